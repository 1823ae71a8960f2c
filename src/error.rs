use thiserror::Error;

/// Failures raised by the thread-local machinery itself.
///
/// Producer errors are never wrapped in this type; instead a producer's error
/// type must be able to absorb it through `From<Error>`.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("Reentrant computation: the producer accessed its own slot while computing it")]
    ReentrantComputation,

    #[error("Thread-local storage already destroyed for this thread")]
    StorageDestroyed,
}

pub type LResult<T> = Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_anyhow() {
        let err: anyhow::Error = Error::ReentrantComputation.into();
        assert_eq!(
            err.downcast_ref::<Error>(),
            Some(&Error::ReentrantComputation)
        );
    }
}
