use crate::error::Error;

/// Computes a fresh value. May run on several threads at once.
pub trait Producer {
    type Output;
    type Error: From<Error>;

    fn produce(&self) -> Result<Self::Output, Self::Error>;
}

impl<F, T, E> Producer for F
where
    F: Fn() -> Result<T, E>,
    E: From<Error>,
{
    type Output = T;
    type Error = E;

    #[inline]
    fn produce(&self) -> Result<T, E> {
        self()
    }
}

/// Adapts a producer that cannot fail.
#[derive(Clone, Copy, Debug)]
pub struct Infallible<F>(pub F);

impl<F, T> Producer for Infallible<F>
where
    F: Fn() -> T,
{
    type Output = T;
    type Error = Error;

    #[inline]
    fn produce(&self) -> Result<T, Error> {
        Ok((self.0)())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_producer() {
        let p = || -> anyhow::Result<u8> { Ok(7) };
        assert_eq!(p.produce().ok(), Some(7));

        let failing = || -> anyhow::Result<u8> { anyhow::bail!("nope") };
        assert_eq!(failing.produce().unwrap_err().to_string(), "nope");
    }

    #[test]
    fn test_infallible() {
        assert_eq!(Infallible(|| "x").produce(), Ok("x"));
    }
}
