use std::sync::Arc;

/// Sentinel comparison: handles by address, scalars by value.
pub trait Identity {
    fn is_same(&self, other: &Self) -> bool;
}

impl<T: ?Sized> Identity for Arc<T> {
    #[inline]
    fn is_same(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

impl<T: ?Sized> Identity for &'static T {
    #[inline]
    fn is_same(&self, other: &Self) -> bool {
        std::ptr::eq(*self, *other)
    }
}

macro_rules! scalar_identity {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Identity for $ty {
                #[inline]
                fn is_same(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

scalar_identity!(
    (), bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arc_identity_ignores_contents() {
        let a: Arc<str> = Arc::from("UNSET");
        let b: Arc<str> = Arc::from("UNSET");
        assert!(a.is_same(&Arc::clone(&a)));
        assert!(!a.is_same(&b));
    }

    #[test]
    fn test_scalars_by_value() {
        assert!(0_i64.is_same(&0));
        assert!(!'a'.is_same(&'b'));
    }
}
