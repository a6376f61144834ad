use alloc::vec;
use alloc::vec::Vec;

use crate::info::{Type, Typed};
use crate::{CallError, Object};

// -----------------------------------------------------------------------------
// ArgList

/// A tuple of statically typed arguments.
///
/// Implemented for tuples of up to four [`Typed`] elements.
pub trait ArgList: Sized + Send + 'static {
    /// Number of arguments.
    const ARITY: usize;

    /// The argument types, in order.
    fn types() -> Vec<Type>;

    /// Boxes every argument.
    fn into_objects(self) -> Vec<Object>;

    /// Clones the arguments out of `args` with checked unboxing.
    fn from_objects(args: &[Object]) -> Result<Self, CallError>;
}

// -----------------------------------------------------------------------------
// IntoMethod

/// A closure usable as an instance method of `I`.
///
/// Implemented for `Fn(&mut I, A0, ..) -> R` with up to four arguments.
pub trait IntoMethod<I, Args, R>: Send + Sync + 'static {
    fn call(&self, this: &mut I, args: Args) -> R;
}

/// A closure usable as a static method or constructor.
///
/// Implemented for `Fn(A0, ..) -> R` with up to four arguments.
pub trait IntoFunction<Args, R>: Send + Sync + 'static {
    fn call(&self, args: Args) -> R;
}

macro_rules! impl_arity {
    ($arity:literal $(, $A:ident $a:ident $i:tt)*) => {
        impl<$($A: Typed),*> ArgList for ($($A,)*) {
            const ARITY: usize = $arity;

            fn types() -> Vec<Type> {
                vec![$($A::ty()),*]
            }

            fn into_objects(self) -> Vec<Object> {
                let ($($a,)*) = self;
                vec![$(Object::new($a)),*]
            }

            #[allow(unused_variables, reason = "empty tuple ignores `args`")]
            fn from_objects(args: &[Object]) -> Result<Self, CallError> {
                if args.len() != $arity {
                    return Err(CallError::ArgumentCount {
                        expected: $arity,
                        actual: args.len(),
                    });
                }
                Ok(($(args[$i].clone_as::<$A>()?,)*))
            }
        }

        impl<I, R, F $(, $A)*> IntoMethod<I, ($($A,)*), R> for F
        where
            F: Fn(&mut I $(, $A)*) -> R + Send + Sync + 'static,
        {
            #[inline]
            fn call(&self, this: &mut I, ($($a,)*): ($($A,)*)) -> R {
                self(this $(, $a)*)
            }
        }

        impl<R, F $(, $A)*> IntoFunction<($($A,)*), R> for F
        where
            F: Fn($($A),*) -> R + Send + Sync + 'static,
        {
            #[inline]
            fn call(&self, ($($a,)*): ($($A,)*)) -> R {
                self($($a),*)
            }
        }
    };
}

impl_arity!(0);
impl_arity!(1, A0 a0 0);
impl_arity!(2, A0 a0 0, A1 a1 1);
impl_arity!(3, A0 a0 0, A1 a1 1, A2 a2 2);
impl_arity!(4, A0 a0 0, A1 a1 1, A2 a2 2, A3 a3 3);

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::String;

    #[test]
    fn arg_list_types_and_objects() {
        assert_eq!(<(i32, String)>::ARITY, 2);
        assert_eq!(<(i32, String)>::types(), vec![i32::ty(), String::ty()]);

        let objects = (1_i32, String::from("x")).into_objects();
        let back = <(i32, String)>::from_objects(&objects).unwrap();
        assert_eq!(back, (1, String::from("x")));
    }

    #[test]
    fn from_objects_rejects_mismatch() {
        let objects = vec![Object::new(1_u8)];
        assert!(matches!(
            <(i32,)>::from_objects(&objects),
            Err(CallError::InvalidCast { .. })
        ));
        assert!(matches!(
            <(i32, i32)>::from_objects(&objects),
            Err(CallError::ArgumentCount { expected: 2, actual: 1 })
        ));
    }
}
