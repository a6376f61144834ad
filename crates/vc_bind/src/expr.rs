//! Expression trees over a call [`Frame`], compiled into closures.
//!
//! Compiling type-checks every [`Expr::Convert`] against the coercion
//! policy and fails when a conversion does not exist. A compiled tree does
//! no lookups at call time.

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::mem;

use vc_reflect::info::{DynGetter, DynInvoke, DynSetter, Type, Typed};
use vc_reflect::registry::TypeRegistry;
use vc_reflect::{CallError, Object, Reflect};

use crate::coercion;

// -----------------------------------------------------------------------------
// Frame

enum Receiver<'a> {
    Static,
    Shared(&'a dyn Reflect),
    Exclusive(&'a mut dyn Reflect),
}

impl<'a> Receiver<'a> {
    // `&mut` is invariant, shorten the object lifetime by coercion.
    fn exclusive<'r: 'a>(receiver: Option<&'a mut (dyn Reflect + 'r)>) -> Self {
        match receiver {
            Some(this) => {
                let this: &'a mut dyn Reflect = this;
                Self::Exclusive(this)
            }
            None => Self::Static,
        }
    }
}

enum Args<'a> {
    Shared(&'a [Object]),
    Exclusive(&'a mut [Object]),
}

/// The inputs of one evaluation.
pub(crate) struct Frame<'a> {
    receiver: Receiver<'a>,
    args: Args<'a>,
    value: Option<Object>,
}

impl<'a> Frame<'a> {
    /// A frame for reads.
    pub fn shared(receiver: Option<&'a dyn Reflect>, args: &'a [Object]) -> Self {
        Self {
            receiver: receiver.map_or(Receiver::Static, Receiver::Shared),
            args: Args::Shared(args),
            value: None,
        }
    }

    /// A frame for writes, `value` is read by [`Expr::Value`].
    pub fn write<'r: 'a>(receiver: Option<&'a mut (dyn Reflect + 'r)>, args: &'a [Object], value: Object) -> Self {
        Self {
            receiver: Receiver::exclusive(receiver),
            args: Args::Shared(args),
            value: Some(value),
        }
    }

    /// A frame for calls, by-reference results are written back into `args`.
    pub fn exclusive<'r: 'a>(receiver: Option<&'a mut (dyn Reflect + 'r)>, args: &'a mut [Object]) -> Self {
        Self {
            receiver: Receiver::exclusive(receiver),
            args: Args::Exclusive(args),
            value: None,
        }
    }

    fn receiver_ref(&self) -> Option<&dyn Reflect> {
        match &self.receiver {
            Receiver::Static => None,
            Receiver::Shared(this) => Some(*this),
            Receiver::Exclusive(this) => Some(&**this),
        }
    }

    fn receiver_mut(&mut self) -> Option<&mut dyn Reflect> {
        match &mut self.receiver {
            Receiver::Exclusive(this) => {
                let this: &mut dyn Reflect = &mut **this;
                Some(this)
            }
            Receiver::Static | Receiver::Shared(_) => None,
        }
    }

    fn arg(&self, index: usize) -> Result<Object, CallError> {
        let args: &[Object] = match &self.args {
            Args::Shared(args) => args,
            Args::Exclusive(args) => args,
        };
        args.get(index).cloned().ok_or(CallError::OutOfBounds {
            index,
            len: args.len(),
        })
    }

    fn take_value(&mut self) -> Result<Object, CallError> {
        self.value
            .take()
            .ok_or(CallError::ArgumentCount { expected: 1, actual: 0 })
    }

    fn write_back(&mut self, index: usize, value: Object) {
        if let Args::Exclusive(args) = &mut self.args
            && let Some(slot) = args.get_mut(index)
        {
            *slot = value;
        }
    }
}

// -----------------------------------------------------------------------------
// Expr

pub(crate) type Compiled = Arc<dyn Fn(&mut Frame<'_>) -> Result<Object, CallError> + Send + Sync>;

#[inline]
fn compiled(f: impl Fn(&mut Frame<'_>) -> Result<Object, CallError> + Send + Sync + 'static) -> Compiled {
    Arc::new(f)
}

/// A node of an expression tree.
///
/// Every node has a static [`Type`], see [`Expr::ty`].
pub(crate) enum Expr {
    /// The argument at `index`.
    Arg { index: usize, ty: Type },
    /// The value being written.
    Value { ty: Type },
    Convert { inner: Box<Expr>, to: Type },
    /// Reads a member of the frame's receiver.
    Read {
        getter: DynGetter,
        ty: Type,
        index: Vec<Expr>,
    },
    /// Writes a member of the frame's receiver, typed `()`.
    Write {
        setter: DynSetter,
        index: Vec<Expr>,
        value: Box<Expr>,
    },
    /// Calls with the frame's receiver. Arguments at `write_back` positions
    /// are copied back into the frame after the call.
    Call {
        invoke: DynInvoke,
        ret: Type,
        args: Vec<Expr>,
        write_back: Vec<usize>,
    },
}

impl Expr {
    #[inline]
    pub fn arg(index: usize, ty: Type) -> Self {
        Self::Arg { index, ty }
    }

    #[inline]
    pub fn value(ty: Type) -> Self {
        Self::Value { ty }
    }

    #[inline]
    pub fn read(getter: DynGetter, ty: Type, index: Vec<Expr>) -> Self {
        Self::Read { getter, ty, index }
    }

    #[inline]
    pub fn write(setter: DynSetter, index: Vec<Expr>, value: Expr) -> Self {
        Self::Write {
            setter,
            index,
            value: Box::new(value),
        }
    }

    #[inline]
    pub fn call(invoke: DynInvoke, ret: Type, args: Vec<Expr>, write_back: Vec<usize>) -> Self {
        Self::Call {
            invoke,
            ret,
            args,
            write_back,
        }
    }

    /// Wraps `self` in a conversion to `to`, unless it already has that type.
    pub fn convert(self, to: Type) -> Self {
        if self.ty() == to {
            self
        } else {
            Self::Convert {
                inner: Box::new(self),
                to,
            }
        }
    }

    pub fn ty(&self) -> Type {
        match self {
            Self::Arg { ty, .. } | Self::Value { ty } | Self::Read { ty, .. } => *ty,
            Self::Convert { to, .. } => *to,
            Self::Write { .. } => <()>::ty(),
            Self::Call { ret, .. } => *ret,
        }
    }

    /// Type-checks and compiles the tree.
    ///
    /// Returns `None` if some conversion has no implementation.
    pub fn compile(&self, registry: &TypeRegistry) -> Option<Compiled> {
        match self {
            Self::Arg { index, .. } => {
                let index = *index;
                Some(compiled(move |frame| frame.arg(index)))
            }
            Self::Value { .. } => Some(compiled(|frame| frame.take_value())),
            Self::Convert { inner, to } => {
                let conversion = coercion::classify(registry, &inner.ty(), to)?;
                let inner = inner.compile(registry)?;
                if conversion.is_noop() {
                    return Some(inner);
                }
                Some(compiled(move |frame| conversion.apply(inner(frame)?)))
            }
            Self::Read { getter, index, .. } => {
                let getter = getter.clone();
                let index = compile_all(index, registry)?;
                Some(compiled(move |frame| {
                    let index = eval_all(&index, frame)?;
                    getter(frame.receiver_ref(), &index)
                }))
            }
            Self::Write { setter, index, value } => {
                let setter = setter.clone();
                let index = compile_all(index, registry)?;
                let value = value.compile(registry)?;
                Some(compiled(move |frame| {
                    let index = eval_all(&index, frame)?;
                    let value = value(frame)?;
                    setter(frame.receiver_mut(), &index, value)?;
                    Ok(Object::unit())
                }))
            }
            Self::Call {
                invoke,
                args,
                write_back,
                ..
            } => {
                let invoke = invoke.clone();
                let args = compile_all(args, registry)?;
                let write_back = write_back.clone();
                Some(compiled(move |frame| {
                    let mut values = eval_all(&args, frame)?;
                    let out = invoke(frame.receiver_mut(), &mut values)?;
                    for &index in &write_back {
                        if let Some(slot) = values.get_mut(index) {
                            frame.write_back(index, mem::replace(slot, Object::unit()));
                        }
                    }
                    Ok(out)
                }))
            }
        }
    }
}

fn compile_all(exprs: &[Expr], registry: &TypeRegistry) -> Option<Vec<Compiled>> {
    exprs.iter().map(|expr| expr.compile(registry)).collect()
}

fn eval_all(exprs: &[Compiled], frame: &mut Frame<'_>) -> Result<Vec<Object>, CallError> {
    exprs.iter().map(|expr| expr(frame)).collect()
}

// -----------------------------------------------------------------------------
// Probe

/// Compiles and runs a tree exercising reads, conversions and arguments.
pub(crate) fn self_test() -> bool {
    let registry = TypeRegistry::empty();
    let getter: DynGetter = Arc::new(|_, args| Ok(args.first().cloned().unwrap_or_else(Object::unit)));

    let tree = Expr::read(getter, Object::ty(), alloc::vec![Expr::arg(0, u32::ty())]).convert(u32::ty());
    let Some(compiled) = tree.compile(&registry) else {
        return false;
    };

    let args = [Object::new(7_u32)];
    matches!(
        compiled(&mut Frame::shared(None, &args)).and_then(Object::take_as::<u32>),
        Ok(7)
    )
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::sync::Arc;
    use alloc::vec;
    use alloc::vec::Vec;

    use vc_reflect::info::{DynInvoke, DynSetter, Typed};
    use vc_reflect::registry::TypeRegistry;
    use vc_reflect::{CallError, Object, Reflect};

    use super::{Expr, Frame};

    #[test]
    fn probe_passes() {
        assert!(super::self_test());
    }

    #[test]
    fn missing_conversion_fails_to_compile() {
        let registry = TypeRegistry::new();
        let tree = Expr::arg(0, i32::ty()).convert(i64::ty());
        assert!(tree.compile(&registry).is_none());

        let tree = Expr::arg(0, i32::ty()).convert(Object::ty());
        assert!(tree.compile(&registry).is_some());
    }

    #[test]
    fn unbox_is_checked_at_call() {
        let registry = TypeRegistry::new();
        let compiled = Expr::arg(0, Object::ty())
            .convert(i32::ty())
            .compile(&registry)
            .unwrap();

        let ok = [Object::new(5_i32)];
        assert_eq!(compiled(&mut Frame::shared(None, &ok)).unwrap().take_as::<i32>(), Ok(5));

        let bad = [Object::new(String::from("5"))];
        assert!(matches!(
            compiled(&mut Frame::shared(None, &bad)),
            Err(CallError::InvalidCast { .. })
        ));
    }

    #[test]
    fn write_uses_value() {
        let registry = TypeRegistry::new();
        let setter: DynSetter = Arc::new(|this, _, value| {
            let this = this.and_then(|this| this.downcast_mut::<i32>()).unwrap();
            *this = value.take_as::<i32>()?;
            Ok(())
        });
        let compiled = Expr::write(setter, Vec::new(), Expr::value(Object::ty()).convert(i32::ty()))
            .compile(&registry)
            .unwrap();

        let mut target = 0_i32;
        let this: &mut dyn Reflect = &mut target;
        compiled(&mut Frame::write(Some(this), &[], Object::new(9_i32))).unwrap();
        assert_eq!(target, 9);
    }

    #[test]
    fn call_writes_back() {
        let registry = TypeRegistry::new();
        // Doubles its only argument in place and returns the old value.
        let invoke: DynInvoke = Arc::new(|_, args| {
            let old = args[0].clone_as::<i32>()?;
            args[0] = Object::new(old * 2);
            Ok(Object::new(old))
        });
        let tree = Expr::call(
            invoke,
            i32::ty(),
            vec![Expr::arg(0, Object::ty()).convert(i32::ty())],
            vec![0],
        )
        .convert(Object::ty());
        let compiled = tree.compile(&registry).unwrap();

        let mut args = [Object::new(21_i32)];
        let out = compiled(&mut Frame::exclusive(None, &mut args)).unwrap();
        assert_eq!(out.take_as::<i32>(), Ok(21));
        assert_eq!(args[0].clone_as::<i32>(), Ok(42));
    }
}
