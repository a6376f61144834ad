use core::fmt;

// -----------------------------------------------------------------------------
// Strategy

/// A way of producing a binding.
///
/// - [`Strategy::Emit`] calls the typed accessor captured at registration,
///   with conversions decided once at build time.
/// - [`Strategy::Expression`] compiles a small expression tree into closures.
/// - [`Strategy::Reflection`] calls the erased implementation and checks
///   every conversion at call time. It always succeeds and ends every ladder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    Expression,
    Emit,
    Reflection,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Self::Expression, Self::Emit, Self::Reflection];

    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Expression => "expression",
            Self::Emit => "emit",
            Self::Reflection => "reflection",
        }
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// -----------------------------------------------------------------------------
// Operation

/// The kind of binding being requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Get,
    Set,
    StaticGet,
    StaticSet,
    IndexGet,
    IndexSet,
    Invoke,
    Construct,
    Collection,
}

// -----------------------------------------------------------------------------
// Ladder

/// Per-operation order of the non-fallback strategies.
///
/// [`Strategy::Reflection`] is implicitly appended to every ladder.
///
/// # Examples
///
/// ```
/// use vc_bind::{Ladder, Operation, Strategy};
///
/// assert_eq!(Ladder::for_op(Operation::Get, true), &[Strategy::Emit, Strategy::Expression]);
/// assert_eq!(Ladder::for_op(Operation::Get, false), &[Strategy::Expression, Strategy::Emit]);
/// assert_eq!(Ladder::for_op(Operation::Collection, false), &[Strategy::Emit]);
/// ```
pub struct Ladder;

impl Ladder {
    const EMIT_FIRST: &'static [Strategy] = &[Strategy::Emit, Strategy::Expression];
    const EXPRESSION_FIRST: &'static [Strategy] = &[Strategy::Expression, Strategy::Emit];
    const COLLECTION: &'static [Strategy] = &[Strategy::Emit];

    /// Returns the ladder of `op`, `typed` is `false` for object-typed shapes.
    ///
    /// Typed shapes and statics start with the typed accessor since it
    /// needs no boxing. Object-typed shapes and indexers box anyway and
    /// start with a compiled expression.
    pub const fn for_op(op: Operation, typed: bool) -> &'static [Strategy] {
        match op {
            Operation::Collection => Self::COLLECTION,
            Operation::IndexGet | Operation::IndexSet => Self::EXPRESSION_FIRST,
            Operation::StaticGet | Operation::StaticSet => Self::EMIT_FIRST,
            _ if typed => Self::EMIT_FIRST,
            _ => Self::EXPRESSION_FIRST,
        }
    }
}
