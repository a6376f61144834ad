use thiserror::Error;

// -----------------------------------------------------------------------------
// CallError

/// An error raised while *calling* a member through its dynamic implementation.
///
/// These are the host's dynamic-invoke failures: a value of the wrong runtime
/// type, a wrong number of arguments, a missing receiver and so on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    #[error("invalid cast from `{from}` to `{to}`")]
    InvalidCast {
        from: &'static str,
        to: &'static str,
    },
    #[error("expected {expected} arguments, found {actual}")]
    ArgumentCount { expected: usize, actual: usize },
    #[error("`{member}` requires a receiver")]
    MissingReceiver { member: &'static str },
    #[error("`{member}` cannot be {access}")]
    Inaccessible {
        member: &'static str,
        access: &'static str,
    },
    #[error("index {index} out of bounds for length {len}")]
    OutOfBounds { index: usize, len: usize },
    #[error("type `{ty}` cannot be hashed")]
    NotHashable { ty: &'static str },
}

impl CallError {
    /// Shorthand for [`CallError::InvalidCast`].
    #[inline]
    pub const fn invalid_cast(from: &'static str, to: &'static str) -> Self {
        Self::InvalidCast { from, to }
    }
}
