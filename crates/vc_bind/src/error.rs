use alloc::string::String;

use thiserror::Error;
use vc_reflect::CallError;
use vc_reflect::info::{MemberId, MemberKind};

/// Errors raised while requesting a binding.
///
/// Every variant except [`BindError::Call`] is a contract violation: it is
/// detected before the binding cache is touched, so a rejected request
/// leaves no trace behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("`{member}` is a {found}, expected a {expected}")]
    WrongMemberKind {
        member: MemberId,
        expected: &'static str,
        found: MemberKind,
    },
    /// `expected` is `"static"` or `"an instance member"`.
    #[error("`{member}` is not {expected}")]
    StaticMismatch {
        member: MemberId,
        expected: &'static str,
    },
    #[error("`{member}` has no getter")]
    MissingGetter { member: MemberId },
    #[error("`{member}` has no setter")]
    MissingSetter { member: MemberId },
    #[error("`{member}` is declared on `{declaring}`, not on `{requested}`")]
    InstanceType {
        member: MemberId,
        declaring: &'static str,
        requested: &'static str,
    },
    #[error("`{member}` takes {expected} arguments, {actual} were requested")]
    ArgumentCount {
        member: MemberId,
        expected: usize,
        actual: usize,
    },
    #[error("parameter {index} of `{member}` is `{declared}`, no conversion from `{requested}`")]
    ParameterType {
        member: MemberId,
        index: usize,
        declared: &'static str,
        requested: &'static str,
    },
    #[error("parameter {index} of `{member}` is passed by reference, use the object-array invoker")]
    ByRefParameter { member: MemberId, index: usize },
    #[error("`{member}` is not an indexer")]
    NotAnIndexer { member: MemberId },
    #[error("`{ty}` has no constructor taking ({params})")]
    NoConstructor { ty: &'static str, params: String },
    #[error("`{ty}` has no member `{name}` matching the arguments")]
    NoMatchingMember { ty: &'static str, name: String },
    #[error("type `{ty}` is not registered")]
    UnknownType { ty: String },
    #[error("generic definition `{definition}` is not registered")]
    UnknownGenericDefinition { definition: String },
    #[error("type `{ty}` cannot be hashed")]
    NotHashable { ty: &'static str },
    #[error(transparent)]
    Call(#[from] CallError),
}

impl BindError {
    /// Returns `true` for errors raised by argument validation.
    ///
    /// These are reported before any cache interaction.
    #[inline]
    pub fn is_contract_violation(&self) -> bool {
        !matches!(self, Self::Call(_))
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use vc_reflect::CallError;
    use vc_reflect::info::{MemberId, MemberKind, Typed};

    use super::BindError;

    #[test]
    fn contract_violations() {
        let member = MemberId::new(i32::ty(), MemberKind::Field, "x", &[]);

        let missing = BindError::MissingGetter { member };
        assert!(missing.is_contract_violation());

        let call = BindError::from(CallError::invalid_cast("i32", "String"));
        assert!(!call.is_contract_violation());
        assert_eq!(call.to_string(), "invalid cast from `i32` to `String`");
    }
}
