use core::any::TypeId;
use core::fmt;

use vc_reflect::info::{MemberId, MemberKind, Type};

use crate::Strategy;

// -----------------------------------------------------------------------------
// Category

/// The family a cached binding belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    FieldGetter,
    FieldSetter,
    PropertyGetter,
    PropertySetter,
    IndexerGetter,
    IndexerSetter,
    MethodInvoker,
    Constructor,
    Collection,
}

impl Category {
    /// The getter or setter category of a field or property.
    pub(crate) fn of_value(kind: MemberKind, is_indexer: bool, write: bool) -> Self {
        match (kind, is_indexer, write) {
            (MemberKind::Field, _, false) => Self::FieldGetter,
            (MemberKind::Field, _, true) => Self::FieldSetter,
            (_, true, false) => Self::IndexerGetter,
            (_, true, true) => Self::IndexerSetter,
            (_, false, false) => Self::PropertyGetter,
            (_, false, true) => Self::PropertySetter,
        }
    }
}

// -----------------------------------------------------------------------------
// CollectionKind

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    Array,
    List,
    HashSet,
    Dictionary,
    SetAdder,
    SetClearer,
}

// -----------------------------------------------------------------------------
// Subject

/// What a binding is bound to.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Subject {
    Member(MemberId),
    Collection {
        kind: CollectionKind,
        element: TypeId,
        /// The value type of dictionaries.
        value: Option<TypeId>,
    },
}

impl Subject {
    #[inline]
    pub fn member(id: &MemberId) -> Self {
        Self::Member(id.clone())
    }

    #[inline]
    pub fn collection(kind: CollectionKind, element: &Type) -> Self {
        Self::Collection {
            kind,
            element: element.id(),
            value: None,
        }
    }

    #[inline]
    pub fn dictionary(key: &Type, value: &Type) -> Self {
        Self::Collection {
            kind: CollectionKind::Dictionary,
            element: key.id(),
            value: Some(value.id()),
        }
    }
}

impl fmt::Debug for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Member(id) => write!(f, "{id}"),
            Self::Collection { kind, .. } => write!(f, "{kind:?}"),
        }
    }
}

// -----------------------------------------------------------------------------
// CapabilityKey

/// Identity of one cached binding.
///
/// Two requests share a binding only if they agree on the subject, the
/// strategy and the exact shape, i.e. the requested instance, argument and
/// value types.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CapabilityKey {
    category: Category,
    subject: Subject,
    strategy: Strategy,
    shape: TypeId,
}

impl CapabilityKey {
    #[inline]
    pub fn new(category: Category, subject: Subject, strategy: Strategy, shape: TypeId) -> Self {
        Self {
            category,
            subject,
            strategy,
            shape,
        }
    }

    #[inline]
    pub fn category(&self) -> Category {
        self.category
    }

    #[inline]
    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    #[inline]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    #[inline]
    pub fn shape(&self) -> TypeId {
        self.shape
    }
}
