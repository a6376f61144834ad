use core::fmt;
use core::sync::atomic::{AtomicU8, Ordering};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::OnceLock;

use vc_reflect::info::typed_access::InstanceAccess;
use vc_reflect::info::{FieldInfo, Typed};

use crate::Strategy;

// -----------------------------------------------------------------------------
// Capabilities

/// Which accelerated strategies may be used.
///
/// [`Strategy::Reflection`] is always supported.
///
/// # Examples
///
/// ```
/// use vc_bind::{Capabilities, Strategy};
///
/// let caps = Capabilities::ALL.with_emit(false);
/// assert!(caps.supports(Strategy::Expression));
/// assert!(!caps.supports(Strategy::Emit));
/// assert!(Capabilities::NONE.supports(Strategy::Reflection));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Capabilities {
    pub expression: bool,
    pub emit: bool,
}

impl Capabilities {
    pub const ALL: Self = Self {
        expression: true,
        emit: true,
    };

    pub const NONE: Self = Self {
        expression: false,
        emit: false,
    };

    const EXPRESSION_BIT: u8 = 1;
    const EMIT_BIT: u8 = 2;

    #[inline]
    pub const fn with_expression(mut self, enabled: bool) -> Self {
        self.expression = enabled;
        self
    }

    #[inline]
    pub const fn with_emit(mut self, enabled: bool) -> Self {
        self.emit = enabled;
        self
    }

    #[inline]
    pub const fn supports(self, strategy: Strategy) -> bool {
        match strategy {
            Strategy::Expression => self.expression,
            Strategy::Emit => self.emit,
            Strategy::Reflection => true,
        }
    }

    /// Detects what this process supports.
    ///
    /// Runs once; later calls return the first result. A strategy is
    /// supported if its cargo feature is enabled and a small self-test
    /// passes. A panicking self-test counts as unsupported.
    pub fn probe() -> Self {
        static PROBED: OnceLock<Capabilities> = OnceLock::new();

        *PROBED.get_or_init(|| {
            let caps = Self {
                expression: cfg!(feature = "expression") && run_probe(Strategy::Expression, crate::expr::self_test),
                emit: cfg!(feature = "emit") && run_probe(Strategy::Emit, emit_self_test),
            };
            log::debug!("capability probe: {caps:?}");
            caps
        })
    }

    #[inline]
    const fn to_bits(self) -> u8 {
        (self.expression as u8 * Self::EXPRESSION_BIT) | (self.emit as u8 * Self::EMIT_BIT)
    }

    #[inline]
    const fn from_bits(bits: u8) -> Self {
        Self {
            expression: bits & Self::EXPRESSION_BIT != 0,
            emit: bits & Self::EMIT_BIT != 0,
        }
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expression={}, emit={}", self.expression, self.emit)
    }
}

fn run_probe(strategy: Strategy, test: fn() -> bool) -> bool {
    match catch_unwind(AssertUnwindSafe(test)) {
        Ok(passed) => passed,
        Err(_) => {
            log::warn!("{strategy} capability probe panicked, disabling it");
            false
        }
    }
}

/// Reads a field through its typed accessor.
fn emit_self_test() -> bool {
    #[derive(Clone, Debug)]
    struct Probe {
        value: u32,
    }

    impl Typed for Probe {}

    let field = FieldInfo::new::<Probe, u32>("value", |this| &this.value, |this| &mut this.value);
    let Some(get) = field
        .typed_access::<InstanceAccess<Probe, u32>>()
        .and_then(InstanceAccess::getter)
    else {
        return false;
    };
    get(&Probe { value: 7 }) == 7
}

// -----------------------------------------------------------------------------
// CapabilityOverride

/// An optional override of the probed [`Capabilities`].
pub(crate) struct CapabilityOverride(AtomicU8);

impl CapabilityOverride {
    const UNSET: u8 = u8::MAX;

    #[inline]
    pub const fn new() -> Self {
        Self(AtomicU8::new(Self::UNSET))
    }

    /// The overriding capabilities, or the probed ones.
    #[inline]
    pub fn current(&self) -> Capabilities {
        match self.0.load(Ordering::Acquire) {
            Self::UNSET => Capabilities::probe(),
            bits => Capabilities::from_bits(bits),
        }
    }

    #[inline]
    pub fn set(&self, caps: Capabilities) -> CapabilityScope<'_> {
        let previous = self.0.swap(caps.to_bits(), Ordering::AcqRel);
        CapabilityScope { slot: self, previous }
    }
}

// -----------------------------------------------------------------------------
// CapabilityScope

/// Restores the previous capabilities when dropped.
///
/// Scopes nest: dropping an inner scope restores the capabilities of the
/// outer one. They must be dropped in reverse creation order.
#[must_use = "the override ends as soon as the scope is dropped"]
pub struct CapabilityScope<'a> {
    slot: &'a CapabilityOverride,
    previous: u8,
}

impl Drop for CapabilityScope<'_> {
    fn drop(&mut self) {
        self.slot.0.store(self.previous, Ordering::Release);
    }
}

impl fmt::Debug for CapabilityScope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityScope")
            .field("current", &self.slot.current())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{Capabilities, CapabilityOverride};

    #[test]
    fn probe_is_stable() {
        let first = Capabilities::probe();
        assert_eq!(first, Capabilities::probe());
        assert_eq!(first.emit, cfg!(feature = "emit"));
        assert_eq!(first.expression, cfg!(feature = "expression"));
    }

    #[test]
    fn scopes_nest() {
        let slot = CapabilityOverride::new();
        let probed = slot.current();
        {
            let _outer = slot.set(Capabilities::NONE);
            assert_eq!(slot.current(), Capabilities::NONE);
            {
                let _inner = slot.set(Capabilities::ALL.with_expression(false));
                assert_eq!(slot.current(), Capabilities::ALL.with_expression(false));
            }
            assert_eq!(slot.current(), Capabilities::NONE);
        }
        assert_eq!(slot.current(), probed);
    }
}
