//! Diagnostic ledgers
//!
//! Each baking domain (animation, mesh, UV) keeps its own deduplicated,
//! insertion-ordered set of active diagnostics. Preconditions are re-evaluated
//! on every refresh and toggle their entry on or off.

use smallvec::SmallVec;
use std::fmt;

/// Baking domain a ledger belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Animation,
    Mesh,
    Uv,
}

/// Severity of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Blocks further configuration and baking for the domain
    Error,
    /// Surfaced, the bake still proceeds
    Warning,
}

/// Every condition the baker can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Diagnostic {
    MissingRigObject,
    MissingSkinnedMesh,
    MissingAnimator,
    MissingAnimatorController,
    NoAnimationClips,
    MissingMesh,
    MissingUvMesh,
    UvAlreadyExists,
    PixelOutOfRange,
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Self::NoAnimationClips | Self::UvAlreadyExists | Self::PixelOutOfRange => {
                Severity::Warning
            }
            _ => Severity::Error,
        }
    }

    /// Whether this diagnostic stops the domain from configuring or baking
    ///
    /// `NoAnimationClips` is worded as a warning but there is nothing to bake.
    pub fn is_blocking(&self) -> bool {
        !matches!(self, Self::UvAlreadyExists | Self::PixelOutOfRange)
    }

    /// Whether this diagnostic may be recorded in `domain`'s ledger
    pub fn belongs_to(&self, domain: Domain) -> bool {
        match self {
            Self::MissingRigObject
            | Self::MissingSkinnedMesh
            | Self::MissingAnimator
            | Self::MissingAnimatorController
            | Self::NoAnimationClips => domain == Domain::Animation,
            Self::MissingMesh => domain == Domain::Mesh,
            Self::MissingUvMesh | Self::UvAlreadyExists => domain == Domain::Uv,
            Self::PixelOutOfRange => matches!(domain, Domain::Animation | Domain::Mesh),
        }
    }

    /// Message text without the severity prefix
    pub fn message(&self) -> &'static str {
        match self {
            Self::MissingRigObject => {
                "An animation rig object is not assigned for texture creation. Please assign one."
            }
            Self::MissingSkinnedMesh => "Could not find a skinned mesh in the rig's hierarchy.",
            Self::MissingAnimator => "Could not find an animator (skin joints) in the rig's hierarchy.",
            Self::MissingAnimatorController => {
                "Could not find an animation controller (no animations) on the rig."
            }
            Self::NoAnimationClips => {
                "There are no animation clips on this animator. You can't bake nonexistent clips."
            }
            Self::MissingMesh => "A mesh is not assigned for baking. Please assign one.",
            Self::MissingUvMesh => "A mesh is not assigned for UV application. Please assign one.",
            Self::UvAlreadyExists => {
                "This mesh already has assigned UVs on this layer. Applying will overwrite them."
            }
            Self::PixelOutOfRange => {
                "A pixel's value was out of range (less than 0 or greater than 1). The texture will save with the clamped pixel if set to LDR."
            }
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.severity() {
            Severity::Error => "ERROR: ",
            Severity::Warning => "Warning: ",
        };
        write!(f, "{}{}", prefix, self.message())
    }
}

/// Ordered set of active diagnostics for one domain
#[derive(Debug, Clone)]
pub struct Ledger {
    domain: Domain,
    entries: SmallVec<[Diagnostic; 4]>,
}

impl Ledger {
    pub fn new(domain: Domain) -> Self {
        Self {
            domain,
            entries: SmallVec::new(),
        }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Insert `key` when `active`, remove it otherwise; returns `active`
    ///
    /// Insertion keeps first-activation order. Repeated calls with the same
    /// condition are no-ops.
    pub fn set_condition(&mut self, key: Diagnostic, active: bool) -> bool {
        debug_assert!(
            key.belongs_to(self.domain),
            "{:?} is not a {:?} diagnostic",
            key,
            self.domain
        );
        let position = self.entries.iter().position(|entry| *entry == key);
        match (active, position) {
            (true, None) => self.entries.push(key),
            (false, Some(index)) => {
                self.entries.remove(index);
            }
            _ => {}
        }
        active
    }

    pub fn contains(&self, key: Diagnostic) -> bool {
        self.entries.contains(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = Diagnostic> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when any active entry blocks the domain
    pub fn is_blocked(&self) -> bool {
        self.entries.iter().any(Diagnostic::is_blocking)
    }
}

/// The three independent ledgers
#[derive(Debug, Clone)]
pub struct Diagnostics {
    pub animation: Ledger,
    pub mesh: Ledger,
    pub uv: Ledger,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self {
            animation: Ledger::new(Domain::Animation),
            mesh: Ledger::new(Domain::Mesh),
            uv: Ledger::new(Domain::Uv),
        }
    }
}

impl Diagnostics {
    pub fn ledger(&self, domain: Domain) -> &Ledger {
        match domain {
            Domain::Animation => &self.animation,
            Domain::Mesh => &self.mesh,
            Domain::Uv => &self.uv,
        }
    }

    pub fn ledger_mut(&mut self, domain: Domain) -> &mut Ledger {
        match domain {
            Domain::Animation => &mut self.animation,
            Domain::Mesh => &mut self.mesh,
            Domain::Uv => &mut self.uv,
        }
    }
}

/// Evaluate preconditions in priority order
///
/// The first failing check is set and every later check is cleared, since it
/// cannot be evaluated yet. Returns `true` when all checks pass.
pub(crate) fn evaluate_chain(ledger: &mut Ledger, checks: &[(Diagnostic, bool)]) -> bool {
    let mut failed = false;
    for &(key, failing) in checks {
        if failed {
            ledger.set_condition(key, false);
        } else {
            failed = ledger.set_condition(key, failing);
        }
    }
    !failed
}
