// Licensed under the Apache-2.0 license

use super::ShaAlgo;

/// Engine ownership state of one hash operation.
///
/// The first-block flag only exists while the operation drives the hardware,
/// so a software operation carries no register-protocol state at all.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EngineMode {
    Uninitialized,
    Hardware { first_block: bool },
    Software,
    /// Hardware path failed after commit. Cleared by the unroll procedure at
    /// the next lock attempt.
    NeedsUnroll,
}

/// Per-operation engine state.
///
/// One context exists per in-flight hash. It records which path the operation
/// committed to and how many clock-enable calls it still owes the platform.
#[derive(Debug, Clone)]
pub struct ShaContext {
    pub(crate) algo: ShaAlgo,
    pub(crate) mode: EngineMode,
    pub(crate) lock_depth: u32,
    pub(crate) owns_mutex: bool,
}

impl ShaContext {
    #[must_use]
    pub const fn new(algo: ShaAlgo) -> Self {
        Self {
            algo,
            mode: EngineMode::Uninitialized,
            lock_depth: 0,
            owns_mutex: false,
        }
    }

    /// Context that never competes for the engine.
    #[must_use]
    pub const fn software(algo: ShaAlgo) -> Self {
        Self {
            algo,
            mode: EngineMode::Software,
            lock_depth: 0,
            owns_mutex: false,
        }
    }

    #[must_use]
    pub const fn algo(&self) -> ShaAlgo {
        self.algo
    }

    #[must_use]
    pub const fn mode(&self) -> EngineMode {
        self.mode
    }

    #[must_use]
    pub const fn lock_depth(&self) -> u32 {
        self.lock_depth
    }

    #[must_use]
    pub const fn is_hardware(&self) -> bool {
        matches!(self.mode, EngineMode::Hardware { .. })
    }

    /// True until the first block has been committed to the engine.
    #[must_use]
    pub const fn is_first_block(&self) -> bool {
        matches!(
            self.mode,
            EngineMode::Hardware { first_block: true } | EngineMode::Uninitialized
        )
    }

    /// Whether the context still holds the engine mutex or owes clock disables.
    #[must_use]
    pub const fn holds_engine(&self) -> bool {
        self.owns_mutex || self.lock_depth > 0
    }
}
