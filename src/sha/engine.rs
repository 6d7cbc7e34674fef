// Licensed under the Apache-2.0 license

//! Engine arbitration.
//!
//! There is one physical accelerator for every hash type, so at most one
//! context may drive it at a time. A context asks for the engine once, at its
//! first block. If the engine is taken (or the mutex cannot be created) the
//! context runs in software for its whole lifetime; this is not an error.
//!
//! Every context that wins the engine issues one clock enable. The platform
//! keeps a reference count for the SHA clock that is shared with other
//! drivers, so each enable must be paired with exactly one disable. When a
//! hardware operation fails after commit the context is parked in
//! `EngineMode::NeedsUnroll` and the debt is paid at its next lock attempt.

use super::{EngineMode, ShaAlgo, ShaContext};
use crate::platform::{ClockGate, HwMutex};
use crate::registers::{busy_reg, ShaRegisters, SHA_SELECTORS};
use core::fmt;
use core::sync::atomic::{AtomicU8, Ordering};
use fugit::MillisDurationU32;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// `try_lock` on a context that already committed to a mode.
    LockPrecondition,
    /// Register protocol requested by a context that does not own the engine.
    NotInHardwareMode,
    /// The engine has no unit for the algorithm. The context needs unroll.
    UnsupportedAlgorithm(ShaAlgo),
    UnknownSelector(u8),
    /// A busy bit stayed set past the configured poll limit.
    BusyTimeout,
    /// Output buffer or block has the wrong size.
    BadLength,
    /// The context is still waiting for its unroll.
    RecoveryPending,
    /// The operation failed earlier and cannot continue.
    Aborted,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::LockPrecondition => f.write_str("context already committed to a mode"),
            EngineError::NotInHardwareMode => f.write_str("context does not own the engine"),
            EngineError::UnsupportedAlgorithm(algo) => {
                write!(f, "{algo:?} is not implemented by the engine")
            }
            EngineError::UnknownSelector(sel) => write!(f, "unknown sha selector {sel}"),
            EngineError::BusyTimeout => f.write_str("engine busy bit never cleared"),
            EngineError::BadLength => f.write_str("buffer has the wrong length"),
            EngineError::RecoveryPending => f.write_str("context needs unroll before reuse"),
            EngineError::Aborted => f.write_str("operation aborted by an earlier failure"),
        }
    }
}

/// Path chosen by a successful `try_lock`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LockOutcome {
    Hardware,
    Software,
}

/// Result of paying back a context's clock-enable debt.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct UnrollReport {
    /// Lock depth recorded in the context.
    pub expected: u32,
    /// Disables actually issued before the clock bit read zero.
    pub issued: u32,
}

impl UnrollReport {
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        self.expected == self.issued
    }
}

#[derive(Debug, Copy, Clone)]
pub struct EngineConfig {
    /// Passed to `HwMutex::try_lock`. Zero means never wait for the engine.
    pub lock_timeout: MillisDurationU32,
    /// Busy-bit re-reads allowed after the first one. `None` blocks until the
    /// engine is idle.
    pub busy_poll_limit: Option<u32>,
}

impl EngineConfig {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lock_timeout: MillisDurationU32::millis(0),
            busy_poll_limit: None,
        }
    }

    #[must_use]
    pub const fn with_lock_timeout(mut self, timeout: MillisDurationU32) -> Self {
        self.lock_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_busy_poll_limit(mut self, limit: u32) -> Self {
        self.busy_poll_limit = Some(limit);
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

const MUTEX_UNINIT: u8 = 0;
const MUTEX_INITIALIZING: u8 = 1;
const MUTEX_READY: u8 = 2;

/// Owner of the accelerator, its clock gate and its mutex.
///
/// Shared by reference between all hash operations. All methods take `&self`;
/// exclusivity of the register block is provided by the mutex.
pub struct ShaEngine<R, C, M> {
    regs: R,
    clock: C,
    mutex: M,
    config: EngineConfig,
    mutex_state: AtomicU8,
}

impl<R, C, M> ShaEngine<R, C, M>
where
    R: ShaRegisters,
    C: ClockGate,
    M: HwMutex,
{
    pub const fn new(regs: R, clock: C, mutex: M, config: EngineConfig) -> Self {
        Self {
            regs,
            clock,
            mutex,
            config,
            mutex_state: AtomicU8::new(MUTEX_UNINIT),
        }
    }

    pub fn regs(&self) -> &R {
        &self.regs
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn mutex(&self) -> &M {
        &self.mutex
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Decides whether `ctx` runs on the engine or in software.
    ///
    /// Never waits beyond `EngineConfig::lock_timeout`. A context parked in
    /// `NeedsUnroll` is unrolled first and then competes normally.
    ///
    /// # Errors
    /// `EngineError::LockPrecondition` when `ctx` already runs in hardware or
    /// software.
    pub fn try_lock(&self, ctx: &mut ShaContext) -> Result<LockOutcome, EngineError> {
        log::trace!("enter try_lock {:?}", ctx.algo);

        match ctx.mode {
            EngineMode::Uninitialized => {}
            EngineMode::NeedsUnroll => {
                self.unroll(ctx);
            }
            EngineMode::Hardware { .. } | EngineMode::Software => {
                log::error!("unexpected try_lock on context in {:?}", ctx.mode);
                return Err(EngineError::LockPrecondition);
            }
        }

        if !self.ensure_mutex() {
            ctx.mode = EngineMode::Software;
            return Ok(LockOutcome::Software);
        }

        match self.mutex.try_lock(self.config.lock_timeout) {
            Ok(()) => {}
            Err(nb::Error::WouldBlock) => {
                log::info!("engine in use, {:?} reverts to software", ctx.algo);
                ctx.mode = EngineMode::Software;
                return Ok(LockOutcome::Software);
            }
            Err(nb::Error::Other(err)) => {
                log::warn!("engine mutex failed ({err:?}), {:?} reverts to software", ctx.algo);
                ctx.mode = EngineMode::Software;
                return Ok(LockOutcome::Software);
            }
        }

        ctx.owns_mutex = true;
        ctx.mode = EngineMode::Hardware { first_block: true };
        self.clock.enable();
        ctx.lock_depth += 1;

        log::trace!("leave try_lock, hardware mode");
        Ok(LockOutcome::Hardware)
    }

    /// Releases whatever `ctx` holds.
    ///
    /// Call once for every successful `try_lock`, whichever path it chose.
    /// The disable is only issued while the context still owes one.
    pub fn unlock(&self, ctx: &mut ShaContext) {
        log::trace!("enter unlock {:?}", ctx.algo);

        if ctx.lock_depth > 0 {
            self.clock.disable();
            ctx.lock_depth -= 1;
        }
        if ctx.owns_mutex {
            self.mutex.unlock();
            ctx.owns_mutex = false;
        }
        if ctx.mode != EngineMode::NeedsUnroll {
            ctx.mode = EngineMode::Uninitialized;
        }
    }

    /// Issues up to `ctx.lock_depth` disables, stopping once the clock bit
    /// reads zero, then returns the context to `Uninitialized`.
    ///
    /// A mismatch between the recorded depth and the disables it took means
    /// another driver's references may have been consumed. It is reported but
    /// not fatal.
    pub fn unroll(&self, ctx: &mut ShaContext) -> UnrollReport {
        let expected = ctx.lock_depth;
        let mut issued = 0;

        while issued < expected {
            self.clock.disable();
            issued += 1;
            if !self.clock.is_enabled() {
                break;
            }
        }

        let report = UnrollReport { expected, issued };
        if !report.is_consistent() {
            log::warn!(
                "unroll of {:?} took {issued} disables for lock depth {expected}, clock refcount may be stale",
                ctx.algo
            );
        }

        if ctx.owns_mutex {
            self.mutex.unlock();
            ctx.owns_mutex = false;
        }
        ctx.lock_depth = 0;
        ctx.mode = EngineMode::Uninitialized;
        report
    }

    /// Creates the platform mutex on first use. Returns false when it is not
    /// usable yet, either because creation failed or because another context
    /// is creating it right now.
    fn ensure_mutex(&self) -> bool {
        match self.mutex_state.compare_exchange(
            MUTEX_UNINIT,
            MUTEX_INITIALIZING,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => match self.mutex.init() {
                Ok(()) => {
                    self.mutex_state.store(MUTEX_READY, Ordering::Release);
                    true
                }
                Err(err) => {
                    self.mutex_state.store(MUTEX_UNINIT, Ordering::Release);
                    log::error!("engine mutex initialization failed: {err:?}");
                    false
                }
            },
            Err(MUTEX_READY) => true,
            Err(_) => false,
        }
    }

    /// Idle fence: spins until no selector reports busy.
    pub(crate) fn wait_until_idle(&self) -> Result<(), EngineError> {
        self.poll(|| (0..SHA_SELECTORS).any(|sel| self.regs.read(busy_reg(sel)) != 0))
    }

    pub(crate) fn wait_while_busy(&self, busy: u32) -> Result<(), EngineError> {
        self.poll(|| self.regs.read(busy) != 0)
    }

    fn poll(&self, mut busy: impl FnMut() -> bool) -> Result<(), EngineError> {
        let Some(limit) = self.config.busy_poll_limit else {
            while busy() {
                core::hint::spin_loop();
            }
            return Ok(());
        };

        if !busy() {
            return Ok(());
        }
        for _ in 0..limit {
            core::hint::spin_loop();
            if !busy() {
                return Ok(());
            }
        }
        log::error!("sha engine still busy after {limit} polls");
        Err(EngineError::BusyTimeout)
    }
}
