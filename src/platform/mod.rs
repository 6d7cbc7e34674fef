// Licensed under the Apache-2.0 license

//! Platform services consumed by the engine.
//!
//! The SHA engine does not own the SoC clock tree or the RTOS. It reaches both
//! through the two capabilities below so the unroll and arbitration logic can
//! be exercised against fakes.

pub mod atomic;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use atomic::AtomicMutex;

use fugit::MillisDurationU32;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The mutex could not be created.
    MutexInit,
    /// The underlying RTOS primitive reported a failure.
    Os,
}

/// Reference-counted peripheral clock gate for the SHA block.
///
/// `enable` and `disable` adjust a count shared with every other user of the
/// peripheral. `is_enabled` reports the SHA bit of the clock-enable bitmask.
pub trait ClockGate {
    fn enable(&self);
    fn disable(&self);
    fn is_enabled(&self) -> bool;
}

/// Mutex guarding the one physical engine.
pub trait HwMutex {
    /// Creates the underlying primitive. Called at most once successfully.
    ///
    /// # Errors
    /// `PlatformError::MutexInit` when the primitive cannot be created.
    fn init(&self) -> Result<(), PlatformError>;

    /// Attempts to take the mutex, waiting at most `timeout`.
    ///
    /// # Errors
    /// `nb::Error::WouldBlock` when another owner holds it.
    fn try_lock(&self, timeout: MillisDurationU32) -> nb::Result<(), PlatformError>;

    fn unlock(&self);
}

impl<T: ClockGate + ?Sized> ClockGate for &T {
    fn enable(&self) {
        (**self).enable();
    }

    fn disable(&self) {
        (**self).disable();
    }

    fn is_enabled(&self) -> bool {
        (**self).is_enabled()
    }
}

impl<T: HwMutex + ?Sized> HwMutex for &T {
    fn init(&self) -> Result<(), PlatformError> {
        (**self).init()
    }

    fn try_lock(&self, timeout: MillisDurationU32) -> nb::Result<(), PlatformError> {
        (**self).try_lock(timeout)
    }

    fn unlock(&self) {
        (**self).unlock();
    }
}
