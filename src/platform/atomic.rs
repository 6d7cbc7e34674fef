// Licensed under the Apache-2.0 license

//! In-use flag standing in for an RTOS mutex.
//!
//! Even a single-threaded firmware can have two hash computations open at the
//! same time (an SSH key exchange hashing a transcript while a MAC is being
//! derived, for example), so the engine still needs an ownership flag when no
//! scheduler is present.

use super::{HwMutex, PlatformError};
use core::sync::atomic::{AtomicBool, Ordering};
use fugit::MillisDurationU32;

pub struct AtomicMutex {
    in_use: AtomicBool,
}

impl AtomicMutex {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            in_use: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.in_use.load(Ordering::Acquire)
    }
}

impl Default for AtomicMutex {
    fn default() -> Self {
        Self::new()
    }
}

impl HwMutex for AtomicMutex {
    fn init(&self) -> Result<(), PlatformError> {
        Ok(())
    }

    // There is nobody to wait on without a scheduler, so the timeout is ignored.
    fn try_lock(&self, _timeout: MillisDurationU32) -> nb::Result<(), PlatformError> {
        self.in_use
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|_| nb::Error::WouldBlock)
    }

    fn unlock(&self) {
        self.in_use.store(false, Ordering::Release);
    }
}
