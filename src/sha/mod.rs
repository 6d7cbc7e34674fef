// Licensed under the Apache-2.0 license

//! Arbitration and register protocol for the shared SHA accelerator.
//!
//! One engine serves SHA-1, SHA-256, SHA-384 and SHA-512. SHA-224 always runs
//! in software.

mod algo;
mod block;
mod context;
mod engine;
mod readout;
pub(crate) mod soft;

pub use algo::{RegisterSet, ShaAlgo};
pub use context::{EngineMode, ShaContext};
pub use engine::{EngineConfig, EngineError, LockOutcome, ShaEngine, UnrollReport};
pub use readout::swap_word_halves;
