// Licensed under the Apache-2.0 license

//! On-target checks, reported over a serial console.

pub mod engine_test;
pub mod vectors;
