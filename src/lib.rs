// Licensed under the Apache-2.0 license

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::indexing_slicing))]
#![cfg_attr(not(test), warn(clippy::expect_used))]
#![cfg_attr(not(test), no_std)]
pub mod digest;
pub mod platform;
pub mod registers;
pub mod sha;
pub mod tests;
