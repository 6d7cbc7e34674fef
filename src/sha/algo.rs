// Licensed under the Apache-2.0 license

//! Per-algorithm digest sizes and the engine register table.

use super::EngineError;
use crate::registers::{start_reg, BUSY_REG_OFFSET, CONTINUE_REG_OFFSET, LOAD_REG_OFFSET};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ShaAlgo {
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

/// Register quadruple driving one hash selector of the engine.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RegisterSet {
    pub start: u32,
    pub cont: u32,
    pub load: u32,
    pub busy: u32,
}

impl RegisterSet {
    #[must_use]
    pub const fn for_selector(selector: u32) -> Self {
        let start = start_reg(selector);
        Self {
            start,
            cont: start + CONTINUE_REG_OFFSET,
            load: start + LOAD_REG_OFFSET,
            busy: start + BUSY_REG_OFFSET,
        }
    }
}

impl ShaAlgo {
    pub const ALL: [ShaAlgo; 5] = [
        ShaAlgo::Sha1,
        ShaAlgo::Sha224,
        ShaAlgo::Sha256,
        ShaAlgo::Sha384,
        ShaAlgo::Sha512,
    ];

    #[must_use]
    pub const fn digest_size(&self) -> usize {
        match self {
            ShaAlgo::Sha1 => 20,
            ShaAlgo::Sha224 => 28,
            ShaAlgo::Sha256 => 32,
            ShaAlgo::Sha384 => 48,
            ShaAlgo::Sha512 => 64,
        }
    }

    #[must_use]
    pub const fn digest_words(&self) -> usize {
        self.digest_size() / 4
    }

    #[must_use]
    pub const fn block_size(&self) -> usize {
        match self {
            ShaAlgo::Sha1 | ShaAlgo::Sha224 | ShaAlgo::Sha256 => 64,
            ShaAlgo::Sha384 | ShaAlgo::Sha512 => 128,
        }
    }

    #[must_use]
    pub const fn block_words(&self) -> usize {
        self.block_size() / 4
    }

    /// True for the algorithms built on 64-bit words.
    #[must_use]
    pub const fn is_wide(&self) -> bool {
        matches!(self, ShaAlgo::Sha384 | ShaAlgo::Sha512)
    }

    /// Size of the trailing message-length field in the final block.
    #[must_use]
    pub const fn length_field_size(&self) -> usize {
        if self.is_wide() {
            16
        } else {
            8
        }
    }

    /// Engine selector, `None` when the accelerator has no unit for it.
    #[must_use]
    pub const fn hw_selector(&self) -> Option<u32> {
        match self {
            ShaAlgo::Sha1 => Some(0),
            ShaAlgo::Sha256 => Some(1),
            ShaAlgo::Sha384 => Some(2),
            ShaAlgo::Sha512 => Some(3),
            ShaAlgo::Sha224 => None,
        }
    }

    #[must_use]
    pub const fn registers(&self) -> Option<RegisterSet> {
        match self.hw_selector() {
            Some(selector) => Some(RegisterSet::for_selector(selector)),
            None => None,
        }
    }

    /// Maps a raw engine selector back to its algorithm.
    ///
    /// # Errors
    /// `EngineError::UnknownSelector` for anything outside the engine's table.
    pub fn from_selector(selector: u8) -> Result<Self, EngineError> {
        match selector {
            0 => Ok(ShaAlgo::Sha1),
            1 => Ok(ShaAlgo::Sha256),
            2 => Ok(ShaAlgo::Sha384),
            3 => Ok(ShaAlgo::Sha512),
            _ => {
                log::error!("bad sha selector {selector}");
                Err(EngineError::UnknownSelector(selector))
            }
        }
    }
}
