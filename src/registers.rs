// Licensed under the Apache-2.0 license

//! Register layer for the SHA accelerator.
//!
//! The accelerator is driven through a small block of 32-bit registers: a
//! 32-word text buffer used both for message input and digest readout, and
//! four command/status registers per hash selector. Every access is volatile
//! and the engine requires a full memory barrier between the last text write
//! and the command write, and again before the text buffer is read back.

use core::ptr::{read_volatile, write_volatile};

/// Base address of the SHA peripheral on the DPORT bus.
pub const SHA_BASE: u32 = 0x3FF0_3000;

/// First text register. Input words and digest output share this buffer.
pub const SHA_TEXT_BASE: u32 = SHA_BASE;

/// Capacity of the text buffer in 32-bit words.
pub const SHA_TEXT_WORDS: usize = 32;

/// Start register of selector 0 (SHA-1). Other selectors follow at 0x10 strides.
pub const SHA_1_START_REG: u32 = SHA_BASE + 0x80;

pub const CONTINUE_REG_OFFSET: u32 = 0x04;
pub const LOAD_REG_OFFSET: u32 = 0x08;
pub const BUSY_REG_OFFSET: u32 = 0x0C;

/// Number of hash selectors implemented by the engine.
pub const SHA_SELECTORS: u32 = 4;

/// Address of text register `index`.
#[must_use]
pub const fn text_reg(index: usize) -> u32 {
    SHA_TEXT_BASE + (index as u32) * 4
}

/// Start register for a hardware selector.
#[must_use]
pub const fn start_reg(selector: u32) -> u32 {
    SHA_1_START_REG + (selector << 4)
}

/// Busy register for a hardware selector.
#[must_use]
pub const fn busy_reg(selector: u32) -> u32 {
    start_reg(selector) + BUSY_REG_OFFSET
}

/// Volatile access to the accelerator's register block.
///
/// Implementations must not reorder or elide accesses. `barrier` orders every
/// access issued before it against every access issued after it.
pub trait ShaRegisters {
    fn read(&self, addr: u32) -> u32;
    fn write(&self, addr: u32, value: u32);
    fn barrier(&self);
}

pub fn dsync_fence_full() {
    #[cfg(target_arch = "arm")]
    {
        cortex_m::asm::dsb();
        cortex_m::asm::isb();
    }
    #[cfg(not(target_arch = "arm"))]
    core::sync::atomic::fence(core::sync::atomic::Ordering::SeqCst);
    core::sync::atomic::compiler_fence(core::sync::atomic::Ordering::SeqCst);
}

/// Memory-mapped register block of the on-chip accelerator.
pub struct Dport {
    _private: (),
}

impl Dport {
    /// # Safety
    /// The caller must be running on the target SoC with the SHA peripheral
    /// mapped at [`SHA_BASE`], and no other owner of the block may exist.
    #[must_use]
    pub const unsafe fn steal() -> Self {
        Self { _private: () }
    }
}

impl ShaRegisters for Dport {
    fn read(&self, addr: u32) -> u32 {
        // SAFETY: `steal` guarantees the address range is the SHA block.
        unsafe { read_volatile(addr as usize as *const u32) }
    }

    fn write(&self, addr: u32, value: u32) {
        // SAFETY: `steal` guarantees the address range is the SHA block.
        unsafe { write_volatile(addr as usize as *mut u32, value) }
    }

    fn barrier(&self) {
        dsync_fence_full();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_registers_follow_selector_stride() {
        assert_eq!(start_reg(0), 0x3FF0_3080);
        assert_eq!(start_reg(1), 0x3FF0_3090);
        assert_eq!(busy_reg(3), 0x3FF0_30BC);
        // text buffer ends exactly where the first command register begins
        assert_eq!(text_reg(SHA_TEXT_WORDS), SHA_1_START_REG);
    }
}
