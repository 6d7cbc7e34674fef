// Licensed under the Apache-2.0 license

//! Behavioural model of the accelerator and its platform services.
//!
//! `MockSha` compresses with the software hash functions so digests computed
//! through the register protocol can be checked against known answers. It
//! also records protocol violations: commands issued without a barrier after
//! text writes, text reads without a barrier after a command, and writes
//! outside the register block.

use super::{ClockGate, HwMutex, PlatformError};
use crate::registers::{
    start_reg, text_reg, ShaRegisters, BUSY_REG_OFFSET, CONTINUE_REG_OFFSET, LOAD_REG_OFFSET,
    SHA_SELECTORS, SHA_TEXT_WORDS,
};
use crate::sha::soft::SoftState;
use crate::sha::ShaAlgo;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use fugit::MillisDurationU32;
use zerocopy::byteorder::big_endian::U32;
use zerocopy::IntoBytes;

#[derive(Copy, Clone)]
struct Unit {
    selector: u32,
    algo: ShaAlgo,
    state: SoftState,
}

struct Model {
    text: [u32; SHA_TEXT_WORDS],
    unit: Option<Unit>,
    busy_latency: u32,
    busy_left: u32,
    busy_selector: Option<u32>,
    stuck: bool,
    text_dirty: bool,
    command_pending: bool,
    unfenced: u32,
    stray_writes: u32,
    protocol_errors: u32,
    highest_text_write: Option<usize>,
    starts: u32,
    blocks: u32,
    loads: u32,
}

impl Model {
    const fn new(busy_latency: u32) -> Self {
        Self {
            text: [0; SHA_TEXT_WORDS],
            unit: None,
            busy_latency,
            busy_left: 0,
            busy_selector: None,
            stuck: false,
            text_dirty: false,
            command_pending: false,
            unfenced: 0,
            stray_writes: 0,
            protocol_errors: 0,
            highest_text_write: None,
            starts: 0,
            blocks: 0,
            loads: 0,
        }
    }

    fn command(&mut self, selector: u32, offset: u32) {
        if self.text_dirty {
            self.unfenced += 1;
        }
        self.command_pending = true;

        match offset {
            0 => {
                let Ok(algo) = ShaAlgo::from_selector(selector as u8) else {
                    self.protocol_errors += 1;
                    return;
                };
                self.starts += 1;
                self.unit = Some(Unit {
                    selector,
                    algo,
                    state: SoftState::new(algo),
                });
                self.compress();
            }
            CONTINUE_REG_OFFSET => {
                if self.unit.map(|u| u.selector) == Some(selector) {
                    self.compress();
                } else {
                    self.protocol_errors += 1;
                }
            }
            LOAD_REG_OFFSET => {
                self.loads += 1;
                match self.unit {
                    Some(unit) if unit.selector == selector => self.load(unit.state),
                    _ => self.protocol_errors += 1,
                }
            }
            _ => {
                self.stray_writes += 1;
                return;
            }
        }

        self.busy_selector = Some(selector);
        self.busy_left = self.busy_latency;
    }

    fn compress(&mut self) {
        let Some(unit) = self.unit.as_mut() else {
            return;
        };
        let bytes = self.text.map(U32::new);
        if unit.state.compress(unit.algo, bytes.as_bytes()).is_err() {
            self.protocol_errors += 1;
        }
        self.blocks += 1;
    }

    fn load(&mut self, state: SoftState) {
        match state {
            SoftState::Narrow(words) => {
                for (slot, word) in self.text.iter_mut().zip(words) {
                    *slot = word;
                }
            }
            SoftState::Wide(lanes) => {
                for (pair, lane) in self.text.chunks_exact_mut(2).zip(lanes) {
                    if let [lo, hi] = pair {
                        *lo = lane as u32;
                        *hi = (lane >> 32) as u32;
                    }
                }
            }
        }
    }
}

fn text_index(addr: u32) -> Option<usize> {
    (0..SHA_TEXT_WORDS).find(|i| text_reg(*i) == addr)
}

fn command_reg(addr: u32) -> Option<(u32, u32)> {
    (0..SHA_SELECTORS).find_map(|sel| {
        let offset = addr.checked_sub(start_reg(sel))?;
        (offset <= BUSY_REG_OFFSET && offset % 4 == 0).then_some((sel, offset))
    })
}

pub struct MockSha {
    model: spin::Mutex<Model>,
}

impl MockSha {
    #[must_use]
    pub const fn new() -> Self {
        Self::with_busy_latency(0)
    }

    /// Model whose busy bit stays set for `polls` reads after each command.
    #[must_use]
    pub const fn with_busy_latency(polls: u32) -> Self {
        Self {
            model: spin::Mutex::new(Model::new(polls)),
        }
    }

    /// Holds every busy bit set until cleared again.
    pub fn set_stuck(&self, stuck: bool) {
        self.model.lock().stuck = stuck;
    }

    /// Overwrites the front of the text buffer, as if the engine had produced it.
    pub fn load_text(&self, words: &[u32]) {
        let mut model = self.model.lock();
        for (slot, word) in model.text.iter_mut().zip(words) {
            *slot = *word;
        }
    }

    pub fn unfenced_accesses(&self) -> u32 {
        self.model.lock().unfenced
    }

    pub fn stray_writes(&self) -> u32 {
        self.model.lock().stray_writes
    }

    /// Continue or load without a matching start, or an unknown selector.
    pub fn protocol_errors(&self) -> u32 {
        self.model.lock().protocol_errors
    }

    pub fn highest_text_write(&self) -> Option<usize> {
        self.model.lock().highest_text_write
    }

    pub fn starts(&self) -> u32 {
        self.model.lock().starts
    }

    pub fn blocks_processed(&self) -> u32 {
        self.model.lock().blocks
    }

    pub fn loads(&self) -> u32 {
        self.model.lock().loads
    }
}

impl Default for MockSha {
    fn default() -> Self {
        Self::new()
    }
}

impl ShaRegisters for MockSha {
    fn read(&self, addr: u32) -> u32 {
        let mut model = self.model.lock();

        if let Some(index) = text_index(addr) {
            if model.command_pending {
                model.unfenced += 1;
            }
            return model.text.get(index).copied().unwrap_or(0);
        }

        match command_reg(addr) {
            Some((sel, BUSY_REG_OFFSET)) => {
                if model.stuck {
                    return 1;
                }
                if model.busy_selector == Some(sel) && model.busy_left > 0 {
                    model.busy_left -= 1;
                    return 1;
                }
                0
            }
            _ => 0,
        }
    }

    fn write(&self, addr: u32, value: u32) {
        let mut model = self.model.lock();

        if let Some(index) = text_index(addr) {
            if let Some(slot) = model.text.get_mut(index) {
                *slot = value;
            }
            model.text_dirty = true;
            model.highest_text_write = model.highest_text_write.max(Some(index));
            return;
        }

        match command_reg(addr) {
            Some((_, BUSY_REG_OFFSET)) | None => model.stray_writes += 1,
            Some(_) if value != 1 => {}
            Some((sel, offset)) => model.command(sel, offset),
        }
    }

    fn barrier(&self) {
        let mut model = self.model.lock();
        model.text_dirty = false;
        model.command_pending = false;
    }
}

/// Reference-counted clock gate. Disabling at zero is a no-op.
pub struct MockClock {
    count: AtomicU32,
    disables: AtomicU32,
}

impl MockClock {
    #[must_use]
    pub const fn new() -> Self {
        Self::with_count(0)
    }

    /// Clock already referenced `count` times by other drivers.
    #[must_use]
    pub const fn with_count(count: u32) -> Self {
        Self {
            count: AtomicU32::new(count),
            disables: AtomicU32::new(0),
        }
    }

    pub fn count(&self) -> u32 {
        self.count.load(Ordering::Acquire)
    }

    pub fn disable_calls(&self) -> u32 {
        self.disables.load(Ordering::Acquire)
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockGate for MockClock {
    fn enable(&self) {
        self.count.fetch_add(1, Ordering::AcqRel);
    }

    fn disable(&self) {
        self.disables.fetch_add(1, Ordering::AcqRel);
        let _ = self
            .count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| c.checked_sub(1));
    }

    fn is_enabled(&self) -> bool {
        self.count() > 0
    }
}

pub struct MockMutex {
    locked: AtomicBool,
    fail_init: AtomicBool,
    init_calls: AtomicU32,
}

impl MockMutex {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            locked: AtomicBool::new(false),
            fail_init: AtomicBool::new(false),
            init_calls: AtomicU32::new(0),
        }
    }

    /// Mutex whose creation fails until `set_fail_init(false)`.
    #[must_use]
    pub const fn failing_init() -> Self {
        Self {
            locked: AtomicBool::new(false),
            fail_init: AtomicBool::new(true),
            init_calls: AtomicU32::new(0),
        }
    }

    pub fn set_fail_init(&self, fail: bool) {
        self.fail_init.store(fail, Ordering::Release);
    }

    pub fn init_calls(&self) -> u32 {
        self.init_calls.load(Ordering::Acquire)
    }

    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }
}

impl Default for MockMutex {
    fn default() -> Self {
        Self::new()
    }
}

impl HwMutex for MockMutex {
    fn init(&self) -> Result<(), PlatformError> {
        self.init_calls.fetch_add(1, Ordering::AcqRel);
        if self.fail_init.load(Ordering::Acquire) {
            return Err(PlatformError::MutexInit);
        }
        Ok(())
    }

    fn try_lock(&self, _timeout: MillisDurationU32) -> nb::Result<(), PlatformError> {
        self.locked
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|_| nb::Error::WouldBlock)
    }

    fn unlock(&self) {
        self.locked.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sha::RegisterSet;
    use sha2::Digest;

    #[test]
    fn start_then_load_yields_state_of_one_block() {
        let mock = MockSha::new();
        let regs = RegisterSet::for_selector(1);

        let mut block = [0u32; 16];
        block[0] = 0x6162_6380;
        block[15] = 24;
        for (i, w) in block.iter().enumerate() {
            mock.write(text_reg(i), *w);
        }
        mock.barrier();
        mock.write(regs.start, 1);
        mock.barrier();
        mock.write(regs.load, 1);
        mock.barrier();

        let expected = sha2::Sha256::digest(b"abc");
        for (i, chunk) in expected.chunks_exact(4).enumerate() {
            let word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            assert_eq!(mock.read(text_reg(i)), word);
        }
        assert_eq!(mock.unfenced_accesses(), 0);
        assert_eq!(mock.protocol_errors(), 0);
    }

    #[test]
    fn missing_barrier_is_counted() {
        let mock = MockSha::new();
        let regs = RegisterSet::for_selector(0);
        mock.write(text_reg(0), 0);
        mock.write(regs.start, 1);
        mock.read(text_reg(0));
        assert_eq!(mock.unfenced_accesses(), 2);
    }

    #[test]
    fn continue_without_start_is_a_protocol_error() {
        let mock = MockSha::new();
        mock.write(RegisterSet::for_selector(2).cont, 1);
        assert_eq!(mock.protocol_errors(), 1);
        mock.write(RegisterSet::for_selector(2).busy, 1);
        assert_eq!(mock.stray_writes(), 1);
    }

    #[test]
    fn busy_latency_counts_down_on_active_selector() {
        let mock = MockSha::with_busy_latency(2);
        let regs = RegisterSet::for_selector(3);
        mock.write(regs.start, 1);
        assert_eq!(mock.read(RegisterSet::for_selector(0).busy), 0);
        assert_eq!(mock.read(regs.busy), 1);
        assert_eq!(mock.read(regs.busy), 1);
        assert_eq!(mock.read(regs.busy), 0);
    }

    #[test]
    fn clock_disable_saturates_at_zero() {
        let clock = MockClock::with_count(1);
        clock.disable();
        clock.disable();
        assert_eq!(clock.count(), 0);
        assert_eq!(clock.disable_calls(), 2);
        assert!(!clock.is_enabled());
    }
}
