// Licensed under the Apache-2.0 license

use super::{digest_from_bytes, ShaDigest};
use crate::platform::{ClockGate, HwMutex};
use crate::registers::{ShaRegisters, SHA_TEXT_WORDS};
use crate::sha::soft::SoftState;
use crate::sha::{EngineError, EngineMode, ShaContext, ShaEngine};
use zerocopy::byteorder::big_endian::{U32, U64};
use zerocopy::IntoBytes;

const MAX_DIGEST_WORDS: usize = super::MAX_DIGEST_SIZE / 4;

/// Incremental hash bound to an engine.
///
/// Message bytes are buffered as big-endian words. Each full block either
/// goes to the engine or through the software compressor, depending on what
/// the first `try_lock` decided. Dropping a hasher releases the engine.
pub struct ShaHasher<'e, R, C, M>
where
    R: ShaRegisters,
    C: ClockGate,
    M: HwMutex,
{
    engine: &'e ShaEngine<R, C, M>,
    ctx: ShaContext,
    soft: SoftState,
    buffer: [U32; SHA_TEXT_WORDS],
    buffered: usize,
    length: u128,
    poisoned: bool,
}

impl<'e, R, C, M> ShaHasher<'e, R, C, M>
where
    R: ShaRegisters,
    C: ClockGate,
    M: HwMutex,
{
    /// Wraps an unused context. When `ctx` is not `Uninitialized` its mode is
    /// kept and no lock attempt is made.
    pub fn with_context(engine: &'e ShaEngine<R, C, M>, ctx: ShaContext) -> Self {
        Self {
            engine,
            soft: SoftState::new(ctx.algo()),
            ctx,
            buffer: [U32::ZERO; SHA_TEXT_WORDS],
            buffered: 0,
            length: 0,
            poisoned: false,
        }
    }

    pub fn context(&self) -> &ShaContext {
        &self.ctx
    }

    /// Absorbs `data`.
    ///
    /// # Errors
    /// - `EngineError::Aborted` once any earlier call failed.
    /// - Errors from the engine while a full block is submitted.
    pub fn update(&mut self, mut data: &[u8]) -> Result<(), EngineError> {
        if self.poisoned {
            return Err(EngineError::Aborted);
        }
        let block = self.ctx.algo().block_size();
        self.length = self.length.wrapping_add(data.len() as u128);

        while !data.is_empty() {
            let take = (block - self.buffered).min(data.len());
            let (head, rest) = data.split_at(take);
            if let Some(dst) = self
                .buffer
                .as_mut_bytes()
                .get_mut(self.buffered..self.buffered + take)
            {
                dst.copy_from_slice(head);
            }
            self.buffered += take;
            data = rest;

            if self.buffered == block {
                self.compress_block(None)?;
                self.buffered = 0;
            }
        }
        Ok(())
    }

    /// Pads the message, computes the digest and releases the engine.
    ///
    /// # Errors
    /// - `EngineError::Aborted` once any earlier call failed.
    /// - Errors from the engine during the final blocks or the readout.
    pub fn finalize(mut self) -> Result<ShaDigest, EngineError> {
        if self.poisoned {
            return Err(EngineError::Aborted);
        }
        let algo = self.ctx.algo();
        let block = algo.block_size();
        let bits = self.length.wrapping_mul(8);

        let bytes = self.buffer.as_mut_bytes();
        if let Some(tail) = bytes.get_mut(self.buffered..block) {
            tail.fill(0);
            if let Some(marker) = tail.first_mut() {
                *marker = 0x80;
            }
        }
        self.buffered += 1;

        if self.buffered > block - algo.length_field_size() {
            self.compress_block(None)?;
            self.buffer.as_mut_bytes().fill(0);
        }

        if algo.is_wide() {
            self.compress_block(Some(bits))?;
        } else {
            // narrow algorithms carry a 64-bit length in both modes
            let bits = bits as u64;
            let words = algo.block_words();
            if let Some([hi, lo]) = self.buffer.get_mut(words - 2..words) {
                *hi = U32::new((bits >> 32) as u32);
                *lo = U32::new(bits as u32);
            }
            self.compress_block(None)?;
        }

        let digest = self.read_out();
        self.release();
        digest
    }

    /// Abandons the hash and releases the engine.
    pub fn cancel(mut self) {
        self.release();
    }

    fn compress_block(&mut self, wide_bits: Option<u128>) -> Result<(), EngineError> {
        let result = self.commit_block(wide_bits);
        if let Err(err) = result {
            log::warn!("{:?} hash aborted: {err}", self.ctx.algo());
            self.poisoned = true;
        }
        result
    }

    fn commit_block(&mut self, wide_bits: Option<u128>) -> Result<(), EngineError> {
        let algo = self.ctx.algo();
        if self.ctx.mode() == EngineMode::Uninitialized {
            self.engine.try_lock(&mut self.ctx)?;
        }

        match self.ctx.mode() {
            EngineMode::Hardware { .. } => {
                let words = self.engine_words(wide_bits);
                let words = words
                    .get(..algo.block_words())
                    .ok_or(EngineError::BadLength)?;
                self.engine.process_block(&mut self.ctx, words)
            }
            EngineMode::Software => match wide_bits {
                Some(bits) => {
                    let lanes = self.software_lanes(bits);
                    self.soft.compress(algo, lanes.as_bytes())
                }
                None => self.soft.compress(algo, self.buffer.as_bytes()),
            },
            EngineMode::NeedsUnroll => Err(EngineError::RecoveryPending),
            EngineMode::Uninitialized => Err(EngineError::LockPrecondition),
        }
    }

    /// Final wide block as big-endian lanes with the 128-bit length in the
    /// last two.
    fn software_lanes(&self, bits: u128) -> [U64; 16] {
        let mut lanes = [U64::ZERO; 16];
        for (lane, pair) in lanes.iter_mut().zip(self.buffer.chunks_exact(2)) {
            if let [hi, lo] = pair {
                *lane = U64::new((u64::from(hi.get()) << 32) | u64::from(lo.get()));
            }
        }
        let [.., len_hi, len_lo] = &mut lanes;
        *len_hi = U64::new((bits >> 64) as u64);
        *len_lo = U64::new(bits as u64);
        lanes
    }

    /// Block in the order the engine consumes it.
    ///
    /// Wide blocks are handled as 64-bit lanes whose low half is written
    /// first. Message lanes therefore come out as the plain big-endian word
    /// sequence, and the length lanes are rotated by 32 to match.
    fn engine_words(&self, wide_bits: Option<u128>) -> [u32; SHA_TEXT_WORDS] {
        let mut words = self.buffer.map(|w| w.get());
        let Some(bits) = wide_bits else {
            return words;
        };

        let mut lanes = [0u64; 16];
        for (lane, pair) in lanes.iter_mut().zip(words.chunks_exact(2)) {
            if let [lo, hi] = pair {
                *lane = u64::from(*lo) | (u64::from(*hi) << 32);
            }
        }
        let [.., len_hi, len_lo] = &mut lanes;
        *len_hi = ((bits >> 64) as u64).rotate_left(32);
        *len_lo = (bits as u64).rotate_left(32);

        for (pair, lane) in words.chunks_exact_mut(2).zip(lanes) {
            if let [lo, hi] = pair {
                *lo = lane as u32;
                *hi = (lane >> 32) as u32;
            }
        }
        words
    }

    fn read_out(&mut self) -> Result<ShaDigest, EngineError> {
        let algo = self.ctx.algo();
        match self.ctx.mode() {
            EngineMode::Hardware { .. } => {
                let mut words = [0u32; MAX_DIGEST_WORDS];
                self.engine.read_digest(&mut self.ctx, &mut words)?;
                let be = words.map(U32::new);
                digest_from_bytes(be.as_bytes(), algo.digest_size())
            }
            EngineMode::Software => self.soft.digest(algo),
            EngineMode::NeedsUnroll => Err(EngineError::RecoveryPending),
            EngineMode::Uninitialized => Err(EngineError::LockPrecondition),
        }
    }

    fn release(&mut self) {
        if self.ctx.holds_engine() {
            self.engine.unlock(&mut self.ctx);
        }
    }
}

impl<R, C, M> Drop for ShaHasher<'_, R, C, M>
where
    R: ShaRegisters,
    C: ClockGate,
    M: HwMutex,
{
    fn drop(&mut self) {
        self.release();
    }
}
