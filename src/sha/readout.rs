// Licensed under the Apache-2.0 license

use super::{EngineError, EngineMode, ShaContext, ShaEngine};
use crate::platform::{ClockGate, HwMutex};
use crate::registers::{text_reg, ShaRegisters};

/// Swaps the two 32-bit halves of every 64-bit lane.
///
/// The engine hands back SHA-384/512 state with each lane's halves in the
/// opposite order from the big-endian word sequence.
pub fn swap_word_halves(words: &mut [u32]) {
    for lane in words.chunks_exact_mut(2) {
        lane.swap(0, 1);
    }
}

impl<R, C, M> ShaEngine<R, C, M>
where
    R: ShaRegisters,
    C: ClockGate,
    M: HwMutex,
{
    /// Copies the engine's current state for `ctx` into `out`.
    ///
    /// Words come out in big-endian digest order, one 32-bit word per slot.
    /// A context that has not submitted a block yet reads nothing and
    /// succeeds.
    ///
    /// # Errors
    /// - `EngineError::NotInHardwareMode` if `ctx` does not own the engine.
    /// - `EngineError::BadLength` if `out` is shorter than the digest.
    /// - `EngineError::BusyTimeout` when a poll limit is configured and hit.
    pub fn read_digest(&self, ctx: &mut ShaContext, out: &mut [u32]) -> Result<(), EngineError> {
        log::trace!("enter read_digest {:?}", ctx.algo);

        let EngineMode::Hardware { first_block } = ctx.mode else {
            log::error!("read_digest on context in {:?}", ctx.mode);
            return Err(EngineError::NotInHardwareMode);
        };
        if first_block {
            return Ok(());
        }

        let regs = ctx
            .algo
            .registers()
            .ok_or(EngineError::UnsupportedAlgorithm(ctx.algo))?;
        let out = out
            .get_mut(..ctx.algo.digest_words())
            .ok_or(EngineError::BadLength)?;

        self.wait_until_idle()?;
        self.regs().write(regs.load, 1);
        self.regs().barrier();
        self.wait_while_busy(regs.busy)?;
        self.wait_until_idle()?;
        self.regs().barrier();

        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.regs().read(text_reg(i));
        }

        if ctx.algo.is_wide() {
            swap_word_halves(out);
        }

        log::trace!("leave read_digest");
        Ok(())
    }
}
