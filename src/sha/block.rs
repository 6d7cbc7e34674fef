// Licensed under the Apache-2.0 license

//! Block submission.

use super::{EngineError, EngineMode, ShaContext, ShaEngine};
use crate::platform::{ClockGate, HwMutex};
use crate::registers::{text_reg, ShaRegisters, SHA_TEXT_WORDS};

impl<R, C, M> ShaEngine<R, C, M>
where
    R: ShaRegisters,
    C: ClockGate,
    M: HwMutex,
{
    /// Feeds one prepared block to the engine and starts compression.
    ///
    /// `words` are written verbatim; byte order and length insertion are the
    /// caller's job. The first block of a context issues start, every later
    /// one continue. Input longer than the text buffer is truncated.
    ///
    /// # Errors
    /// - `EngineError::NotInHardwareMode` if `ctx` does not own the engine.
    /// - `EngineError::BadLength` if a block that fits the text buffer is not
    ///   exactly one block of the context's algorithm.
    /// - `EngineError::UnsupportedAlgorithm` if the engine has no unit for the
    ///   context's algorithm. The context is left in `NeedsUnroll`.
    /// - `EngineError::BusyTimeout` when a poll limit is configured and hit.
    pub fn process_block(&self, ctx: &mut ShaContext, words: &[u32]) -> Result<(), EngineError> {
        log::trace!("enter process_block {:?}", ctx.algo);

        let EngineMode::Hardware { first_block } = ctx.mode else {
            log::error!("process_block on context in {:?}", ctx.mode);
            return Err(EngineError::NotInHardwareMode);
        };

        let words = match words.get(..SHA_TEXT_WORDS) {
            Some(head) if words.len() > SHA_TEXT_WORDS => {
                log::error!(
                    "block of {} words overflows the {SHA_TEXT_WORDS}-word text buffer, truncating",
                    words.len()
                );
                head
            }
            _ if words.len() != ctx.algo.block_words() => {
                log::error!(
                    "{:?} block of {} words, expected {}",
                    ctx.algo,
                    words.len(),
                    ctx.algo.block_words()
                );
                return Err(EngineError::BadLength);
            }
            _ => words,
        };

        self.wait_until_idle()?;

        for (i, word) in words.iter().enumerate() {
            self.regs().write(text_reg(i), *word);
        }
        self.regs().barrier();

        self.start_process(ctx, first_block)?;
        self.regs().barrier();

        log::trace!("leave process_block");
        Ok(())
    }

    fn start_process(&self, ctx: &mut ShaContext, first_block: bool) -> Result<(), EngineError> {
        let Some(regs) = ctx.algo.registers() else {
            log::error!("no engine unit for {:?}, context needs unroll", ctx.algo);
            ctx.mode = EngineMode::NeedsUnroll;
            return Err(EngineError::UnsupportedAlgorithm(ctx.algo));
        };

        if first_block {
            self.regs().write(regs.start, 1);
            ctx.mode = EngineMode::Hardware { first_block: false };
        } else {
            self.regs().write(regs.cont, 1);
        }
        Ok(())
    }
}
