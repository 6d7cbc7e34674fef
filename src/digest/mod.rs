// Licensed under the Apache-2.0 license

//! Streaming hashes on top of the SHA engine.
//!
//! A [`ShaHasher`] competes for the engine at its first full block. If it
//! loses it finishes the whole message in software, so the caller sees the
//! same digest either way.

pub mod hasher;

pub use hasher::ShaHasher;

use crate::platform::{ClockGate, HwMutex};
use crate::registers::ShaRegisters;
use crate::sha::{EngineError, ShaAlgo, ShaContext, ShaEngine};

/// Largest digest produced by the engine (SHA-512).
pub const MAX_DIGEST_SIZE: usize = 64;

pub type ShaDigest = heapless::Vec<u8, MAX_DIGEST_SIZE>;

pub(crate) fn digest_from_bytes(bytes: &[u8], len: usize) -> Result<ShaDigest, EngineError> {
    let bytes = bytes.get(..len).ok_or(EngineError::BadLength)?;
    ShaDigest::from_slice(bytes).map_err(|()| EngineError::BadLength)
}

impl<R, C, M> ShaEngine<R, C, M>
where
    R: ShaRegisters,
    C: ClockGate,
    M: HwMutex,
{
    /// Streaming hash that uses the engine when it is free.
    pub fn hasher(&self, algo: ShaAlgo) -> ShaHasher<'_, R, C, M> {
        let ctx = if algo.hw_selector().is_some() {
            ShaContext::new(algo)
        } else {
            ShaContext::software(algo)
        };
        ShaHasher::with_context(self, ctx)
    }

    /// Streaming hash that never touches the engine.
    pub fn software_hasher(&self, algo: ShaAlgo) -> ShaHasher<'_, R, C, M> {
        ShaHasher::with_context(self, ShaContext::software(algo))
    }

    /// One-shot digest of `data`.
    ///
    /// # Errors
    /// Any error raised while driving the engine. The engine is released
    /// before returning.
    pub fn digest(&self, algo: ShaAlgo, data: &[u8]) -> Result<ShaDigest, EngineError> {
        let mut hasher = self.hasher(algo);
        hasher.update(data)?;
        hasher.finalize()
    }
}

macro_rules! impl_hasher_init {
    ($($name:ident => $algo:ident),* $(,)?) => {
        paste::paste! {
            impl<R, C, M> ShaEngine<R, C, M>
            where
                R: ShaRegisters,
                C: ClockGate,
                M: HwMutex,
            {
                $(
                    #[doc = "Starts a " $algo " hash, on the engine when it is free."]
                    pub fn [<init_ $name>](&self) -> ShaHasher<'_, R, C, M> {
                        self.hasher(ShaAlgo::$algo)
                    }

                    #[doc = "Starts a " $algo " hash in software."]
                    pub fn [<init_ $name _software>](&self) -> ShaHasher<'_, R, C, M> {
                        self.software_hasher(ShaAlgo::$algo)
                    }
                )*
            }
        }
    };
}

impl_hasher_init!(
    sha1 => Sha1,
    sha224 => Sha224,
    sha256 => Sha256,
    sha384 => Sha384,
    sha512 => Sha512,
);
