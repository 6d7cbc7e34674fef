// Licensed under the Apache-2.0 license

//! Software compression used when the engine is not available.

use super::{EngineError, ShaAlgo};
use sha2::digest::consts::{U128, U64};
use sha2::digest::generic_array::GenericArray;
use zerocopy::byteorder::big_endian::{U32, U64 as BeU64};
use zerocopy::IntoBytes;

pub(crate) const SHA1_IV: [u32; 5] = [
    0x6745_2301,
    0xEFCD_AB89,
    0x98BA_DCFE,
    0x1032_5476,
    0xC3D2_E1F0,
];

pub(crate) const SHA224_IV: [u32; 8] = [
    0xC105_9ED8,
    0x367C_D507,
    0x3070_DD17,
    0xF70E_5939,
    0xFFC0_0B31,
    0x6858_1511,
    0x64F9_8FA7,
    0xBEFA_4FA4,
];

pub(crate) const SHA256_IV: [u32; 8] = [
    0x6A09_E667,
    0xBB67_AE85,
    0x3C6E_F372,
    0xA54F_F53A,
    0x510E_527F,
    0x9B05_688C,
    0x1F83_D9AB,
    0x5BE0_CD19,
];

pub(crate) const SHA384_IV: [u64; 8] = [
    0xCBBB_9D5D_C105_9ED8,
    0x629A_292A_367C_D507,
    0x9159_015A_3070_DD17,
    0x152F_ECD8_F70E_5939,
    0x6733_2667_FFC0_0B31,
    0x8EB4_4A87_6858_1511,
    0xDB0C_2E0D_64F9_8FA7,
    0x47B5_481D_BEFA_4FA4,
];

pub(crate) const SHA512_IV: [u64; 8] = [
    0x6A09_E667_F3BC_C908,
    0xBB67_AE85_84CA_A73B,
    0x3C6E_F372_FE94_F82B,
    0xA54F_F53A_5F1D_36F1,
    0x510E_527F_ADE6_82D1,
    0x9B05_688C_2B3E_6C1F,
    0x1F83_D9AB_FB41_BD6B,
    0x5BE0_CD19_137E_2179,
];

/// Chaining state of a software hash.
///
/// SHA-1 keeps its five words in the front of the narrow array.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum SoftState {
    Narrow([u32; 8]),
    Wide([u64; 8]),
}

impl SoftState {
    pub(crate) fn new(algo: ShaAlgo) -> Self {
        match algo {
            ShaAlgo::Sha1 => {
                let [a, b, c, d, e] = SHA1_IV;
                SoftState::Narrow([a, b, c, d, e, 0, 0, 0])
            }
            ShaAlgo::Sha224 => SoftState::Narrow(SHA224_IV),
            ShaAlgo::Sha256 => SoftState::Narrow(SHA256_IV),
            ShaAlgo::Sha384 => SoftState::Wide(SHA384_IV),
            ShaAlgo::Sha512 => SoftState::Wide(SHA512_IV),
        }
    }

    /// Compresses one block of message bytes. Extra trailing bytes are ignored.
    pub(crate) fn compress(&mut self, algo: ShaAlgo, bytes: &[u8]) -> Result<(), EngineError> {
        let block = bytes
            .get(..algo.block_size())
            .ok_or(EngineError::BadLength)?;

        match (self, algo) {
            (SoftState::Narrow([a, b, c, d, e, ..]), ShaAlgo::Sha1) => {
                let mut sha1_state = [*a, *b, *c, *d, *e];
                sha1::compress(
                    &mut sha1_state,
                    core::slice::from_ref(GenericArray::<u8, U64>::from_slice(block)),
                );
                [*a, *b, *c, *d, *e] = sha1_state;
            }
            (SoftState::Narrow(state), ShaAlgo::Sha224 | ShaAlgo::Sha256) => {
                sha2::compress256(
                    state,
                    core::slice::from_ref(GenericArray::<u8, U64>::from_slice(block)),
                );
            }
            (SoftState::Wide(state), ShaAlgo::Sha384 | ShaAlgo::Sha512) => {
                sha2::compress512(
                    state,
                    core::slice::from_ref(GenericArray::<u8, U128>::from_slice(block)),
                );
            }
            _ => return Err(EngineError::UnsupportedAlgorithm(algo)),
        }
        Ok(())
    }

    /// Big-endian digest bytes, truncated to the algorithm's output size.
    pub(crate) fn digest(&self, algo: ShaAlgo) -> Result<crate::digest::ShaDigest, EngineError> {
        match self {
            SoftState::Narrow(state) => {
                let words = state.map(U32::new);
                crate::digest::digest_from_bytes(words.as_bytes(), algo.digest_size())
            }
            SoftState::Wide(state) => {
                let words = state.map(BeU64::new);
                crate::digest::digest_from_bytes(words.as_bytes(), algo.digest_size())
            }
        }
    }
}
