// Licensed under the Apache-2.0 license

//! FIPS 180 example messages.

use crate::sha::ShaAlgo;
use hex_literal::hex;

pub struct KnownAnswer {
    pub algo: ShaAlgo,
    pub message: &'static [u8],
    pub digest: &'static [u8],
}

const ABC: &[u8] = b"abc";
const TWO_BLOCK: &[u8] = b"abcdbcdecdefdefgefghfghighijhijkijkljklmklmnlmnomnopnopq";
const TWO_BLOCK_WIDE: &[u8] = b"abcdefghbcdefghicdefghijdefghijkefghijklfghijklmghijklmnhijklmnoijklmnopjklmnopqklmnopqrlmnopqrsmnopqrstnopqrstu";

pub const VECTORS: &[KnownAnswer] = &[
    KnownAnswer {
        algo: ShaAlgo::Sha1,
        message: ABC,
        digest: &hex!("a9993e364706816aba3e25717850c26c9cd0d89d"),
    },
    KnownAnswer {
        algo: ShaAlgo::Sha1,
        message: b"",
        digest: &hex!("da39a3ee5e6b4b0d3255bfef95601890afd80709"),
    },
    KnownAnswer {
        algo: ShaAlgo::Sha1,
        message: TWO_BLOCK,
        digest: &hex!("84983e441c3bd26ebaae4aa1f95129e5e54670f1"),
    },
    KnownAnswer {
        algo: ShaAlgo::Sha224,
        message: ABC,
        digest: &hex!("23097d223405d8228642a477bda255b32aadbce4bda0b3f7e36c9da7"),
    },
    KnownAnswer {
        algo: ShaAlgo::Sha224,
        message: b"",
        digest: &hex!("d14a028c2a3a2bc9476102bb288234c415a2b01f828ea62ac5b3e42f"),
    },
    KnownAnswer {
        algo: ShaAlgo::Sha224,
        message: TWO_BLOCK,
        digest: &hex!("75388b16512776cc5dba5da1fd890150b0c6455cb4f58b1952522525"),
    },
    KnownAnswer {
        algo: ShaAlgo::Sha256,
        message: ABC,
        digest: &hex!("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"),
    },
    KnownAnswer {
        algo: ShaAlgo::Sha256,
        message: b"",
        digest: &hex!("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"),
    },
    KnownAnswer {
        algo: ShaAlgo::Sha256,
        message: TWO_BLOCK,
        digest: &hex!("248d6a61d20638b8e5c026930c3e6039a33ce45964ff2167f6ecedd419db06c1"),
    },
    KnownAnswer {
        algo: ShaAlgo::Sha384,
        message: ABC,
        digest: &hex!(
            "cb00753f45a35e8bb5a03d699ac65007272c32ab0eded1631a8b605a43ff5bed"
            "8086072ba1e7cc2358baeca134c825a7"
        ),
    },
    KnownAnswer {
        algo: ShaAlgo::Sha384,
        message: b"",
        digest: &hex!(
            "38b060a751ac96384cd9327eb1b1e36a21fdb71114be07434c0cc7bf63f6e1da"
            "274edebfe76f65fbd51ad2f14898b95b"
        ),
    },
    KnownAnswer {
        algo: ShaAlgo::Sha384,
        message: TWO_BLOCK_WIDE,
        digest: &hex!(
            "09330c33f71147e83d192fc782cd1b4753111b173b3b05d22fa08086e3b0f712"
            "fcc7c71a557e2db966c3e9fa91746039"
        ),
    },
    KnownAnswer {
        algo: ShaAlgo::Sha512,
        message: ABC,
        digest: &hex!(
            "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a"
            "2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f"
        ),
    },
    KnownAnswer {
        algo: ShaAlgo::Sha512,
        message: b"",
        digest: &hex!(
            "cf83e1357eefb8bdf1542850d66d8007d620e4050b5715dc83f4a921d36ce9ce"
            "47d0d13c5d85f2b0ff8318d2877eec2f63b931bd47417a81a538327af927da3e"
        ),
    },
    KnownAnswer {
        algo: ShaAlgo::Sha512,
        message: TWO_BLOCK_WIDE,
        digest: &hex!(
            "8e959b75dae313da8cf4f72814fc143f8f7779c6eb9f7fa17299aeadb6889018"
            "501d289e4900f7e4331b99dec4b5433ac7d329eeb6dd26545e96e55b874be909"
        ),
    },
];
