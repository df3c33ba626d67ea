/*++

Licensed under the Apache-2.0 license.

File Name:

    aes256ctr.rs

Abstract:

    File contains the AES-256 CTR reference implementation.

--*/

use crate::{AES_256_BLOCK_SIZE, AES_256_KEY_SIZE};
use aes::Aes256;
use cipher::{KeyIvInit, StreamCipherCore};

const AES_256_IV_SIZE: usize = AES_256_BLOCK_SIZE;

type Ctr = ctr::CtrCore<Aes256, ctr::flavors::Ctr128BE>;

pub struct Aes256Ctr {
    cryptor: Ctr,
}

impl Aes256Ctr {
    pub fn new(key: &[u8; AES_256_KEY_SIZE], iv: &[u8; AES_256_IV_SIZE]) -> Self {
        Self {
            cryptor: Ctr::new(key.into(), iv.into()),
        }
    }

    /// Streaming mode: encrypt or decrypt a single block and return the output.
    pub fn crypt_block(&mut self, block: &[u8; AES_256_BLOCK_SIZE]) -> [u8; AES_256_BLOCK_SIZE] {
        let mut out_block = [(*block).into()];
        self.cryptor.apply_keystream_blocks(&mut out_block);
        out_block[0].into()
    }
}

/// Trusted reference decryption: same length out as in. CTR is an involution,
/// so this doubles as the encryption oracle in tests.
pub fn aes256_ctr_decrypt(key: &[u8; 32], iv: &[u8; 16], ciphertext: &[u8]) -> Vec<u8> {
    let mut ctr = Aes256Ctr::new(key, iv);
    let mut plaintext = Vec::with_capacity(ciphertext.len());
    for chunk in ciphertext.chunks(AES_256_BLOCK_SIZE) {
        let mut block = [0u8; AES_256_BLOCK_SIZE];
        block[..chunk.len()].copy_from_slice(chunk);
        let out = ctr.crypt_block(&block);
        plaintext.extend_from_slice(&out[..chunk.len()]);
    }
    plaintext
}
