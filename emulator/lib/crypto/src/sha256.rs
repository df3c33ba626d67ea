/*++

Licensed under the Apache-2.0 license.

File Name:

    sha256.rs

Abstract:

    File contains the SHA-256 block compression used by the accelerator model.

--*/

use sha2::digest::block_buffer::Block;
use sha2::digest::consts::U64;

/// SHA-256 running hash state
///
/// Holds the eight working hash words and compresses one 512-bit block at a
/// time, matching the register-level view the hardware accelerator exposes
/// (SUM0..SUM7). Padding is the caller's concern.
pub struct Sha256 {
    /// Hash
    hash: [u32; 8],
}

impl Sha256 {
    /// SHA-256 Block Size
    pub const BLOCK_SIZE: usize = 64;

    /// Number of hash words
    pub const HASH_WORDS: usize = 8;

    /// SHA-256 Initial Hash Vectors (FIPS 180-4 section 5.3.3)
    #[cfg_attr(rustfmt, rustfmt_skip)]
    const HASH_IV: [u32; 8] = [
        0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a,
        0x510e527f, 0x9b05688c, 0x1f83d9ab, 0x5be0cd19,
    ];

    /// Create a new instance in the initial hash state
    pub fn new() -> Self {
        Self {
            hash: Self::HASH_IV,
        }
    }

    /// Reset the hash state to the initial vectors
    pub fn reset(&mut self) {
        self.hash = Self::HASH_IV;
    }

    /// Compress one 512-bit block into the running hash
    ///
    /// # Arguments
    ///
    /// * `block` - Block to compress
    pub fn update(&mut self, block: &[u8; Self::BLOCK_SIZE]) {
        let block = *Block::<U64>::from_slice(block);
        sha2::compress256(&mut self.hash, &[block]);
    }

    /// Read one word of the running hash (SUM register readout)
    pub fn word(&self, idx: usize) -> u32 {
        self.hash[idx]
    }

    /// The running hash words
    pub fn words(&self) -> &[u32; 8] {
        &self.hash
    }
}

impl Default for Sha256 {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // "abc", padded to a single block.
    #[cfg_attr(rustfmt, rustfmt_skip)]
    const SHA_256_TEST_BLOCK: [u8; 64] = [
        0x61, 0x62, 0x63, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x18,
    ];

    #[test]
    fn test_sha256_abc() {
        let mut sha = Sha256::new();
        sha.update(&SHA_256_TEST_BLOCK);

        #[cfg_attr(rustfmt, rustfmt_skip)]
        let expected: [u32; 8] = [
            0xba7816bf, 0x8f01cfea, 0x414140de, 0x5dae2223,
            0xb00361a3, 0x96177a9c, 0xb410ff61, 0xf20015ad,
        ];
        assert_eq!(sha.words(), &expected);
    }

    #[test]
    fn test_sha256_empty() {
        // Empty message: one block of padding only.
        let mut block = [0u8; 64];
        block[0] = 0x80;

        let mut sha = Sha256::new();
        sha.update(&block);

        #[cfg_attr(rustfmt, rustfmt_skip)]
        let expected: [u32; 8] = [
            0xe3b0c442, 0x98fc1c14, 0x9afbf4c8, 0x996fb924,
            0x27ae41e4, 0x649b934c, 0xa495991b, 0x7852b855,
        ];
        assert_eq!(sha.words(), &expected);
    }

    #[test]
    fn test_reset_restores_iv() {
        let mut sha = Sha256::new();
        sha.update(&SHA_256_TEST_BLOCK);
        sha.reset();
        assert_eq!(sha.word(0), 0x6a09e667);
        assert_eq!(sha.word(7), 0x5be0cd19);
    }
}
