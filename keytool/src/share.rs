// Licensed under the Apache-2.0 license

use rand::rngs::OsRng;
use rand::RngCore;

/// AES-256 key size in bytes
pub const KEY_SIZE: usize = 32;

/// Bytes per share block (half of the 128-byte share layout)
pub const BLOCK_SIZE: usize = 64;

/// Bytes per key word
const WORD: usize = 4;

/// Shares per key word
const SHARES: usize = 4;

/// Split a 256-bit key into 4-way XOR shares, laid out as two 64-byte
/// blocks: `a0 b0 c0 d0 ... a3 b3 c3 d3 | a4 b4 c4 d4 ... a7 b7 c7 d7`.
pub fn encode(key: &[u8; KEY_SIZE]) -> ([u8; BLOCK_SIZE], [u8; BLOCK_SIZE]) {
    let mut shares = [0u8; 2 * BLOCK_SIZE];
    for (word, out) in key
        .chunks_exact(WORD)
        .zip(shares.chunks_exact_mut(WORD * SHARES))
    {
        OsRng.fill_bytes(&mut out[..WORD * (SHARES - 1)]);
        for i in 0..WORD {
            out[WORD * (SHARES - 1) + i] = word[i] ^ out[i] ^ out[WORD + i] ^ out[2 * WORD + i];
        }
    }

    let mut block0 = [0u8; BLOCK_SIZE];
    let mut block1 = [0u8; BLOCK_SIZE];
    block0.copy_from_slice(&shares[..BLOCK_SIZE]);
    block1.copy_from_slice(&shares[BLOCK_SIZE..]);
    (block0, block1)
}

/// Recombine the two 64-byte share blocks back into the 256-bit key.
pub fn decode(block0: &[u8; BLOCK_SIZE], block1: &[u8; BLOCK_SIZE]) -> [u8; KEY_SIZE] {
    let shares: Vec<u8> = block0.iter().chain(block1.iter()).copied().collect();

    let mut key = [0u8; KEY_SIZE];
    for (word, share) in key
        .chunks_exact_mut(WORD)
        .zip(shares.chunks_exact(WORD * SHARES))
    {
        for i in 0..WORD {
            word[i] = share[i] ^ share[WORD + i] ^ share[2 * WORD + i] ^ share[3 * WORD + i];
        }
    }
    key
}
