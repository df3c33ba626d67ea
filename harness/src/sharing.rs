/*++

Licensed under the Apache-2.0 license.

File Name:

    sharing.rs

Abstract:

    File contains the XOR secret-sharing transforms for the AES key and IV.

--*/

use rand::rngs::OsRng;
use rand::RngCore;

/// AES-256 key size in bytes
pub const KEY_SIZE: usize = 32;

/// Size of the 4-way shared key in bytes
pub const SHARED_KEY_SIZE: usize = 128;

/// AES CTR IV size in bytes
pub const IV_SIZE: usize = 16;

/// Bytes per key word
const WORD: usize = 4;

/// Shares per key word
const SHARES: usize = 4;

/// Split a 256-bit key into 4-way XOR shares.
///
/// Each key word K becomes four consecutive words (a, b, c, d) with
/// a ^ b ^ c ^ d == K; a, b and c are drawn from the OS entropy source.
pub fn split_key(key: &[u8; KEY_SIZE]) -> [u8; SHARED_KEY_SIZE] {
    let mut shares = [0u8; SHARED_KEY_SIZE];
    for (word, out) in key
        .chunks_exact(WORD)
        .zip(shares.chunks_exact_mut(WORD * SHARES))
    {
        OsRng.fill_bytes(&mut out[..WORD * (SHARES - 1)]);
        for i in 0..WORD {
            out[WORD * (SHARES - 1) + i] =
                word[i] ^ out[i] ^ out[WORD + i] ^ out[2 * WORD + i];
        }
    }
    shares
}

/// Reduce 4-way XOR shares back to the 256-bit key.
///
/// Inverse of [`split_key`]; the verification harness never needs this, but
/// the key tooling does.
pub fn join_key(shares: &[u8; SHARED_KEY_SIZE]) -> [u8; KEY_SIZE] {
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

/// Split a 128-bit IV into two XOR shares.
pub fn split_iv(iv: &[u8; IV_SIZE]) -> ([u8; IV_SIZE], [u8; IV_SIZE]) {
    let mut share_a = [0u8; IV_SIZE];
    OsRng.fill_bytes(&mut share_a);

    let mut share_b = [0u8; IV_SIZE];
    for i in 0..IV_SIZE {
        share_b[i] = iv[i] ^ share_a[i];
    }
    (share_a, share_b)
}
