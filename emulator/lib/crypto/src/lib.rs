/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the RP2350 Emulator Crypto library.

--*/

mod aes256ctr;
mod sha256;

pub use crate::aes256ctr::{aes256_ctr_decrypt, Aes256Ctr};
pub use crate::sha256::Sha256;

/// AES-256 Key Size
pub const AES_256_KEY_SIZE: usize = 32;

/// AES-256 Block Size
pub const AES_256_BLOCK_SIZE: usize = 16;
