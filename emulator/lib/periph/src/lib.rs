/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the RP2350 Emulator Peripheral library.

--*/

mod periph_bus;
mod resets;
mod rosc;
mod sha256_accel;
mod trng;

pub use periph_bus::PeriphBus;
pub use resets::Resets;
pub use rosc::Rosc;
pub use sha256_accel::Sha256Accel;
pub use trng::Trng;
