/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the RP2350 Emulator Bus library.

--*/
mod bus;
mod register;

pub use crate::bus::{Bus, BusError};
pub use crate::register::{ReadOnlyRegister, ReadWriteRegister};
