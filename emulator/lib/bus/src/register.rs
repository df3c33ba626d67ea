/*++

Licensed under the Apache-2.0 license.

File Name:

    register.rs

Abstract:

    File contains the register wrapper types used by the peripheral models.

--*/

use tock_registers::registers::InMemoryRegister;
use tock_registers::RegisterLongName;

/// Read Write Register
///
/// The RP2350 peripherals modeled here expose 32-bit registers only; each
/// model decodes word accesses itself, so these wrappers carry no bus logic
/// of their own.
pub struct ReadWriteRegister<R: RegisterLongName = ()> {
    /// Register
    pub reg: InMemoryRegister<u32, R>,
}

impl<R: RegisterLongName> ReadWriteRegister<R> {
    /// Create an instance of Read Write Register
    pub fn new(val: u32) -> Self {
        Self {
            reg: InMemoryRegister::new(val),
        }
    }
}

/// Read Only Register
pub struct ReadOnlyRegister<R: RegisterLongName = ()> {
    /// Register
    pub reg: InMemoryRegister<u32, R>,
}

impl<R: RegisterLongName> ReadOnlyRegister<R> {
    /// Create an instance of Read Only Register
    pub fn new(val: u32) -> Self {
        Self {
            reg: InMemoryRegister::new(val),
        }
    }
}
