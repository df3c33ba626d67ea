/*++

Licensed under the Apache-2.0 license.

File Name:

    periph_bus.rs

Abstract:

    File contains the root Bus implementation routing peripheral accesses.

--*/

use crate::{Resets, Rosc, Sha256Accel, Trng};
use rp2350_emu_bus::{Bus, BusError};
use rp2350_emu_types::{ArmAddr, ArmData, ArmSize};
use std::cell::RefCell;
use std::rc::Rc;

/// Peripheral Bus
///
/// Decodes a physical address into (peripheral, offset) and routes the access
/// to the matching register-file model. Addresses outside every modeled
/// window read as zero and swallow writes, so the routine under test may
/// probe unmodeled peripherals without faulting the emulation.
pub struct PeriphBus {
    /// TRNG model, shared with the reset controller
    pub trng: Rc<RefCell<Trng>>,

    /// SHA-256 model, shared with the reset controller
    pub sha256: Rc<RefCell<Sha256Accel>>,

    /// Ring oscillator model
    pub rosc: Rosc,

    /// Reset controller model
    pub resets: Resets,
}

impl PeriphBus {
    /// RESETS register window base
    pub const RESETS_BASE: ArmAddr = 0x4002_0000;

    /// ROSC register window base
    pub const ROSC_BASE: ArmAddr = 0x400e_8000;

    /// TRNG register window base
    pub const TRNG_BASE: ArmAddr = 0x400f_0000;

    /// SHA-256 register window base
    pub const SHA256_BASE: ArmAddr = 0x400f_8000;

    /// Each peripheral decodes a 4 KiB window
    const WINDOW_MASK: ArmAddr = 0xffff_f000;

    /// Create a new instance with every model in architectural reset state
    pub fn new() -> Self {
        let trng = Rc::new(RefCell::new(Trng::new()));
        let sha256 = Rc::new(RefCell::new(Sha256Accel::new()));
        let resets = Resets::new(trng.clone(), sha256.clone());
        Self {
            trng,
            sha256,
            rosc: Rosc::new(),
            resets,
        }
    }

    /// Read a 32-bit value from a peripheral address
    pub fn read32(&mut self, addr: ArmAddr) -> ArmData {
        self.read(ArmSize::Word, addr).unwrap_or(0)
    }

    /// Write a 32-bit value to a peripheral address
    pub fn write32(&mut self, addr: ArmAddr, val: ArmData) {
        let _ = self.write(ArmSize::Word, addr, val);
    }
}

impl Default for PeriphBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for PeriphBus {
    fn read(&mut self, size: ArmSize, addr: ArmAddr) -> Result<ArmData, BusError> {
        let offset = addr & !Self::WINDOW_MASK;
        match addr & Self::WINDOW_MASK {
            Self::TRNG_BASE => self.trng.borrow_mut().read(size, offset),
            Self::SHA256_BASE => self.sha256.borrow_mut().read(size, offset),
            Self::ROSC_BASE => self.rosc.read(size, offset),
            Self::RESETS_BASE => self.resets.read(size, offset),
            _ => Ok(0),
        }
    }

    fn write(&mut self, size: ArmSize, addr: ArmAddr, val: ArmData) -> Result<(), BusError> {
        let offset = addr & !Self::WINDOW_MASK;
        match addr & Self::WINDOW_MASK {
            Self::TRNG_BASE => self.trng.borrow_mut().write(size, offset, val),
            Self::SHA256_BASE => self.sha256.borrow_mut().write(size, offset, val),
            Self::ROSC_BASE => self.rosc.write(size, offset, val),
            Self::RESETS_BASE => self.resets.write(size, offset, val),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes_to_each_peripheral() {
        let mut bus = PeriphBus::new();

        // TRNG_VALID
        assert_eq!(bus.read32(PeriphBus::TRNG_BASE + 0x110), 1);
        // SHA-256 CSR reset value
        assert_eq!(bus.read32(PeriphBus::SHA256_BASE), 0x1206);
        // ROSC DORMANT reads "wake"
        assert_eq!(bus.read32(PeriphBus::ROSC_BASE + 0x10), 0x7761_6b65);
        // RESETS comes up all ones
        assert_eq!(bus.read32(PeriphBus::RESETS_BASE), 0xffff_ffff);
    }

    #[test]
    fn test_write_routing() {
        let mut bus = PeriphBus::new();
        bus.write32(PeriphBus::TRNG_BASE + 0x10c, 0x55);
        assert_eq!(bus.read32(PeriphBus::TRNG_BASE + 0x10c), 0x55);
    }

    #[test]
    fn test_reset_release_through_bus() {
        let mut bus = PeriphBus::new();
        bus.write32(PeriphBus::TRNG_BASE + 0x10c, 0x55);
        bus.write32(PeriphBus::RESETS_BASE, !Resets::RESET_TRNG);
        assert_eq!(bus.read32(PeriphBus::TRNG_BASE + 0x10c), 0);
    }

    #[test]
    fn test_outside_windows_is_lenient() {
        let mut bus = PeriphBus::new();
        // SIO, XIP, and friends are not modeled; they read as zero.
        assert_eq!(bus.read32(0x4000_0000), 0);
        assert_eq!(bus.read32(0x40ff_fffc), 0);
        bus.write32(0x4005_0000, 0xdead_beef);
        assert_eq!(bus.read32(0x4005_0000), 0);
    }

    #[test]
    fn test_sha256_digest_through_bus() {
        let mut bus = PeriphBus::new();
        bus.write32(PeriphBus::SHA256_BASE, 0x1001); // START | BSWAP
        let mut block = [0u32; 16];
        block[0] = 0x61626380;
        block[15] = 0x18;
        for word in block {
            bus.write32(PeriphBus::SHA256_BASE + 0x04, word);
        }
        assert_eq!(bus.read32(PeriphBus::SHA256_BASE + 0x08), 0xba7816bf);
    }
}
