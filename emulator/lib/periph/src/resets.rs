/*++

Licensed under the Apache-2.0 license.

File Name:

    resets.rs

Abstract:

    File contains the peripheral reset controller model.

--*/

use crate::{Sha256Accel, Trng};
use rp2350_emu_bus::{Bus, BusError, ReadWriteRegister};
use rp2350_emu_types::{ArmAddr, ArmData, ArmSize};
use std::cell::RefCell;
use std::rc::Rc;
use tock_registers::interfaces::{Readable, Writeable};

/// RESETS register offsets (RP2350 datasheet)
mod regs {
    use rp2350_emu_types::ArmAddr;

    pub const RESET: ArmAddr = 0x00;
}

/// Peripheral Reset Controller
///
/// One bit per peripheral; releasing a reset line (1 -> 0) re-initializes the
/// corresponding model to its architectural reset state. The controller holds
/// non-owning references to the models it notifies.
pub struct Resets {
    /// Reset bitmask register
    reset: ReadWriteRegister,

    /// TRNG model, reset on RESET_TRNG release
    trng: Rc<RefCell<Trng>>,

    /// SHA-256 model, reset on RESET_SHA256 release
    sha256: Rc<RefCell<Sha256Accel>>,
}

impl Resets {
    /// RESET bit gating the SHA-256 accelerator
    pub const RESET_SHA256: ArmData = 1 << 17;

    /// RESET bit gating the TRNG
    pub const RESET_TRNG: ArmData = 1 << 25;

    /// RESET register value at power on (everything held in reset)
    const RESET_RESET_VAL: ArmData = 0xffff_ffff;

    /// Create a new instance with every peripheral held in reset
    ///
    /// # Arguments
    ///
    /// * `trng` - TRNG model to notify on reset release
    /// * `sha256` - SHA-256 model to notify on reset release
    pub fn new(trng: Rc<RefCell<Trng>>, sha256: Rc<RefCell<Sha256Accel>>) -> Self {
        Self {
            reset: ReadWriteRegister::new(Self::RESET_RESET_VAL),
            trng,
            sha256,
        }
    }

    /// On Write callback for the `reset` register
    fn on_write_reset(&mut self, val: ArmData) {
        let prev = self.reset.reg.get();
        if prev & Self::RESET_SHA256 != 0 && val & Self::RESET_SHA256 == 0 {
            self.sha256.borrow_mut().reset();
        }
        if prev & Self::RESET_TRNG != 0 && val & Self::RESET_TRNG == 0 {
            self.trng.borrow_mut().reset();
        }
        self.reset.reg.set(val);
    }
}

impl Bus for Resets {
    fn read(&mut self, size: ArmSize, addr: ArmAddr) -> Result<ArmData, BusError> {
        if size != ArmSize::Word {
            return Err(BusError::LoadAccessFault);
        }
        let val = match addr {
            regs::RESET => self.reset.reg.get(),
            _ => 0,
        };
        Ok(val)
    }

    fn write(&mut self, size: ArmSize, addr: ArmAddr, val: ArmData) -> Result<(), BusError> {
        if size != ArmSize::Word {
            return Err(BusError::StoreAccessFault);
        }
        match addr {
            regs::RESET => self.on_write_reset(val),
            _ => (),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (Rc<RefCell<Trng>>, Rc<RefCell<Sha256Accel>>, Resets) {
        let trng = Rc::new(RefCell::new(Trng::new()));
        let sha256 = Rc::new(RefCell::new(Sha256Accel::new()));
        let resets = Resets::new(trng.clone(), sha256.clone());
        (trng, sha256, resets)
    }

    // TRNG_CONFIG offset, for poking observable state into the TRNG.
    const TRNG_CONFIG: ArmAddr = 0x10c;

    #[test]
    fn test_reset_reads_all_ones() {
        let (_, _, mut resets) = fixture();
        assert_eq!(
            resets.read(ArmSize::Word, regs::RESET).unwrap(),
            0xffff_ffff
        );
    }

    #[test]
    fn test_release_resets_trng() {
        let (trng, _, mut resets) = fixture();
        trng.borrow_mut()
            .write(ArmSize::Word, TRNG_CONFIG, 0xabcd)
            .unwrap();

        resets
            .write(ArmSize::Word, regs::RESET, !Resets::RESET_TRNG)
            .unwrap();

        assert_eq!(
            trng.borrow_mut().read(ArmSize::Word, TRNG_CONFIG).unwrap(),
            0
        );
        assert_eq!(
            resets.read(ArmSize::Word, regs::RESET).unwrap(),
            !Resets::RESET_TRNG
        );
    }

    #[test]
    fn test_release_resets_sha256() {
        let (_, sha256, mut resets) = fixture();
        // Queue a partial block, then release reset; the queue must drop.
        sha256
            .borrow_mut()
            .write(ArmSize::Word, 0x04, 0x1234)
            .unwrap();

        resets
            .write(ArmSize::Word, regs::RESET, !Resets::RESET_SHA256)
            .unwrap();

        let csr = sha256.borrow_mut().read(ArmSize::Word, 0x00).unwrap();
        assert_eq!(csr, 0x1206);
    }

    #[test]
    fn test_entering_reset_has_no_side_effect() {
        let (trng, _, mut resets) = fixture();

        resets
            .write(ArmSize::Word, regs::RESET, !Resets::RESET_TRNG)
            .unwrap();
        trng.borrow_mut()
            .write(ArmSize::Word, TRNG_CONFIG, 0xabcd)
            .unwrap();

        // 0 -> 1 (re-asserting reset) leaves the model untouched.
        resets
            .write(ArmSize::Word, regs::RESET, 0xffff_ffff)
            .unwrap();
        assert_eq!(
            trng.borrow_mut().read(ArmSize::Word, TRNG_CONFIG).unwrap(),
            0xabcd
        );
    }

    #[test]
    fn test_unrelated_bits_do_not_reset() {
        let (trng, _, mut resets) = fixture();
        trng.borrow_mut()
            .write(ArmSize::Word, TRNG_CONFIG, 0xabcd)
            .unwrap();

        // Clear every bit except the TRNG's; its model must keep state.
        resets
            .write(ArmSize::Word, regs::RESET, Resets::RESET_TRNG)
            .unwrap();
        assert_eq!(
            trng.borrow_mut().read(ArmSize::Word, TRNG_CONFIG).unwrap(),
            0xabcd
        );
    }

    #[test]
    fn test_undefined_offset() {
        let (_, _, mut resets) = fixture();
        assert_eq!(resets.read(ArmSize::Word, 0x8).unwrap(), 0);
        assert_eq!(resets.write(ArmSize::Word, 0x8, 0).ok(), Some(()));
    }
}
