// Licensed under the Apache-2.0 license

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rp2350_emu_bus::{Bus, BusError, ReadOnlyRegister, ReadWriteRegister};
use rp2350_emu_types::{ArmAddr, ArmData, ArmSize};
use tock_registers::interfaces::{Readable, Writeable};

/// ROSC register offsets (RP2350 datasheet)
mod regs {
    use rp2350_emu_types::ArmAddr;

    pub const CTRL: ArmAddr = 0x00;
    pub const FREQA: ArmAddr = 0x04;
    pub const FREQB: ArmAddr = 0x08;
    pub const RANDOM: ArmAddr = 0x0c;
    pub const DORMANT: ArmAddr = 0x10;
    pub const DIV: ArmAddr = 0x14;
    pub const PHASE: ArmAddr = 0x18;
    pub const STATUS: ArmAddr = 0x1c;
    pub const RANDOMBIT: ArmAddr = 0x20;
    pub const COUNT: ArmAddr = 0x24;
}

/// Ring Oscillator
///
/// All fields are free-running software-visible values with no timing model;
/// RANDOMBIT yields a fresh bit per read and COUNT always reads as expired.
pub struct Rosc {
    /// Control register
    ctrl: ReadWriteRegister,

    /// Frequency control register A
    freqa: ReadWriteRegister,

    /// Frequency control register B
    freqb: ReadWriteRegister,

    /// LFSR random value register
    random: ReadWriteRegister,

    /// Dormant/wake register
    dormant: ReadWriteRegister,

    /// Output divider register
    div: ReadWriteRegister,

    /// Phase shifter register
    phase: ReadWriteRegister,

    /// Status register
    status: ReadOnlyRegister,

    /// Random bit source
    rng: StdRng,
}

impl Rosc {
    /// CTRL reset value
    const CTRL_RESET_VAL: ArmData = 0x0000_0aa0;

    /// RANDOM reset value (default LFSR seed)
    const RANDOM_RESET_VAL: ArmData = 0x3f04_b16d;

    /// DORMANT reset value ("wake")
    const DORMANT_RESET_VAL: ArmData = 0x7761_6b65;

    /// DIV reset value (divide by 32)
    const DIV_RESET_VAL: ArmData = 0x0000_aa20;

    /// PHASE reset value
    const PHASE_RESET_VAL: ArmData = 0x0000_0008;

    /// STATUS reset value (STABLE | ENABLED)
    const STATUS_RESET_VAL: ArmData = 0x8000_1000;

    /// Create a new instance in architectural reset state
    pub fn new() -> Self {
        Self {
            ctrl: ReadWriteRegister::new(Self::CTRL_RESET_VAL),
            freqa: ReadWriteRegister::new(0),
            freqb: ReadWriteRegister::new(0),
            random: ReadWriteRegister::new(Self::RANDOM_RESET_VAL),
            dormant: ReadWriteRegister::new(Self::DORMANT_RESET_VAL),
            div: ReadWriteRegister::new(Self::DIV_RESET_VAL),
            phase: ReadWriteRegister::new(Self::PHASE_RESET_VAL),
            status: ReadOnlyRegister::new(Self::STATUS_RESET_VAL),
            rng: StdRng::from_entropy(),
        }
    }

    /// Restore architectural reset state
    pub fn reset(&mut self) {
        self.ctrl.reg.set(Self::CTRL_RESET_VAL);
        self.freqa.reg.set(0);
        self.freqb.reg.set(0);
        self.random.reg.set(Self::RANDOM_RESET_VAL);
        self.dormant.reg.set(Self::DORMANT_RESET_VAL);
        self.div.reg.set(Self::DIV_RESET_VAL);
        self.phase.reg.set(Self::PHASE_RESET_VAL);
    }
}

impl Default for Rosc {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for Rosc {
    fn read(&mut self, size: ArmSize, addr: ArmAddr) -> Result<ArmData, BusError> {
        if size != ArmSize::Word {
            return Err(BusError::LoadAccessFault);
        }
        let val = match addr {
            regs::CTRL => self.ctrl.reg.get(),
            regs::FREQA => self.freqa.reg.get(),
            regs::FREQB => self.freqb.reg.get(),
            regs::RANDOM => self.random.reg.get(),
            regs::DORMANT => self.dormant.reg.get(),
            regs::DIV => self.div.reg.get(),
            regs::PHASE => self.phase.reg.get(),
            regs::STATUS => self.status.reg.get(),
            regs::RANDOMBIT => self.rng.next_u32() & 1,
            // The countdown has always expired
            regs::COUNT => 0,
            _ => 0,
        };
        Ok(val)
    }

    fn write(&mut self, size: ArmSize, addr: ArmAddr, val: ArmData) -> Result<(), BusError> {
        if size != ArmSize::Word {
            return Err(BusError::StoreAccessFault);
        }
        match addr {
            regs::CTRL => self.ctrl.reg.set(val),
            regs::FREQA => self.freqa.reg.set(val),
            regs::FREQB => self.freqb.reg.set(val),
            regs::RANDOM => self.random.reg.set(val),
            regs::DORMANT => self.dormant.reg.set(val),
            regs::DIV => self.div.reg.set(val),
            regs::PHASE => self.phase.reg.set(val),
            _ => (),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_state() {
        let mut rosc = Rosc::new();
        assert_eq!(rosc.read(ArmSize::Word, regs::CTRL).unwrap(), 0xaa0);
        assert_eq!(rosc.read(ArmSize::Word, regs::RANDOM).unwrap(), 0x3f04b16d);
        assert_eq!(rosc.read(ArmSize::Word, regs::DORMANT).unwrap(), 0x77616b65);
        assert_eq!(rosc.read(ArmSize::Word, regs::DIV).unwrap(), 0xaa20);
        assert_eq!(rosc.read(ArmSize::Word, regs::PHASE).unwrap(), 0x8);
        assert_eq!(rosc.read(ArmSize::Word, regs::STATUS).unwrap(), 0x80001000);
        assert_eq!(rosc.read(ArmSize::Word, regs::COUNT).unwrap(), 0);
    }

    #[test]
    fn test_random_bit_is_a_bit() {
        let mut rosc = Rosc::new();
        for _ in 0..64 {
            let bit = rosc.read(ArmSize::Word, regs::RANDOMBIT).unwrap();
            assert!(bit <= 1);
        }
    }

    #[test]
    fn test_read_write_regs() {
        let mut rosc = Rosc::new();
        rosc.write(ArmSize::Word, regs::FREQA, 0x9696_0000).unwrap();
        assert_eq!(
            rosc.read(ArmSize::Word, regs::FREQA).unwrap(),
            0x9696_0000
        );
        // STATUS is read only; the write lands nowhere.
        rosc.write(ArmSize::Word, regs::STATUS, 0).unwrap();
        assert_eq!(rosc.read(ArmSize::Word, regs::STATUS).unwrap(), 0x80001000);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut rosc = Rosc::new();
        rosc.write(ArmSize::Word, regs::DIV, 0xaa01).unwrap();
        rosc.reset();
        assert_eq!(rosc.read(ArmSize::Word, regs::DIV).unwrap(), 0xaa20);
    }
}
