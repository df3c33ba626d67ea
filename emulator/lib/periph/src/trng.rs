// Licensed under the Apache-2.0 license

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rp2350_emu_bus::{Bus, BusError, ReadWriteRegister};
use rp2350_emu_types::{ArmAddr, ArmData, ArmSize};
use tock_registers::interfaces::{Readable, Writeable};

/// TRNG register offsets (RP2350 datasheet)
mod regs {
    use rp2350_emu_types::ArmAddr;

    pub const RNG_IMR: ArmAddr = 0x100;
    pub const RNG_ISR: ArmAddr = 0x104;
    pub const RNG_ICR: ArmAddr = 0x108;
    pub const TRNG_CONFIG: ArmAddr = 0x10c;
    pub const TRNG_VALID: ArmAddr = 0x110;
    pub const EHR_DATA0: ArmAddr = 0x114;
    pub const EHR_DATA5: ArmAddr = 0x128;
    pub const RND_SOURCE_ENABLE: ArmAddr = 0x12c;
    pub const SAMPLE_CNT1: ArmAddr = 0x130;
    pub const TRNG_DEBUG_CONTROL: ArmAddr = 0x138;
    pub const TRNG_SW_RESET: ArmAddr = 0x140;
    pub const TRNG_BUSY: ArmAddr = 0x1b8;
}

/// EHR_VALID bit in RNG_ISR/RNG_ICR
const EHR_VALID: ArmData = 1 << 0;

/// RND_SOURCE_ENABLE source enable bit
const SOURCE_ENABLE: ArmData = 1 << 0;

/// TRNG_SW_RESET reset bit
const SW_RESET: ArmData = 1 << 0;

/// Words in the entropy holding register
const EHR_WORDS: usize = 6;

/// True Random Number Generator
///
/// The entropy holding register is refreshed whenever software clears
/// EHR_VALID through RNG_ICR or (re-)enables the random source; TRNG_VALID
/// always reads ready since emulated entropy is never delayed.
pub struct Trng {
    /// Interrupt mask register
    rng_imr: ReadWriteRegister,

    /// Interrupt status register
    rng_isr: ReadWriteRegister,

    /// Interrupt clear register
    rng_icr: ReadWriteRegister,

    /// Configuration register
    trng_config: ReadWriteRegister,

    /// Random source enable register
    rnd_source_enable: ReadWriteRegister,

    /// Sample count register
    sample_cnt1: ReadWriteRegister,

    /// Debug control register
    debug_control: ReadWriteRegister,

    /// Entropy holding register data
    ehr_data: [ArmData; EHR_WORDS],

    /// Entropy source
    rng: StdRng,
}

impl Trng {
    /// RNG_IMR reset value (all interrupts masked)
    const IMR_RESET_VAL: ArmData = 0x0000_000f;

    /// SAMPLE_CNT1 reset value
    const SAMPLE_CNT1_RESET_VAL: ArmData = 0x0000_ffff;

    /// Create a new instance in architectural reset state
    pub fn new() -> Self {
        let mut trng = Self {
            rng_imr: ReadWriteRegister::new(Self::IMR_RESET_VAL),
            rng_isr: ReadWriteRegister::new(0),
            rng_icr: ReadWriteRegister::new(0),
            trng_config: ReadWriteRegister::new(0),
            rnd_source_enable: ReadWriteRegister::new(0),
            sample_cnt1: ReadWriteRegister::new(Self::SAMPLE_CNT1_RESET_VAL),
            debug_control: ReadWriteRegister::new(0),
            ehr_data: [0; EHR_WORDS],
            rng: StdRng::from_entropy(),
        };
        trng.refresh_ehr();
        trng
    }

    /// Restore architectural reset state
    pub fn reset(&mut self) {
        self.rng_imr.reg.set(Self::IMR_RESET_VAL);
        self.rng_isr.reg.set(0);
        self.rng_icr.reg.set(0);
        self.trng_config.reg.set(0);
        self.rnd_source_enable.reg.set(0);
        self.sample_cnt1.reg.set(Self::SAMPLE_CNT1_RESET_VAL);
        self.debug_control.reg.set(0);
        self.refresh_ehr();
    }

    /// Collect a new batch of entropy into the EHR
    fn refresh_ehr(&mut self) {
        for word in self.ehr_data.iter_mut() {
            *word = self.rng.next_u32();
        }
    }
}

impl Default for Trng {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for Trng {
    fn read(&mut self, size: ArmSize, addr: ArmAddr) -> Result<ArmData, BusError> {
        if size != ArmSize::Word {
            return Err(BusError::LoadAccessFault);
        }
        let val = match addr {
            regs::RNG_IMR => self.rng_imr.reg.get(),
            regs::RNG_ISR => self.rng_isr.reg.get(),
            regs::RNG_ICR => self.rng_icr.reg.get(),
            regs::TRNG_CONFIG => self.trng_config.reg.get(),
            // Emulated entropy is never delayed
            regs::TRNG_VALID => 1,
            regs::EHR_DATA0..=regs::EHR_DATA5 if addr & 0x3 == 0 => {
                self.ehr_data[((addr - regs::EHR_DATA0) / 4) as usize]
            }
            regs::RND_SOURCE_ENABLE => self.rnd_source_enable.reg.get(),
            regs::SAMPLE_CNT1 => self.sample_cnt1.reg.get(),
            regs::TRNG_DEBUG_CONTROL => self.debug_control.reg.get(),
            regs::TRNG_SW_RESET => 0,
            regs::TRNG_BUSY => 0,
            _ => 0,
        };
        Ok(val)
    }

    fn write(&mut self, size: ArmSize, addr: ArmAddr, val: ArmData) -> Result<(), BusError> {
        if size != ArmSize::Word {
            return Err(BusError::StoreAccessFault);
        }
        match addr {
            regs::RNG_IMR => self.rng_imr.reg.set(val),
            regs::RNG_ICR => {
                // Writing clears the corresponding RNG_ISR bits; clearing
                // EHR_VALID starts a new entropy collection.
                self.rng_icr.reg.set(val);
                self.rng_isr.reg.set(self.rng_isr.reg.get() & !val);
                if val & EHR_VALID != 0 {
                    self.refresh_ehr();
                }
            }
            regs::TRNG_CONFIG => self.trng_config.reg.set(val),
            regs::RND_SOURCE_ENABLE => {
                self.rnd_source_enable.reg.set(val);
                if val & SOURCE_ENABLE != 0 {
                    self.refresh_ehr();
                }
            }
            regs::SAMPLE_CNT1 => self.sample_cnt1.reg.set(val),
            regs::TRNG_DEBUG_CONTROL => self.debug_control.reg.set(val),
            regs::TRNG_SW_RESET => {
                if val & SW_RESET != 0 {
                    self.reset();
                }
            }
            _ => (),
        }
        Ok(())
    }
}
