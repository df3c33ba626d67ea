/*++

Licensed under the Apache-2.0 license.

File Name:

    sha256_accel.rs

Abstract:

    File contains the SHA-256 hardware accelerator model.

--*/

use rp2350_emu_bus::{Bus, BusError, ReadWriteRegister};
use rp2350_emu_crypto::Sha256;
use rp2350_emu_types::{ArmAddr, ArmData, ArmSize};
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use tock_registers::register_bitfields;

register_bitfields! [
    u32,

    /// Control and Status Register Fields
    Csr [
        START OFFSET(0) NUMBITS(1) [],
        WDATA_RDY OFFSET(1) NUMBITS(1) [],
        SUM_VLD OFFSET(2) NUMBITS(1) [],
        DMA_SIZE OFFSET(8) NUMBITS(2) [],
        BSWAP OFFSET(12) NUMBITS(1) [],
    ],
];

/// SHA-256 accelerator register offsets (RP2350 datasheet)
mod regs {
    use rp2350_emu_types::ArmAddr;

    pub const CSR: ArmAddr = 0x00;
    pub const WDATA: ArmAddr = 0x04;
    pub const SUM0: ArmAddr = 0x08;
    pub const SUM7: ArmAddr = 0x24;
}

/// Words per 512-bit message block
const BLOCK_WORDS: usize = 16;

/// SHA-256 Hardware Accelerator
///
/// Words written to WDATA accumulate until a full 512-bit block is queued,
/// which is then run through the FIPS 180-4 compression function. SUM_VLD
/// tracks whether SUM0..SUM7 hold the digest of every complete block
/// submitted since the last START.
pub struct Sha256Accel {
    /// Control and status register
    csr: ReadWriteRegister<Csr::Register>,

    /// Queued input words, consumed 16 at a time
    wdata: Vec<ArmData>,

    /// SHA-256 engine
    sha256: Sha256,
}

impl Sha256Accel {
    /// CSR reset value: WDATA_RDY | SUM_VLD | DMA_SIZE=2 | BSWAP
    const CSR_RESET_VAL: ArmData = 0x0000_1206;

    /// Create a new instance in architectural reset state
    pub fn new() -> Self {
        Self {
            csr: ReadWriteRegister::new(Self::CSR_RESET_VAL),
            wdata: Vec::new(),
            sha256: Sha256::new(),
        }
    }

    /// Restore architectural reset state
    pub fn reset(&mut self) {
        self.csr.reg.set(Self::CSR_RESET_VAL);
        self.wdata.clear();
        self.sha256.reset();
    }

    /// On Write callback for the `csr` register
    fn on_write_csr(&mut self, val: ArmData) {
        if val & Csr::START::SET.value != 0 {
            // START re-arms the engine: fresh hash state, empty queue.
            self.sha256.reset();
            self.wdata.clear();
            self.csr.reg.set(
                (val & !Csr::START::SET.value)
                    | Csr::WDATA_RDY::SET.value
                    | Csr::SUM_VLD::SET.value,
            );
        } else {
            // Only the configuration fields are software writable.
            self.csr.reg.modify(
                Csr::BSWAP.val((val >> 12) & 0x1) + Csr::DMA_SIZE.val((val >> 8) & 0x3),
            );
        }
    }

    /// On Write callback for the `wdata` register
    fn on_write_wdata(&mut self, val: ArmData) {
        self.wdata.push(val);
        self.csr.reg.modify(Csr::SUM_VLD::CLEAR);
        if self.wdata.len() >= BLOCK_WORDS {
            self.compress_block();
        }
    }

    /// Consume 16 queued words and run the compression function
    fn compress_block(&mut self) {
        let words: Vec<ArmData> = self.wdata.drain(..BLOCK_WORDS).collect();
        let bswap = self.csr.reg.is_set(Csr::BSWAP);

        let mut block = [0u8; Sha256::BLOCK_SIZE];
        for (chunk, word) in block.chunks_exact_mut(4).zip(words) {
            // With BSWAP the word enters the message schedule as written;
            // without it the hardware consumes the bytes in bus order.
            let bytes = if bswap {
                word.to_be_bytes()
            } else {
                word.to_le_bytes()
            };
            chunk.copy_from_slice(&bytes);
        }

        self.sha256.update(&block);
        self.csr.reg.modify(Csr::SUM_VLD::SET);
    }
}

impl Default for Sha256Accel {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for Sha256Accel {
    fn read(&mut self, size: ArmSize, addr: ArmAddr) -> Result<ArmData, BusError> {
        if size != ArmSize::Word {
            return Err(BusError::LoadAccessFault);
        }
        let val = match addr {
            regs::CSR => self.csr.reg.get(),
            // WDATA is write only
            regs::WDATA => 0,
            regs::SUM0..=regs::SUM7 if addr & 0x3 == 0 => {
                self.sha256.word(((addr - regs::SUM0) / 4) as usize)
            }
            _ => 0,
        };
        Ok(val)
    }

    fn write(&mut self, size: ArmSize, addr: ArmAddr, val: ArmData) -> Result<(), BusError> {
        if size != ArmSize::Word {
            return Err(BusError::StoreAccessFault);
        }
        match addr {
            regs::CSR => self.on_write_csr(val),
            regs::WDATA => self.on_write_wdata(val),
            _ => (),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: ArmData = 1 << 0;
    const WDATA_RDY: ArmData = 1 << 1;
    const SUM_VLD: ArmData = 1 << 2;
    const BSWAP: ArmData = 1 << 12;

    // "abc" padded to one block, as big-endian schedule words.
    #[cfg_attr(rustfmt, rustfmt_skip)]
    const ABC_BLOCK_WORDS: [ArmData; 16] = [
        0x61626380, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0, 0, 0, 0x18,
    ];

    #[cfg_attr(rustfmt, rustfmt_skip)]
    const ABC_DIGEST: [ArmData; 8] = [
        0xba7816bf, 0x8f01cfea, 0x414140de, 0x5dae2223,
        0xb00361a3, 0x96177a9c, 0xb410ff61, 0xf20015ad,
    ];

    fn read_sum(accel: &mut Sha256Accel) -> [ArmData; 8] {
        let mut sum = [0; 8];
        for (i, word) in sum.iter_mut().enumerate() {
            *word = accel
                .read(ArmSize::Word, regs::SUM0 + 4 * i as ArmAddr)
                .unwrap();
        }
        sum
    }

    #[test]
    fn test_reset_state() {
        let mut accel = Sha256Accel::new();
        assert_eq!(accel.read(ArmSize::Word, regs::CSR).unwrap(), 0x1206);
        // SUM registers expose the FIPS 180-4 initial constants.
        assert_eq!(read_sum(&mut accel)[0], 0x6a09e667);
        assert_eq!(read_sum(&mut accel)[7], 0x5be0cd19);
    }

    #[test]
    fn test_start_rearms_engine() {
        let mut accel = Sha256Accel::new();
        accel.write(ArmSize::Word, regs::WDATA, 0x1234).unwrap();
        accel.write(ArmSize::Word, regs::CSR, START | BSWAP).unwrap();

        let csr = accel.read(ArmSize::Word, regs::CSR).unwrap();
        assert_eq!(csr & START, 0);
        assert_ne!(csr & WDATA_RDY, 0);
        assert_ne!(csr & SUM_VLD, 0);
        assert!(accel.wdata.is_empty());
        assert_eq!(read_sum(&mut accel)[0], 0x6a09e667);
    }

    #[test]
    fn test_abc_digest_bswap() {
        let mut accel = Sha256Accel::new();
        accel.write(ArmSize::Word, regs::CSR, START | BSWAP).unwrap();
        for word in ABC_BLOCK_WORDS {
            accel.write(ArmSize::Word, regs::WDATA, word).unwrap();
        }
        assert_ne!(accel.read(ArmSize::Word, regs::CSR).unwrap() & SUM_VLD, 0);
        assert_eq!(read_sum(&mut accel), ABC_DIGEST);
    }

    #[test]
    fn test_abc_digest_no_bswap() {
        let mut accel = Sha256Accel::new();
        accel.write(ArmSize::Word, regs::CSR, START).unwrap();
        for word in ABC_BLOCK_WORDS {
            accel
                .write(ArmSize::Word, regs::WDATA, word.swap_bytes())
                .unwrap();
        }
        assert_eq!(read_sum(&mut accel), ABC_DIGEST);
    }

    #[test]
    fn test_sum_vld_tracks_queue() {
        let mut accel = Sha256Accel::new();
        accel.write(ArmSize::Word, regs::CSR, START | BSWAP).unwrap();
        for (i, word) in ABC_BLOCK_WORDS.iter().enumerate() {
            accel.write(ArmSize::Word, regs::WDATA, *word).unwrap();
            let sum_vld = accel.read(ArmSize::Word, regs::CSR).unwrap() & SUM_VLD;
            if i < 15 {
                assert_eq!(sum_vld, 0);
            } else {
                assert_ne!(sum_vld, 0);
            }
        }
    }

    #[test]
    fn test_config_bits_writable_without_start() {
        let mut accel = Sha256Accel::new();
        accel.write(ArmSize::Word, regs::CSR, 0).unwrap();
        assert_eq!(
            accel.read(ArmSize::Word, regs::CSR).unwrap() & BSWAP,
            0,
            "bswap should clear"
        );
        accel.write(ArmSize::Word, regs::CSR, BSWAP).unwrap();
        assert_ne!(accel.read(ArmSize::Word, regs::CSR).unwrap() & BSWAP, 0);
        // Status bits are untouched by config writes.
        assert_ne!(accel.read(ArmSize::Word, regs::CSR).unwrap() & WDATA_RDY, 0);
    }

    #[test]
    fn test_wdata_reads_zero() {
        let mut accel = Sha256Accel::new();
        assert_eq!(accel.read(ArmSize::Word, regs::WDATA).unwrap(), 0);
        assert_eq!(accel.read(ArmSize::Word, 0x800).unwrap(), 0);
    }
}
