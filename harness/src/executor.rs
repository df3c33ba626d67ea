/*++

Licensed under the Apache-2.0 license.

File Name:

    executor.rs

Abstract:

    File contains the execution harness hosting one invocation of the routine
    under test inside the CPU engine.

--*/

use crate::{Firmware, HarnessError};
use log::trace;
use rp2350_emu_periph::PeriphBus;
use std::cell::RefCell;
use std::rc::Rc;
use unicorn_engine::unicorn_const::{uc_error, Arch, HookType, MemType, Mode, Permission};
use unicorn_engine::{RegisterARM, Unicorn};

/// Guest memory layout for one invocation.
pub struct MemLayout;

impl MemLayout {
    /// Zero page; the routine clears registers by loading from address 0
    pub const ZERO_BASE: u64 = 0x0000_0000;
    pub const ZERO_SIZE: usize = 0x1000;

    /// Input region in main SRAM for key shares, IV shares and data
    pub const INPUT_BASE: u64 = 0x2000_0000;
    pub const INPUT_SIZE: usize = 0x1000;

    /// Code + workspace in SRAM scratch X/Y
    pub const CODE_BASE: u64 = 0x2008_0000;
    pub const CODE_SIZE: usize = 0x2000;

    /// Initial stack pointer, top of the workspace
    pub const STACK_TOP: u64 = 0x2008_2000;

    /// Peripheral window, instrumented with MMIO hooks
    pub const PERIPH_BASE: u64 = 0x4000_0000;
    pub const PERIPH_SIZE: usize = 0x0100_0000;

    /// Input region offsets
    pub const KEY_OFFSET: u64 = 0x000;
    pub const IV_A_OFFSET: u64 = 0x100;
    pub const IV_B_OFFSET: u64 = 0x120;
    pub const DATA_OFFSET: u64 = 0x200;
}

/// AES block size in bytes
const BLOCK_SIZE: usize = 16;

/// Fault details captured by the unmapped-access hook.
#[derive(Clone, Copy, Debug)]
struct MemFault {
    is_write: bool,
    addr: u64,
    size: usize,
    pc: u64,
}

fn engine_err(err: uc_error) -> HarnessError {
    HarnessError::Engine(format!("{err:?}"))
}

/// Run one end-to-end invocation of the routine under test.
///
/// A fresh CPU engine instance and a fresh peripheral set are built per call;
/// nothing carries over between invocations. The routine receives the key
/// shares, IV shares and buffer pointer per its calling convention and runs
/// until it returns to a sentinel link address. The decrypted data is read
/// back from the buffer, which the routine overwrites in place.
///
/// # Arguments
///
/// * `fw` - Routine under test
/// * `key4way` - 4-way shared AES-256 key
/// * `iv_share_a` - First IV share
/// * `iv_share_b` - Second IV share
/// * `ciphertext` - Data to decrypt, 16 bytes per block
/// * `nblocks` - Number of 16-byte blocks
pub fn run_decrypt(
    fw: &Firmware,
    key4way: &[u8; 128],
    iv_share_a: &[u8; 16],
    iv_share_b: &[u8; 16],
    ciphertext: &[u8],
    nblocks: usize,
) -> Result<Vec<u8>, HarnessError> {
    if ciphertext.len() < nblocks * BLOCK_SIZE {
        return Err(HarnessError::InvalidInput(format!(
            "ciphertext holds {} bytes but {} blocks were requested",
            ciphertext.len(),
            nblocks
        )));
    }
    if fw.image.len() + 0x100 >= MemLayout::CODE_SIZE {
        return Err(HarnessError::InvalidInput(format!(
            "firmware image of {} bytes does not fit the code region",
            fw.image.len()
        )));
    }
    let entry = fw.entry as u64;
    if entry < MemLayout::CODE_BASE || entry >= MemLayout::CODE_BASE + fw.image.len() as u64 {
        return Err(HarnessError::InvalidInput(format!(
            "entry {:#010x} lies outside the loaded image",
            entry
        )));
    }

    let mut uc =
        Unicorn::new(Arch::ARM, Mode::THUMB | Mode::MCLASS).map_err(engine_err)?;

    uc.mem_map(MemLayout::ZERO_BASE, MemLayout::ZERO_SIZE, Permission::ALL)
        .map_err(engine_err)?;
    uc.mem_map(MemLayout::CODE_BASE, MemLayout::CODE_SIZE, Permission::ALL)
        .map_err(engine_err)?;
    uc.mem_map(MemLayout::INPUT_BASE, MemLayout::INPUT_SIZE, Permission::ALL)
        .map_err(engine_err)?;
    uc.mem_map(
        MemLayout::PERIPH_BASE,
        MemLayout::PERIPH_SIZE,
        Permission::ALL,
    )
    .map_err(engine_err)?;

    uc.mem_write(MemLayout::CODE_BASE, &fw.image)
        .map_err(engine_err)?;

    // Each invocation gets a peripheral set in architectural reset state.
    let bus = Rc::new(RefCell::new(PeriphBus::new()));
    let hook_bus = bus.clone();
    uc.add_mem_hook(
        HookType::MEM_READ | HookType::MEM_WRITE,
        MemLayout::PERIPH_BASE,
        MemLayout::PERIPH_BASE + MemLayout::PERIPH_SIZE as u64,
        move |uc, access, addr, _size, value| {
            if matches!(access, MemType::WRITE) {
                trace!("periph write {:#010x} = {:#010x}", addr, value as u32);
                hook_bus.borrow_mut().write32(addr as u32, value as u32);
            } else {
                let val = hook_bus.borrow_mut().read32(addr as u32);
                trace!("periph read {:#010x} -> {:#010x}", addr, val);
                // Land the value in emulator memory so the pending load
                // observes it.
                let _ = uc.mem_write(addr, &val.to_le_bytes());
            }
            true
        },
    )
    .map_err(engine_err)?;

    // Any access outside the mapped regions indicates a modeling gap and is
    // fatal to the run.
    let fault: Rc<RefCell<Option<MemFault>>> = Rc::new(RefCell::new(None));
    let hook_fault = fault.clone();
    uc.add_mem_hook(
        HookType::MEM_READ_UNMAPPED | HookType::MEM_WRITE_UNMAPPED,
        1,
        0,
        move |uc, access, addr, size, _value| {
            let pc = uc.reg_read(RegisterARM::PC).unwrap_or(0);
            *hook_fault.borrow_mut() = Some(MemFault {
                is_write: matches!(access, MemType::WRITE_UNMAPPED),
                addr,
                size,
                pc,
            });
            false
        },
    )
    .map_err(engine_err)?;

    // Input region: key shares, IV shares, ciphertext at fixed offsets.
    uc.mem_write(MemLayout::INPUT_BASE + MemLayout::KEY_OFFSET, key4way)
        .map_err(engine_err)?;
    uc.mem_write(MemLayout::INPUT_BASE + MemLayout::IV_A_OFFSET, iv_share_a)
        .map_err(engine_err)?;
    uc.mem_write(MemLayout::INPUT_BASE + MemLayout::IV_B_OFFSET, iv_share_b)
        .map_err(engine_err)?;
    uc.mem_write(
        MemLayout::INPUT_BASE + MemLayout::DATA_OFFSET,
        &ciphertext[..nblocks * BLOCK_SIZE],
    )
    .map_err(engine_err)?;

    // Calling convention: pointers in r0-r3, block count on the stack.
    uc.reg_write(
        RegisterARM::R0,
        MemLayout::INPUT_BASE + MemLayout::KEY_OFFSET,
    )
    .map_err(engine_err)?;
    uc.reg_write(
        RegisterARM::R1,
        MemLayout::INPUT_BASE + MemLayout::IV_A_OFFSET,
    )
    .map_err(engine_err)?;
    uc.reg_write(
        RegisterARM::R2,
        MemLayout::INPUT_BASE + MemLayout::IV_B_OFFSET,
    )
    .map_err(engine_err)?;
    uc.reg_write(
        RegisterARM::R3,
        MemLayout::INPUT_BASE + MemLayout::DATA_OFFSET,
    )
    .map_err(engine_err)?;

    let sp = MemLayout::STACK_TOP - 4;
    uc.mem_write(sp, &(nblocks as u32).to_le_bytes())
        .map_err(engine_err)?;
    uc.reg_write(RegisterARM::SP, sp).map_err(engine_err)?;

    // Return lands on a sentinel address past the image, still inside the
    // mapped code region; the run stops there.
    let sentinel = MemLayout::CODE_BASE + fw.image.len() as u64 + 0x100;
    uc.reg_write(RegisterARM::LR, sentinel | 1)
        .map_err(engine_err)?;

    trace!(
        "starting routine at {:#010x}, sentinel {:#010x}, {} block(s)",
        entry,
        sentinel,
        nblocks
    );

    // No instruction limit: a routine that never returns hangs the harness.
    if let Err(err) = uc.emu_start(entry | 1, sentinel, 0, 0) {
        if let Some(fault) = fault.borrow_mut().take() {
            return Err(HarnessError::UnmappedAccess {
                kind: if fault.is_write { "write" } else { "read" },
                addr: fault.addr,
                size: fault.size,
                pc: fault.pc,
            });
        }
        let pc = uc.reg_read(RegisterARM::PC).unwrap_or(0);
        return Err(HarnessError::Emulator {
            err: format!("{err:?}"),
            pc,
        });
    }

    uc.mem_read_as_vec(
        MemLayout::INPUT_BASE + MemLayout::DATA_OFFSET,
        nblocks * BLOCK_SIZE,
    )
    .map_err(engine_err)
}
