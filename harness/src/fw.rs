/*++

Licensed under the Apache-2.0 license.

File Name:

    fw.rs

Abstract:

    File contains the toolchain driver that turns the routine under test into
    a loadable firmware image.

--*/

use crate::HarnessError;
use log::info;
use rp2350_emu_types::ArmAddr;
use std::collections::HashMap;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::Path;
use std::process::{Command, Stdio};

const GCC: &str = "arm-none-eabi-gcc";
const OBJCOPY: &str = "arm-none-eabi-objcopy";
const NM: &str = "arm-none-eabi-nm";

/// Preprocessor configuration of the routine under test: hardening features
/// that need real RCP hardware are compiled out for emulation.
const DEFINES: &[&str] = &[
    "RC_COUNT=0",
    "HARDENING=0",
    "DOUBLE_HARDENING=0",
    "INLINE_REF_ROUNDKEY_SHARES_S=1",
    "INLINE_REF_ROUNDKEY_HVPERMS_S=1",
    "INLINE_SHIFT_ROWS_S=1",
    "INLINE_MAP_SBOX_S=1",
    "CALLER_INIT_RCP_COUNT=1",
    "RC_CANARY=0",
    "FIB_WORKAROUND=0",
];

/// Standalone link layout: code in SRAM scratch X, workspace in scratch Y,
/// stack at the end. Matches the executor's memory map.
const LINKER_SCRIPT: &str = r#"
MEMORY
{
    CODE (rwx) : ORIGIN = 0x20080000, LENGTH = 4K
    DATA (rw) : ORIGIN = 0x20081000, LENGTH = 4K
    STACK (rw) : ORIGIN = 0x20081C00, LENGTH = 1K
}

SECTIONS
{
    .text : {
        *(.text)
        *(.text.*)
    } > CODE

    .data : {
        *(.data)
        *(.data.*)
    } > DATA

    .scratch_y.aes : {
        *(.scratch_y.aes)
    } > DATA

    .bss : {
        *(.bss)
        *(.bss.*)
    } > DATA

    __stack_top = ORIGIN(STACK) + LENGTH(STACK);
}

ENTRY(decrypt)
"#;

fn other_err(e: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> io::Error {
    io::Error::new(ErrorKind::Other, e)
}

fn run_cmd(cmd: &mut Command) -> io::Result<()> {
    let out = cmd.output()?;
    if out.status.success() {
        Ok(())
    } else {
        Err(other_err(format!(
            "Process {:?} {:?} exited with status code {:?} stderr {}",
            cmd.get_program(),
            cmd.get_args(),
            out.status.code(),
            String::from_utf8_lossy(&out.stderr)
        )))
    }
}

fn run_cmd_stdout(cmd: &mut Command) -> io::Result<String> {
    let out = cmd.output()?;
    if out.status.success() {
        Ok(String::from_utf8_lossy(&out.stdout).into())
    } else {
        Err(other_err(format!(
            "Process {:?} {:?} exited with status code {:?} stderr {}",
            cmd.get_program(),
            cmd.get_args(),
            out.status.code(),
            String::from_utf8_lossy(&out.stderr)
        )))
    }
}

/// Check whether the arm-none-eabi toolchain is installed.
pub fn toolchain_available() -> bool {
    Command::new(GCC)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// A built routine-under-test: raw binary image plus its symbol table.
pub struct Firmware {
    /// Raw binary image, loaded at the code region base
    pub image: Vec<u8>,

    /// Absolute address of the entry symbol
    pub entry: ArmAddr,

    symbols: HashMap<String, ArmAddr>,
}

impl Firmware {
    /// Entry symbol of the routine under test
    pub const ENTRY_SYMBOL: &'static str = "decrypt";

    /// Assemble and link `source` for Cortex-M33 and extract the flat binary
    /// and symbol table. Any toolchain failure is fatal to harness startup.
    ///
    /// # Arguments
    ///
    /// * `source` - Path to the assembly source of the routine under test
    /// * `out_dir` - Scratch directory for the build products
    pub fn build(source: &Path, out_dir: &Path) -> Result<Self, HarnessError> {
        fs::create_dir_all(out_dir).map_err(HarnessError::Build)?;

        let ld_path = out_dir.join("aes.ld");
        fs::write(&ld_path, LINKER_SCRIPT).map_err(HarnessError::Build)?;
        let elf_path = out_dir.join("aes.elf");
        let bin_path = out_dir.join("aes.bin");

        let mut cmd = Command::new(GCC);
        cmd.args([
            "-mcpu=cortex-m33",
            "-mthumb",
            "-mfloat-abi=soft",
            "-nostdlib",
            "-nostartfiles",
            "-ffreestanding",
            "-g",
            "-O0",
        ]);
        if let Some(dir) = source.parent() {
            cmd.arg("-I").arg(dir);
            let stub_include = dir.join("include");
            if stub_include.exists() {
                cmd.arg("-I").arg(stub_include);
            }
        }
        if let Ok(sdk) = std::env::var("PICO_SDK_PATH") {
            cmd.arg("-I")
                .arg(Path::new(&sdk).join("src/rp2350/hardware_regs/include"));
        }
        for define in DEFINES {
            cmd.arg("-D").arg(define);
        }
        cmd.arg("-T").arg(&ld_path).arg("-o").arg(&elf_path);
        cmd.arg(source);
        run_cmd(&mut cmd).map_err(HarnessError::Build)?;

        run_cmd(
            Command::new(OBJCOPY)
                .args(["-O", "binary"])
                .arg(&elf_path)
                .arg(&bin_path),
        )
        .map_err(HarnessError::Build)?;

        let nm_out =
            run_cmd_stdout(Command::new(NM).arg(&elf_path)).map_err(HarnessError::Build)?;
        let symbols = parse_nm(&nm_out);

        let image = fs::read(&bin_path).map_err(HarnessError::Build)?;
        let entry = *symbols
            .get(Self::ENTRY_SYMBOL)
            .ok_or_else(|| HarnessError::MissingSymbol(Self::ENTRY_SYMBOL.into()))?;

        info!(
            "built {} ({} bytes, entry {:#010x})",
            source.display(),
            image.len(),
            entry
        );
        Ok(Self {
            image,
            entry,
            symbols,
        })
    }

    /// Wrap a prebuilt image with a known entry address.
    pub fn from_parts(image: Vec<u8>, entry: ArmAddr) -> Self {
        Self {
            image,
            entry,
            symbols: HashMap::new(),
        }
    }

    /// Look up a symbol address from the build.
    pub fn symbol(&self, name: &str) -> Option<ArmAddr> {
        self.symbols.get(name).copied()
    }
}

/// Parse `nm` output lines of the form `20080070 T decrypt`.
fn parse_nm(out: &str) -> HashMap<String, ArmAddr> {
    let mut symbols = HashMap::new();
    for line in out.lines() {
        let mut parts = line.split_whitespace();
        if let (Some(addr), Some(_kind), Some(name)) = (parts.next(), parts.next(), parts.next()) {
            if let Ok(addr) = ArmAddr::from_str_radix(addr, 16) {
                symbols.insert(name.to_string(), addr);
            }
        }
    }
    symbols
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nm() {
        let out = "20080070 T decrypt\n20081000 D chaff\n\nnot a symbol line\n";
        let symbols = parse_nm(out);
        assert_eq!(symbols.get("decrypt"), Some(&0x2008_0070));
        assert_eq!(symbols.get("chaff"), Some(&0x2008_1000));
        assert_eq!(symbols.len(), 2);
    }

    #[test]
    fn test_from_parts() {
        let fw = Firmware::from_parts(vec![0x70, 0x47], 0x2008_0000);
        assert_eq!(fw.entry, 0x2008_0000);
        assert_eq!(fw.symbol("decrypt"), None);
    }
}
