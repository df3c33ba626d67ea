// Licensed under the Apache-2.0 license

use thiserror::Error;

/// Harness-level failures.
///
/// Build errors are fatal at startup; emulation faults abandon a single
/// invocation and carry the program counter context needed to diagnose a
/// modeling gap; comparison mismatches are not errors at all, they are
/// reported test failures.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("firmware build failed: {0}")]
    Build(#[from] std::io::Error),

    #[error("symbol {0:?} not found in firmware image")]
    MissingSymbol(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unmapped {kind} of {size} bytes at {addr:#010x}, pc={pc:#010x}")]
    UnmappedAccess {
        kind: &'static str,
        addr: u64,
        size: usize,
        pc: u64,
    },

    #[error("cpu engine stopped with {err} at pc={pc:#010x}")]
    Emulator { err: String, pc: u64 },

    #[error("cpu engine setup failed: {0}")]
    Engine(String),
}
