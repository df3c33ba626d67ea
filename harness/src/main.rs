/*++

Licensed under the Apache-2.0 license.

File Name:

    main.rs

Abstract:

    File contains the main entrypoint for the masked AES verification
    harness.

--*/

use clap::{arg, value_parser};
use masked_aes_harness::{run_all_campaigns, toolchain_available, Firmware};
use std::path::PathBuf;
use std::process::exit;

fn main() {
    env_logger::init();

    let args = clap::Command::new("masked-aes-harness")
        .about("Differential verification of the masked AES-256-CTR routine")
        .arg(
            arg!(--source <FILE> "Assembly source of the routine under test")
                .required(false)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            arg!(--"out-dir" <DIR> "Scratch directory for build products")
                .required(false)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            arg!(--trials <COUNT> "Number of randomized trials")
                .required(false)
                .value_parser(value_parser!(usize)),
        )
        .get_matches();

    let source = args
        .get_one::<PathBuf>("source")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("fw/aes.S"));
    let out_dir = args
        .get_one::<PathBuf>("out-dir")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("target/aes-fw"));
    let trials = args.get_one::<usize>("trials").copied().unwrap_or(30);

    if !source.exists() {
        eprintln!("Routine source {:?} does not exist", source);
        exit(1);
    }
    if !toolchain_available() {
        eprintln!("arm-none-eabi-gcc not found; install the ARM toolchain");
        exit(1);
    }

    let fw = match Firmware::build(&source, &out_dir) {
        Ok(fw) => fw,
        Err(err) => {
            eprintln!("{err}");
            exit(1);
        }
    };

    let reports = run_all_campaigns(&fw, trials);

    let mut all_passed = true;
    for report in &reports {
        println!("=== campaign: {} ===", report.name);
        for case in &report.cases {
            if case.passed {
                println!("[PASS] {}", case.name);
            } else {
                println!("[FAIL] {}", case.name);
                if let Some(detail) = &case.detail {
                    println!("  {detail}");
                }
            }
        }
        println!(
            "{}: {}/{} passed",
            report.name,
            report.pass_count(),
            report.cases.len()
        );
        all_passed &= report.passed();
    }

    if !all_passed {
        exit(1);
    }
    println!("all campaigns passed");
}
