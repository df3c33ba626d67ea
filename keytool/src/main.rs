/*++

Licensed under the Apache-2.0 license.

File Name:

    main.rs

Abstract:

    File contains the main entrypoint for the 4-way XOR secret-sharing key
    tool.

--*/

use clap::{arg, ArgMatches};
use std::process::exit;

mod codec;
mod share;

use codec::Encoding;

fn main() {
    let args = clap::Command::new("keytool")
        .about("4-way XOR secret-sharing tool for AES-256 keys")
        .arg(
            arg!(-c --"c-array" "Read and write share blocks as C-style escaped hex")
                .global(true),
        )
        .subcommand_required(true)
        .subcommand(
            clap::Command::new("encode")
                .about("Split a key into two share blocks")
                .arg(arg!(<KEY> "64 hex character key")),
        )
        .subcommand(
            clap::Command::new("decode")
                .about("Recombine two share blocks into the key")
                .arg(arg!(<BLOCK0> "first 64-byte share block"))
                .arg(arg!(<BLOCK1> "second 64-byte share block")),
        )
        .get_matches();

    if let Err(msg) = run(&args) {
        eprintln!("Error: {msg}");
        exit(1);
    }
}

fn run(args: &ArgMatches) -> Result<(), String> {
    let encoding = if args.is_present("c-array") {
        Encoding::CEscaped
    } else {
        Encoding::Hex
    };

    match args.subcommand() {
        Some(("encode", sub)) => {
            let key_hex = sub.get_one::<String>("KEY").unwrap();
            let key = hex::decode(key_hex).map_err(|_| "key must be valid hexadecimal")?;
            let key: [u8; share::KEY_SIZE] = key
                .try_into()
                .map_err(|_| "key must be exactly 32 bytes (64 hex characters)")?;

            let (block0, block1) = share::encode(&key);
            println!("{}", encoding.bytes_to_text(&block0));
            println!("{}", encoding.bytes_to_text(&block1));
        }
        Some(("decode", sub)) => {
            let block0 = parse_block(encoding, sub.get_one::<String>("BLOCK0").unwrap())?;
            let block1 = parse_block(encoding, sub.get_one::<String>("BLOCK1").unwrap())?;

            let key = share::decode(&block0, &block1);
            println!("{}", encoding.bytes_to_text(&key));
        }
        _ => unreachable!(),
    }
    Ok(())
}

fn parse_block(encoding: Encoding, text: &str) -> Result<[u8; share::BLOCK_SIZE], String> {
    encoding
        .text_to_bytes(text)?
        .try_into()
        .map_err(|_| "each block must be exactly 64 bytes (128 hex characters)".to_string())
}
