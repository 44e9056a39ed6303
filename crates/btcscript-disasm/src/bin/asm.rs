use anyhow::Result;
use clap::Parser;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use btcscript_rs::disasm::disassemble;
use btcscript_rs::hex::to_hex;
use btcscript_rs::assemble;

use btcscript_disasm::OffsetReport;

#[derive(Parser, Debug)]
#[command(author, version, about = "Bitcoin script assembler")]
struct Opts {
    /// Input assembly file (whitespace-separated tokens)
    #[arg(short, long)]
    input: PathBuf,
    /// Output file (default: hex on stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Write raw bytes instead of hex
    #[arg(long)]
    binary: bool,
    /// Print the canonical ASM of the result instead of hex
    #[arg(long)]
    normalize: bool,
    /// Write the line table and pc map as JSON
    #[arg(long, value_name = "FILE")]
    offsets: Option<PathBuf>,
}

/// Writes `out` to `path`, or unchanged to `sink` when no path is given.
fn emit(path: Option<&Path>, out: &[u8], sink: &mut impl Write) -> Result<()> {
    match path {
        Some(path) => fs::write(path, out)?,
        None => {
            sink.write_all(out)?;
            sink.flush()?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let opts = Opts::parse();
    let text = fs::read_to_string(&opts.input)?;
    let bin = assemble(&text)?;

    if let Some(path) = &opts.offsets {
        let report = OffsetReport::compute(&text)?;
        fs::write(path, serde_json::to_string_pretty(&report)?)?;
    }

    let out: Vec<u8> = if opts.normalize {
        (disassemble(&bin)? + "\n").into_bytes()
    } else if opts.binary {
        bin
    } else {
        (to_hex(&bin) + "\n").into_bytes()
    };
    emit(opts.output.as_deref(), &out, &mut std::io::stdout().lock())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_output_to_stdout_is_byte_exact() {
        let bin = assemble("OP_DUP OP_HASH160 <00112233445566778899aabbccddeeff00112233> OP_EQUALVERIFY OP_CHECKSIG").unwrap();
        let mut sink = Vec::new();
        emit(None, &bin, &mut sink).unwrap();
        assert_eq!(sink, bin);
        assert_eq!(sink[1], 0xa9);
        assert_eq!(sink[sink.len() - 1], 0xac);
    }

    #[test]
    fn binary_flag_parses() {
        let opts = Opts::try_parse_from(["asm", "-i", "p2pkh.asm", "--binary"]).unwrap();
        assert!(opts.binary);
        assert!(opts.output.is_none());
    }
}
