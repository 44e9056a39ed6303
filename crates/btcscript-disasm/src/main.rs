use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use std::path::Path;

use btcscript_rs::disasm::{decode_instructions, render_listing, ListingOptions};
use btcscript_rs::export::{render_brace_initializer, render_data_literal};

use btcscript_disasm::{load_program, DisasmReport, InputFormat};

#[derive(Parser, Debug)]
#[command(author, version, about = "Bitcoin script disassembler CLI", long_about=None)]
struct Cli {
    /// How the input is encoded
    #[arg(long, value_enum, default_value_t = InputFormat::Hex)]
    input_format: InputFormat,
    /// Skip N bytes of the decoded program
    #[arg(long, default_value_t = 0usize)]
    skip: usize,
    /// Limit bytes decoded (default: to end after --skip)
    #[arg(long)]
    len: Option<usize>,
    /// Input path, `-` for stdin
    #[arg(value_name = "INPUT")]
    input: String,
    /// Subcommand
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Canonical ASM, one token per line
    Asm {
        /// Write output to file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<String>,
    },
    /// Offset-annotated listing
    Listing {
        /// Show instruction bytes
        #[arg(long)]
        show_bytes: bool,
        /// Omit the offset column
        #[arg(long)]
        no_offsets: bool,
        /// Output format: text or json
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Write output to file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<String>,
    },
    /// Alternate notations of the same program
    Export {
        #[arg(value_enum, default_value_t = ExportStyle::All)]
        style: ExportStyle,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat { Text, Json }

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ExportStyle { Data, Braces, All }

fn emit(out: Option<String>, text: &str) -> Result<()> {
    if let Some(path) = out { std::fs::write(path, text)?; } else { print!("{}", text); }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let prog = load_program(Path::new(&cli.input), cli.input_format, cli.skip, cli.len)?;
    let instrs = decode_instructions(&prog.bytes)?;

    match cli.cmd {
        Command::Asm { out } => {
            let mut text = instrs.iter().map(|i| i.chunk.to_string()).collect::<Vec<_>>().join("\n");
            text.push('\n');
            emit(out, &text)?;
        }
        Command::Listing { show_bytes, no_offsets, format, out } => {
            let text = match format {
                OutputFormat::Json => {
                    let report = DisasmReport::from_instructions(&prog.bytes, &instrs);
                    serde_json::to_string_pretty(&report)? + "\n"
                }
                OutputFormat::Text => {
                    let mut opts = ListingOptions::empty();
                    opts.set(ListingOptions::OFFSETS, !no_offsets);
                    opts.set(ListingOptions::BYTES, show_bytes);
                    render_listing(&instrs, &prog.bytes, opts)
                }
            };
            emit(out, &text)?;
        }
        Command::Export { style } => {
            if matches!(style, ExportStyle::Data | ExportStyle::All) {
                println!("{}", render_data_literal(&instrs));
            }
            if matches!(style, ExportStyle::Braces | ExportStyle::All) {
                println!("{}", render_brace_initializer(&prog.bytes));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_listing_flags() {
        let cli = Cli::try_parse_from(["btcscript-disasm", "--skip", "2", "in.hex", "listing", "--show-bytes"]).unwrap();
        assert_eq!(cli.skip, 2);
        assert!(matches!(cli.cmd, Command::Listing { show_bytes: true, no_offsets: false, .. }));
    }

    #[test]
    fn export_style_defaults_to_all() {
        let cli = Cli::try_parse_from(["btcscript-disasm", "-", "export"]).unwrap();
        assert!(matches!(cli.cmd, Command::Export { style: ExportStyle::All }));
    }
}
