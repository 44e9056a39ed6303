use anyhow::{Context, Result};
use clap::ValueEnum;
use std::io::Read;
use std::path::Path;

use btcscript_rs::hex::{clean_hex, parse_hex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    /// Hex text; whitespace and a leading 0x are ignored
    Hex,
    /// Raw bytes
    Bin,
}

#[derive(Debug, Clone)]
pub struct Program {
    pub bytes: Vec<u8>,
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf)?;
        return Ok(buf);
    }
    std::fs::read(path).with_context(|| format!("reading {}", path.display()))
}

/// Loads a compiled script. `skip`/`len` apply to the decoded bytes.
pub fn load_program(path: &Path, format: InputFormat, skip: usize, len: Option<usize>) -> Result<Program> {
    let file = read_input(path)?;
    let bytes = match format {
        InputFormat::Bin => file,
        InputFormat::Hex => {
            let text = String::from_utf8(file).context("hex input is not UTF-8")?;
            parse_hex(&clean_hex(&text)).context("invalid hex input")?
        }
    };
    anyhow::ensure!(skip <= bytes.len(), "--skip exceeds program size");
    let mut payload = &bytes[skip..];
    if let Some(lim) = len {
        anyhow::ensure!(lim <= payload.len(), "--len exceeds remaining program size after skip");
        payload = &payload[..lim];
    }
    Ok(Program { bytes: payload.to_vec() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loader_maps_skip_and_len() {
        let cwd = std::env::current_dir().unwrap();
        let path = cwd.join("_test_script.hex");
        std::fs::write(&path, "0x76 a9 14\n00 11 ").unwrap();
        let prog = load_program(&path, InputFormat::Hex, 1, Some(3)).unwrap();
        assert_eq!(prog.bytes, vec![0xa9, 0x14, 0x00]);
        assert!(load_program(&path, InputFormat::Hex, 6, None).is_err());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn loader_rejects_odd_hex() {
        let cwd = std::env::current_dir().unwrap();
        let path = cwd.join("_test_odd.hex");
        std::fs::write(&path, "76a").unwrap();
        assert!(load_program(&path, InputFormat::Hex, 0, None).is_err());
        let _ = std::fs::remove_file(&path);
    }
}
