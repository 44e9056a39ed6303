use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::session::Navigation;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebuggerConfig {
    /// Engine command line; empty means no engine is configured.
    pub engine: Vec<String>,
    pub send_breakpoints: bool,
    pub start_at: Navigation,
}

impl Default for DebuggerConfig {
    fn default() -> Self {
        Self {
            engine: Vec::new(),
            send_breakpoints: true,
            start_at: Navigation::Start,
        }
    }
}

impl DebuggerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: DebuggerConfig = serde_json::from_str(r#"{"start_at":"end"}"#).unwrap();
        assert_eq!(cfg.start_at, Navigation::End);
        assert!(cfg.send_breakpoints);
        assert!(cfg.engine.is_empty());
    }
}
