//! Request/response contract with the external script engine.

use std::io::Write as _;
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TransportError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRequest {
    /// Clean lowercase hex of the assembled program.
    pub input: String,
    /// Byte offsets to halt at.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub breakpoints: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceStep {
    pub pc: usize,
    #[serde(default)]
    pub stack: Vec<String>,
    #[serde(default, rename = "altstack")]
    pub alt_stack: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResponse {
    pub status: RunStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub trace: Vec<TraceStep>,
}

impl RunResponse {
    pub fn from_json(body: &str) -> Result<Self, TransportError> {
        Ok(serde_json::from_str(body)?)
    }
}

pub trait Engine {
    fn run(&self, req: &RunRequest) -> Result<RunResponse, TransportError>;
}

/// Spawns `program args..`, writes the request as JSON to stdin and parses
/// the response from stdout. One process per run.
#[derive(Debug, Clone)]
pub struct ProcessEngine {
    pub program: String,
    pub args: Vec<String>,
}

impl ProcessEngine {
    /// `argv[0]` is the program; `None` for an empty command line.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

impl Engine for ProcessEngine {
    fn run(&self, req: &RunRequest) -> Result<RunResponse, TransportError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| TransportError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        let body = serde_json::to_vec(req)?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&body)?;
        }
        let out = child.wait_with_output()?;
        if !out.status.success() {
            return Err(TransportError::Exit {
                status: out.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            });
        }
        let text = String::from_utf8_lossy(&out.stdout);
        debug!(program = %self.program, bytes = text.len(), "engine responded");
        RunResponse::from_json(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_error_response_with_partial_trace() {
        let body = r#"{"status":"error","error":"OP_VERIFY failed","trace":[{"pc":0,"stack":["01"],"altstack":[]}]}"#;
        let resp = RunResponse::from_json(body).unwrap();
        assert_eq!(resp.status, RunStatus::Error);
        assert_eq!(resp.error.as_deref(), Some("OP_VERIFY failed"));
        assert_eq!(resp.trace[0].stack, vec!["01".to_string()]);
    }

    #[test]
    fn request_omits_empty_breakpoints() {
        let req = RunRequest { input: "76".into(), breakpoints: vec![] };
        assert_eq!(serde_json::to_string(&req).unwrap(), r#"{"input":"76"}"#);
    }

    #[test]
    fn malformed_body_is_transport_error() {
        assert!(matches!(
            RunResponse::from_json("not json"),
            Err(TransportError::Malformed(_))
        ));
    }
}
