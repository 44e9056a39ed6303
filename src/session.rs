use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::{RunResponse, RunStatus, TraceStep};
use crate::offsets::{translate_program_counter, OffsetMaps};

/// Where to land after a trace is loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Navigation {
    #[default]
    Start,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Idle,
    Active,
    Terminal(RunStatus),
}

/// Stepping state over one engine trace.
///
/// `step` counts viewed steps: 0 is "not started", `1..=len` shows
/// `trace[step - 1]`, and `step == len` is terminal.
#[derive(Debug, Clone, Default)]
pub struct Session {
    trace: Option<Vec<TraceStep>>,
    status: Option<RunStatus>,
    error: String,
    step: usize,
    tokens: Vec<String>,
}

/// What a front-end needs to render the current step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct View {
    pub highlight_token: Option<usize>,
    pub highlight_line: Option<usize>,
    pub stack: String,
    pub alt_stack: String,
    pub error: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        match (&self.trace, self.status) {
            (Some(trace), Some(status)) if self.step >= trace.len() => Phase::Terminal(status),
            (Some(_), _) => Phase::Active,
            _ => Phase::Idle,
        }
    }

    pub fn step_index(&self) -> usize {
        self.step
    }

    pub fn trace_len(&self) -> usize {
        self.trace.as_ref().map_or(0, Vec::len)
    }

    pub fn error_detail(&self) -> &str {
        &self.error
    }

    /// Replaces any previous trace wholesale. Returns the terminal status if
    /// the load lands directly on the end of the trace.
    pub fn load(&mut self, resp: RunResponse, tokens: Vec<String>, nav: Navigation) -> Option<RunStatus> {
        let len = resp.trace.len();
        self.step = match nav {
            Navigation::Start => len.min(1),
            Navigation::End => len,
        };
        self.status = Some(resp.status);
        self.error = resp.error.unwrap_or_default();
        self.trace = Some(resp.trace);
        self.tokens = tokens;
        debug!(steps = len, step = self.step, ?nav, "trace loaded");
        match self.phase() {
            Phase::Terminal(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the terminal status on the step that reaches the end, and only then.
    pub fn step_forward(&mut self) -> Option<RunStatus> {
        let len = self.trace.as_ref()?.len();
        if self.step >= len {
            return None;
        }
        self.step += 1;
        debug!(step = self.step, len, "step forward");
        match self.phase() {
            Phase::Terminal(s) => Some(s),
            _ => None,
        }
    }

    pub fn step_backward(&mut self) {
        let Some(trace) = &self.trace else { return };
        if trace.is_empty() {
            return;
        }
        self.step = self.step.saturating_sub(1).max(1);
        debug!(step = self.step, "step backward");
    }

    /// Drops the trace if `tokens` differs from the stream it was loaded for.
    /// Returns true when a reset happened.
    pub fn source_changed(&mut self, tokens: &[String]) -> bool {
        if self.trace.is_none() || self.tokens.as_slice() == tokens {
            return false;
        }
        debug!("token stream changed, session reset");
        self.reset();
        true
    }

    pub fn reset(&mut self) {
        *self = Session::default();
    }

    pub fn current_step(&self) -> Option<&TraceStep> {
        let trace = self.trace.as_ref()?;
        self.step.checked_sub(1).and_then(|i| trace.get(i))
    }

    pub fn view(&self, maps: &OffsetMaps) -> View {
        let phase = self.phase();
        let Some(step) = self.current_step() else {
            return View {
                error: self.terminal_error(phase),
                ..Default::default()
            };
        };
        let last = maps.token_count.checked_sub(1);
        let highlight_token = match phase {
            Phase::Terminal(RunStatus::Success) => translate_program_counter(maps.total_len, &maps.pc_map),
            _ => translate_program_counter(step.pc, &maps.pc_map)
                .map(|i| i + 1)
                .zip(last)
                .map(|(i, last)| i.min(last)),
        };
        View {
            highlight_token,
            highlight_line: highlight_token.and_then(|i| maps.line_of_token(i)),
            stack: step.stack.join("\n"),
            alt_stack: step.alt_stack.join("\n"),
            error: self.terminal_error(phase),
        }
    }

    fn terminal_error(&self, phase: Phase) -> Option<String> {
        matches!(phase, Phase::Terminal(RunStatus::Error)).then(|| self.error.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace(n: usize) -> RunResponse {
        RunResponse {
            status: RunStatus::Success,
            error: None,
            trace: (0..n)
                .map(|i| TraceStep { pc: i, stack: vec![format!("{i:02x}")], alt_stack: vec![] })
                .collect(),
        }
    }

    #[test]
    fn empty_trace_is_terminal_at_once() {
        let mut s = Session::new();
        assert_eq!(s.load(trace(0), vec![], Navigation::Start), Some(RunStatus::Success));
        assert_eq!(s.step_index(), 0);
        assert_eq!(s.step_forward(), None);
        s.step_backward();
        assert_eq!(s.step_index(), 0);
    }

    #[test]
    fn backward_floors_at_one() {
        let mut s = Session::new();
        s.load(trace(3), vec![], Navigation::End);
        assert_eq!(s.phase(), Phase::Terminal(RunStatus::Success));
        s.step_backward();
        assert_eq!(s.phase(), Phase::Active);
        for _ in 0..5 {
            s.step_backward();
        }
        assert_eq!(s.step_index(), 1);
        assert_eq!(s.current_step().map(|t| t.pc), Some(0));
    }
}
