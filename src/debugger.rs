//! Owns everything a debugging front-end edits or steps through: source text,
//! breakpoints, the last-good offset maps and the session.
//!
//! The front-end calls [`Debugger::update_source`] once per confirmed edit and
//! renders [`Debugger::view`]; it never holds state of its own.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::asm::{assemble, token_texts};
use crate::config::DebuggerConfig;
use crate::engine::{Engine, RunRequest, RunResponse, RunStatus};
use crate::error::{ScriptError, TransportError};
use crate::export::Exports;
use crate::hex::to_hex;
use crate::offsets::{translate_breakpoints, OffsetMaps};
use crate::session::{Navigation, Session, View};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunTicket(u64);

#[derive(Debug)]
struct PendingRun {
    ticket: RunTicket,
    nav: Navigation,
    tokens: Vec<String>,
}

/// Result of handing an engine reply to the debugger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Trace applied; carries the terminal status if it landed on the end.
    Loaded(Option<RunStatus>),
    /// A newer request superseded this one.
    Superseded,
    /// The source changed while the request was in flight.
    SourceChanged,
    /// Connectivity problem; nothing changed.
    Transport(String),
}

#[derive(Debug)]
pub struct Debugger {
    source: String,
    tokens: Vec<String>,
    bytecode: Option<Vec<u8>>,
    maps: OffsetMaps,
    exports: Option<Exports>,
    error: Option<ScriptError>,
    breakpoints: BTreeSet<usize>,
    session: Session,
    next_ticket: u64,
    pending: Option<PendingRun>,
    cfg: DebuggerConfig,
}

impl Debugger {
    pub fn new(cfg: DebuggerConfig) -> Self {
        Self {
            source: String::new(),
            tokens: Vec::new(),
            bytecode: Some(Vec::new()),
            maps: OffsetMaps::default(),
            exports: Exports::from_bytes(&[]).ok(),
            error: None,
            breakpoints: BTreeSet::new(),
            session: Session::new(),
            next_ticket: 0,
            pending: None,
            cfg,
        }
    }

    /// Recomputes bytecode, maps and exports for `text`. On a codec error the
    /// previous maps stay in place and the error is returned for display.
    pub fn update_source(&mut self, text: &str) -> Result<(), ScriptError> {
        self.source = text.to_string();
        let tokens = token_texts(text);
        if tokens != self.tokens {
            self.session.source_changed(&tokens);
            self.tokens = tokens;
        }

        let compiled = assemble(text).and_then(|bytes| Ok((OffsetMaps::compute(text)?, bytes)));
        match compiled {
            Ok((maps, bytes)) => {
                self.exports = match Exports::from_bytes(&bytes) {
                    Ok(x) => Some(x),
                    Err(e) => {
                        warn!(error = %e, "assembled program does not disassemble");
                        None
                    }
                };
                self.maps = maps;
                self.bytecode = Some(bytes);
                self.error = None;
                Ok(())
            }
            Err(e) => {
                debug!(error = %e, "source does not assemble, keeping previous maps");
                self.bytecode = None;
                self.exports = None;
                self.error = Some(e.clone());
                Err(e)
            }
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn bytecode(&self) -> Option<&[u8]> {
        self.bytecode.as_deref()
    }

    pub fn hex(&self) -> Option<String> {
        self.bytecode.as_deref().map(to_hex)
    }

    pub fn maps(&self) -> &OffsetMaps {
        &self.maps
    }

    pub fn exports(&self) -> Option<&Exports> {
        self.exports.as_ref()
    }

    pub fn error(&self) -> Option<&ScriptError> {
        self.error.as_ref()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn breakpoints(&self) -> &BTreeSet<usize> {
        &self.breakpoints
    }

    /// Returns whether `line` is now a breakpoint.
    pub fn toggle_breakpoint(&mut self, line: usize) -> bool {
        if self.breakpoints.remove(&line) {
            false
        } else {
            self.breakpoints.insert(line);
            true
        }
    }

    pub fn clear_breakpoints(&mut self) {
        self.breakpoints.clear();
    }

    pub fn breakpoint_offsets(&self) -> Vec<usize> {
        translate_breakpoints(&self.breakpoints, &self.maps.line_offsets)
    }

    /// Builds a request for the current program and makes it the only one
    /// whose reply will be accepted. `None` while the source fails to assemble.
    pub fn prepare_run(&mut self, nav: Navigation) -> Option<(RunTicket, RunRequest)> {
        let bytes = self.bytecode.as_deref()?;
        let breakpoints = if self.cfg.send_breakpoints {
            self.breakpoint_offsets()
        } else {
            Vec::new()
        };
        let req = RunRequest {
            input: to_hex(bytes),
            breakpoints,
        };
        self.next_ticket += 1;
        let ticket = RunTicket(self.next_ticket);
        if self.pending.is_some() {
            debug!(?ticket, "superseding in-flight run");
        }
        self.pending = Some(PendingRun {
            ticket,
            nav,
            tokens: self.tokens.clone(),
        });
        Some((ticket, req))
    }

    pub fn apply_response(
        &mut self,
        ticket: RunTicket,
        result: Result<RunResponse, TransportError>,
    ) -> RunOutcome {
        match &self.pending {
            Some(p) if p.ticket == ticket => {}
            _ => {
                debug!(?ticket, "dropping stale run response");
                return RunOutcome::Superseded;
            }
        }
        let Some(pending) = self.pending.take() else {
            return RunOutcome::Superseded;
        };
        let resp = match result {
            Ok(resp) => resp,
            Err(e) => {
                warn!(error = %e, "engine request failed");
                return RunOutcome::Transport(e.to_string());
            }
        };
        if pending.tokens != self.tokens {
            debug!("source edited while run was in flight, discarding trace");
            return RunOutcome::SourceChanged;
        }
        RunOutcome::Loaded(self.session.load(resp, pending.tokens, pending.nav))
    }

    /// Synchronous prepare + run + apply.
    pub fn run<E: Engine>(&mut self, engine: &E, nav: Navigation) -> Option<RunOutcome> {
        let (ticket, req) = self.prepare_run(nav)?;
        let result = engine.run(&req);
        Some(self.apply_response(ticket, result))
    }

    pub fn step_forward(&mut self) -> Option<RunStatus> {
        self.session.step_forward()
    }

    pub fn step_backward(&mut self) {
        self.session.step_backward()
    }

    pub fn view(&self) -> View {
        self.session.view(&self.maps)
    }
}

impl Default for Debugger {
    fn default() -> Self {
        Self::new(DebuggerConfig::default())
    }
}
