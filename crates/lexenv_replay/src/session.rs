//! Replays traces against one long-lived scope stack.

use crate::trace::{parse_line, TraceCommand, TraceError};
use lexenv_core::{BuiltinTypeMapper, Interner};
use lexenv_diagnostics::{messages, DiagnosticCollection, DiagnosticMessage};
use lexenv_options::EnvOptions;
use lexenv_scope::{ScopeArena, ScopeError, ScopeRef, ScopeStack};
use log::{debug, info};
use miette::Diagnostic as MietteDiagnostic;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Failure that stops a session before any trace runs.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum ReplayError {
    #[error("cannot read trace '{path}': {source}")]
    #[diagnostic(code(lexenv_replay::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot install the global scope")]
    #[diagnostic(code(lexenv_replay::global))]
    Global(#[source] ScopeError),
}

/// A line of replay output, tied to the trace line that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub file: String,
    pub line: u32,
    pub text: String,
}

impl fmt::Display for OutputLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.file, self.line, self.text)
    }
}

/// Everything a run produced.
#[derive(Debug, Default)]
pub struct ReplayReport {
    pub outputs: Vec<OutputLine>,
    pub diagnostics: DiagnosticCollection,
    /// Traces stopped early by a hard scope error.
    pub aborted: Vec<String>,
}

impl ReplayReport {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }
}

/// The session represents one process-lifetime environment: a global scope
/// seeded from the options, and the traces replayed on top of it in order.
pub struct Session {
    /// Environment options.
    pub options: EnvOptions,
    /// The root trace files.
    pub root_files: Vec<String>,
    /// Loaded traces as (file name, text).
    sources: Vec<(String, String)>,
    stack: ScopeStack,
}

impl Session {
    /// Create a session, installing the global scope when the options seed
    /// host bindings.
    pub fn new(root_files: Vec<String>, options: EnvOptions) -> Result<Self, ReplayError> {
        let mut arena = ScopeArena::with_slot_limit(options.slot_limit());
        arena.set_reuse(options.reuse_enabled());

        let mut stack = ScopeStack::with_arena(Interner::new(), arena);
        stack.set_strict_redeclaration(options.is_strict());
        stack.set_root_is_boundary(options.root_boundary());
        if options.has_seeds() {
            stack
                .install_global(options.seeds(), &BuiltinTypeMapper)
                .map_err(ReplayError::Global)?;
        }

        Ok(Self {
            options,
            root_files,
            sources: Vec::new(),
            stack,
        })
    }

    /// Add a trace to the session.
    pub fn add_source(&mut self, file_name: impl Into<String>, text: impl Into<String>) {
        self.sources.push((file_name.into(), text.into()));
    }

    /// Load all root files from disk.
    pub fn load_root_files(&mut self) -> Result<(), ReplayError> {
        for file in &self.root_files {
            let text = std::fs::read_to_string(file).map_err(|source| ReplayError::Io {
                path: PathBuf::from(file),
                source,
            })?;
            self.sources.push((file.clone(), text));
        }
        Ok(())
    }

    pub fn stack(&self) -> &ScopeStack {
        &self.stack
    }

    /// Replay every loaded trace in order. Returns all outputs and
    /// diagnostics, both in replay order.
    pub fn run(&mut self) -> ReplayReport {
        let mut report = ReplayReport::default();
        let sources = std::mem::take(&mut self.sources);
        for (file, text) in &sources {
            self.replay(file, text, &mut report);
        }
        self.sources = sources;
        report
    }

    fn replay(&mut self, file: &str, text: &str, report: &mut ReplayReport) {
        info!("replaying {}", file);
        let mut aborted = false;
        let mut last_line = 0;

        for (index, raw) in text.lines().enumerate() {
            let line = index as u32 + 1;
            last_line = line;
            self.stack.set_location(Some(file.to_string()), Some(line));

            let command = match parse_line(raw) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(err) => {
                    self.report_trace_error(&err);
                    continue;
                }
            };

            match self.execute(command) {
                Ok(Some(text)) => report.outputs.push(OutputLine {
                    file: file.to_string(),
                    line,
                    text,
                }),
                Ok(None) => {}
                Err(err) => {
                    // Overflow is already reported by the stack.
                    if !matches!(err, ScopeError::SlotOverflow { .. }) {
                        let reason = err.to_string();
                        self.report(&messages::INTERNAL_SCOPE_ERROR_0, &[&reason]);
                    }
                    debug!("{}:{}: abandoning trace: {}", file, line, err);
                    aborted = true;
                    break;
                }
            }
        }

        self.stack.set_location(Some(file.to_string()), Some(last_line));
        match self.stack.unwind() {
            Ok(closed) if closed > 0 && !aborted => {
                let count = closed.to_string();
                self.report(&messages::SCOPES_LEFT_OPEN_0, &[&count]);
            }
            Ok(_) => {}
            // Reported by the stack.
            Err(ScopeError::SlotOverflow { .. }) => {}
            Err(err) => {
                let reason = err.to_string();
                self.report(&messages::INTERNAL_SCOPE_ERROR_0, &[&reason]);
            }
        }
        if aborted {
            report.aborted.push(file.to_string());
        }
        self.stack.set_location(None, None);
        report.diagnostics.extend(self.stack.take_diagnostics());
    }

    fn execute(&mut self, command: TraceCommand) -> Result<Option<String>, ScopeError> {
        let stack = &mut self.stack;
        let output = match command {
            TraceCommand::Push { kind, boundary } => {
                stack.push_scope(kind, boundary)?;
                None
            }
            TraceCommand::Pop => {
                stack.pop_scope()?;
                None
            }
            TraceCommand::Declare { name, ty, modifiers } => {
                let address = stack.declare(&name, ty, modifiers)?;
                Some(format!("declare {} -> {}", name, address))
            }
            TraceCommand::Lookup { name } => stack
                .lookup_or_report(&name)
                .map(|found| format!("{} -> {}", name, found)),
            TraceCommand::Address { name } => match stack.address_of(&name) {
                Some(address) => Some(format!("address {} -> {}", name, address)),
                None => {
                    stack.lookup_or_report(&name);
                    None
                }
            },
            TraceCommand::Assign { name } => {
                stack.assign(&name);
                None
            }
            TraceCommand::Remove { name } => {
                stack.remove_last(&name)?;
                None
            }
            TraceCommand::Reset => {
                stack.reset_scope()?;
                None
            }
            TraceCommand::Level => Some(format!("level {}", stack.level())),
            TraceCommand::Size => Some(format!("size {}", stack.size())),
            TraceCommand::Ancestor { distance } => {
                let target = match stack.ancestor_at(distance) {
                    Some(ScopeRef::Scope(id)) => id.to_string(),
                    Some(ScopeRef::Terminal) => "terminal".to_string(),
                    None => "none".to_string(),
                };
                Some(format!("ancestor {} -> {}", distance, target))
            }
        };
        Ok(output)
    }

    fn report_trace_error(&mut self, err: &TraceError) {
        match err {
            TraceError::UnknownCommand(word) => {
                self.report(&messages::UNKNOWN_TRACE_COMMAND_0, &[word.as_str()])
            }
            TraceError::UnknownType(word) => self.report(&messages::UNKNOWN_TYPE_0, &[word.as_str()]),
            TraceError::Malformed(reason) => {
                self.report(&messages::MALFORMED_TRACE_LINE_0, &[reason.as_str()])
            }
        }
    }

    fn report(&mut self, message: &DiagnosticMessage, args: &[&str]) {
        self.stack.report(message, args);
    }
}
