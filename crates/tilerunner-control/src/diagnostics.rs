//! Diagnostics sink for the control loops.
//!
//! Loops emit a [`StatusLine`] when they start, on every iteration and when
//! they finish.  The sink is handed to the robot explicitly, so a test can
//! record every line while the CLI forwards them to `tracing`.  Nothing in
//! the control logic depends on what the sink does with them.

use std::fmt;

use tilerunner_types::RunMode;
use tracing::{debug, trace};

/// Where in a loop's life a line was emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Enter,
    Step,
    Exit,
}

/// A single key/value datum.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    /// Numeric view of the value, `None` for text.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(v) => Some(*v as f64),
            FieldValue::Float(v) => Some(*v),
            FieldValue::Text(_) => None,
        }
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Int(i64::from(v))
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<RunMode> for FieldValue {
    fn from(v: RunMode) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(v) => write!(f, "{v}"),
            FieldValue::Float(v) => write!(f, "{v:.3}"),
            FieldValue::Text(v) => f.write_str(v),
        }
    }
}

/// One structured status line, e.g. `turn step power=0.400 delta=12.000`.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusLine {
    pub label: &'static str,
    pub phase: Phase,
    pub fields: Vec<(&'static str, FieldValue)>,
}

impl StatusLine {
    pub fn new(label: &'static str, phase: Phase) -> Self {
        Self {
            label,
            phase,
            fields: Vec::new(),
        }
    }

    /// Append a field (builder style).
    pub fn field(mut self, key: &'static str, value: impl Into<FieldValue>) -> Self {
        self.fields.push((key, value.into()));
        self
    }

    /// First value recorded under `key`.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase = match self.phase {
            Phase::Enter => "enter",
            Phase::Step => "step",
            Phase::Exit => "exit",
        };
        write!(f, "{} {phase}", self.label)?;
        for (key, value) in &self.fields {
            write!(f, " {key}={value}")?;
        }
        Ok(())
    }
}

/// Receiver of [`StatusLine`]s.
pub trait Diagnostics {
    fn emit(&mut self, line: StatusLine);
}

impl Diagnostics for Box<dyn Diagnostics + Send> {
    fn emit(&mut self, line: StatusLine) {
        self.as_mut().emit(line);
    }
}

/// Forwards lines to `tracing`: entry and exit at `DEBUG`, iterations at
/// `TRACE`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn emit(&mut self, line: StatusLine) {
        match line.phase {
            Phase::Step => trace!(target: "tilerunner::diagnostics", label = line.label, "{line}"),
            Phase::Enter | Phase::Exit => {
                debug!(target: "tilerunner::diagnostics", label = line.label, "{line}")
            }
        }
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDiagnostics;

impl Diagnostics for NoDiagnostics {
    fn emit(&mut self, _line: StatusLine) {}
}

/// Keeps every line in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingDiagnostics {
    lines: Vec<StatusLine>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[StatusLine] {
        &self.lines
    }

    /// Lines emitted by the loop named `label` in the given `phase`.
    pub fn matching(&self, label: &str, phase: Phase) -> impl Iterator<Item = &StatusLine> {
        self.lines
            .iter()
            .filter(move |l| l.label == label && l.phase == phase)
    }

    pub fn last(&self) -> Option<&StatusLine> {
        self.lines.last()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn emit(&mut self, line: StatusLine) {
        self.lines.push(line);
    }
}
