//! Diagnostics channel for non-fatal pipeline errors.
//!
//! Fatal errors unwind through [`GenError`](crate::error::GenError); everything
//! else lands here with enough context to point at the phase, module and symbol
//! that produced it. The collector is shared across worker threads and stays
//! readable after the run so the driver can decide the process exit code.

use std::fmt;
use std::sync::Mutex;

/// How severe a reported condition is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity
{
    /// Informational, e.g. a skipped symbol.
    Note,
    /// Degraded output, e.g. an unresolved template argument.
    Warning,
    /// The run produced wrong or missing output.
    Error,
}

impl fmt::Display for Severity
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let label = match self {
            Severity::Note => "note",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{label}")
    }
}

/// Pipeline phase a diagnostic originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase
{
    Load,
    Enumerate,
    Deduplicate,
    Collect,
    Link,
    PostProcess,
    Emit,
    Compile,
}

impl fmt::Display for Phase
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let label = match self {
            Phase::Load => "load",
            Phase::Enumerate => "enumerate",
            Phase::Deduplicate => "deduplicate",
            Phase::Collect => "collect",
            Phase::Link => "link",
            Phase::PostProcess => "post-process",
            Phase::Emit => "emit",
            Phase::Compile => "compile",
        };
        write!(f, "{label}")
    }
}

/// One reported condition with structured context.
#[derive(Debug, Clone)]
pub struct Diagnostic
{
    pub severity: Severity,
    pub phase: Phase,
    /// Module name, when the condition is tied to one.
    pub module: Option<String>,
    /// Symbol name, when the condition is tied to one.
    pub symbol: Option<String>,
    pub message: String,
}

impl fmt::Display for Diagnostic
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}: [{}]", self.severity, self.phase)?;
        if let Some(module) = &self.module {
            write!(f, " module {module}")?;
        }
        if let Some(symbol) = &self.symbol {
            write!(f, " symbol {symbol}")?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Append-only diagnostic collector shared across pipeline workers.
///
/// Every push is mirrored to `tracing` so the conditions show up in logs as
/// they happen, not only in the end-of-run summary.
#[derive(Debug, Default)]
pub struct Diagnostics
{
    entries: Mutex<Vec<Diagnostic>>,
}

impl Diagnostics
{
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    pub fn push(&self, diagnostic: Diagnostic)
    {
        match diagnostic.severity {
            Severity::Error => tracing::error!(
                phase = %diagnostic.phase,
                module = diagnostic.module.as_deref(),
                symbol = diagnostic.symbol.as_deref(),
                "{}",
                diagnostic.message
            ),
            Severity::Warning => tracing::warn!(
                phase = %diagnostic.phase,
                module = diagnostic.module.as_deref(),
                symbol = diagnostic.symbol.as_deref(),
                "{}",
                diagnostic.message
            ),
            Severity::Note => tracing::debug!(
                phase = %diagnostic.phase,
                module = diagnostic.module.as_deref(),
                symbol = diagnostic.symbol.as_deref(),
                "{}",
                diagnostic.message
            ),
        }
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).push(diagnostic);
    }

    /// Shorthand for a warning tied to a phase only.
    pub fn warn(&self, phase: Phase, message: impl Into<String>)
    {
        self.push(Diagnostic {
            severity: Severity::Warning,
            phase,
            module: None,
            symbol: None,
            message: message.into(),
        });
    }

    /// Snapshot of everything reported so far.
    pub fn entries(&self) -> Vec<Diagnostic>
    {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }

    /// True when at least one entry has severity `Error`.
    pub fn has_errors(&self) -> bool
    {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .any(|entry| entry.severity == Severity::Error)
    }

    pub fn len(&self) -> usize
    {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.len() == 0
    }
}
