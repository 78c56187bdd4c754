//! Per-call execution context.

/// Execution context threaded through backend operations and hooks.
///
/// An `Env` identifies the logical operation a transaction is performing.
/// It is cheap to construct and is typically created once per call site.
/// Backends and hooks receive it by reference and must not retain it.
#[derive(Debug, Clone, Default)]
pub struct Env {
    /// Label of the logical operation (e.g. "mkdir", "rename").
    op: Option<String>,
}

impl Env {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self { op: None }
    }

    /// Set the operation label.
    #[must_use]
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Get the operation label, if one was set.
    #[must_use]
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }
}
