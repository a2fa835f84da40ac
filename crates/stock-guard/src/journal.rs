//! Prefixed writer over the host [`LogSink`].

use shop_host::{LogEntry, LogSink, ProductId, Severity};
use std::sync::Arc;

/// Writes host log records prefixed with `[module_name]`.
#[derive(Clone)]
pub struct Journal {
    sink: Arc<dyn LogSink>,
    module_name: Arc<str>,
}

impl Journal {
    pub fn new(sink: Arc<dyn LogSink>, module_name: impl Into<Arc<str>>) -> Self {
        Self {
            sink,
            module_name: module_name.into(),
        }
    }

    fn prefixed(&self, message: impl std::fmt::Display) -> String {
        format!("[{}] {}", self.module_name, message)
    }

    /// Record about the module itself.
    pub fn module(&self, severity: Severity, message: impl std::fmt::Display) {
        self.sink.log(LogEntry::module(severity, self.prefixed(message)));
    }

    /// Record about the module that still names the product being handled.
    pub fn module_about(
        &self,
        severity: Severity,
        product_id: ProductId,
        message: impl std::fmt::Display,
    ) {
        self.sink
            .log(LogEntry::module_about(severity, product_id, self.prefixed(message)));
    }

    /// Record about one product.
    pub fn product(&self, severity: Severity, product_id: ProductId, message: impl std::fmt::Display) {
        self.sink
            .log(LogEntry::product(severity, product_id, self.prefixed(message)));
    }
}
