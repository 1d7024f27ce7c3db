// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for configuration loading and validation events.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A non-fatal validation issue was found while loading a config.
///
/// # Log Level
/// `warn!` - recoverable, the sequencer falls back to declaration order
pub struct ConfigValidationIssue<'a> {
    pub path: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ConfigValidationIssue<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "configuration '{}' has a validation issue: {}", self.path, self.error)
    }
}

impl StructuredLog for ConfigValidationIssue<'_> {
    fn log(&self) {
        tracing::warn!(path = self.path, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("config_validation_issue", span_name = name, path = self.path, error = %self.error)
    }
}

/// Configuration loaded successfully.
///
/// # Log Level
/// `info!` - important operational event
pub struct ConfigLoaded<'a> {
    pub path: &'a str,
    pub table_count: usize,
}

impl Display for ConfigLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "loaded configuration '{}' with {} tables", self.path, self.table_count)
    }
}

impl StructuredLog for ConfigLoaded<'_> {
    fn log(&self) {
        tracing::info!(path = self.path, table_count = self.table_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("config_loaded", span_name = name, path = self.path, table_count = self.table_count)
    }
}
