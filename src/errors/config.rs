// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors raised while loading a streaming-config YAML file from disk.
///
/// These are the only errors in the crate that are fatal at process start: a bad
/// config means there is nothing safe to run.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {path}")]
    NotFound { path: String },

    #[error("failed to read configuration file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration as YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("configuration has no tables")]
    NoTables,
}

/// Errors raised while validating a parsed [`crate::config::Config`] for structural
/// integrity before startup.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// The FK / copy-from-FK graph over table names contains a cycle.
    #[error("cyclic dependency detected among tables: {}", .cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },

    /// A column references a parent table that is not defined anywhere in the config.
    #[error("table '{table}' references parent '{parent}' which does not exist")]
    UnresolvedParent { table: String, parent: String },

    /// Two tables were declared with the same name.
    #[error("duplicate table name: '{0}'")]
    DuplicateTableName(String),
}
