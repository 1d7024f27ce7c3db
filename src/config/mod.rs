// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod consts;
pub mod dependency_graph;
pub mod loader;
mod validation;

pub use dependency_graph::DependencyGraph;
pub use loader::{
    load_and_validate_config, load_config, Cadence, ColumnSpec, Config, GlobalOptions,
    PostprocessMode, RowCountSpec, TableSpec, UpdatePolicy,
};
pub use validation::validate_tables;
