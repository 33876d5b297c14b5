//! **tenant-scope** - One-shot migration threading `tenantId` through storage calls
//!
//! Scans `server/routes.ts` line by line, injects a tenant declaration into
//! route handlers that await the storage layer, and splices the tenant
//! argument into each storage call according to a tiered rule table.

/// Core rewrite pipeline
pub mod core {
    /// Storage-call locator and argument splitter
    pub mod call;

    /// Typed rewrite failures
    pub mod error;
    pub use error::RewriteError;

    /// Whole-file read, rewrite and write-back
    pub mod migrate;
    pub use migrate::run;

    /// Compiled line classifiers for handler detection
    pub mod patterns;

    /// Tiered method rules and the single-line rewriter
    pub mod rules;
    pub use rules::{Tier, rewrite_line};

    /// Handler-boundary state machine with lookahead and injection
    pub mod scanner;
    pub use scanner::{Rewrite, RewriteReport, Scanner, rewrite_lines, rewrite_source};
}

/// Infrastructure - configuration, I/O, and logging
pub mod infra {
    /// Compiled-in literals for the migration
    pub mod config;
    pub use config::RewriteConfig;

    /// Whole-file line I/O
    pub mod io;

    /// Tracing subscriber for the binary
    pub mod logging;
}

pub use crate::core::{RewriteError, RewriteReport, rewrite_lines, rewrite_source, run};
pub use infra::RewriteConfig;
