//! Shared test utilities for integration tests
//!
//! Builds a temporary project holding `server/routes.ts`, the path the
//! binary rewrites relative to its working directory.

#![allow(dead_code)]

use assert_fs::prelude::*;

/// Sample routes file with login, injected, pre-declared and nested handlers
pub const ROUTES_FIXTURE: &str = include_str!("fixtures/routes.ts");

/// Create a temp project whose `server/routes.ts` holds `content`.
pub fn make_project(content: &str) -> assert_fs::TempDir
{
    // Initialize the temporary project root
    let tmp = assert_fs::TempDir::new().expect("tempdir");

    tmp.child("server/routes.ts")
        .write_str(content)
        .expect("write routes");

    // Return the prepared directory to the caller
    tmp
}

/// Read the rewritten routes file back.
pub fn read_routes(tmp: &assert_fs::TempDir) -> String
{
    std::fs::read_to_string(
        tmp.child("server/routes.ts")
            .path(),
    )
    .expect("read routes")
}
