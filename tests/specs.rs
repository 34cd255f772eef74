//! End-to-end specs for the `campers` CLI binary (§6, §8 scenarios).
//!
//! Scoped to what can run without live cloud credentials: argument
//! parsing, config resolution/validation, and `init`. Commands that
//! reach the Compute Adapter (`run` past RESOLVE, `list`, `stop`, …)
//! need a real provider account and are exercised only in the unit
//! tests of `campers-orchestrator` against `FakeComputeAdapter`.

#[path = "prelude.rs"]
mod prelude;

mod cli {
    mod help;
}

mod config {
    mod init;
    mod validation;
}
