//! Shared test harness modules for the forkcast CLI.
#![expect(
    clippy::panic,
    reason = "Tests assert panic branches to surface unexpected CLI outcomes"
)]

use super::*;

mod build_index_unit;
mod helpers;
mod recommend_steps;
