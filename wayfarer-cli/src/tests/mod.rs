//! Shared test harness modules for the Wayfarer CLI.
#![expect(
    clippy::panic,
    reason = "Tests assert panic branches to surface unexpected CLI outcomes"
)]

use super::*;
use crate::plan::*;

mod helpers;
