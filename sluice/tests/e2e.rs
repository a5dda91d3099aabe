// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! End-to-End Tests
//!
//! This module aggregates all E2E tests for the sluice application. Each
//! test drives the full stack through [`sluice::presentation::dispatch`]
//! with a [`sluice_bootstrap::cli::ValidatedCommand`] built directly, the
//! same value `sluice_bootstrap::parse_and_validate` would hand the binary
//! after parsing and validating real command-line arguments.

#[path = "e2e/e2e_sort_cli_test.rs"]
mod e2e_sort_cli_test;

#[path = "e2e/e2e_bucket_cli_test.rs"]
mod e2e_bucket_cli_test;
