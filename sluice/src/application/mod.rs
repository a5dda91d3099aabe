// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Application layer: one use case per CLI subcommand, each translating a
//! `sluice_bootstrap::cli::ValidatedCommand` into a concrete pipeline built
//! from the operator algebra and running it to completion.

pub mod use_cases;
