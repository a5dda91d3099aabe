// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Shared test helpers for integration and end-to-end tests.

use std::path::Path;

pub fn write_lines(path: &Path, lines: &[&str]) {
    let contents = lines.iter().map(|l| format!("{l}\n")).collect::<String>();
    std::fs::write(path, contents).expect("write fixture file");
}

pub fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path).expect("read output file").lines().map(str::to_string).collect()
}
