// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Bucket object metadata (spec.md section 3: "Bucket object metadata (M)").

use chrono::{DateTime, Utc};

/// Per-implementation metadata for an object addressed within a
/// [`crate::repositories::Bucket`].
///
/// Carries at minimum a bucket-relative path, byte length, last-modified
/// timestamp, and enough information (the path) to re-address the object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMetadata {
    path: String,
    length: u64,
    last_updated: DateTime<Utc>,
}

impl ObjectMetadata {
    pub fn new(path: impl Into<String>, length: u64, last_updated: DateTime<Utc>) -> Self {
        Self {
            path: path.into(),
            length,
            last_updated,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    /// A path ending with `/` denotes a folder (spec.md section 3).
    pub fn is_folder(&self) -> bool {
        crate::value_objects::object_path::is_folder(&self.path)
    }
}
