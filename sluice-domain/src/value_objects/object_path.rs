// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Object storage URL scheme (spec.md section 6: "Object storage URL
//! scheme").
//!
//! Fully qualified paths use `<protocol>://<bucket>/<key>`.

use crate::error::PipeError;

/// A parsed `<protocol>://<bucket>/<key>` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectUrl {
    pub protocol: String,
    pub bucket: String,
    pub key: String,
}

impl ObjectUrl {
    /// Parses `protocol://bucket/key`. Fails if the `://` separator is
    /// missing.
    pub fn parse(s: &str) -> Result<Self, PipeError> {
        let (protocol, rest) = s
            .split_once("://")
            .ok_or_else(|| PipeError::validation(format!("not a fully qualified object url: {s}")))?;
        let (bucket, key) = match rest.split_once('/') {
            Some((b, k)) => (b, k),
            None => (rest, ""),
        };
        Ok(Self {
            protocol: protocol.to_string(),
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
    }
}

/// Joins path parts with `/`, eliding empty parts, collapsing repeated
/// separators, and removing any leading separator (spec.md section 6: "Path
/// joining rules").
pub fn join_path(parts: &[&str]) -> String {
    let mut joined = parts
        .iter()
        .flat_map(|p| p.split('/'))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    while joined.starts_with('/') {
        joined.remove(0);
    }
    joined
}

/// Appends a trailing `/` if not already present, marking a key as a
/// virtual folder.
pub fn as_folder(path: &str) -> String {
    if path.is_empty() || path.ends_with('/') {
        path.to_string()
    } else {
        format!("{path}/")
    }
}

/// Whether `path` denotes a virtual folder (spec.md section 3: a path
/// ending with `/` denotes a folder; any other path denotes a file).
pub fn is_folder(path: &str) -> bool {
    path.ends_with('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fully_qualified_url() {
        let u = ObjectUrl::parse("gs://my-bucket/a/b.csv").unwrap();
        assert_eq!(u.protocol, "gs");
        assert_eq!(u.bucket, "my-bucket");
        assert_eq!(u.key, "a/b.csv");
    }

    #[test]
    fn parse_rejects_missing_separator() {
        assert!(ObjectUrl::parse("not-a-url").is_err());
    }

    #[test]
    fn join_path_collapses_and_elides() {
        assert_eq!(join_path(&["/a/", "", "b//c", "/d"]), "a/b/c/d");
    }

    #[test]
    fn as_folder_appends_trailing_slash_once() {
        assert_eq!(as_folder("a/b"), "a/b/");
        assert_eq!(as_folder("a/b/"), "a/b/");
    }

    #[test]
    fn is_folder_checks_trailing_slash() {
        assert!(is_folder("a/b/"));
        assert!(!is_folder("a/b"));
    }
}
