// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The hash-join output record (spec.md section 3: "Join record").

/// A triple `(key, left_values, right_values_per_pipe[])` produced by the
/// hash-join operator.
///
/// `right_values[i]` is the ordered sequence of matches found in right
/// input `i`; its length is `0` when that pipe contributed no match for
/// `key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRecord<K, L, R> {
    pub key: K,
    pub left_values: Vec<L>,
    pub right_values: Vec<Vec<R>>,
}

impl<K, L, R> JoinRecord<K, L, R> {
    pub fn new(key: K, right_pipe_count: usize) -> Self {
        Self {
            key,
            left_values: Vec::new(),
            right_values: vec![Vec::new(); right_pipe_count],
        }
    }

    /// How many of the right pipes contributed at least one value.
    pub fn right_pipes_contributed(&self) -> usize {
        self.right_values.iter().filter(|v| !v.is_empty()).count()
    }

    pub fn has_left(&self) -> bool {
        !self.left_values.is_empty()
    }
}
