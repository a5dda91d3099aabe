// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Join record and join mode value objects (spec.md sections 3, 4.4.14).

mod record;

pub use record::JoinRecord;

/// The four hash-join output modes (spec.md section 4.4.14).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinMode {
    /// Emit every left record, regardless of right matches.
    Left,
    /// Emit only if a left record exists and every right pipe contributed
    /// at least one match.
    Inner,
    /// Emit only if every right pipe contributed at least one match,
    /// regardless of whether a left record exists for that key. Distinct
    /// from `Inner` exactly at keys with no left record: `Inner` drops
    /// them, `FullInner` still emits them as long as every right pipe
    /// matched.
    FullInner,
    /// Emit any record seen anywhere (left or any right pipe).
    Outer,
}

impl JoinMode {
    /// Whether a `JoinRecord` should be emitted, given how many of the
    /// `right_pipe_count` right-hand pipes contributed at least one value,
    /// and whether a left value was present.
    pub fn should_output(self, has_left: bool, right_pipes_contributed: usize, right_pipe_count: usize) -> bool {
        match self {
            JoinMode::Left => has_left,
            JoinMode::Inner => has_left && right_pipe_count > 0 && right_pipes_contributed == right_pipe_count,
            JoinMode::FullInner => right_pipe_count > 0 && right_pipes_contributed == right_pipe_count,
            JoinMode::Outer => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_mode_emits_regardless_of_right_matches() {
        assert!(JoinMode::Left.should_output(true, 0, 2));
        assert!(!JoinMode::Left.should_output(false, 2, 2));
    }

    #[test]
    fn inner_mode_requires_left_and_all_rights() {
        assert!(JoinMode::Inner.should_output(true, 2, 2));
        assert!(!JoinMode::Inner.should_output(true, 1, 2));
        assert!(!JoinMode::Inner.should_output(false, 2, 2));
    }

    #[test]
    fn outer_mode_always_emits() {
        assert!(JoinMode::Outer.should_output(false, 0, 2));
    }

    #[test]
    fn full_inner_mode_does_not_require_a_left_record() {
        // Every right pipe contributed but there is no left record: Inner
        // drops it, FullInner still emits it.
        assert!(JoinMode::FullInner.should_output(false, 2, 2));
        assert!(!JoinMode::Inner.should_output(false, 2, 2));
        // Still requires every right pipe to have contributed.
        assert!(!JoinMode::FullInner.should_output(false, 1, 2));
        assert!(!JoinMode::FullInner.should_output(true, 1, 2));
    }
}
