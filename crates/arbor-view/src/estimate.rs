//! Coarse per-message extent estimation.

use arbor_core::Message;

/// Extent profile for unmeasured messages.
///
/// Estimates are intentionally coarse: content length is bucketed, not
/// counted per character, so small edits rarely move an estimate. The
/// function is pure and deterministic, which keeps the cumulative offset
/// table stable between renders; realized sizes reported back through
/// item handles supersede it.
///
/// Units are abstract extent rows. The default profile reads as
/// terminal rows, but nothing downstream assumes a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeEstimator {
    /// Extent every message occupies regardless of content.
    pub base: usize,
    /// Content characters per bucket.
    pub bucket_chars: usize,
    /// Extent added per full bucket.
    pub extent_per_bucket: usize,
    /// Fixed addend for tool-bearing messages.
    pub tool_extent: usize,
    /// Fixed addend when the message sits in a sibling group of more
    /// than one (space reserved for the branch selector).
    pub branch_selector_extent: usize,
    /// Upper clamp on the final estimate.
    pub max_extent: usize,
}

impl Default for SizeEstimator {
    fn default() -> Self {
        Self {
            base: 2,
            bucket_chars: 160,
            extent_per_bucket: 2,
            tool_extent: 4,
            branch_selector_extent: 1,
            max_extent: 120,
        }
    }
}

impl SizeEstimator {
    /// Estimate the on-screen extent of one message given the size of
    /// its sibling group (inclusive of itself).
    pub fn estimate(&self, message: &Message, sibling_count: usize) -> usize {
        let buckets = message.content_len() / self.bucket_chars.max(1);
        let mut extent = self.base + buckets * self.extent_per_bucket;
        if message.bears_tool() {
            extent += self.tool_extent;
        }
        if sibling_count > 1 {
            extent += self.branch_selector_extent;
        }
        extent.min(self.max_extent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_core::{MessageData, ToolUse};

    fn message(content: &str, tool_calls: Vec<ToolUse>) -> Message {
        Message {
            id: "m1".to_string(),
            parent_id: None,
            created_at: 1000,
            sidechain: false,
            usage: None,
            data: MessageData::Assistant {
                content: content.to_string(),
                tool_calls,
            },
        }
    }

    fn tool_use() -> ToolUse {
        ToolUse {
            id: "call_1".to_string(),
            name: "bash".to_string(),
            input: serde_json::json!({"command": "ls"}),
        }
    }

    #[test]
    fn short_message_is_baseline() {
        let estimator = SizeEstimator::default();
        let msg = message("hi", vec![]);
        assert_eq!(estimator.estimate(&msg, 1), estimator.base);
    }

    #[test]
    fn content_grows_in_buckets_not_per_char() {
        let estimator = SizeEstimator::default();
        let just_short = message(&"x".repeat(estimator.bucket_chars - 1), vec![]);
        let one_bucket = message(&"x".repeat(estimator.bucket_chars), vec![]);
        assert_eq!(estimator.estimate(&just_short, 1), estimator.base);
        assert_eq!(
            estimator.estimate(&one_bucket, 1),
            estimator.base + estimator.extent_per_bucket
        );
    }

    #[test]
    fn tool_and_branch_addends_stack() {
        let estimator = SizeEstimator::default();
        let msg = message("run it", vec![tool_use()]);
        assert_eq!(
            estimator.estimate(&msg, 3),
            estimator.base + estimator.tool_extent + estimator.branch_selector_extent
        );
    }

    #[test]
    fn estimate_is_clamped() {
        let estimator = SizeEstimator::default();
        let huge = message(&"x".repeat(1_000_000), vec![]);
        assert_eq!(estimator.estimate(&huge, 1), estimator.max_extent);
    }

    #[test]
    fn estimate_is_stable() {
        let estimator = SizeEstimator::default();
        let msg = message("the same message", vec![tool_use()]);
        assert_eq!(estimator.estimate(&msg, 2), estimator.estimate(&msg, 2));
    }
}
