//! # Block Search Criteria

use crate::domain::block::Block;
use serde::{Deserialize, Serialize};
use shared_types::{Hash, Timestamp};

/// Conjunctive filter over blocks. Unset criteria match everything.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Substring of inline, unencrypted UTF-8 data (case-insensitive).
    pub content: Option<String>,
    /// Exact keyword (case-insensitive).
    pub keyword: Option<String>,
    /// Category (case-insensitive).
    pub category: Option<String>,
    pub hash: Option<Hash>,
    pub block_number: Option<u64>,
    /// Inclusive lower timestamp bound.
    pub from: Option<Timestamp>,
    /// Inclusive upper timestamp bound.
    pub to: Option<Timestamp>,
    /// Maximum number of results.
    pub limit: Option<usize>,
}

impl SearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_hash(mut self, hash: Hash) -> Self {
        self.hash = Some(hash);
        self
    }

    pub fn with_block_number(mut self, block_number: u64) -> Self {
        self.block_number = Some(block_number);
        self
    }

    pub fn between(mut self, from: Timestamp, to: Timestamp) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, block: &Block) -> bool {
        if self.block_number.is_some_and(|n| n != block.block_number) {
            return false;
        }
        if self.hash.is_some_and(|h| h != block.hash) {
            return false;
        }
        if self.from.is_some_and(|from| block.timestamp < from)
            || self.to.is_some_and(|to| block.timestamp > to)
        {
            return false;
        }
        if let Some(category) = &self.category {
            let matches = block
                .category
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(category.trim()));
            if !matches {
                return false;
            }
        }
        if let Some(keyword) = &self.keyword {
            let keyword = keyword.trim();
            if !block.keywords.iter().any(|k| k.eq_ignore_ascii_case(keyword)) {
                return false;
            }
        }
        if let Some(content) = &self.content {
            let needle = content.to_lowercase();
            let found = block
                .inline_data()
                .and_then(|data| std::str::from_utf8(data).ok())
                .is_some_and(|text| text.to_lowercase().contains(&needle));
            if !found {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::block::BlockPayload;
    use std::collections::BTreeMap;

    fn block(number: u64, timestamp: Timestamp, payload: BlockPayload) -> Block {
        Block {
            block_number: number,
            previous_hash: [0u8; 32],
            hash: [number as u8; 32],
            timestamp,
            payload,
            signature: vec![],
            signer_public_key: "signer".into(),
            custom_metadata: BTreeMap::new(),
            category: Some("INVOICE".into()),
            keywords: vec!["Acme".into(), "paid".into()],
            recipient: None,
        }
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let b = block(3, 100, BlockPayload::inline(b"anything".to_vec()));
        assert!(SearchQuery::new().matches(&b));
    }

    #[test]
    fn test_text_criteria_ignore_case() {
        let b = block(0, 100, BlockPayload::inline(b"Invoice for ACME Corp".to_vec()));

        assert!(SearchQuery::new().with_content("acme corp").matches(&b));
        assert!(SearchQuery::new().with_category(" invoice ").matches(&b));
        assert!(SearchQuery::new().with_keyword("ACME").matches(&b));
        assert!(!SearchQuery::new().with_keyword("unpaid").matches(&b));
        assert!(!SearchQuery::new().with_category("receipt").matches(&b));
    }

    #[test]
    fn test_content_only_matches_readable_inline_text() {
        let binary = block(0, 100, BlockPayload::inline(vec![0xff, 0xfe, b'a']));
        assert!(!SearchQuery::new().with_content("a").matches(&binary));
    }

    #[test]
    fn test_time_range_is_inclusive() {
        let b = block(0, 100, BlockPayload::inline(b"x".to_vec()));

        assert!(SearchQuery::new().between(100, 100).matches(&b));
        assert!(SearchQuery::new().between(50, 150).matches(&b));
        assert!(!SearchQuery::new().between(101, 200).matches(&b));
        assert!(!SearchQuery::new().between(0, 99).matches(&b));
    }

    #[test]
    fn test_criteria_combine_with_and() {
        let b = block(2, 100, BlockPayload::inline(b"paid in full".to_vec()));

        let query = SearchQuery::new().with_block_number(2).with_content("paid");
        assert!(query.matches(&b));
        assert!(!query.clone().with_hash([9u8; 32]).matches(&b));
        assert!(!SearchQuery::new().with_block_number(1).matches(&b));
    }
}
