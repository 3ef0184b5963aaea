use panther_types::{normalize_hash, AnchorEvent};

/// Upper bound on events returned by one query.
pub const MAX_HISTORY_LIMIT: usize = 1000;

/// Events returned when the caller does not say.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// A history lookup: optional hash filter and a result limit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryQuery {
    hash: Option<String>,
    limit: usize,
}

impl HistoryQuery {
    /// Build a query, clamping `limit` into `[0, MAX_HISTORY_LIMIT]`.
    ///
    /// An empty hash means no filter. Digest spellings are normalized the
    /// same way anchoring normalizes them.
    pub fn new(hash: Option<String>, limit: i64) -> Self {
        let limit = limit.clamp(0, MAX_HISTORY_LIMIT as i64) as usize;
        Self {
            hash: hash.map(|h| normalize_hash(&h)).filter(|h| !h.is_empty()),
            limit,
        }
    }

    pub fn hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn matches(&self, event: &AnchorEvent) -> bool {
        self.hash.as_deref().map_or(true, |h| event.hash == h)
    }

    /// Select matching events from a sequence given oldest first.
    ///
    /// Result is ordered by descending `ts`; events with equal `ts` come
    /// back later-inserted first.
    pub(crate) fn select<'a, I>(&self, oldest_first: I) -> Vec<AnchorEvent>
    where
        I: DoubleEndedIterator<Item = &'a AnchorEvent>,
    {
        let mut out: Vec<AnchorEvent> = oldest_first
            .rev()
            .filter(|e| self.matches(e))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.ts.cmp(&a.ts));
        out.truncate(self.limit);
        out
    }
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            hash: None,
            limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_is_clamped() {
        assert_eq!(HistoryQuery::new(None, 5000).limit(), MAX_HISTORY_LIMIT);
        assert_eq!(HistoryQuery::new(None, -3).limit(), 0);
        assert_eq!(HistoryQuery::new(None, 7).limit(), 7);
        assert_eq!(HistoryQuery::default().limit(), DEFAULT_HISTORY_LIMIT);
    }

    #[test]
    fn empty_hash_is_no_filter() {
        let q = HistoryQuery::new(Some(String::new()), 10);
        assert!(q.hash().is_none());
        assert!(q.matches(&AnchorEvent::status(1, "anything", true, None)));
    }

    #[test]
    fn digest_filter_is_normalized() {
        let digest = "0f".repeat(64);
        let q = HistoryQuery::new(Some(format!("0x{}", digest.to_uppercase())), 10);
        assert_eq!(q.hash(), Some(digest.as_str()));
        assert!(q.matches(&AnchorEvent::status(1, digest.clone(), true, None)));
        assert_eq!(HistoryQuery::new(Some(" B ".into()), 10).hash(), Some("B"));
    }

    #[test]
    fn select_orders_newest_first_with_stable_ties() {
        let events = vec![
            AnchorEvent::anchor(10, "a", "0x1", None),
            AnchorEvent::anchor(30, "b", "0x2", None),
            AnchorEvent::status(30, "c", true, None),
            AnchorEvent::status(20, "a", false, None),
        ];
        let out = HistoryQuery::default().select(events.iter());
        let hashes: Vec<_> = out.iter().map(|e| e.hash.as_str()).collect();
        assert_eq!(hashes, ["c", "b", "a", "a"]);
        assert_eq!(out[2].ts, 20);
    }

    #[test]
    fn select_filters_and_limits() {
        let events: Vec<_> = (0..5)
            .map(|i| AnchorEvent::anchor(i, if i % 2 == 0 { "x" } else { "y" }, "0x", None))
            .collect();
        let out = HistoryQuery::new(Some("x".into()), 2).select(events.iter());
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|e| e.hash == "x"));
        assert_eq!(out[0].ts, 4);
    }
}
