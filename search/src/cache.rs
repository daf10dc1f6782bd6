//! Query result cache.
//!
//! Avoids a worker round-trip for queries repeated within a session. Owned
//! exclusively by the coordinator, so no locking is needed. Keys are exact,
//! case-sensitive query strings.

use std::collections::HashMap;

use tracing::debug;

/// Bounded mapping from query string to its resolved result strings.
///
/// Eviction is whole-cache: inserting a *new* key when the cache already holds
/// `max_entries` distinct keys clears everything first. Re-putting an existing
/// key overwrites in place and never triggers eviction. Crude, but it bounds
/// memory with a single counter and no per-entry bookkeeping.
pub struct QueryCache {
    entries: HashMap<String, Vec<String>>,
    max_entries: usize,
}

impl QueryCache {
    /// Create a cache holding at most `max_entries` distinct queries.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            max_entries,
        }
    }

    /// Look up the cached results for a query.
    pub fn get(&self, query: &str) -> Option<&Vec<String>> {
        self.entries.get(query)
    }

    /// Store results for a query, evicting the whole cache if a new key would
    /// exceed capacity.
    pub fn put(&mut self, query: impl Into<String>, results: Vec<String>) {
        let query = query.into();

        if !self.entries.contains_key(&query) && self.entries.len() >= self.max_entries {
            debug!(
                "Query cache at capacity ({}), clearing all entries",
                self.max_entries
            );
            self.entries.clear();
        }

        self.entries.insert(query, results);
    }

    /// Check if a query is cached.
    pub fn contains(&self, query: &str) -> bool {
        self.entries.contains_key(query)
    }

    /// Number of cached queries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn results(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_round_trip() {
        let mut cache = QueryCache::new(4);
        cache.put("cat", results(&["the cat sat"]));

        assert_eq!(cache.get("cat"), Some(&results(&["the cat sat"])));
        assert_eq!(cache.get("dog"), None);
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let mut cache = QueryCache::new(4);
        cache.put("Cat", results(&["a"]));

        assert!(cache.contains("Cat"));
        assert!(!cache.contains("cat"));
        assert!(!cache.contains("Cat "));
    }

    #[test]
    fn test_eviction_clears_everything() {
        let mut cache = QueryCache::new(3);
        cache.put("a", results(&["1"]));
        cache.put("b", results(&["2"]));
        cache.put("c", results(&["3"]));
        assert_eq!(cache.len(), 3);

        cache.put("d", results(&["4"]));

        assert_eq!(cache.len(), 1);
        assert!(!cache.contains("a"));
        assert!(!cache.contains("b"));
        assert!(!cache.contains("c"));
        assert_eq!(cache.get("d"), Some(&results(&["4"])));
    }

    #[test]
    fn test_overwrite_existing_key_never_evicts() {
        let mut cache = QueryCache::new(2);
        cache.put("a", results(&["1"]));
        cache.put("b", results(&["2"]));

        // "a" already exists, so this is an overwrite, not an insert.
        cache.put("a", results(&["1b"]));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), Some(&results(&["1b"])));
        assert_eq!(cache.get("b"), Some(&results(&["2"])));
    }

    #[test]
    fn test_clear() {
        let mut cache = QueryCache::new(2);
        cache.put("a", results(&["1"]));
        assert!(!cache.is_empty());

        cache.clear();
        assert!(cache.is_empty());
    }
}
