//! Per-stream index allocation
//!
//! One [`StreamIndexContext`] lives for exactly one response stream. It hands
//! out sequence numbers and remembers every identifier and index it has
//! assigned, so later events in the same stream resolve to the same values.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Memoizing allocator for stream addressing fields
///
/// Every cache is first-write-wins: once a key has a value, later calls for
/// that key return it unchanged regardless of their arguments.
#[derive(Debug, Default)]
pub struct StreamIndexContext {
    sequence: u64,
    item_ids: HashMap<String, String>,
    output_indices: HashMap<String, i64>,
    content_indices: HashMap<String, i64>,
    annotation_indices: HashMap<String, HashMap<String, i64>>,
    message_id: Option<String>,
    item_id: Option<String>,
}

impl StreamIndexContext {
    /// Fresh context for a new stream
    pub fn new() -> Self {
        Self::default()
    }

    /// Next sequence number, starting at 1
    pub const fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    /// Last sequence number handed out, 0 before the first
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Account for a sequence number the vendor supplied
    ///
    /// Later allocations continue above it, so numbering never goes back.
    pub const fn observe_sequence(&mut self, sequence: u64) {
        if sequence > self.sequence {
            self.sequence = sequence;
        }
    }

    /// Item id for `key`, generating one on first use
    pub fn ensure_item_id(&mut self, key: &str) -> String {
        let next = self.item_ids.len();
        self.item_ids
            .entry(key.to_owned())
            .or_insert_with(|| format!("item_{next}"))
            .clone()
    }

    /// Bind `key` to a caller-chosen item id unless it is already bound
    ///
    /// Returns the id the key is bound to afterwards.
    pub fn bind_item_id(&mut self, key: &str, item_id: &str) -> String {
        self.item_ids
            .entry(key.to_owned())
            .or_insert_with(|| item_id.to_owned())
            .clone()
    }

    /// Output index for `key`, allocating in first-seen order
    pub fn ensure_output_index(&mut self, key: &str) -> i64 {
        let next = index_from_len(self.output_indices.len());
        *self.output_indices.entry(key.to_owned()).or_insert(next)
    }

    /// Content index for `item_id`
    ///
    /// A non-negative `hinted` value is adopted on first use; a negative one
    /// allocates the next free slot in cache-size order.
    pub fn ensure_content_index(&mut self, item_id: &str, hinted: i64) -> i64 {
        ensure_index(&mut self.content_indices, item_id, hinted)
    }

    /// Annotation index for `key` within `item_id`
    ///
    /// Each item numbers its annotations from 0; otherwise the contract is
    /// that of [`ensure_content_index`](Self::ensure_content_index).
    pub fn ensure_annotation_index(&mut self, item_id: &str, key: &str, hinted: i64) -> i64 {
        let annotations = self.annotation_indices.entry(item_id.to_owned()).or_default();
        ensure_index(annotations, key, hinted)
    }

    /// Record the message currently streaming
    pub fn set_message_id(&mut self, message_id: impl Into<String>) {
        self.message_id = Some(message_id.into());
    }

    /// Message currently streaming
    pub fn get_message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }

    /// Record the output item currently streaming
    pub fn set_item_id(&mut self, item_id: impl Into<String>) {
        self.item_id = Some(item_id.into());
    }

    /// Output item currently streaming
    pub fn get_item_id(&self) -> Option<&str> {
        self.item_id.as_deref()
    }
}

fn ensure_index(cache: &mut HashMap<String, i64>, key: &str, hinted: i64) -> i64 {
    if let Some(index) = cache.get(key) {
        return *index;
    }
    let index = if hinted >= 0 { hinted } else { index_from_len(cache.len()) };
    cache.insert(key.to_owned(), index);
    index
}

fn index_from_len(len: usize) -> i64 {
    i64::try_from(len).unwrap_or(i64::MAX)
}

/// Cloneable handle to a context that several tasks may inspect
///
/// The conversion path is the only writer; other holders (diagnostics) read
/// through the same lock, so every check-then-fill stays atomic.
#[derive(Debug, Clone, Default)]
pub struct SharedStreamIndexContext {
    inner: Arc<Mutex<StreamIndexContext>>,
}

impl SharedStreamIndexContext {
    /// Handle to a fresh context
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclusive access to the context
    ///
    /// A poisoned lock is recovered: the caches only ever hold fully written
    /// entries.
    pub fn lock(&self) -> MutexGuard<'_, StreamIndexContext> {
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Last sequence number handed out
    pub fn sequence(&self) -> u64 {
        self.lock().sequence()
    }

    /// Message currently streaming
    pub fn message_id(&self) -> Option<String> {
        self.lock().get_message_id().map(str::to_owned)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn sequence_starts_at_one_and_increases() {
        let mut ctx = StreamIndexContext::new();
        assert_eq!(ctx.sequence(), 0);
        assert_eq!(ctx.next_sequence(), 1);
        assert_eq!(ctx.next_sequence(), 2);
        assert_eq!(ctx.next_sequence(), 3);
    }

    #[test]
    fn item_ids_are_memoized() {
        let mut ctx = StreamIndexContext::new();
        let a = ctx.ensure_item_id("resp:0:0");
        let b = ctx.ensure_item_id("resp:0:1");
        assert_ne!(a, b);
        assert_eq!(ctx.ensure_item_id("resp:0:0"), a);
    }

    #[test]
    fn bound_item_id_wins_over_later_binds() {
        let mut ctx = StreamIndexContext::new();
        assert_eq!(ctx.bind_item_id("resp:0:2", "toolu_1"), "toolu_1");
        assert_eq!(ctx.bind_item_id("resp:0:2", "toolu_2"), "toolu_1");
        assert_eq!(ctx.ensure_item_id("resp:0:2"), "toolu_1");
    }

    #[test]
    fn output_indices_allocate_in_order() {
        let mut ctx = StreamIndexContext::new();
        assert_eq!(ctx.ensure_output_index("msg_a"), 0);
        assert_eq!(ctx.ensure_output_index("msg_b"), 1);
        assert_eq!(ctx.ensure_output_index("msg_a"), 0);
    }

    #[test]
    fn content_index_first_write_wins() {
        let mut ctx = StreamIndexContext::new();
        assert_eq!(ctx.ensure_content_index("toolu_1", 2), 2);
        assert_eq!(ctx.ensure_content_index("toolu_1", 5), 2);
        assert_eq!(ctx.ensure_content_index("toolu_1", -1), 2);
    }

    #[test]
    fn content_index_allocates_when_unhinted() {
        let mut ctx = StreamIndexContext::new();
        assert_eq!(ctx.ensure_content_index("a", -1), 0);
        assert_eq!(ctx.ensure_content_index("b", -1), 1);
        assert_eq!(ctx.ensure_content_index("a", -1), 0);
    }

    #[test]
    fn zero_hint_is_adopted() {
        let mut ctx = StreamIndexContext::new();
        ctx.ensure_content_index("a", -1);
        assert_eq!(ctx.ensure_content_index("b", 0), 0);
    }

    #[test]
    fn annotation_indices_are_independent() {
        let mut ctx = StreamIndexContext::new();
        ctx.ensure_content_index("a", 4);
        assert_eq!(ctx.ensure_annotation_index("a", "1", -1), 0);
        assert_eq!(ctx.ensure_annotation_index("a", "2", -1), 1);
        assert_eq!(ctx.ensure_annotation_index("a", "1", 9), 0);
    }

    #[test]
    fn annotation_indices_restart_per_item() {
        let mut ctx = StreamIndexContext::new();
        assert_eq!(ctx.ensure_annotation_index("a", "1", -1), 0);
        assert_eq!(ctx.ensure_annotation_index("a", "2", -1), 1);
        assert_eq!(ctx.ensure_annotation_index("b", "3", -1), 0);
        assert_eq!(ctx.ensure_annotation_index("b", "4", -1), 1);
        assert_eq!(ctx.ensure_annotation_index("a", "5", -1), 2);
    }

    #[test]
    fn observed_sequence_moves_allocation_forward() {
        let mut ctx = StreamIndexContext::new();
        ctx.observe_sequence(42);
        assert_eq!(ctx.next_sequence(), 43);
        ctx.observe_sequence(7);
        assert_eq!(ctx.sequence(), 43);
        assert_eq!(ctx.next_sequence(), 44);
    }

    #[test]
    fn current_pointers() {
        let mut ctx = StreamIndexContext::new();
        assert!(ctx.get_message_id().is_none());
        ctx.set_message_id("msg_1");
        ctx.set_item_id("toolu_1");
        assert_eq!(ctx.get_message_id(), Some("msg_1"));
        assert_eq!(ctx.get_item_id(), Some("toolu_1"));
    }

    #[test]
    fn concurrent_first_writes_agree() {
        let shared = SharedStreamIndexContext::new();
        let handles: Vec<_> = (0..8)
            .map(|hint| {
                let shared = shared.clone();
                thread::spawn(move || shared.lock().ensure_content_index("item", hint))
            })
            .collect();
        let results: Vec<i64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(results.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn shared_handle_sees_writes() {
        let shared = SharedStreamIndexContext::new();
        let observer = shared.clone();
        shared.lock().next_sequence();
        shared.lock().set_message_id("msg_1");
        assert_eq!(observer.sequence(), 1);
        assert_eq!(observer.message_id().as_deref(), Some("msg_1"));
    }
}
