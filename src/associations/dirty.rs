//! Dirty-association queue - related documents pending cascade save
//!
//! Every accessor mutation that touches a related document queues it on the
//! owner. Saving the owner drains the queue LIFO, saving each entry exactly
//! once per drain.

use tracing::trace;

use crate::document::Document;

/// Insertion-ordered, deduplicated queue of documents awaiting save
#[derive(Default)]
pub struct DirtyQueue {
    entries: Vec<Document>,
}

impl DirtyQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a document unless an equivalent entry is already present
    pub fn enqueue(&mut self, doc: Document) {
        if self.entries.iter().any(|entry| entry.is_same(&doc)) {
            return;
        }
        trace!(model = %doc.model_name(), id = ?doc.id(), "queued dirty association");
        self.entries.push(doc);
    }

    /// Remove and return the most recently queued document
    pub fn pop(&mut self) -> Option<Document> {
        self.entries.pop()
    }

    /// Number of queued documents
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelType;
    use serde_json::Map;

    fn docs() -> (Document, Document) {
        let model = ModelType::builder("Pet").build().unwrap();
        (
            Document::hydrate(&model, "p1".to_string(), Map::new()),
            Document::hydrate(&model, "p2".to_string(), Map::new()),
        )
    }

    #[test]
    fn test_enqueue_deduplicates_same_instance() {
        let (a, _) = docs();
        let mut queue = DirtyQueue::new();
        queue.enqueue(a.clone());
        queue.enqueue(a.clone());
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_enqueue_deduplicates_same_persisted_record() {
        let model = ModelType::builder("Pet").build().unwrap();
        let first = Document::hydrate(&model, "p1".to_string(), Map::new());
        let second = Document::hydrate(&model, "p1".to_string(), Map::new());
        let mut queue = DirtyQueue::new();
        queue.enqueue(first);
        queue.enqueue(second);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_pop_is_lifo() {
        let (a, b) = docs();
        let mut queue = DirtyQueue::new();
        queue.enqueue(a.clone());
        queue.enqueue(b.clone());

        assert!(queue.pop().unwrap().is_same(&b));
        assert!(queue.pop().unwrap().is_same(&a));
        assert!(queue.pop().is_none());
        assert!(queue.is_empty());
    }
}
