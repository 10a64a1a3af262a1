//! BranchIndex - parent/child/sibling structure over a flat collection.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::error::Anomaly;
use crate::message::{Message, MessageId};

/// Structural index over one message collection.
///
/// Built in a single O(n) pass over the input and never mutated after:
/// identical input always yields an identical index. Messages are kept
/// in arrival order; a child's position within its sibling group is the
/// arrival order of the group and never changes for a given input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BranchIndex {
    /// All messages in arrival order with O(1) id-based access.
    by_id: IndexMap<MessageId, Message>,
    /// parent id -> child ids in arrival order.
    children: HashMap<MessageId, Vec<MessageId>>,
    /// Messages without a (resolvable) parent, in arrival order.
    roots: Vec<MessageId>,
    /// Non-fatal structural problems found while building.
    anomalies: Vec<Anomaly>,
}

impl BranchIndex {
    /// Build the index. Duplicate ids keep the later entry; a message
    /// whose declared parent is not in the collection is promoted to a
    /// root. Both are recorded in [`BranchIndex::anomalies`].
    pub fn build(messages: &[Message]) -> Self {
        let mut by_id: IndexMap<MessageId, Message> = IndexMap::with_capacity(messages.len());
        let mut anomalies = Vec::new();

        for message in messages {
            if by_id.insert(message.id.clone(), message.clone()).is_some() {
                tracing::warn!(
                    target: "arbor.index",
                    "duplicate message id {}; keeping the later entry",
                    message.id
                );
                anomalies.push(Anomaly::DuplicateId {
                    id: message.id.clone(),
                });
            }
        }

        let mut children: HashMap<MessageId, Vec<MessageId>> = HashMap::new();
        let mut roots = Vec::new();
        for (id, message) in &by_id {
            match message.parent_id.as_ref() {
                Some(parent) if by_id.contains_key(parent) => {
                    children.entry(parent.clone()).or_default().push(id.clone());
                }
                Some(parent) => {
                    tracing::warn!(
                        target: "arbor.index",
                        "message {id} references missing parent {parent}; promoting to root"
                    );
                    anomalies.push(Anomaly::OrphanReference {
                        id: id.clone(),
                        missing_parent: parent.clone(),
                    });
                    roots.push(id.clone());
                }
                None => roots.push(id.clone()),
            }
        }

        Self {
            by_id,
            children,
            roots,
            anomalies,
        }
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Message> {
        self.by_id.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Child ids of `parent` in arrival order. Empty for unknown parents
    /// and for leaves.
    pub fn children_of(&self, parent: &str) -> &[MessageId] {
        self.children.get(parent).map_or(&[], Vec::as_slice)
    }

    /// Messages without a resolvable parent, in arrival order.
    pub fn roots(&self) -> &[MessageId] {
        &self.roots
    }

    /// The sibling group containing `id`: its parent's children, or the
    /// roots when it has no resolvable parent. Empty for unknown ids.
    pub fn sibling_group_of(&self, id: &str) -> &[MessageId] {
        let Some(message) = self.by_id.get(id) else {
            return &[];
        };
        match message.parent_id.as_ref() {
            Some(parent) if self.by_id.contains_key(parent) => self.children_of(parent),
            _ => &self.roots,
        }
    }

    /// Size of the sibling group containing `id`, inclusive of `id`.
    pub fn sibling_count_of(&self, id: &str) -> usize {
        self.sibling_group_of(id).len()
    }

    /// Resolved parent of `id`: `None` for roots and orphan-promoted
    /// messages.
    pub fn parent_of(&self, id: &str) -> Option<&MessageId> {
        let parent = self.by_id.get(id)?.parent_id.as_ref()?;
        self.by_id.contains_key(parent).then_some(parent)
    }

    /// All message ids in arrival order.
    pub fn ids(&self) -> impl Iterator<Item = &MessageId> + '_ {
        self.by_id.keys()
    }

    /// All messages in arrival order.
    pub fn messages(&self) -> impl Iterator<Item = &Message> + '_ {
        self.by_id.values()
    }

    /// Non-fatal structural problems found while building.
    pub fn anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }
}
