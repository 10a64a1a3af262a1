//! Active-path filtering: which messages are currently displayed.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::index::BranchIndex;
use crate::message::MessageId;

/// Externally owned branch choices, parent id -> chosen child id.
///
/// No entry for a parent is a meaningful state: every alternative at
/// that branch point stays visible until the user collapses it to one.
/// The only writers are an explicit branch switch and the navigator's
/// ancestor resolution; both go through [`BranchSelection::select`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchSelection {
    chosen: HashMap<MessageId, MessageId>,
}

impl BranchSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin `parent`'s branch point to `child`.
    pub fn select(&mut self, parent: impl Into<MessageId>, child: impl Into<MessageId>) {
        self.chosen.insert(parent.into(), child.into());
    }

    /// Return `parent` to the expanded "no branch chosen" state.
    pub fn clear(&mut self, parent: &str) -> Option<MessageId> {
        self.chosen.remove(parent)
    }

    pub fn chosen_for(&self, parent: &str) -> Option<&MessageId> {
        self.chosen.get(parent)
    }

    pub fn len(&self) -> usize {
        self.chosen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chosen.is_empty()
    }
}

/// Compute the displayed sequence for the current branch choices.
///
/// Inclusion policy, applied independently at every branch point:
/// - a message with no parent is always included;
/// - a sibling group of size <= 1 is always included;
/// - a sibling group of size > 1 is included whole when its parent has
///   no selection entry, and collapses to exactly the chosen child once
///   one exists. Excluded messages take their descendants with them.
///
/// The walk runs on an explicit stack (no recursion on untrusted
/// structure); output order is the arrival order of the collection.
pub fn filtered_sequence(index: &BranchIndex, selection: &BranchSelection) -> Vec<MessageId> {
    let mut included: HashSet<&MessageId> = HashSet::with_capacity(index.len());
    let mut stack: Vec<&MessageId> = index.roots().iter().rev().collect();

    while let Some(id) = stack.pop() {
        if !included.insert(id) {
            continue;
        }
        let children = index.children_of(id);
        if children.len() <= 1 {
            stack.extend(children.iter().rev());
        } else if let Some(chosen) = selection.chosen_for(id) {
            if children.contains(chosen) {
                stack.push(chosen);
            } else {
                // Stale entry: the literal policy shows only the chosen
                // child, and no child matches. Navigation repairs it.
                tracing::debug!(
                    target: "arbor.path",
                    "selection for {id} names {chosen}, which is not one of its children"
                );
            }
        } else {
            stack.extend(children.iter().rev());
        }
    }

    index
        .ids()
        .filter(|id| included.contains(id))
        .cloned()
        .collect()
}
