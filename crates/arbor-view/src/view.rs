//! ConversationView - the surface hosts embed and drive.
//!
//! Owns the message collection and every piece of derived state, and
//! recomputes synchronously on each input event (new message, branch
//! switch, navigation, resize). Deriving from scratch is cheap and
//! keeps the pipeline free of memoized-invalidation bugs; the only
//! caches are the id-keyed item sizes inside the window.

use std::collections::HashMap;

use arbor_core::{
    Anomaly, BranchIndex, BranchSelection, Message, MessageId, filtered_sequence,
};

use crate::estimate::SizeEstimator;
use crate::navigate::{self, NavigateError, ScrollAnimation};
use crate::window::{Align, VirtualWindow, VisibleItem, WindowConfig};

/// Realized geometry reported back by the presentation layer for one
/// rendered item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemHandle {
    /// Measured on-screen extent.
    pub extent: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ConversationView {
    messages: Vec<Message>,
    index: BranchIndex,
    selection: BranchSelection,
    estimator: SizeEstimator,
    window: VirtualWindow,
    /// Realized sizes by id; they supersede estimates until the item's
    /// content changes enough for the host to re-report.
    handles: HashMap<MessageId, ItemHandle>,
    /// In-flight smooth scroll, host-ticked through [`advance`].
    ///
    /// [`advance`]: ConversationView::advance
    animation: Option<ScrollAnimation>,
}

impl ConversationView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: WindowConfig, estimator: SizeEstimator) -> Self {
        Self {
            estimator,
            window: VirtualWindow::new(config),
            ..Self::default()
        }
    }

    /// Replace the whole collection (initial load, session switch).
    pub fn set_messages(&mut self, messages: Vec<Message>) {
        self.messages = messages;
        self.animation = None;
        self.resync();
    }

    /// Append one arriving message.
    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
        self.resync();
    }

    /// Pin a branch point to one child. The only externally triggered
    /// mutation of branch state besides navigation.
    pub fn select_branch(&mut self, parent: &str, child: &str) {
        self.selection.select(parent, child);
        self.animation = None;
        self.resync();
    }

    /// Re-expand a previously pinned branch point.
    pub fn expand_branch(&mut self, parent: &str) {
        if self.selection.clear(parent).is_some() {
            self.resync();
        }
    }

    /// Make `target` visible - switching branches along its ancestor
    /// chain if needed - and start a smooth scroll that centers it.
    /// Returns the target's index in the displayed sequence.
    ///
    /// A second navigation before the first finishes simply replaces
    /// the animation; the newest request wins.
    pub fn navigate_to(&mut self, target: &str) -> Result<usize, NavigateError> {
        if navigate::reveal(&self.index, &mut self.selection, target)? {
            self.resync();
        }
        let index = self
            .window
            .index_of(target)
            .ok_or_else(|| NavigateError::TargetNotFound(target.to_string()))?;
        let to = self.window.offset_for_index(index, Align::Center).unwrap_or(0);
        self.animation = Some(ScrollAnimation::new(self.window.offset(), to));
        Ok(index)
    }

    /// Feed back the realized extent of a rendered item.
    pub fn register_handle(&mut self, id: impl Into<MessageId>, handle: ItemHandle) {
        let id = id.into();
        self.window.set_realized_size(&id, handle.extent);
        self.handles.insert(id, handle);
    }

    /// Tick the in-flight scroll animation, if any, by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        if let Some(animation) = &mut self.animation {
            let offset = animation.advance(dt);
            self.window.scroll_to(offset);
            if animation.is_done() {
                self.animation = None;
            }
        }
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    // Scrolling input. Manual scrolling supersedes an in-flight
    // navigation animation, matching the newest-input-wins rule.

    pub fn scroll_up(&mut self, amount: usize) -> bool {
        self.animation = None;
        self.window.scroll_up(amount)
    }

    pub fn scroll_down(&mut self, amount: usize) -> bool {
        self.animation = None;
        self.window.scroll_down(amount)
    }

    pub fn scroll_to_top(&mut self) {
        self.animation = None;
        self.window.scroll_to_top();
    }

    pub fn scroll_to_bottom(&mut self) {
        self.animation = None;
        self.window.scroll_to_bottom();
    }

    pub fn set_viewport(&mut self, extent: usize) {
        self.window.set_viewport(extent);
    }

    // Read side.

    pub fn visible_items(&self) -> impl Iterator<Item = VisibleItem<'_>> + '_ {
        self.window.visible_items()
    }

    /// The displayed sequence under the current branch choices.
    pub fn displayed(&self) -> &[MessageId] {
        self.window.order()
    }

    pub fn message(&self, id: &str) -> Option<&Message> {
        self.index.get(id)
    }

    pub fn index(&self) -> &BranchIndex {
        &self.index
    }

    pub fn selection(&self) -> &BranchSelection {
        &self.selection
    }

    pub fn window(&self) -> &VirtualWindow {
        &self.window
    }

    /// Structural problems recovered during the last index build.
    pub fn anomalies(&self) -> &[Anomaly] {
        self.index.anomalies()
    }

    /// Rebuild everything derived from the collection and the branch
    /// choices. Pure recomputation: no state survives except the size
    /// cache, which is keyed by id and reconciled here.
    fn resync(&mut self) {
        self.index = BranchIndex::build(&self.messages);
        let sequence = filtered_sequence(&self.index, &self.selection);

        let Self {
            index,
            estimator,
            handles,
            window,
            ..
        } = self;
        window.sync(sequence, |id| {
            if let Some(handle) = handles.get(id) {
                return handle.extent;
            }
            index
                .get(id)
                .map_or(0, |message| estimator.estimate(message, index.sibling_count_of(id)))
        });
    }
}
