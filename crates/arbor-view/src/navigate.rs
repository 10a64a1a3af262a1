//! Target navigation: make an arbitrary message visible and scroll to it.

use thiserror::Error;

use arbor_core::{BranchIndex, BranchSelection, MessageId};

/// Navigation failures. Returned as values, never thrown; the view
/// keeps rendering whatever it was rendering.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigateError {
    #[error("message {0} is not present in the conversation")]
    TargetNotFound(MessageId),
}

/// Rewrite branch choices so `target` is on the displayed path.
///
/// Walks the ancestor chain from the target to its root and pins every
/// branch point to the child leading to the target. This includes the
/// no-entry -> entry transition: a branch point that was showing every
/// alternative narrows down to just the needed path, which is the price
/// of guaranteeing the target ends up visible. Returns whether any
/// selection changed.
pub fn reveal(
    index: &BranchIndex,
    selection: &mut BranchSelection,
    target: &str,
) -> Result<bool, NavigateError> {
    if !index.contains(target) {
        return Err(NavigateError::TargetNotFound(target.to_string()));
    }

    let mut changed = false;
    let mut child: MessageId = target.to_string();
    // A malformed parent chain could loop; it cannot be longer than the
    // collection.
    let mut remaining = index.len();
    while let Some(parent) = index.parent_of(&child) {
        if index.children_of(parent).len() > 1 && selection.chosen_for(parent) != Some(&child) {
            selection.select(parent.clone(), child.clone());
            changed = true;
        }
        child = parent.clone();
        remaining -= 1;
        if remaining == 0 {
            tracing::warn!(
                target: "arbor.navigate",
                "parent chain of {target} does not terminate; stopping ancestor walk"
            );
            break;
        }
    }
    Ok(changed)
}

/// A retargetable scroll transition.
///
/// The host ticks it once per frame with the elapsed seconds and applies
/// the returned offset. Retargeting mid-flight is safe and is the whole
/// cancellation model: a newer navigation simply replaces the animation,
/// and the newest target wins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollAnimation {
    from: f32,
    to: f32,
    elapsed: f32,
    duration: f32,
}

impl ScrollAnimation {
    pub const DEFAULT_DURATION: f32 = 0.25;

    pub fn new(from: usize, to: usize) -> Self {
        Self::with_duration(from, to, Self::DEFAULT_DURATION)
    }

    pub fn with_duration(from: usize, to: usize, duration: f32) -> Self {
        Self {
            from: from as f32,
            to: to as f32,
            elapsed: 0.0,
            duration: duration.max(f32::EPSILON),
        }
    }

    pub fn target(&self) -> usize {
        self.to as usize
    }

    pub fn is_done(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Advance by `dt` seconds and return the offset to apply.
    pub fn advance(&mut self, dt: f32) -> usize {
        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration);
        let t = self.elapsed / self.duration;
        let eased = 1.0 - (1.0 - t).powi(3);
        (self.from + (self.to - self.from) * eased).round().max(0.0) as usize
    }
}
