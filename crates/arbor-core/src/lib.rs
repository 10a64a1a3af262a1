//! Structural core of the Arbor conversation viewer.
//!
//! A conversation is a flat collection of [`Message`]s in which a parent
//! turn may have several alternative continuations. This crate owns the
//! structure-only half of the engine:
//!
//! - [`BranchIndex`] - parent/child/sibling index over the collection
//! - [`BranchSelection`] + [`filtered_sequence`] - which alternatives are
//!   currently displayed
//! - [`layout`] - 2D coordinates for the full forest, for the graph view
//!
//! Everything here is a pure function of its inputs and is cheap enough
//! to recompute on every input event; windowing and navigation live in
//! `arbor-view`.

pub mod error;
pub mod index;
pub mod layout;
pub mod message;
pub mod path;

pub use error::Anomaly;
pub use index::BranchIndex;
pub use layout::{
    Edge, EdgeKind, Layout, LayoutConfig, Node, NodeId, NodeKind, NodeMetrics, Point, layout,
};
pub use message::{Message, MessageData, MessageId, Role, ToolUse, Usage};
pub use path::{BranchSelection, filtered_sequence};
