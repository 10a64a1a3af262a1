//! Viewport half of the Arbor conversation viewer.
//!
//! Consumes the structural crate (`arbor-core`) and adds what a host
//! needs to put a long, branching conversation on screen:
//!
//! - [`SizeEstimator`] - coarse per-message extent estimates
//! - [`VirtualWindow`] - windowing over the displayed sequence with an
//!   id-keyed size cache and an incrementally maintained offset table
//! - [`navigate`] - revealing and scrolling to an arbitrary target
//! - [`ConversationView`] - the facade hosts embed and drive
//!
//! Everything is single-threaded and synchronous; the only time-like
//! state is the host-ticked scroll animation.

pub mod estimate;
pub mod navigate;
pub mod view;
pub mod window;

pub use estimate::SizeEstimator;
pub use navigate::{NavigateError, ScrollAnimation};
pub use view::{ConversationView, ItemHandle};
pub use window::{Align, VirtualWindow, VisibleItem, WindowConfig};
