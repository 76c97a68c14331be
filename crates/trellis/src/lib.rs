//! Trellis is a retained-mode widget-tree core: an arena of positionable,
//! paintable, input-receiving nodes with pluggable layout engines, a lazily
//! rebuilt screen-clip cache, and a mouse/keyboard/focus dispatch state
//! machine.
//!
//! The crate deliberately stops at the drawing boundary: widgets receive an
//! abstract [`DrawSurface`] and rasterization is a collaborator's problem.

/// Anchor flag sets.
mod anchors;
/// Screen-space clip cache.
mod clip;
/// Mouse and wheel dispatch state machine.
mod dispatch;
/// Error types.
mod error;
/// Input event primitives.
pub mod event;
/// Observer lists and notification argument types.
mod events;
/// The wrapping flow layout engine.
mod flow;
/// Focus chain management and keyboard routing.
mod focus;
/// Arena node identifiers.
mod id;
/// Layout engine contract and the default anchor engine.
mod layout;
/// Arena node data.
mod node;
/// Deferred single-threaded work queue.
mod queue;
/// Node names and dispatch state enums.
mod state;
/// The widget tree arena.
mod tree;
/// Test utilities.
pub mod tutils;
/// Widget behavior trait and the draw boundary.
mod widget;

pub use geom;

pub use anchors::{HAnchor, VAnchor};
pub use error::{Error, Result};
pub use events::{
    BoundsChangedArgs, ChildArgs, FocusChangedArgs, KeyArgs, LayoutArgs, MouseArgs, NodeEvents,
    Observers, ParentChangedArgs, PositionChangedArgs, Subscription, WheelArgs,
};
pub use flow::{FlowItem, FlowLayout, FlowRow, SpacerMode};
pub use id::NodeId;
pub use layout::{AnchorLayout, LayoutCause, LayoutEngine, LayoutEvent};
pub use node::Node;
pub use queue::DeferredQueue;
pub use state::{Capture, NodeName, UnderMouse};
pub use tree::{Tree, TreeConfig};
pub use widget::{DrawSurface, Pane, Widget};
