//! Input event primitives fed into the tree by platform code. Positions are
//! expressed in the root node's local coordinate space; the dispatcher
//! converts them as it recurses.

/// Keyboard input primitives.
pub mod key;
/// Mouse input primitives.
pub mod mouse;
