use std::cell::Cell;

use geom::{Affine, Insets, Point, Rect, Size};

use crate::{
    anchors::{HAnchor, VAnchor},
    clip::ClipState,
    events::NodeEvents,
    id::NodeId,
    layout::LayoutEngine,
    state::{Capture, NodeName, UnderMouse},
    widget::Widget,
};

/// Core node data stored in the arena.
pub struct Node {
    /// Widget behavior. Taken out of the slot while hooks run.
    pub(crate) widget: Option<Box<dyn Widget>>,
    /// The layout engine owning this node's children. Taken out of the slot
    /// while a layout pass runs.
    pub(crate) engine: Option<Box<dyn LayoutEngine>>,

    /// Parent in the arena tree. Non-owning.
    pub(crate) parent: Option<NodeId>,
    /// Children in the arena tree, back-to-front.
    pub(crate) children: Vec<NodeId>,
    /// Diagnostic name. Not unique.
    pub(crate) name: NodeName,

    /// Bounds in this node's local coordinate space.
    pub(crate) local_bounds: Rect,
    /// Parent-to-child transform. The translation component is the origin
    /// relative to the parent; rotation is permitted but rare.
    pub(crate) transform: Affine,
    /// Outset around the bounds, owned by the parent's layout.
    pub(crate) margin: Insets,
    /// Border between the bounds and the padding.
    pub(crate) border: Insets,
    /// Inset between the border and the content box.
    pub(crate) padding: Insets,
    /// Minimum size, clamped so `min <= max` component-wise.
    pub(crate) min_size: Size,
    /// Maximum size, clamped so `min <= max` component-wise.
    pub(crate) max_size: Size,
    /// Horizontal anchor flags.
    pub(crate) h_anchor: HAnchor,
    /// Vertical anchor flags.
    pub(crate) v_anchor: VAnchor,

    /// Node visibility.
    pub(crate) visible: bool,
    /// Node enabled state. Effective enablement also requires every ancestor
    /// to be enabled.
    pub(crate) enabled: bool,
    /// Whether the node participates in hit testing.
    pub(crate) selectable: bool,
    /// Terminal closed flag. A closed node has no parent and no children.
    pub(crate) closed: bool,
    /// Reuse guard: set on removal, must be explicitly cleared before the
    /// node can be attached again.
    pub(crate) removed: bool,

    /// Mouse capture tri-state.
    pub(crate) capture: Capture,
    /// Under-mouse tri-state.
    pub(crate) under_mouse: UnderMouse,
    /// True if this node is on the focus chain.
    pub(crate) contains_focus: bool,

    /// Cached screen-space clip, rebuilt lazily.
    pub(crate) clip: Cell<ClipState>,
    /// Redraw marker set when this node's region changed.
    pub(crate) needs_redraw: Cell<bool>,

    /// Per-node notification surface.
    pub(crate) events: NodeEvents,
}

impl Node {
    /// Construct a node with default geometry and anchors.
    pub(crate) fn new(name: NodeName, widget: Box<dyn Widget>) -> Self {
        Self {
            widget: Some(widget),
            engine: Some(Box::new(crate::layout::AnchorLayout::default())),
            parent: None,
            children: Vec::new(),
            name,
            local_bounds: Rect::zero(),
            transform: Affine::IDENTITY,
            margin: Insets::zero(),
            border: Insets::zero(),
            padding: Insets::zero(),
            min_size: Size::zero(),
            max_size: Size::new(f64::INFINITY, f64::INFINITY),
            h_anchor: HAnchor::empty(),
            v_anchor: VAnchor::empty(),
            visible: true,
            enabled: true,
            selectable: true,
            closed: false,
            removed: false,
            capture: Capture::NotCaptured,
            under_mouse: UnderMouse::NotUnder,
            contains_focus: false,
            clip: Cell::new(ClipState::dirty()),
            needs_redraw: Cell::new(false),
            events: NodeEvents::default(),
        }
    }

    /// Return the node's diagnostic name.
    pub fn name(&self) -> &NodeName {
        &self.name
    }

    /// Return the node's parent, if any.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Return the node's children, back-to-front.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Return the bounds in the node's local coordinate space.
    pub fn local_bounds(&self) -> Rect {
        self.local_bounds
    }

    /// Return the parent-to-child transform.
    pub fn transform(&self) -> Affine {
        self.transform
    }

    /// Return the origin relative to the parent: the translation component of
    /// the transform.
    pub fn origin(&self) -> Point {
        self.transform.translation()
    }

    /// Return the margin insets.
    pub fn margin(&self) -> Insets {
        self.margin
    }

    /// Return the border insets.
    pub fn border(&self) -> Insets {
        self.border
    }

    /// Return the padding insets.
    pub fn padding(&self) -> Insets {
        self.padding
    }

    /// Return the minimum size.
    pub fn min_size(&self) -> Size {
        self.min_size
    }

    /// Return the maximum size.
    pub fn max_size(&self) -> Size {
        self.max_size
    }

    /// Return the horizontal anchor flags.
    pub fn h_anchor(&self) -> HAnchor {
        self.h_anchor
    }

    /// Return the vertical anchor flags.
    pub fn v_anchor(&self) -> VAnchor {
        self.v_anchor
    }

    /// Return true if the node is visible.
    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Return true if the node itself is enabled. See
    /// [`Tree::effective_enabled`](crate::Tree::effective_enabled) for the
    /// parent-chain-aware check.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Return true if the node participates in hit testing.
    pub fn selectable(&self) -> bool {
        self.selectable
    }

    /// Return true if the node has been closed.
    pub fn closed(&self) -> bool {
        self.closed
    }

    /// Return true if the node has been removed and not cleared for reuse.
    pub fn removed(&self) -> bool {
        self.removed
    }

    /// Return the mouse-capture state.
    pub fn capture(&self) -> Capture {
        self.capture
    }

    /// Return the under-mouse state.
    pub fn under_mouse(&self) -> UnderMouse {
        self.under_mouse
    }

    /// Return true if this node is on the focus chain.
    pub fn contains_focus(&self) -> bool {
        self.contains_focus
    }

    /// Return true if this node needs redrawing.
    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw.get()
    }

    /// Return the node's notification surface.
    pub fn events(&self) -> &NodeEvents {
        &self.events
    }

    /// The content box in local coordinates: the bounds minus border minus
    /// padding.
    pub fn content_box(&self) -> Rect {
        self.local_bounds.shrink(self.border).shrink(self.padding)
    }
}
