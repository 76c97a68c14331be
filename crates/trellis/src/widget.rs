//! Widget behavior trait and the abstract drawing boundary.

use std::any::{Any, type_name};

use geom::{Affine, Rect};

use crate::{
    error::Result,
    event::mouse::{MouseEvent, WheelEvent},
    events::KeyArgs,
    id::NodeId,
    state::NodeName,
    tree::Tree,
};

/// Widgets are the behavior attached to nodes in the tree arena. All hooks
/// have empty defaults; a bare node is a passive container.
///
/// Hooks receive the tree so they can mutate it; the widget is taken out of
/// its node slot for the duration of the call.
pub trait Widget: Any {
    /// Name used for diagnostic lookup. Defaults to the snake-cased type name.
    fn name(&self) -> NodeName {
        let name = type_name::<Self>();
        let short = name.rsplit("::").next().unwrap_or(name);
        NodeName::convert(short)
    }

    /// Attempt to focus this widget.
    fn accept_focus(&self) -> bool {
        false
    }

    /// A mouse-down landed on this node and no child accepted it.
    fn on_mouse_down(&mut self, _tree: &mut Tree, _id: NodeId, _ev: &MouseEvent) -> Result<()> {
        Ok(())
    }

    /// Pointer movement was delivered to this node.
    fn on_mouse_move(&mut self, _tree: &mut Tree, _id: NodeId, _ev: &MouseEvent) -> Result<()> {
        Ok(())
    }

    /// A mouse-up was delivered to this node while it held capture.
    fn on_mouse_up(&mut self, _tree: &mut Tree, _id: NodeId, _ev: &MouseEvent) -> Result<()> {
        Ok(())
    }

    /// A full press-release happened inside this node's bounds.
    fn on_click(&mut self, _tree: &mut Tree, _id: NodeId, _ev: &MouseEvent) -> Result<()> {
        Ok(())
    }

    /// Wheel input was delivered to this node.
    fn on_wheel(&mut self, _tree: &mut Tree, _id: NodeId, _ev: &WheelEvent) -> Result<()> {
        Ok(())
    }

    /// A key was pressed while this node was on the focus chain.
    fn on_key_down(&mut self, _tree: &mut Tree, _id: NodeId, _args: &KeyArgs) -> Result<()> {
        Ok(())
    }

    /// A key was released while this node was on the focus chain.
    fn on_key_up(&mut self, _tree: &mut Tree, _id: NodeId, _args: &KeyArgs) -> Result<()> {
        Ok(())
    }

    /// A character was produced while this node was on the focus chain.
    fn on_key_press(&mut self, _tree: &mut Tree, _id: NodeId, _args: &KeyArgs) -> Result<()> {
        Ok(())
    }

    /// Render this widget's own content. Does not render children; the tree
    /// owns the recursion and has already applied this node's transform and
    /// clip to the surface.
    fn draw(&mut self, _surface: &mut dyn DrawSurface, _clip: Rect) -> Result<()> {
        Ok(())
    }
}

/// Convert widgets into boxed trait objects.
impl<W> From<W> for Box<dyn Widget>
where
    W: Widget + 'static,
{
    fn from(widget: W) -> Self {
        Box::new(widget)
    }
}

/// A passive container widget with no behavior.
#[derive(Debug, Default, Clone, Copy)]
pub struct Pane;

impl Widget for Pane {}

/// The abstract 2D drawing surface handed to widgets during a draw pass. The
/// tree sets the transform and clip before each widget draws; concrete
/// surfaces expose their own primitive calls.
pub trait DrawSurface {
    /// Set the local-to-screen transform for subsequent primitives.
    fn set_transform(&mut self, transform: Affine);

    /// Set the screen-space clip rectangle for subsequent primitives.
    fn set_clip(&mut self, clip: Rect);
}
