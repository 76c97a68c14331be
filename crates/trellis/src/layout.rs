//! The layout-engine contract and the default anchor-based engine.

use std::any::Any;

use geom::{Point, Rect, Size};
use tracing::trace;

use crate::{
    anchors::{HAnchor, VAnchor},
    error::Result,
    id::NodeId,
    tree::Tree,
};

/// What triggered a layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutCause {
    /// An explicit `perform_layout` request.
    Requested,
    /// The owner's bounds changed.
    BoundsChanged,
    /// A child's bounds or position changed.
    ChildBoundsChanged,
    /// A child was added.
    ChildAdded,
    /// A child was removed.
    ChildRemoved,
    /// The owner's padding changed.
    PaddingChanged,
    /// The owner's border changed.
    BorderChanged,
    /// A child's margin changed.
    MarginChanged,
    /// A child's anchors changed.
    AnchorChanged,
    /// A child's visibility changed.
    VisibilityChanged,
}

/// A layout request delivered to a [`LayoutEngine`].
#[derive(Debug, Clone, Copy)]
pub struct LayoutEvent {
    /// The node whose engine is running; the engine positions this node's
    /// children.
    pub owner: NodeId,
    /// The child that caused the request, if any.
    pub child: Option<NodeId>,
    /// What triggered the request.
    pub cause: LayoutCause,
}

/// A pluggable strategy that positions and sizes a node's children.
///
/// Exactly one engine is attached to every node. The engine is taken out of
/// the node slot while it runs, so it may freely mutate the tree; layout
/// requests targeting the owner that arrive during the pass are dropped (the
/// in-progress pass produces the final geometry).
pub trait LayoutEngine: Any {
    /// Recompute each visible child's bounds and origin from the owner's
    /// content box and the children's anchors, margins and size limits.
    fn layout(&mut self, tree: &mut Tree, ev: LayoutEvent) -> Result<()>;

    /// Downcasting support for typed engine accessors.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// The default engine: anchors each visible child within the owner's content
/// box, and sizes the owner to its children first when the owner carries a
/// fit anchor.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnchorLayout;

impl LayoutEngine for AnchorLayout {
    fn layout(&mut self, tree: &mut Tree, ev: LayoutEvent) -> Result<()> {
        trace!(owner = ?ev.owner, cause = ?ev.cause, "anchor layout");
        tree.with_layout_locked(|tree| {
            fit_owner_to_children(tree, ev.owner)?;
            let Some(node) = tree.node(ev.owner) else {
                return Ok(());
            };
            let content = node.content_box();
            let children = node.children().to_vec();
            for child in children {
                anchor_child(tree, content, child)?;
            }
            Ok(())
        })
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// The horizontal extent a node needs to enclose its visible children's
/// margin-inflated bounds, or `None` if it has no visible children.
fn fit_size(tree: &Tree, id: NodeId) -> Option<Size> {
    let node = tree.node(id)?;
    let mut enclosing = Rect::zero();
    let mut any = false;
    for &child in node.children() {
        let Some(c) = tree.node(child) else {
            continue;
        };
        if !c.visible {
            continue;
        }
        let outer = c
            .transform
            .transform_rect_bbox(c.local_bounds)
            .inflate(c.margin);
        enclosing = enclosing.union(outer);
        any = true;
    }
    if !any {
        return None;
    }
    let bounds = node.local_bounds;
    let w = enclosing.right() + node.padding.right + node.border.right - bounds.left();
    let h = enclosing.bottom() + node.padding.bottom + node.border.bottom - bounds.top();
    Some(Size::new(w.max(0.0), h.max(0.0)))
}

/// Resolve a fit/stretch combination into a final extent.
fn combine_fit_stretch(fit: f64, stretch: Option<f64>, has_stretch: bool, take_min: bool) -> f64 {
    match (has_stretch, stretch) {
        (true, Some(s)) => {
            if take_min {
                fit.min(s)
            } else {
                fit.max(s)
            }
        }
        _ => fit,
    }
}

/// If the owner carries a fit anchor, size it to enclose its visible
/// children's margin-inflated bounds, honoring fit/stretch combination
/// against the owner's own parent.
fn fit_owner_to_children(tree: &mut Tree, owner: NodeId) -> Result<()> {
    let Some(node) = tree.node(owner) else {
        return Ok(());
    };
    let h = node.h_anchor;
    let v = node.v_anchor;
    if !h.contains(HAnchor::FIT) && !v.contains(VAnchor::FIT) {
        return Ok(());
    }
    let bounds = node.local_bounds;
    let margin = node.margin;
    let parent_content = node
        .parent
        .and_then(|p| tree.node(p))
        .map(|p| p.content_box());
    let Some(fit) = fit_size(tree, owner) else {
        return Ok(());
    };

    let mut size = bounds.size();
    if h.contains(HAnchor::FIT) {
        let stretch = parent_content.map(|c| c.w - margin.width());
        size.w = combine_fit_stretch(
            fit.w,
            stretch,
            h.contains(HAnchor::STRETCH),
            h.contains(HAnchor::MIN_FIT_OR_STRETCH),
        );
    }
    if v.contains(VAnchor::FIT) {
        let stretch = parent_content.map(|c| c.h - margin.height());
        size.h = combine_fit_stretch(
            fit.h,
            stretch,
            v.contains(VAnchor::STRETCH),
            v.contains(VAnchor::MIN_FIT_OR_STRETCH),
        );
    }
    tree.set_local_bounds(owner, bounds.with_size(size))
}

/// Position and size a single child within the owner's content box.
fn anchor_child(tree: &mut Tree, content: Rect, child: NodeId) -> Result<()> {
    let Some(node) = tree.node(child) else {
        return Ok(());
    };
    if !node.visible {
        return Ok(());
    }
    let h = node.h_anchor;
    let v = node.v_anchor;
    let bounds = node.local_bounds;
    let margin = node.margin;
    let min = node.min_size;
    let max = node.max_size;
    let origin = node.origin();

    let fit = if h.contains(HAnchor::FIT) || v.contains(VAnchor::FIT) {
        fit_size(tree, child)
    } else {
        None
    };

    let mut size = bounds.size();
    if h.contains(HAnchor::FIT) {
        let fit_w = fit.map(|f| f.w).unwrap_or(bounds.w);
        size.w = combine_fit_stretch(
            fit_w,
            Some(content.w - margin.width()),
            h.contains(HAnchor::STRETCH),
            h.contains(HAnchor::MIN_FIT_OR_STRETCH),
        );
    } else if h.contains(HAnchor::STRETCH) {
        size.w = content.w - margin.width();
    }
    if v.contains(VAnchor::FIT) {
        let fit_h = fit.map(|f| f.h).unwrap_or(bounds.h);
        size.h = combine_fit_stretch(
            fit_h,
            Some(content.h - margin.height()),
            v.contains(VAnchor::STRETCH),
            v.contains(VAnchor::MIN_FIT_OR_STRETCH),
        );
    } else if v.contains(VAnchor::STRETCH) {
        size.h = content.h - margin.height();
    }
    size = size.clamp(min, max);

    let mut pos = origin;
    if h.contains(HAnchor::STRETCH) {
        pos.x = content.left() + margin.left - bounds.left();
    } else if h.contains(HAnchor::RIGHT) {
        pos.x = content.right() - margin.right - size.w - bounds.left();
    } else if h.contains(HAnchor::CENTER) {
        pos.x = content.left() + (content.w - (size.w + margin.width())) / 2.0 + margin.left
            - bounds.left();
    }
    if v.contains(VAnchor::STRETCH) {
        pos.y = content.top() + margin.top - bounds.top();
    } else if v.contains(VAnchor::BOTTOM) {
        pos.y = content.bottom() - margin.bottom - size.h - bounds.top();
    } else if v.contains(VAnchor::CENTER) {
        pos.y = content.top() + (content.h - (size.h + margin.height())) / 2.0 + margin.top
            - bounds.top();
    }

    tree.set_local_bounds(child, bounds.with_size(size))?;
    tree.set_origin(child, Point::new(pos.x, pos.y))?;
    Ok(())
}
