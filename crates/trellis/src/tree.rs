//! The widget tree arena: node storage, structure mutation, geometry setters
//! and the layout driver.

use std::time::Duration;

use geom::{Affine, Insets, Point, Rect, Size};
use scopeguard::guard;
use slotmap::SlotMap;
use tracing::debug;

use crate::{
    anchors::{HAnchor, VAnchor},
    error::{Error, Result},
    events::{BoundsChangedArgs, ChildArgs, LayoutArgs, ParentChangedArgs, PositionChangedArgs},
    id::NodeId,
    layout::{LayoutCause, LayoutEngine, LayoutEvent},
    node::Node,
    queue::DeferredQueue,
    state::NodeName,
    widget::{DrawSurface, Widget},
};

/// Tree-wide configuration, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeConfig {
    /// Scale factor applied to margin, border and padding values as they are
    /// set, so callers can work in device-independent units.
    pub device_scale: f64,
    /// Round bounds and insets to whole numbers as they are set.
    pub integer_bounds: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            device_scale: 1.0,
            integer_bounds: false,
        }
    }
}

/// The arena holding every node. All operations address nodes by [`NodeId`];
/// the tree has no privileged root, and callers may maintain several disjoint
/// trees in one arena.
pub struct Tree {
    /// Node storage. Slot reuse is generational, so stale ids miss.
    nodes: SlotMap<NodeId, Node>,
    /// Fixed configuration.
    config: TreeConfig,
    /// Depth of nested layout locks. While positive, layout requests are
    /// recorded rather than run.
    layout_locks: u32,
    /// Layout requests recorded while locked, deduplicated by owner.
    pending_layout: Vec<(NodeId, Option<NodeId>, LayoutCause)>,
    /// Depth of in-progress mouse-up dispatches. While positive, `close`
    /// refuses to run.
    pub(crate) mouse_up_locks: u32,
    /// Deferred work queue.
    deferred: DeferredQueue,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Construct an empty tree with default configuration.
    pub fn new() -> Self {
        Self::with_config(TreeConfig::default())
    }

    /// Construct an empty tree with the given configuration.
    pub fn with_config(config: TreeConfig) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            config,
            layout_locks: 0,
            pending_layout: Vec::new(),
            mouse_up_locks: 0,
            deferred: DeferredQueue::new(),
        }
    }

    /// The tree configuration.
    pub fn config(&self) -> TreeConfig {
        self.config
    }

    /// Create a detached node wrapping a widget. The node's name comes from
    /// the widget.
    pub fn create<W: Widget + 'static>(&mut self, widget: W) -> NodeId {
        let name = widget.name();
        let id = self.nodes.insert(Node::new(name, Box::new(widget)));
        debug!(node = ?id, "created node");
        id
    }

    /// Look up a node. Returns `None` for stale or foreign ids.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub(crate) fn try_node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id).ok_or(Error::NodeNotFound(id))
    }

    pub(crate) fn try_node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(id).ok_or(Error::NodeNotFound(id))
    }

    /// Closed nodes are terminal and reject property mutation.
    fn try_mutable(&self, id: NodeId) -> Result<&Node> {
        let node = self.try_node(id)?;
        if node.closed {
            return Err(Error::Closed);
        }
        Ok(node)
    }

    /// True if the id refers to a live node in this arena.
    pub fn is_live(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// The node's diagnostic name.
    pub fn name(&self, id: NodeId) -> Option<NodeName> {
        self.node(id).map(|n| n.name.clone())
    }

    /// Depth-first search of the subtree (including the start node) for the
    /// first node with the given name.
    pub fn find_descendant(&self, id: NodeId, name: &str) -> Option<NodeId> {
        let node = self.node(id)?;
        if node.name == name {
            return Some(id);
        }
        for &child in &node.children {
            if let Some(found) = self.find_descendant(child, name) {
                return Some(found);
            }
        }
        None
    }

    /// True if the node and every ancestor are enabled. Disabled subtrees are
    /// skipped by input dispatch.
    pub fn effective_enabled(&self, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(c) = cursor {
            let Some(node) = self.node(c) else {
                return false;
            };
            if !node.enabled {
                return false;
            }
            cursor = node.parent;
        }
        true
    }

    /// True if the node and every ancestor are visible. Invisible subtrees
    /// are skipped by keyboard routing.
    pub fn effective_visible(&self, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(c) = cursor {
            let Some(node) = self.node(c) else {
                return false;
            };
            if !node.visible {
                return false;
            }
            cursor = node.parent;
        }
        true
    }

    /// The axis-aligned bounding box of the node's bounds in its parent's
    /// coordinate space.
    pub fn bounds_relative_to_parent(&self, id: NodeId) -> Option<Rect> {
        let node = self.node(id)?;
        Some(node.transform.transform_rect_bbox(node.local_bounds))
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    /// Attach a detached node as the last (frontmost) child of a parent.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let index = self.try_node(parent)?.children.len();
        self.insert_child(parent, index, child)
    }

    /// Attach a detached node at a specific index in a parent's child list.
    /// Children are ordered back-to-front.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<()> {
        if parent == child {
            return Err(Error::AddSelf);
        }
        self.try_node(child)?;
        if self.try_node(child)?.parent.is_some() {
            return Err(Error::AlreadyAttached);
        }
        let mut cursor = Some(parent);
        while let Some(c) = cursor {
            if c == child {
                return Err(Error::WouldCreateCycle);
            }
            cursor = self.try_node(c)?.parent;
        }
        if index > self.try_node(parent)?.children.len() {
            return Err(Error::IndexOutOfRange(index));
        }
        if self.try_node(child)?.removed {
            return Err(Error::RemovedNodeReuse);
        }

        self.try_node_mut(parent)?.children.insert(index, child);
        {
            let c = self.try_node_mut(child)?;
            c.parent = Some(parent);
            c.closed = false;
        }
        self.invalidate_clip(child);

        let added = self.try_node(parent)?.events.child_added.clone();
        added.notify(&ChildArgs { child });
        let parented = self.try_node(child)?.events.parent_changed.clone();
        parented.notify(&ParentChangedArgs {
            old: None,
            new: Some(parent),
        });

        self.run_layout(child, None, LayoutCause::Requested)?;
        self.run_layout(parent, Some(child), LayoutCause::ChildAdded)
    }

    /// Detach a child from its parent. A no-op if the child is not attached
    /// to this parent. The detached node is marked removed; it must be
    /// cleared with [`Tree::clear_removed_flag`] before it can be attached
    /// again.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.try_node(child)?;
        let Some(pos) = self
            .try_node(parent)?
            .children
            .iter()
            .position(|&c| c == child)
        else {
            return Ok(());
        };

        self.release_capture_on_detach(child);
        if self.try_node(child)?.contains_focus {
            self.unfocus(child)?;
        }
        self.invalidate_clip(child);

        self.try_node_mut(parent)?.children.remove(pos);
        {
            let c = self.try_node_mut(child)?;
            c.parent = None;
            c.removed = true;
        }
        if let Some(p) = self.node(parent) {
            p.needs_redraw.set(true);
        }

        let removed = self.try_node(parent)?.events.child_removed.clone();
        removed.notify(&ChildArgs { child });
        let parented = self.try_node(child)?.events.parent_changed.clone();
        parented.notify(&ParentChangedArgs {
            old: Some(parent),
            new: None,
        });

        self.run_layout(parent, Some(child), LayoutCause::ChildRemoved)
    }

    /// Clear the reuse guard on a detached node so it can be attached again.
    pub fn clear_removed_flag(&mut self, id: NodeId) -> Result<()> {
        self.try_node_mut(id)?.removed = false;
        Ok(())
    }

    /// Close a node and its entire subtree. Closing releases capture and
    /// focus, detaches the node from its parent, recursively closes every
    /// descendant and fires a closed notification on each. Closing an
    /// already-closed node is a no-op. Errors if called while a mouse-up
    /// dispatch is unwinding.
    pub fn close(&mut self, id: NodeId) -> Result<()> {
        if self.mouse_up_locks > 0 {
            return Err(Error::ReentrantMutation);
        }
        let Some(node) = self.node(id) else {
            return Ok(());
        };
        if node.closed {
            return Ok(());
        }
        debug!(node = ?id, "closing subtree");

        self.release_capture_on_detach(id);
        if self.try_node(id)?.contains_focus {
            self.unfocus(id)?;
        }
        if let Some(parent) = self.try_node(id)?.parent {
            self.remove_child(parent, id)?;
        }
        self.close_subtree(id);
        Ok(())
    }

    /// Mark a detached subtree closed, bottom-up.
    fn close_subtree(&mut self, id: NodeId) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        let children = std::mem::take(&mut node.children);
        node.parent = None;
        node.closed = true;
        node.removed = true;
        for &child in &children {
            if let Some(c) = self.node_mut(child) {
                c.parent = None;
            }
            self.close_subtree(child);
        }
        if let Some(node) = self.node(id) {
            let closed = node.events.closed.clone();
            closed.notify(&());
        }
    }

    /// Move a node to the front of its parent's child list (drawn last, hit
    /// tested first). A no-op for detached nodes.
    pub fn bring_to_front(&mut self, id: NodeId) -> Result<()> {
        let Some(parent) = self.try_node(id)?.parent else {
            return Ok(());
        };
        let p = self.try_node_mut(parent)?;
        let Some(pos) = p.children.iter().position(|&c| c == id) else {
            return Ok(());
        };
        if pos == p.children.len() - 1 {
            return Ok(());
        }
        p.children.remove(pos);
        p.children.push(id);
        p.needs_redraw.set(true);
        Ok(())
    }

    /// Move a node to the back of its parent's child list (drawn first, hit
    /// tested last). A no-op for detached nodes.
    pub fn send_to_back(&mut self, id: NodeId) -> Result<()> {
        let Some(parent) = self.try_node(id)?.parent else {
            return Ok(());
        };
        let p = self.try_node_mut(parent)?;
        let Some(pos) = p.children.iter().position(|&c| c == id) else {
            return Ok(());
        };
        if pos == 0 {
            return Ok(());
        }
        p.children.remove(pos);
        p.children.insert(0, id);
        p.needs_redraw.set(true);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Geometry setters
    // ------------------------------------------------------------------

    /// Set the node's local bounds. The size component is clamped to the
    /// node's min/max limits, and rounded if the tree uses integer bounds.
    /// Setting an unchanged value is a no-op: no notifications fire and no
    /// layout runs.
    pub fn set_local_bounds(&mut self, id: NodeId, bounds: Rect) -> Result<()> {
        let node = self.try_mutable(id)?;
        let mut bounds = bounds.with_size(bounds.size().clamp(node.min_size, node.max_size));
        if self.config.integer_bounds {
            bounds = Rect::new(
                bounds.tl.x.round(),
                bounds.tl.y.round(),
                bounds.w.round(),
                bounds.h.round(),
            );
        }
        let old = node.local_bounds;
        if old == bounds {
            return Ok(());
        }
        self.try_node_mut(id)?.local_bounds = bounds;
        self.invalidate_clip(id);

        let node = self.try_node(id)?;
        let changed = node.events.bounds_changed.clone();
        let resized = (old.size() != bounds.size()).then(|| node.events.size_changed.clone());
        let parent = node.parent;
        changed.notify(&BoundsChangedArgs { old, new: bounds });
        if let Some(resized) = resized {
            resized.notify(&BoundsChangedArgs { old, new: bounds });
        }

        self.run_layout(id, None, LayoutCause::BoundsChanged)?;
        if let Some(p) = parent {
            self.run_layout(p, Some(id), LayoutCause::ChildBoundsChanged)?;
        }
        Ok(())
    }

    /// Set the node's origin relative to its parent: the translation
    /// component of its transform. Unchanged values are a no-op.
    pub fn set_origin(&mut self, id: NodeId, origin: Point) -> Result<()> {
        let node = self.try_mutable(id)?;
        let origin = if self.config.integer_bounds {
            Point::new(origin.x.round(), origin.y.round())
        } else {
            origin
        };
        let old = node.origin();
        if old == origin {
            return Ok(());
        }
        let transform = node.transform.with_translation(origin);
        self.try_node_mut(id)?.transform = transform;
        self.invalidate_clip(id);

        let node = self.try_node(id)?;
        let moved = node.events.position_changed.clone();
        let parent = node.parent;
        moved.notify(&PositionChangedArgs { old, new: origin });

        if let Some(p) = parent {
            self.run_layout(p, Some(id), LayoutCause::ChildBoundsChanged)?;
        }
        Ok(())
    }

    /// Replace the node's full parent-to-child transform. Unchanged values
    /// are a no-op.
    pub fn set_transform(&mut self, id: NodeId, transform: Affine) -> Result<()> {
        let node = self.try_mutable(id)?;
        let old = node.transform;
        if old == transform {
            return Ok(());
        }
        self.try_node_mut(id)?.transform = transform;
        self.invalidate_clip(id);

        let node = self.try_node(id)?;
        let old_origin = old.translation();
        let new_origin = transform.translation();
        let moved = (old_origin != new_origin).then(|| node.events.position_changed.clone());
        let parent = node.parent;
        if let Some(moved) = moved {
            moved.notify(&PositionChangedArgs {
                old: old_origin,
                new: new_origin,
            });
        }

        if let Some(p) = parent {
            self.run_layout(p, Some(id), LayoutCause::ChildBoundsChanged)?;
        }
        Ok(())
    }

    /// Scale an inset value by the configured device scale, rounding when
    /// integer bounds are on.
    fn scale_insets(&self, insets: Insets) -> Insets {
        let scaled = insets.scale(self.config.device_scale);
        if self.config.integer_bounds {
            scaled.round()
        } else {
            scaled
        }
    }

    /// Set the node's margin. The value is device-scaled. Margins belong to
    /// the parent's layout, so the parent relays out.
    pub fn set_margin(&mut self, id: NodeId, margin: Insets) -> Result<()> {
        let margin = self.scale_insets(margin);
        let node = self.try_mutable(id)?;
        if node.margin == margin {
            return Ok(());
        }
        let parent = node.parent;
        self.try_node_mut(id)?.margin = margin;
        if let Some(p) = parent {
            self.run_layout(p, Some(id), LayoutCause::MarginChanged)?;
        }
        Ok(())
    }

    /// Set the node's border insets. The value is device-scaled. Changes the
    /// content box, so the node's own layout reruns.
    pub fn set_border(&mut self, id: NodeId, border: Insets) -> Result<()> {
        let border = self.scale_insets(border);
        let node = self.try_mutable(id)?;
        if node.border == border {
            return Ok(());
        }
        self.try_node_mut(id)?.border = border;
        self.invalidate_clip(id);
        self.run_layout(id, None, LayoutCause::BorderChanged)
    }

    /// Set the node's padding. The value is device-scaled. Changes the
    /// content box, so the node's own layout reruns.
    pub fn set_padding(&mut self, id: NodeId, padding: Insets) -> Result<()> {
        let padding = self.scale_insets(padding);
        let node = self.try_mutable(id)?;
        if node.padding == padding {
            return Ok(());
        }
        self.try_node_mut(id)?.padding = padding;
        self.invalidate_clip(id);
        self.run_layout(id, None, LayoutCause::PaddingChanged)
    }

    /// Set the node's minimum size. If the new minimum exceeds the current
    /// maximum, the maximum is raised to match. The current bounds are
    /// re-clamped.
    pub fn set_min_size(&mut self, id: NodeId, min: Size) -> Result<()> {
        let node = self.try_mutable(id)?;
        if node.min_size == min {
            return Ok(());
        }
        let bounds = node.local_bounds;
        {
            let n = self.try_node_mut(id)?;
            n.min_size = min;
            n.max_size = n.max_size.max(min);
        }
        self.set_local_bounds(id, bounds)
    }

    /// Set the node's maximum size. If the new maximum falls below the
    /// current minimum, the minimum is lowered to match. The current bounds
    /// are re-clamped.
    pub fn set_max_size(&mut self, id: NodeId, max: Size) -> Result<()> {
        let node = self.try_mutable(id)?;
        if node.max_size == max {
            return Ok(());
        }
        let bounds = node.local_bounds;
        {
            let n = self.try_node_mut(id)?;
            n.max_size = max;
            n.min_size = n.min_size.min(max);
        }
        self.set_local_bounds(id, bounds)
    }

    /// Set the node's anchor flags. Errors if either axis combines a center
    /// anchor with an edge anchor. Both the node's own layout and the
    /// parent's rerun.
    pub fn set_anchors(&mut self, id: NodeId, h: HAnchor, v: VAnchor) -> Result<()> {
        if h.is_conflicting() {
            return Err(Error::Invalid(format!("conflicting horizontal anchors: {h:?}")));
        }
        if v.is_conflicting() {
            return Err(Error::Invalid(format!("conflicting vertical anchors: {v:?}")));
        }
        let node = self.try_mutable(id)?;
        if node.h_anchor == h && node.v_anchor == v {
            return Ok(());
        }
        let parent = node.parent;
        {
            let n = self.try_node_mut(id)?;
            n.h_anchor = h;
            n.v_anchor = v;
        }
        self.run_layout(id, None, LayoutCause::AnchorChanged)?;
        if let Some(p) = parent {
            self.run_layout(p, Some(id), LayoutCause::AnchorChanged)?;
        }
        Ok(())
    }

    /// Set the node's visibility. Invisible nodes are skipped by layout, hit
    /// testing and drawing. The parent relays out.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> Result<()> {
        let node = self.try_mutable(id)?;
        if node.visible == visible {
            return Ok(());
        }
        let parent = node.parent;
        self.try_node_mut(id)?.visible = visible;
        self.invalidate_clip(id);
        if let Some(p) = parent {
            self.run_layout(p, Some(id), LayoutCause::VisibilityChanged)?;
        }
        Ok(())
    }

    /// Set the node's enabled flag. A disabled node also disables its
    /// descendants for input purposes.
    pub fn set_enabled(&mut self, id: NodeId, enabled: bool) -> Result<()> {
        let node = self.try_mutable(id)?;
        if node.enabled == enabled {
            return Ok(());
        }
        self.try_node_mut(id)?.enabled = enabled;
        if let Some(n) = self.node(id) {
            n.needs_redraw.set(true);
        }
        Ok(())
    }

    /// Set whether the node participates in hit testing.
    pub fn set_selectable(&mut self, id: NodeId, selectable: bool) -> Result<()> {
        let node = self.try_mutable(id)?;
        if node.selectable == selectable {
            return Ok(());
        }
        self.try_node_mut(id)?.selectable = selectable;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Layout driver
    // ------------------------------------------------------------------

    /// Explicitly run the node's layout engine.
    pub fn perform_layout(&mut self, id: NodeId) -> Result<()> {
        self.run_layout(id, None, LayoutCause::Requested)
    }

    /// Run the node's layout engine with the given cause. If layout is
    /// locked, the request is recorded for replay at unlock (one request per
    /// owner). If the owner's engine is already running, the request is
    /// dropped: the in-progress pass produces the final geometry.
    pub(crate) fn run_layout(
        &mut self,
        owner: NodeId,
        child: Option<NodeId>,
        cause: LayoutCause,
    ) -> Result<()> {
        let Some(node) = self.node(owner) else {
            return Ok(());
        };
        if node.closed {
            return Ok(());
        }
        if self.layout_locks > 0 {
            // One replay per owner, carrying the most recent cause.
            match self.pending_layout.iter_mut().find(|(o, _, _)| *o == owner) {
                Some(entry) => {
                    entry.1 = child;
                    entry.2 = cause;
                }
                None => self.pending_layout.push((owner, child, cause)),
            }
            return Ok(());
        }
        let Some(mut engine) = self.node_mut(owner).and_then(|n| n.engine.take()) else {
            return Ok(());
        };
        let result = engine.layout(self, LayoutEvent { owner, child, cause });
        if let Some(n) = self.node_mut(owner) {
            n.engine = Some(engine);
        }
        result?;
        if let Some(n) = self.node(owner) {
            let obs = n.events.layout.clone();
            obs.notify(&LayoutArgs { cause, child });
        }
        Ok(())
    }

    /// Run a closure with layout locked. Layout requests raised inside the
    /// closure are recorded and replayed once, per owner, when the outermost
    /// lock releases.
    pub fn with_layout_locked<R>(&mut self, f: impl FnOnce(&mut Self) -> Result<R>) -> Result<R> {
        self.layout_locks += 1;
        let result = {
            let mut tree = guard(&mut *self, |t| t.layout_locks -= 1);
            f(&mut tree)
        };
        if self.layout_locks == 0 {
            let pending = std::mem::take(&mut self.pending_layout);
            let mut replay = Ok(());
            for (owner, child, cause) in pending {
                if replay.is_ok() {
                    replay = self.run_layout(owner, child, cause);
                }
            }
            result.and_then(|r| replay.map(|()| r))
        } else {
            result
        }
    }

    /// Replace the node's layout engine and rerun layout.
    pub fn set_engine(&mut self, id: NodeId, engine: impl LayoutEngine + 'static) -> Result<()> {
        self.try_node_mut(id)?.engine = Some(Box::new(engine));
        self.run_layout(id, None, LayoutCause::Requested)
    }

    /// Run a closure against the node's layout engine, downcast to a concrete
    /// type. The engine is taken out of its slot for the duration, so the
    /// closure has full access to the tree. Errors if the engine is of a
    /// different type or currently mid-pass.
    pub fn with_engine<E, R>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut E, &mut Self) -> Result<R>,
    ) -> Result<R>
    where
        E: LayoutEngine,
    {
        let mut engine = self
            .try_node_mut(id)?
            .engine
            .take()
            .ok_or(Error::EngineMismatch)?;
        let result = match engine.as_any_mut().downcast_mut::<E>() {
            Some(e) => f(e, self),
            None => Err(Error::EngineMismatch),
        };
        if let Some(n) = self.node_mut(id) {
            n.engine = Some(engine);
        }
        result
    }

    /// Run a closure against the node's widget. The widget is taken out of
    /// its slot for the duration, so the closure has full access to the tree.
    /// Returns `None` if the node is missing or its widget slot is empty.
    pub(crate) fn with_widget<R>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut dyn Widget, &mut Self) -> R,
    ) -> Option<R> {
        let mut widget = self.node_mut(id)?.widget.take()?;
        let result = f(widget.as_mut(), self);
        if let Some(n) = self.node_mut(id) {
            n.widget = Some(widget);
        }
        Some(result)
    }

    // ------------------------------------------------------------------
    // Deferred work
    // ------------------------------------------------------------------

    /// Queue a closure to run on the next [`Tree::run_deferred`] call.
    pub fn defer(&mut self, f: impl FnOnce(&mut Tree) + 'static) {
        self.deferred.push(f);
    }

    /// Queue a closure to run once the delay has elapsed.
    pub fn defer_after(&mut self, delay: Duration, f: impl FnOnce(&mut Tree) + 'static) {
        self.deferred.push_after(delay, f);
    }

    /// Run every queued closure whose due time has passed, in queue order.
    /// Closures queued during the run wait for the next call.
    pub fn run_deferred(&mut self) {
        for job in self.deferred.take_due() {
            job(self);
        }
    }

    /// Number of queued closures, due or not.
    pub fn deferred_len(&self) -> usize {
        self.deferred.len()
    }

    // ------------------------------------------------------------------
    // Drawing
    // ------------------------------------------------------------------

    /// Draw a subtree onto a surface, back-to-front. Each node's composed
    /// transform and screen clip are applied before its widget draws;
    /// invisible subtrees are skipped. Clears redraw flags as it goes.
    pub fn draw(&mut self, id: NodeId, surface: &mut dyn DrawSurface) -> Result<()> {
        let Some(clip) = self.screen_clip(id) else {
            return Ok(());
        };
        surface.set_transform(self.node_to_screen(id));
        surface.set_clip(clip);
        if let Some(result) = self.with_widget(id, |w, _| w.draw(surface, clip)) {
            result?;
        }
        let Some(node) = self.node(id) else {
            return Ok(());
        };
        node.needs_redraw.set(false);
        let children = node.children.clone();
        for child in children {
            self.draw(child, surface)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    /// Check the capture invariant over a subtree: at most one node holds
    /// capture, every ancestor of it reports a capturing child, and no node
    /// reports a capturing child without one.
    pub fn validate_capture(&self, root: NodeId) -> Result<()> {
        self.capture_walk(root).map(|_| ())
    }

    fn capture_walk(&self, id: NodeId) -> Result<bool> {
        use crate::state::Capture;
        let node = self.try_node(id)?;
        let mut captured_children = 0;
        for &child in &node.children {
            if self.capture_walk(child)? {
                captured_children += 1;
            }
        }
        match node.capture {
            Capture::ThisHasCaptured => {
                if captured_children > 0 {
                    return Err(Error::CaptureInvariant(format!(
                        "{} holds capture but also has a capturing child",
                        node.name
                    )));
                }
                Ok(true)
            }
            Capture::ChildHasCaptured => {
                if captured_children != 1 {
                    return Err(Error::CaptureInvariant(format!(
                        "{} reports a capturing child but has {captured_children}",
                        node.name
                    )));
                }
                Ok(true)
            }
            Capture::NotCaptured => {
                if captured_children > 0 {
                    return Err(Error::CaptureInvariant(format!(
                        "{} has a capturing child but does not report it",
                        node.name
                    )));
                }
                Ok(false)
            }
        }
    }

    /// Check the focus invariant over a subtree: contains-focus nodes form a
    /// single unbroken chain from some ancestor down to the focused leaf.
    pub fn validate_focus(&self, root: NodeId) -> Result<()> {
        self.focus_walk(root).map(|_| ())
    }

    fn focus_walk(&self, id: NodeId) -> Result<bool> {
        let node = self.try_node(id)?;
        let mut focused_children = 0;
        for &child in &node.children {
            if self.focus_walk(child)? {
                focused_children += 1;
            }
        }
        if node.contains_focus {
            if focused_children > 1 {
                return Err(Error::FocusInvariant(format!(
                    "{} has {focused_children} focused children",
                    node.name
                )));
            }
            Ok(true)
        } else {
            if focused_children > 0 {
                return Err(Error::FocusInvariant(format!(
                    "{} has a focused child but is not on the focus chain",
                    node.name
                )));
            }
            Ok(false)
        }
    }
}
