//! Screen-space transform and clip caching.
//!
//! Every node caches its screen clip: the bounding box of its local bounds
//! under the composed local-to-screen transform, intersected with the
//! parent's clip. The cache is rebuilt lazily on query and invalidated
//! conservatively whenever geometry or structure changes anywhere on the
//! node's ancestor or descendant chain.

use geom::{Affine, Rect};

use crate::{id::NodeId, tree::Tree};

/// Cached clip data stored per node behind a `Cell`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ClipState {
    /// Screen-space clip rectangle. Meaningless while dirty.
    pub(crate) rect: Rect,
    /// False if this node or any ancestor is invisible.
    pub(crate) visible: bool,
    /// True if the cache must be rebuilt before use.
    pub(crate) dirty: bool,
}

impl ClipState {
    /// A cache entry that must be rebuilt before use.
    pub(crate) fn dirty() -> Self {
        Self {
            rect: Rect::zero(),
            visible: false,
            dirty: true,
        }
    }
}

impl Tree {
    /// The composed local-to-screen transform for a node: the product of
    /// every transform from the root down to the node. Identity for detached
    /// or missing nodes.
    pub fn node_to_screen(&self, id: NodeId) -> Affine {
        let mut chain = Vec::new();
        let mut cursor = Some(id);
        while let Some(c) = cursor {
            let Some(node) = self.node(c) else {
                break;
            };
            chain.push(node.transform);
            cursor = node.parent;
        }
        let mut acc = Affine::IDENTITY;
        for t in chain.into_iter().rev() {
            acc = acc * t;
        }
        acc
    }

    /// The node's screen-space clip: its transformed bounds intersected with
    /// every ancestor clip. Returns `None` if the node is missing, or if the
    /// node or any ancestor is invisible. The result is cached and rebuilt
    /// only after an invalidation.
    pub fn screen_clip(&self, id: NodeId) -> Option<Rect> {
        let node = self.node(id)?;
        let cached = node.clip.get();
        if !cached.dirty {
            return cached.visible.then_some(cached.rect);
        }
        let own = self
            .node_to_screen(id)
            .transform_rect_bbox(node.local_bounds);
        // A node fully outside its ancestors' clips is treated like an
        // invisible one: no clip, and drawing skips the subtree.
        let (rect, visible) = if !node.visible {
            (Rect::zero(), false)
        } else {
            match node.parent {
                Some(p) => match self.screen_clip(p) {
                    Some(parent_clip) => {
                        let clip = own.intersect(parent_clip);
                        (clip, !clip.is_empty())
                    }
                    None => (Rect::zero(), false),
                },
                None => (own, !own.is_empty()),
            }
        };
        node.clip.set(ClipState {
            rect,
            visible,
            dirty: false,
        });
        visible.then_some(rect)
    }

    /// Mark the clip caches stale for a node, its ancestors and its entire
    /// subtree, and flag the node and its parent for redraw. Deliberately
    /// conservative: a single geometry change dirties the whole chain rather
    /// than tracking exactly which caches are affected.
    pub(crate) fn invalidate_clip(&self, id: NodeId) {
        let Some(node) = self.node(id) else {
            return;
        };
        node.needs_redraw.set(true);
        let mut cursor = node.parent;
        if let Some(p) = cursor
            && let Some(parent) = self.node(p)
        {
            parent.needs_redraw.set(true);
        }
        while let Some(c) = cursor {
            let Some(n) = self.node(c) else {
                break;
            };
            let mut st = n.clip.get();
            st.dirty = true;
            n.clip.set(st);
            cursor = n.parent;
        }
        let mut stack = vec![id];
        while let Some(c) = stack.pop() {
            let Some(n) = self.node(c) else {
                continue;
            };
            let mut st = n.clip.get();
            st.dirty = true;
            n.clip.set(st);
            stack.extend_from_slice(&n.children);
        }
    }
}
