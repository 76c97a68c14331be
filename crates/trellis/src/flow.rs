//! A wrapping flow layout engine.
//!
//! Items are laid out left to right and wrapped into rows when they run out
//! of horizontal room. Each row is materialized as a real `flow_row` node
//! owned by the engine; items are reparented into rows on every reflow, and
//! the previous generation of rows is torn down first. An item that exactly
//! fills the remaining room stays on the current row; wrapping needs a
//! strict overflow.

use geom::{Point, Rect, Size};
use tracing::trace;

use crate::{
    error::Result,
    id::NodeId,
    layout::{LayoutEngine, LayoutEvent},
    tree::Tree,
    widget::Widget,
};

/// Distribution of leftover horizontal room within a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpacerMode {
    /// Rows are packed to the left.
    #[default]
    None,
    /// Leftover room is split evenly into the gaps between items.
    Proportional,
    /// The whole row is centered.
    Centered,
}

/// One flow item: a node plus its wrapping behavior.
#[derive(Debug, Clone, Copy)]
pub struct FlowItem {
    /// The node to place.
    pub node: NodeId,
    /// Always start a new row at this item.
    pub force_break: bool,
    /// Drop this item when it would start a row, like a space at a line
    /// break.
    pub skip_if_first: bool,
}

impl FlowItem {
    /// A plain item with default wrapping behavior.
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            force_break: false,
            skip_if_first: false,
        }
    }

    /// Always start a new row at this item.
    pub fn with_break(mut self) -> Self {
        self.force_break = true;
        self
    }

    /// Drop this item when it would start a row.
    pub fn skippable(mut self) -> Self {
        self.skip_if_first = true;
        self
    }
}

/// The container widget for one materialized row.
#[derive(Debug, Default, Clone, Copy)]
pub struct FlowRow;

impl Widget for FlowRow {}

/// A layout engine that wraps its items into rows within the owner's content
/// box.
#[derive(Default)]
pub struct FlowLayout {
    /// Items in flow order.
    items: Vec<FlowItem>,
    /// Materialized row nodes from the last reflow, top to bottom.
    rows: Vec<NodeId>,
    /// Guard against re-entrant reflow.
    in_progress: bool,
    /// A reflow arrived while one was running; rerun once at the end.
    pending: bool,
    /// Leftover-room distribution.
    spacing: SpacerMode,
}

impl FlowLayout {
    /// An empty flow with packed rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty flow with the given leftover-room distribution.
    pub fn with_spacing(spacing: SpacerMode) -> Self {
        Self {
            spacing,
            ..Self::default()
        }
    }

    /// The items in flow order.
    pub fn items(&self) -> &[FlowItem] {
        &self.items
    }

    /// The materialized row nodes, top to bottom.
    pub fn rows(&self) -> &[NodeId] {
        &self.rows
    }

    /// Append an item and reflow.
    pub fn add(&mut self, tree: &mut Tree, owner: NodeId, item: FlowItem) -> Result<()> {
        self.items.push(item);
        self.reflow(tree, owner)
    }

    /// Remove an item and reflow. The node itself stays alive, detached.
    pub fn remove(&mut self, tree: &mut Tree, owner: NodeId, node: NodeId) -> Result<()> {
        self.items.retain(|i| i.node != node);
        self.reflow(tree, owner)
    }

    /// Remove every item and tear down the rows.
    pub fn clear(&mut self, tree: &mut Tree, owner: NodeId) -> Result<()> {
        self.items.clear();
        self.reflow(tree, owner)
    }

    /// Rebuild the rows from scratch. A reflow requested while one is in
    /// progress is coalesced into a single rerun at the end.
    pub fn reflow(&mut self, tree: &mut Tree, owner: NodeId) -> Result<()> {
        if self.in_progress {
            self.pending = true;
            return Ok(());
        }
        self.in_progress = true;
        let result = tree.with_layout_locked(|tree| self.rebuild(tree, owner));
        self.in_progress = false;
        result?;
        while self.pending {
            self.pending = false;
            self.in_progress = true;
            let result = tree.with_layout_locked(|tree| self.rebuild(tree, owner));
            self.in_progress = false;
            result?;
        }
        Ok(())
    }

    fn rebuild(&mut self, tree: &mut Tree, owner: NodeId) -> Result<()> {
        // Tear down the previous generation of rows, handing the items back.
        for &row in &self.rows.clone() {
            let children = tree.node(row).map(|n| n.children().to_vec()).unwrap_or_default();
            for child in children {
                tree.remove_child(row, child)?;
                tree.clear_removed_flag(child)?;
            }
            tree.close(row)?;
        }
        self.rows.clear();
        self.items
            .retain(|i| tree.node(i.node).is_some_and(|n| !n.closed()));

        let Some(node) = tree.node(owner) else {
            return Ok(());
        };
        let content = node.content_box();
        let avail = content.w;
        trace!(owner = ?owner, avail, items = self.items.len(), "reflow");

        // Partition items into rows.
        let mut rows: Vec<Vec<(FlowItem, Size)>> = Vec::new();
        let mut current: Vec<(FlowItem, Size)> = Vec::new();
        let mut x = 0.0;
        for &item in &self.items {
            let Some(n) = tree.node(item.node) else {
                continue;
            };
            let size = Size::new(
                n.local_bounds().w + n.margin().width(),
                n.local_bounds().h + n.margin().height(),
            );
            let wraps = item.force_break || (!current.is_empty() && x + size.w > avail);
            if wraps {
                rows.push(std::mem::take(&mut current));
                x = 0.0;
            }
            if item.skip_if_first && current.is_empty() {
                continue;
            }
            x += size.w;
            current.push((item, size));
        }
        if !current.is_empty() {
            rows.push(current);
        }

        // Materialize a node per row and parent the items into it.
        let mut y = content.top();
        for row_items in rows {
            let row_w: f64 = row_items.iter().map(|(_, s)| s.w).sum();
            let row_h = row_items
                .iter()
                .map(|(_, s)| s.h)
                .fold(0.0_f64, f64::max);
            let leftover = (avail - row_w).max(0.0);
            let (mut x, gap) = match self.spacing {
                SpacerMode::None => (0.0, 0.0),
                SpacerMode::Centered => (leftover / 2.0, 0.0),
                SpacerMode::Proportional => {
                    if leftover > 0.0 && row_items.len() > 1 {
                        (0.0, leftover / (row_items.len() - 1) as f64)
                    } else {
                        (0.0, 0.0)
                    }
                }
            };

            let row = tree.create(FlowRow);
            tree.set_local_bounds(row, Rect::new(0.0, 0.0, avail, row_h))?;
            tree.add_child(owner, row)?;
            tree.set_origin(row, Point::new(content.left(), y))?;
            self.rows.push(row);

            for (item, size) in row_items {
                let Some(n) = tree.node(item.node) else {
                    continue;
                };
                let margin = n.margin();
                let bounds = n.local_bounds();
                if n.removed() {
                    tree.clear_removed_flag(item.node)?;
                }
                tree.add_child(row, item.node)?;
                tree.set_origin(
                    item.node,
                    Point::new(x + margin.left - bounds.left(), margin.top - bounds.top()),
                )?;
                x += size.w + gap;
            }
            y += row_h;
        }
        Ok(())
    }
}

impl LayoutEngine for FlowLayout {
    fn layout(&mut self, tree: &mut Tree, ev: LayoutEvent) -> Result<()> {
        self.reflow(tree, ev.owner)
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
