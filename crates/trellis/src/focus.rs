//! Focus chain management and keyboard routing.
//!
//! Focus is stored per node as a contains-focus flag. The flagged nodes form
//! a single unbroken chain from a root down to one leaf, and that leaf is
//! the focused node. Keyboard input is delivered to the leaf first and then
//! bubbles up the chain until a handler claims it.

use tracing::trace;

use crate::{
    error::Result,
    event::key::Key,
    events::{FocusChangedArgs, KeyArgs},
    id::NodeId,
    tree::Tree,
};

/// Which keyboard notification to route.
#[derive(Debug, Clone, Copy)]
enum KeyKind {
    Down,
    Up,
    Press,
}

impl Tree {
    /// The focused leaf under a root: the deepest node on the contains-focus
    /// chain. `None` if the root is not on the chain.
    pub fn focused(&self, root: NodeId) -> Option<NodeId> {
        let node = self.node(root)?;
        if !node.contains_focus() {
            return None;
        }
        Some(self.focus_leaf_from(root))
    }

    /// Walk down from a contains-focus node to the chain's leaf.
    fn focus_leaf_from(&self, id: NodeId) -> NodeId {
        let mut cursor = id;
        loop {
            let Some(node) = self.node(cursor) else {
                return cursor;
            };
            let next = node
                .children()
                .iter()
                .copied()
                .find(|&c| self.node(c).is_some_and(|n| n.contains_focus()));
            match next {
                Some(child) => cursor = child,
                None => return cursor,
            }
        }
    }

    /// The node and its ancestors, leaf first.
    fn ancestor_chain(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut cursor = Some(id);
        while let Some(c) = cursor {
            chain.push(c);
            cursor = self.node(c).and_then(|n| n.parent());
        }
        chain
    }

    /// Move focus to a node. A soft no-op if the node's widget does not
    /// accept focus. Every node leaving the chain is cleared leaf-to-root and
    /// every node joining it is set root-to-leaf, with a focus-changed
    /// notification on each transition; ancestors are flagged as
    /// contains-focus transitions, the leaves are not.
    pub fn focus(&mut self, id: NodeId) -> Result<()> {
        self.try_node(id)?;
        let accepts = self
            .with_widget(id, |w, _| w.accept_focus())
            .unwrap_or(false);
        if !accepts {
            return Ok(());
        }
        let new_chain = self.ancestor_chain(id);
        let root = *new_chain.last().unwrap_or(&id);
        let old = self.focused(root);
        if old == Some(id) {
            return Ok(());
        }
        trace!(from = ?old, to = ?id, "focus change");
        let args = |n: NodeId| FocusChangedArgs {
            old,
            new: Some(id),
            contains_focus: n != id && Some(n) != old,
        };

        if let Some(old_leaf) = old {
            for n in self.ancestor_chain(old_leaf) {
                if new_chain.contains(&n) {
                    break;
                }
                if let Some(node) = self.node_mut(n) {
                    node.contains_focus = false;
                }
                if let Some(node) = self.node(n) {
                    let obs = node.events().focus_changed.clone();
                    obs.notify(&args(n));
                }
            }
        }
        for &n in new_chain.iter().rev() {
            let already = self.node(n).is_some_and(|node| node.contains_focus());
            if let Some(node) = self.node_mut(n) {
                node.contains_focus = true;
            }
            if !already || n == id || Some(n) == old {
                if let Some(node) = self.node(n) {
                    let obs = node.events().focus_changed.clone();
                    obs.notify(&args(n));
                }
            }
        }
        Ok(())
    }

    /// Remove a node and its descendants from the focus chain. Ancestors stay
    /// on the chain, and the deepest remaining one becomes the focused leaf.
    /// A no-op if the node is not on the chain.
    pub fn unfocus(&mut self, id: NodeId) -> Result<()> {
        let node = self.try_node(id)?;
        if !node.contains_focus() {
            return Ok(());
        }
        let parent = node.parent();
        let old_leaf = self.focus_leaf_from(id);
        let new_leaf = parent.filter(|&p| self.node(p).is_some_and(|n| n.contains_focus()));
        trace!(from = ?old_leaf, to = ?new_leaf, "unfocus");
        let args = |n: NodeId| FocusChangedArgs {
            old: Some(old_leaf),
            new: new_leaf,
            contains_focus: n != old_leaf && Some(n) != new_leaf,
        };

        let mut cleared = Vec::new();
        let mut cursor = old_leaf;
        loop {
            cleared.push(cursor);
            if cursor == id {
                break;
            }
            match self.node(cursor).and_then(|n| n.parent()) {
                Some(p) => cursor = p,
                None => break,
            }
        }
        for n in cleared {
            if let Some(node) = self.node_mut(n) {
                node.contains_focus = false;
            }
            if let Some(node) = self.node(n) {
                let obs = node.events().focus_changed.clone();
                obs.notify(&args(n));
            }
        }
        if let Some(leaf) = new_leaf
            && let Some(node) = self.node(leaf)
        {
            let obs = node.events().focus_changed.clone();
            obs.notify(&args(leaf));
        }
        Ok(())
    }

    /// Route a key-down through the focus chain under a root. Returns true if
    /// a handler claimed it.
    pub fn key_down(&mut self, root: NodeId, key: Key) -> Result<bool> {
        self.route_key(root, key, KeyKind::Down)
    }

    /// Route a key-up through the focus chain under a root.
    pub fn key_up(&mut self, root: NodeId, key: Key) -> Result<bool> {
        self.route_key(root, key, KeyKind::Up)
    }

    /// Route a produced character through the focus chain under a root.
    pub fn key_press(&mut self, root: NodeId, key: Key) -> Result<bool> {
        self.route_key(root, key, KeyKind::Press)
    }

    fn route_key(&mut self, root: NodeId, key: Key, kind: KeyKind) -> Result<bool> {
        let chain = match self.focused(root) {
            Some(leaf) => self.ancestor_chain(leaf),
            None => vec![root],
        };
        let args = KeyArgs::new(key);
        for id in chain {
            if !self.effective_enabled(id) || !self.effective_visible(id) {
                continue;
            }
            if let Some(node) = self.node(id) {
                let obs = match kind {
                    KeyKind::Down => node.events().key_down.clone(),
                    KeyKind::Up => node.events().key_up.clone(),
                    KeyKind::Press => node.events().key_press.clone(),
                };
                obs.notify(&args);
            }
            if args.handled() {
                break;
            }
            let hook = self.with_widget(id, |w, t| match kind {
                KeyKind::Down => w.on_key_down(t, id, &args),
                KeyKind::Up => w.on_key_up(t, id, &args),
                KeyKind::Press => w.on_key_press(t, id, &args),
            });
            if let Some(result) = hook {
                result?;
            }
            if args.handled() {
                break;
            }
        }
        Ok(args.handled())
    }
}
