//! Mouse and wheel dispatch.
//!
//! Dispatch walks the tree from a root, hit testing children front-to-back
//! in each node's local coordinate space. A mouse-down establishes capture:
//! the accepting node becomes `ThisHasCaptured` and every ancestor on the
//! path `ChildHasCaptured`, routing all movement to the holder until the
//! matching mouse-up. Under-mouse state is maintained per node with
//! enter/leave notifications on every transition.

use geom::Point;
use scopeguard::guard;
use tracing::trace;

use crate::{
    error::{Error, Result},
    event::mouse::{MouseEvent, WheelEvent},
    events::{MouseArgs, WheelArgs},
    id::NodeId,
    state::{Capture, UnderMouse},
    tree::Tree,
};

impl Tree {
    /// Dispatch a mouse-down starting at a root. The event position is in the
    /// root's local space. Returns true if some node captured the press.
    pub fn mouse_down(&mut self, root: NodeId, ev: MouseEvent) -> Result<bool> {
        let mut focus_taken = false;
        self.mouse_down_node(root, ev, &mut focus_taken)
    }

    fn mouse_down_node(
        &mut self,
        id: NodeId,
        ev: MouseEvent,
        focus_taken: &mut bool,
    ) -> Result<bool> {
        let Some(node) = self.node(id) else {
            return Ok(false);
        };
        // A press while capture is held routes straight to the holder.
        match node.capture() {
            Capture::ChildHasCaptured => {
                let child = self.captured_child(id)?;
                let local = self.to_child_space(child, ev.position)?;
                self.mouse_down_node(child, ev.with_position(local), focus_taken)?;
                return Ok(true);
            }
            Capture::ThisHasCaptured => {
                if let Some(n) = self.node(id) {
                    let down = n.events().mouse_down_captured.clone();
                    down.notify(&MouseArgs { event: ev });
                }
                if let Some(result) = self.with_widget(id, |w, t| w.on_mouse_down(t, id, &ev)) {
                    result?;
                }
                return Ok(true);
            }
            Capture::NotCaptured => {}
        }
        if node.closed()
            || !node.visible()
            || !node.enabled()
            || !node.selectable()
            || !node.local_bounds().contains(ev.position)
        {
            self.mouse_moved_off(id);
            return Ok(false);
        }

        let children = node.children().to_vec();
        let mut target: Option<(NodeId, MouseEvent)> = None;
        for &child in children.iter().rev() {
            if target.is_none()
                && let Some(local) = self.hit_child(child, ev.position)
            {
                target = Some((child, ev.with_position(local)));
                continue;
            }
            self.mouse_moved_off(child);
        }

        self.set_under_mouse(
            id,
            if target.is_some() {
                UnderMouse::UnderNotFirst
            } else {
                UnderMouse::First
            },
        );

        match target {
            Some((child, child_ev)) => {
                if self.mouse_down_node(child, child_ev, focus_taken)? {
                    self.set_capture(id, Capture::ChildHasCaptured);
                    self.take_focus_if_accepting(id, focus_taken)?;
                } else {
                    self.capture_here(id, ev, focus_taken)?;
                }
            }
            None => self.capture_here(id, ev, focus_taken)?,
        }
        Ok(true)
    }

    /// Take capture on this node and deliver the press.
    fn capture_here(&mut self, id: NodeId, ev: MouseEvent, focus_taken: &mut bool) -> Result<()> {
        trace!(node = ?id, "mouse capture");
        self.set_capture(id, Capture::ThisHasCaptured);
        if let Some(node) = self.node(id) {
            let down = node.events().mouse_down_captured.clone();
            down.notify(&MouseArgs { event: ev });
        }
        if let Some(result) = self.with_widget(id, |w, t| w.on_mouse_down(t, id, &ev)) {
            result?;
        }
        self.take_focus_if_accepting(id, focus_taken)
    }

    /// Every node on the dispatch path offers to take focus on the unwind;
    /// the deepest accepting widget wins.
    fn take_focus_if_accepting(&mut self, id: NodeId, focus_taken: &mut bool) -> Result<()> {
        if *focus_taken {
            return Ok(());
        }
        let accepts = self
            .with_widget(id, |w, _| w.accept_focus())
            .unwrap_or(false);
        if accepts {
            self.focus(id)?;
            *focus_taken = true;
        }
        Ok(())
    }

    /// Dispatch pointer movement starting at a root. While capture is held
    /// the event routes straight down the capture path; otherwise it follows
    /// the hit test, and the topmost node under the pointer becomes `First`.
    pub fn mouse_move(&mut self, root: NodeId, ev: MouseEvent) -> Result<bool> {
        let mut accepted = false;
        self.mouse_move_node(root, ev, &mut accepted)
    }

    fn mouse_move_node(
        &mut self,
        id: NodeId,
        ev: MouseEvent,
        accepted: &mut bool,
    ) -> Result<bool> {
        let Some(node) = self.node(id) else {
            return Ok(false);
        };
        match node.capture() {
            Capture::ThisHasCaptured => {
                let inside = node.local_bounds().contains(ev.position);
                self.set_under_mouse(
                    id,
                    if inside {
                        UnderMouse::First
                    } else {
                        UnderMouse::NotUnder
                    },
                );
                if inside {
                    *accepted = true;
                }
                self.fire_mouse_move(id, ev)?;
                Ok(true)
            }
            Capture::ChildHasCaptured => {
                let child = self.captured_child(id)?;
                let local = self.to_child_space(child, ev.position)?;
                let inside = node.local_bounds().contains(ev.position);
                self.set_under_mouse(
                    id,
                    if inside {
                        UnderMouse::UnderNotFirst
                    } else {
                        UnderMouse::NotUnder
                    },
                );
                self.mouse_move_node(child, ev.with_position(local), accepted)?;
                Ok(true)
            }
            Capture::NotCaptured => {
                if node.closed()
                    || !node.visible()
                    || !node.enabled()
                    || !node.selectable()
                    || !node.local_bounds().contains(ev.position)
                {
                    self.mouse_moved_off(id);
                    return Ok(false);
                }
                let children = node.children().to_vec();
                let mut over_child = false;
                for &child in children.iter().rev() {
                    if let Some(local) = self.hit_child(child, ev.position) {
                        if self.mouse_move_node(child, ev.with_position(local), accepted)? {
                            over_child = true;
                        }
                    } else {
                        self.mouse_moved_off(child);
                    }
                }
                if over_child || *accepted {
                    self.set_under_mouse(id, UnderMouse::UnderNotFirst);
                } else {
                    self.set_under_mouse(id, UnderMouse::First);
                    *accepted = true;
                    self.fire_mouse_move(id, ev)?;
                }
                Ok(true)
            }
        }
    }

    /// Dispatch a mouse-up starting at a root. The event routes down the
    /// capture path; capture is released on the way back out, and a click is
    /// delivered if the release landed inside the holder's bounds. Structural
    /// mutation is locked out for the duration.
    pub fn mouse_up(&mut self, root: NodeId, ev: MouseEvent) -> Result<bool> {
        self.mouse_up_locks += 1;
        let mut tree = guard(self, |t| t.mouse_up_locks -= 1);
        tree.mouse_up_node(root, ev)
    }

    fn mouse_up_node(&mut self, id: NodeId, ev: MouseEvent) -> Result<bool> {
        let Some(node) = self.node(id) else {
            return Ok(false);
        };
        match node.capture() {
            // An uncaptured release follows the hit test like a press does,
            // landing on the deepest eligible node under the point.
            Capture::NotCaptured => {
                if node.closed()
                    || !node.visible()
                    || !node.enabled()
                    || !node.selectable()
                    || !node.local_bounds().contains(ev.position)
                {
                    return Ok(false);
                }
                let children = node.children().to_vec();
                for &child in children.iter().rev() {
                    if let Some(local) = self.hit_child(child, ev.position) {
                        return self.mouse_up_node(child, ev.with_position(local));
                    }
                }
                if let Some(n) = self.node(id) {
                    let up = n.events().mouse_up_captured.clone();
                    up.notify(&MouseArgs { event: ev });
                }
                if let Some(result) = self.with_widget(id, |w, t| w.on_mouse_up(t, id, &ev)) {
                    result?;
                }
                Ok(true)
            }
            Capture::ChildHasCaptured => {
                let child = self.captured_child(id)?;
                let local = self.to_child_space(child, ev.position)?;
                let handled = self.mouse_up_node(child, ev.with_position(local))?;
                self.set_capture(id, Capture::NotCaptured);
                Ok(handled)
            }
            Capture::ThisHasCaptured => {
                trace!(node = ?id, "mouse release");
                let inside = node.local_bounds().contains(ev.position);
                self.set_capture(id, Capture::NotCaptured);
                if let Some(node) = self.node(id) {
                    let up = node.events().mouse_up_captured.clone();
                    up.notify(&MouseArgs { event: ev });
                }
                if let Some(result) = self.with_widget(id, |w, t| w.on_mouse_up(t, id, &ev)) {
                    result?;
                }
                if inside {
                    if let Some(node) = self.node(id) {
                        let click = node.events().click.clone();
                        click.notify(&MouseArgs { event: ev });
                    }
                    if let Some(result) = self.with_widget(id, |w, t| w.on_click(t, id, &ev)) {
                        result?;
                    }
                }
                Ok(true)
            }
        }
    }

    /// Dispatch wheel input starting at a root. The capture holder gets it if
    /// one exists; otherwise it goes to the deepest eligible node under the
    /// pointer.
    pub fn wheel(&mut self, root: NodeId, ev: WheelEvent) -> Result<bool> {
        let Some(node) = self.node(root) else {
            return Ok(false);
        };
        match node.capture() {
            Capture::ChildHasCaptured => {
                let child = self.captured_child(root)?;
                let local = self.to_child_space(child, ev.position)?;
                self.wheel(child, ev.with_position(local))
            }
            Capture::ThisHasCaptured => {
                self.fire_wheel(root, ev)?;
                Ok(true)
            }
            Capture::NotCaptured => {
                if node.closed()
                    || !node.visible()
                    || !node.enabled()
                    || !node.selectable()
                    || !node.local_bounds().contains(ev.position)
                {
                    return Ok(false);
                }
                let children = node.children().to_vec();
                for &child in children.iter().rev() {
                    if let Some(local) = self.hit_child(child, ev.position)
                        && self.wheel(child, ev.with_position(local))?
                    {
                        return Ok(true);
                    }
                }
                self.fire_wheel(root, ev)?;
                Ok(true)
            }
        }
    }

    /// Recursively clear under-mouse state on a subtree, firing leave
    /// notifications on the way down.
    pub(crate) fn mouse_moved_off(&mut self, id: NodeId) {
        let Some(node) = self.node(id) else {
            return;
        };
        if node.under_mouse() == UnderMouse::NotUnder {
            return;
        }
        let children = node.children().to_vec();
        self.set_under_mouse(id, UnderMouse::NotUnder);
        for child in children {
            self.mouse_moved_off(child);
        }
    }

    /// Clear capture state for a node being detached: every capture mark in
    /// its subtree plus the chain of `ChildHasCaptured` ancestors above it.
    pub(crate) fn release_capture_on_detach(&mut self, id: NodeId) {
        let Some(node) = self.node(id) else {
            return;
        };
        if node.capture() == Capture::NotCaptured {
            return;
        }
        let mut cursor = node.parent();
        while let Some(c) = cursor {
            let Some(n) = self.node(c) else {
                break;
            };
            if n.capture() != Capture::ChildHasCaptured {
                break;
            }
            let parent = n.parent();
            self.set_capture(c, Capture::NotCaptured);
            cursor = parent;
        }
        let mut stack = vec![id];
        while let Some(c) = stack.pop() {
            let Some(n) = self.node(c) else {
                continue;
            };
            stack.extend_from_slice(n.children());
            self.set_capture(c, Capture::NotCaptured);
        }
    }

    /// The node holding mouse capture under a root, if any.
    pub fn capture_holder(&self, root: NodeId) -> Option<NodeId> {
        let node = self.node(root)?;
        match node.capture() {
            Capture::NotCaptured => None,
            Capture::ThisHasCaptured => Some(root),
            Capture::ChildHasCaptured => node
                .children()
                .iter()
                .find_map(|&c| self.capture_holder(c)),
        }
    }

    fn set_capture(&mut self, id: NodeId, capture: Capture) {
        if let Some(n) = self.node_mut(id) {
            n.capture = capture;
        }
    }

    /// The single captured child of a `ChildHasCaptured` node. Errors if the
    /// chain is inconsistent.
    fn captured_child(&self, id: NodeId) -> Result<NodeId> {
        let node = self.try_node(id)?;
        let captured: Vec<NodeId> = node
            .children()
            .iter()
            .copied()
            .filter(|&c| {
                self.node(c)
                    .is_some_and(|n| n.capture() != Capture::NotCaptured)
            })
            .collect();
        if captured.len() != 1 {
            return Err(Error::CaptureInvariant(format!(
                "{} reports a capturing child but has {}",
                node.name(),
                captured.len()
            )));
        }
        Ok(captured[0])
    }

    /// Convert a point from a node's parent space into the node's local
    /// space. Errors if the node's transform is singular.
    fn to_child_space(&self, child: NodeId, p: Point) -> Result<Point> {
        let node = self.try_node(child)?;
        Ok(node.transform().inverse()?.apply(p))
    }

    /// Hit test a child during non-captured dispatch: the child must be
    /// live, visible, enabled, selectable and contain the point. Returns the
    /// point in the child's local space on a hit. Children with singular
    /// transforms cannot be hit.
    fn hit_child(&self, child: NodeId, p: Point) -> Option<Point> {
        let node = self.node(child)?;
        if node.closed() || !node.visible() || !node.enabled() || !node.selectable() {
            return None;
        }
        let local = node.transform().inverse().ok()?.apply(p);
        node.local_bounds().contains(local).then_some(local)
    }

    /// Transition a node's under-mouse state, firing enter/leave
    /// notifications for each edge crossed.
    pub(crate) fn set_under_mouse(&mut self, id: NodeId, state: UnderMouse) {
        let Some(node) = self.node(id) else {
            return;
        };
        let old = node.under_mouse();
        if old == state {
            return;
        }
        let events = node.events();
        let leave = (old == UnderMouse::First).then(|| events.mouse_leave.clone());
        let leave_bounds = (state == UnderMouse::NotUnder).then(|| events.mouse_leave_bounds.clone());
        let enter_bounds = (old == UnderMouse::NotUnder).then(|| events.mouse_enter_bounds.clone());
        let enter = (state == UnderMouse::First).then(|| events.mouse_enter.clone());
        if let Some(n) = self.node_mut(id) {
            n.under_mouse = state;
        }
        if let Some(o) = leave {
            o.notify(&());
        }
        if let Some(o) = leave_bounds {
            o.notify(&());
        }
        if let Some(o) = enter_bounds {
            o.notify(&());
        }
        if let Some(o) = enter {
            o.notify(&());
        }
    }

    fn fire_mouse_move(&mut self, id: NodeId, ev: MouseEvent) -> Result<()> {
        if let Some(node) = self.node(id) {
            let moved = node.events().mouse_move.clone();
            moved.notify(&MouseArgs { event: ev });
        }
        if let Some(result) = self.with_widget(id, |w, t| w.on_mouse_move(t, id, &ev)) {
            result?;
        }
        Ok(())
    }

    fn fire_wheel(&mut self, id: NodeId, ev: WheelEvent) -> Result<()> {
        if let Some(node) = self.node(id) {
            let wheel = node.events().wheel.clone();
            wheel.notify(&WheelArgs {
                delta: ev.delta,
                position: ev.position,
            });
        }
        if let Some(result) = self.with_widget(id, |w, t| w.on_wheel(t, id, &ev)) {
            result?;
        }
        Ok(())
    }
}
