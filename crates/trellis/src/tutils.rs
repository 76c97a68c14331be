//! Utilities for testing trees and widgets.

use std::{cell::RefCell, rc::Rc};

use geom::{Affine, Point, Rect};

use crate::{
    error::Result,
    event::mouse::{MouseEvent, WheelEvent},
    events::KeyArgs,
    id::NodeId,
    state::NodeName,
    tree::Tree,
    widget::{DrawSurface, Pane, Widget},
};

/// A shared, ordered log of event strings.
pub type Log = Rc<RefCell<Vec<String>>>;

/// An empty shared log.
pub fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

/// Create a passive pane node with the given bounds.
pub fn pane(tree: &mut Tree, bounds: Rect) -> Result<NodeId> {
    let id = tree.create(Pane);
    tree.set_local_bounds(id, bounds)?;
    Ok(id)
}

/// A widget that records every hook invocation into a shared log, tagged with
/// its name.
pub struct Recorder {
    /// Tag used as the node name and log prefix.
    tag: String,
    /// Whether this widget takes focus on click.
    accept_focus: bool,
    /// Shared log.
    log: Log,
    /// Local-space positions of received mouse events, in order.
    positions: Rc<RefCell<Vec<Point>>>,
}

impl Recorder {
    /// A recorder writing into a shared log.
    pub fn new(tag: &str, log: &Log) -> Self {
        Self {
            tag: tag.into(),
            accept_focus: false,
            log: Rc::clone(log),
            positions: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Make the recorder accept focus.
    pub fn focusable(mut self) -> Self {
        self.accept_focus = true;
        self
    }

    /// Handle to the recorded mouse-event positions.
    pub fn positions(&self) -> Rc<RefCell<Vec<Point>>> {
        Rc::clone(&self.positions)
    }

    fn record(&self, what: &str) {
        self.log.borrow_mut().push(format!("{}:{}", self.tag, what));
    }
}

impl Widget for Recorder {
    fn name(&self) -> NodeName {
        NodeName::convert(&self.tag)
    }

    fn accept_focus(&self) -> bool {
        self.accept_focus
    }

    fn on_mouse_down(&mut self, _tree: &mut Tree, _id: NodeId, ev: &MouseEvent) -> Result<()> {
        self.record("mouse_down");
        self.positions.borrow_mut().push(ev.position);
        Ok(())
    }

    fn on_mouse_move(&mut self, _tree: &mut Tree, _id: NodeId, ev: &MouseEvent) -> Result<()> {
        self.record("mouse_move");
        self.positions.borrow_mut().push(ev.position);
        Ok(())
    }

    fn on_mouse_up(&mut self, _tree: &mut Tree, _id: NodeId, ev: &MouseEvent) -> Result<()> {
        self.record("mouse_up");
        self.positions.borrow_mut().push(ev.position);
        Ok(())
    }

    fn on_click(&mut self, _tree: &mut Tree, _id: NodeId, _ev: &MouseEvent) -> Result<()> {
        self.record("click");
        Ok(())
    }

    fn on_wheel(&mut self, _tree: &mut Tree, _id: NodeId, _ev: &WheelEvent) -> Result<()> {
        self.record("wheel");
        Ok(())
    }

    fn on_key_down(&mut self, _tree: &mut Tree, _id: NodeId, _args: &KeyArgs) -> Result<()> {
        self.record("key_down");
        Ok(())
    }

    fn on_key_up(&mut self, _tree: &mut Tree, _id: NodeId, _args: &KeyArgs) -> Result<()> {
        self.record("key_up");
        Ok(())
    }

    fn on_key_press(&mut self, _tree: &mut Tree, _id: NodeId, _args: &KeyArgs) -> Result<()> {
        self.record("key_press");
        Ok(())
    }
}

/// Subscribe enter/leave observers on a node, writing tagged entries into the
/// shared log.
pub fn track_hover(tree: &Tree, id: NodeId, tag: &str, log: &Log) {
    let Some(node) = tree.node(id) else {
        return;
    };
    let events = node.events();
    for (obs, what) in [
        (&events.mouse_enter_bounds, "enter_bounds"),
        (&events.mouse_leave_bounds, "leave_bounds"),
        (&events.mouse_enter, "enter"),
        (&events.mouse_leave, "leave"),
    ] {
        let log = Rc::clone(log);
        let entry = format!("{tag}:{what}");
        obs.subscribe(move |()| log.borrow_mut().push(entry.clone()));
    }
}

/// Subscribe a focus-changed observer on a node, writing tagged entries into
/// the shared log.
pub fn track_focus(tree: &Tree, id: NodeId, tag: &str, log: &Log) {
    let Some(node) = tree.node(id) else {
        return;
    };
    let log = Rc::clone(log);
    let tag = tag.to_string();
    node.events().focus_changed.subscribe(move |args| {
        let kind = if args.contains_focus {
            "contains_focus"
        } else {
            "focus"
        };
        log.borrow_mut().push(format!("{tag}:{kind}"));
    });
}

/// A surface that records the transforms and clips set during a draw pass.
#[derive(Debug, Default)]
pub struct TestSurface {
    /// Transforms in the order they were set.
    pub transforms: Vec<Affine>,
    /// Clips in the order they were set.
    pub clips: Vec<Rect>,
}

impl DrawSurface for TestSurface {
    fn set_transform(&mut self, transform: Affine) {
        self.transforms.push(transform);
    }

    fn set_clip(&mut self, clip: Rect) {
        self.clips.push(clip);
    }
}
