//! Notification surface: ordered observer lists and the per-node event set.

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
};

use geom::{Point, Rect};

use crate::{
    event::{key::Key, mouse::MouseEvent},
    id::NodeId,
    layout::LayoutCause,
};

/// Handle returned by [`Observers::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

/// One registered observer.
struct Entry<T> {
    /// Subscription identifier.
    id: u64,
    /// The callback. Kept behind an `Rc` so it can be invoked without holding
    /// the list borrow.
    cb: Rc<RefCell<dyn FnMut(&T)>>,
    /// Tombstone set by unsubscribe during iteration.
    dead: bool,
}

/// Shared observer list state.
struct Inner<T> {
    /// Next subscription identifier.
    next_id: u64,
    /// Registered observers in subscription order.
    entries: Vec<Entry<T>>,
    /// Nesting depth of in-progress notify calls.
    firing: u32,
}

/// An ordered list of callbacks with deterministic invocation order.
///
/// Observers fire in registration order. Unsubscribing is safe during
/// iteration: the entry is tombstoned and swept once the outermost notify
/// finishes. The handle is cheap to clone; clones share the same list.
pub struct Observers<T> {
    /// Shared list state.
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for Observers<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> Default for Observers<T> {
    fn default() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                next_id: 0,
                entries: Vec::new(),
                firing: 0,
            })),
        }
    }
}

impl<T> fmt::Debug for Observers<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("len", &self.len())
            .finish()
    }
}

impl<T> Observers<T> {
    /// Construct an empty observer list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback. Returns a handle that can be used to unsubscribe.
    pub fn subscribe(&self, cb: impl FnMut(&T) + 'static) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.entries.push(Entry {
            id,
            cb: Rc::new(RefCell::new(cb)),
            dead: false,
        });
        Subscription(id)
    }

    /// Remove a callback. Returns true if the subscription was present. Safe
    /// to call from inside a callback.
    pub fn unsubscribe(&self, sub: Subscription) -> bool {
        let mut inner = self.inner.borrow_mut();
        let Some(pos) = inner.entries.iter().position(|e| e.id == sub.0) else {
            return false;
        };
        if inner.entries[pos].dead {
            return false;
        }
        if inner.firing > 0 {
            inner.entries[pos].dead = true;
        } else {
            inner.entries.remove(pos);
        }
        true
    }

    /// Number of live observers.
    pub fn len(&self) -> usize {
        self.inner.borrow().entries.iter().filter(|e| !e.dead).count()
    }

    /// True if no observers are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invoke every live observer in registration order. Observers registered
    /// while a notify is in progress are not invoked until the next notify.
    pub fn notify(&self, args: &T) {
        let initial = {
            let mut inner = self.inner.borrow_mut();
            inner.firing += 1;
            inner.entries.len()
        };
        let mut i = 0;
        while i < initial {
            let cb = {
                let inner = self.inner.borrow();
                let entry = &inner.entries[i];
                if entry.dead {
                    None
                } else {
                    Some(Rc::clone(&entry.cb))
                }
            };
            if let Some(cb) = cb {
                (cb.borrow_mut())(args);
            }
            i += 1;
        }
        let mut inner = self.inner.borrow_mut();
        inner.firing -= 1;
        if inner.firing == 0 {
            inner.entries.retain(|e| !e.dead);
        }
    }
}

/// Arguments for bounds and size change notifications.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsChangedArgs {
    /// Previous local bounds.
    pub old: Rect,
    /// New local bounds.
    pub new: Rect,
}

/// Arguments for position change notifications.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionChangedArgs {
    /// Previous origin relative to the parent.
    pub old: Point,
    /// New origin relative to the parent.
    pub new: Point,
}

/// Arguments for structural child notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildArgs {
    /// The child that was added or removed.
    pub child: NodeId,
}

/// Arguments for parent change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentChangedArgs {
    /// Previous parent, if any.
    pub old: Option<NodeId>,
    /// New parent, if any.
    pub new: Option<NodeId>,
}

/// Arguments for the focus-changed notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusChangedArgs {
    /// Previously focused node, if any.
    pub old: Option<NodeId>,
    /// Newly focused node, if any.
    pub new: Option<NodeId>,
    /// True when this notification reports a contains-focus transition on an
    /// ancestor rather than the leaf focus change itself.
    pub contains_focus: bool,
}

/// Arguments for layout notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutArgs {
    /// What triggered the layout pass.
    pub cause: LayoutCause,
    /// The child that caused the pass, if any.
    pub child: Option<NodeId>,
}

/// Arguments for mouse notifications.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseArgs {
    /// The event, with the position in the node's local space.
    pub event: MouseEvent,
}

/// Arguments for wheel notifications.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelArgs {
    /// Scroll delta; positive values scroll down.
    pub delta: f64,
    /// Pointer position in the node's local space.
    pub position: Point,
}

/// Arguments for keyboard notifications, carrying a mutable handled flag.
#[derive(Debug, Clone)]
pub struct KeyArgs {
    /// The key input.
    pub key: Key,
    /// Set by a handler to stop further routing.
    handled: Cell<bool>,
}

impl KeyArgs {
    /// Construct unhandled key arguments.
    pub fn new(key: Key) -> Self {
        Self {
            key,
            handled: Cell::new(false),
        }
    }

    /// Has a handler claimed this event?
    pub fn handled(&self) -> bool {
        self.handled.get()
    }

    /// Claim this event, stopping further routing.
    pub fn set_handled(&self) {
        self.handled.set(true);
    }
}

/// The typed notification surface exposed by every node.
#[derive(Default)]
pub struct NodeEvents {
    /// A layout pass ran on this node.
    pub layout: Observers<LayoutArgs>,
    /// Local bounds changed.
    pub bounds_changed: Observers<BoundsChangedArgs>,
    /// Size component of the local bounds changed.
    pub size_changed: Observers<BoundsChangedArgs>,
    /// Origin relative to the parent changed.
    pub position_changed: Observers<PositionChangedArgs>,
    /// A child was added.
    pub child_added: Observers<ChildArgs>,
    /// A child was removed.
    pub child_removed: Observers<ChildArgs>,
    /// The parent link changed.
    pub parent_changed: Observers<ParentChangedArgs>,
    /// Focus moved to or away from this node.
    pub focus_changed: Observers<FocusChangedArgs>,
    /// The pointer entered this node's bounds (it may be covered by a child).
    pub mouse_enter_bounds: Observers<()>,
    /// The pointer left this node's bounds.
    pub mouse_leave_bounds: Observers<()>,
    /// This node became the topmost node under the pointer.
    pub mouse_enter: Observers<()>,
    /// This node stopped being the topmost node under the pointer.
    pub mouse_leave: Observers<()>,
    /// A mouse-down landed on this node and no child accepted it.
    pub mouse_down_captured: Observers<MouseArgs>,
    /// A mouse-up was delivered to this node while it held capture.
    pub mouse_up_captured: Observers<MouseArgs>,
    /// Pointer movement was delivered to this node.
    pub mouse_move: Observers<MouseArgs>,
    /// A full press-release happened inside this node's bounds.
    pub click: Observers<MouseArgs>,
    /// Wheel input was delivered to this node.
    pub wheel: Observers<WheelArgs>,
    /// A key was pressed while this node was on the focus chain.
    pub key_down: Observers<KeyArgs>,
    /// A key was released while this node was on the focus chain.
    pub key_up: Observers<KeyArgs>,
    /// A character was produced while this node was on the focus chain.
    pub key_press: Observers<KeyArgs>,
    /// The node was closed.
    pub closed: Observers<()>,
}

impl fmt::Debug for NodeEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeEvents").finish_non_exhaustive()
    }
}
