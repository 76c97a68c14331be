use geom::Point;

use crate::event::key;

/// Mouse button codes.
#[derive(Debug, PartialOrd, PartialEq, Eq, Clone, Copy, Hash, Default)]
pub enum Button {
    /// Left mouse button.
    #[default]
    Left,
    /// Right mouse button.
    Right,
    /// Middle mouse button.
    Middle,
}

/// A mouse button event. The position is in the local coordinate space of the
/// node receiving the event; platform code supplies it in the root's space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseEvent {
    /// Mouse button.
    pub button: Button,
    /// Keyboard modifiers.
    pub mods: key::Mods,
    /// Pointer location.
    pub position: Point,
}

impl MouseEvent {
    /// A left-button event at a location with no modifiers.
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            button: Button::Left,
            mods: key::Empty,
            position: Point::new(x, y),
        }
    }

    /// Return the event with a different button.
    pub fn with_button(mut self, button: Button) -> Self {
        self.button = button;
        self
    }

    /// Return the event with a different position.
    pub fn with_position(mut self, position: Point) -> Self {
        self.position = position;
        self
    }
}

/// A scroll wheel event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelEvent {
    /// Scroll delta; positive values scroll down.
    pub delta: f64,
    /// Keyboard modifiers.
    pub mods: key::Mods,
    /// Pointer location.
    pub position: Point,
}

impl WheelEvent {
    /// A wheel event at a location with no modifiers.
    pub fn at(x: f64, y: f64, delta: f64) -> Self {
        Self {
            delta,
            mods: key::Empty,
            position: Point::new(x, y),
        }
    }

    /// Return the event with a different position.
    pub fn with_position(mut self, position: Point) -> Self {
        self.position = position;
        self
    }
}
