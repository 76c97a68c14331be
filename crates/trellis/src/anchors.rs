use bitflags::bitflags;

bitflags! {
    /// Horizontal anchor flags. Coordinates are y-down, so the near edge is
    /// the left edge.
    ///
    /// `LEFT` keeps the node's offset from the left edge. `RIGHT` sticks the
    /// node's margin box to the right edge of the parent content box.
    /// `STRETCH` (both edges) fills the content width. `FIT` sizes the node to
    /// enclose its own visible children. `FIT | STRETCH` takes the larger of
    /// the two computed widths, or the smaller when `MIN_FIT_OR_STRETCH` is
    /// also set.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct HAnchor: u8 {
        /// Keep the offset from the left (near) edge.
        const LEFT = 0b0000_0001;
        /// Center within the parent content box.
        const CENTER = 0b0000_0010;
        /// Stick to the right (far) edge.
        const RIGHT = 0b0000_0100;
        /// Size to enclose this node's own visible children.
        const FIT = 0b0000_1000;
        /// With `FIT | STRETCH`, take the smaller of the two widths instead of
        /// the larger.
        const MIN_FIT_OR_STRETCH = 0b0001_0000;
        /// Stretch to the parent content width.
        const STRETCH = Self::LEFT.bits() | Self::RIGHT.bits();
        /// Take the larger of the fit and stretch widths.
        const MAX_FIT_OR_STRETCH = Self::FIT.bits() | Self::STRETCH.bits();
    }
}

bitflags! {
    /// Vertical anchor flags. Coordinates are y-down, so the near edge is the
    /// top edge. See [`HAnchor`] for the semantics of each flag.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct VAnchor: u8 {
        /// Keep the offset from the top (near) edge.
        const TOP = 0b0000_0001;
        /// Center within the parent content box.
        const CENTER = 0b0000_0010;
        /// Stick to the bottom (far) edge.
        const BOTTOM = 0b0000_0100;
        /// Size to enclose this node's own visible children.
        const FIT = 0b0000_1000;
        /// With `FIT | STRETCH`, take the smaller of the two heights instead
        /// of the larger.
        const MIN_FIT_OR_STRETCH = 0b0001_0000;
        /// Stretch to the parent content height.
        const STRETCH = Self::TOP.bits() | Self::BOTTOM.bits();
        /// Take the larger of the fit and stretch heights.
        const MAX_FIT_OR_STRETCH = Self::FIT.bits() | Self::STRETCH.bits();
    }
}

impl HAnchor {
    /// True if the flags combine center anchoring with an edge, which is
    /// contradictory.
    pub fn is_conflicting(&self) -> bool {
        self.contains(Self::CENTER) && self.intersects(Self::LEFT | Self::RIGHT)
    }
}

impl VAnchor {
    /// True if the flags combine center anchoring with an edge, which is
    /// contradictory.
    pub fn is_conflicting(&self) -> bool {
        self.contains(Self::CENTER) && self.intersects(Self::TOP | Self::BOTTOM)
    }
}
