/// Edge insets used for margins, borders and padding.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Insets {
    /// Left edge inset.
    pub left: f64,
    /// Right edge inset.
    pub right: f64,
    /// Top edge inset.
    pub top: f64,
    /// Bottom edge inset.
    pub bottom: f64,
}

impl Insets {
    /// Construct insets from individual edges.
    pub fn new(left: f64, right: f64, top: f64, bottom: f64) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    /// The same inset on all four edges.
    pub fn uniform(v: f64) -> Self {
        Self::new(v, v, v, v)
    }

    /// Zero insets.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Total horizontal inset.
    pub fn width(&self) -> f64 {
        self.left + self.right
    }

    /// Total vertical inset.
    pub fn height(&self) -> f64 {
        self.top + self.bottom
    }

    /// Scale all edges by a factor.
    pub fn scale(&self, factor: f64) -> Self {
        Self::new(
            self.left * factor,
            self.right * factor,
            self.top * factor,
            self.bottom * factor,
        )
    }

    /// Round all edges to the nearest integer.
    pub fn round(&self) -> Self {
        Self::new(
            self.left.round(),
            self.right.round(),
            self.top.round(),
            self.bottom.round(),
        )
    }
}

impl From<f64> for Insets {
    fn from(v: f64) -> Self {
        Self::uniform(v)
    }
}

impl From<(f64, f64, f64, f64)> for Insets {
    fn from(v: (f64, f64, f64, f64)) -> Self {
        Self::new(v.0, v.1, v.2, v.3)
    }
}
