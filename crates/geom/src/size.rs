use super::{Point, Rect};

/// A `Size` is a rectangle that has a width and height but no location.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
}

impl Size {
    /// Construct a size from a width and height.
    pub fn new(w: f64, h: f64) -> Self {
        Self { w, h }
    }

    /// A zero-valued size.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Return a `Rect` with the same dimensions as the `Size`, located at (0, 0).
    pub fn rect(&self) -> Rect {
        Rect {
            tl: Point::zero(),
            w: self.w,
            h: self.h,
        }
    }

    /// True if this size can completely enclose the target size in both dimensions.
    pub fn contains(&self, other: &Self) -> bool {
        self.w >= other.w && self.h >= other.h
    }

    /// Component-wise maximum of two sizes.
    pub fn max(&self, other: Self) -> Self {
        Self {
            w: self.w.max(other.w),
            h: self.h.max(other.h),
        }
    }

    /// Component-wise minimum of two sizes.
    pub fn min(&self, other: Self) -> Self {
        Self {
            w: self.w.min(other.w),
            h: self.h.min(other.h),
        }
    }

    /// Clamp a size so it falls between `lo` and `hi` component-wise.
    pub fn clamp(&self, lo: Self, hi: Self) -> Self {
        Self {
            w: self.w.clamp(lo.w, hi.w),
            h: self.h.clamp(lo.h, hi.h),
        }
    }
}

impl From<Rect> for Size {
    fn from(r: Rect) -> Self {
        Self { w: r.w, h: r.h }
    }
}

impl From<(f64, f64)> for Size {
    fn from(v: (f64, f64)) -> Self {
        Self { w: v.0, h: v.1 }
    }
}
