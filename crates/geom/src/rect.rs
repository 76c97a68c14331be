use super::{Insets, Point, Size};

/// A rectangle located in 2D space, defined by its top-left corner and
/// dimensions. Coordinates are y-down.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Top-left corner.
    pub tl: Point,
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
}

impl Rect {
    /// Construct a rect from a top-left corner and dimensions.
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            tl: Point { x, y },
            w,
            h,
        }
    }

    /// A zero-sized rect at the origin.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Left edge coordinate.
    pub fn left(&self) -> f64 {
        self.tl.x
    }

    /// Right edge coordinate.
    pub fn right(&self) -> f64 {
        self.tl.x + self.w
    }

    /// Top edge coordinate.
    pub fn top(&self) -> f64 {
        self.tl.y
    }

    /// Bottom edge coordinate.
    pub fn bottom(&self) -> f64 {
        self.tl.y + self.h
    }

    /// The size of this rect.
    pub fn size(&self) -> Size {
        Size {
            w: self.w,
            h: self.h,
        }
    }

    /// True if the rect has no area.
    pub fn is_empty(&self) -> bool {
        self.w <= 0.0 || self.h <= 0.0
    }

    /// Return a rect with the same size located at a new top-left corner.
    pub fn at(&self, tl: Point) -> Self {
        Self {
            tl,
            w: self.w,
            h: self.h,
        }
    }

    /// Return a rect with the same location and a new size.
    pub fn with_size(&self, size: Size) -> Self {
        Self {
            tl: self.tl,
            w: size.w,
            h: size.h,
        }
    }

    /// Does this rect contain the point? Containment is half-open: the left
    /// and top edges are inside, the right and bottom edges are not.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left() && p.x < self.right() && p.y >= self.top() && p.y < self.bottom()
    }

    /// The intersection of two rects. Empty if they do not overlap.
    pub fn intersect(&self, other: Self) -> Self {
        let left = self.left().max(other.left());
        let top = self.top().max(other.top());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= left || bottom <= top {
            Self::zero()
        } else {
            Self::new(left, top, right - left, bottom - top)
        }
    }

    /// The smallest rect enclosing both rects. An empty rect is treated as the
    /// identity for union.
    pub fn union(&self, other: Self) -> Self {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return *self;
        }
        let left = self.left().min(other.left());
        let top = self.top().min(other.top());
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Self::new(left, top, right - left, bottom - top)
    }

    /// Grow the rect outward by the given insets.
    pub fn inflate(&self, insets: Insets) -> Self {
        Self::new(
            self.left() - insets.left,
            self.top() - insets.top,
            self.w + insets.width(),
            self.h + insets.height(),
        )
    }

    /// Shrink the rect inward by the given insets. Dimensions are floored at
    /// zero.
    pub fn shrink(&self, insets: Insets) -> Self {
        Self::new(
            self.left() + insets.left,
            self.top() + insets.top,
            (self.w - insets.width()).max(0.0),
            (self.h - insets.height()).max(0.0),
        )
    }

    /// Translate the rect by an offset.
    pub fn translate(&self, offset: Point) -> Self {
        self.at(self.tl + offset)
    }
}

impl From<(f64, f64, f64, f64)> for Rect {
    fn from(v: (f64, f64, f64, f64)) -> Self {
        Self::new(v.0, v.1, v.2, v.3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_half_open() {
        let r = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert!(r.contains(Point::new(10.0, 10.0)));
        assert!(r.contains(Point::new(29.9, 29.9)));
        assert!(!r.contains(Point::new(30.0, 15.0)));
        assert!(!r.contains(Point::new(15.0, 30.0)));
        assert!(!r.contains(Point::new(9.9, 15.0)));
    }

    #[test]
    fn intersect_and_union() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert_eq!(a.intersect(b), Rect::new(5.0, 5.0, 5.0, 5.0));
        assert_eq!(a.union(b), Rect::new(0.0, 0.0, 15.0, 15.0));

        let c = Rect::new(20.0, 20.0, 5.0, 5.0);
        assert!(a.intersect(c).is_empty());
        assert_eq!(a.union(Rect::zero()), a);
    }

    #[test]
    fn inflate_shrink() {
        let r = Rect::new(10.0, 10.0, 20.0, 20.0);
        let insets = Insets::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(r.inflate(insets), Rect::new(9.0, 7.0, 23.0, 27.0));
        assert_eq!(r.inflate(insets).shrink(insets), r);
        assert!(r.shrink(Insets::uniform(15.0)).is_empty());
    }
}
