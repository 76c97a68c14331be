use std::ops::Mul;

use super::{Error, Point, Rect, Result};

/// A 2D affine transform, stored as the six coefficients
/// `[a, b, c, d, e, f]` of the matrix:
///
/// ```text
/// | a c e |
/// | b d f |
/// | 0 0 1 |
/// ```
///
/// Points transform as `x' = a*x + c*y + e`, `y' = b*x + d*y + f`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    coeffs: [f64; 6],
}

impl Affine {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        coeffs: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
    };

    /// Construct a transform from raw coefficients.
    pub fn new(coeffs: [f64; 6]) -> Self {
        Self { coeffs }
    }

    /// A pure translation.
    pub fn translate(offset: Point) -> Self {
        Self {
            coeffs: [1.0, 0.0, 0.0, 1.0, offset.x, offset.y],
        }
    }

    /// A rotation around the origin, in radians.
    pub fn rotate(theta: f64) -> Self {
        let (s, c) = theta.sin_cos();
        Self {
            coeffs: [c, s, -s, c, 0.0, 0.0],
        }
    }

    /// A uniform scale around the origin.
    pub fn scale(factor: f64) -> Self {
        Self {
            coeffs: [factor, 0.0, 0.0, factor, 0.0, 0.0],
        }
    }

    /// The raw coefficients.
    pub fn coeffs(&self) -> [f64; 6] {
        self.coeffs
    }

    /// The translation component of the transform.
    pub fn translation(&self) -> Point {
        Point {
            x: self.coeffs[4],
            y: self.coeffs[5],
        }
    }

    /// Return the transform with its translation component replaced.
    pub fn with_translation(&self, offset: Point) -> Self {
        let mut coeffs = self.coeffs;
        coeffs[4] = offset.x;
        coeffs[5] = offset.y;
        Self { coeffs }
    }

    /// Apply the transform to a point.
    pub fn apply(&self, p: Point) -> Point {
        let [a, b, c, d, e, f] = self.coeffs;
        Point {
            x: a * p.x + c * p.y + e,
            y: b * p.x + d * p.y + f,
        }
    }

    /// The determinant of the linear part.
    pub fn determinant(&self) -> f64 {
        let [a, b, c, d, _, _] = self.coeffs;
        a * d - b * c
    }

    /// Compute the inverse transform. Errors if the transform is singular.
    pub fn inverse(&self) -> Result<Self> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return Err(Error::NonInvertible);
        }
        let [a, b, c, d, e, f] = self.coeffs;
        let inv = det.recip();
        Ok(Self {
            coeffs: [
                d * inv,
                -b * inv,
                -c * inv,
                a * inv,
                (c * f - d * e) * inv,
                (b * e - a * f) * inv,
            ],
        })
    }

    /// The conservative axis-aligned bounding box of a transformed rect.
    pub fn transform_rect_bbox(&self, r: Rect) -> Rect {
        let corners = [
            self.apply(r.tl),
            self.apply(Point::new(r.right(), r.top())),
            self.apply(Point::new(r.left(), r.bottom())),
            self.apply(Point::new(r.right(), r.bottom())),
        ];
        let mut min = corners[0];
        let mut max = corners[0];
        for p in &corners[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Rect::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Composition: `a * b` applies `b` first, then `a`.
impl Mul for Affine {
    type Output = Self;

    fn mul(self, other: Self) -> Self {
        let [a1, b1, c1, d1, e1, f1] = self.coeffs;
        let [a2, b2, c2, d2, e2, f2] = other.coeffs;
        Self {
            coeffs: [
                a1 * a2 + c1 * b2,
                b1 * a2 + d1 * b2,
                a1 * c2 + c1 * d2,
                b1 * c2 + d1 * d2,
                a1 * e2 + c1 * f2 + e1,
                b1 * e2 + d1 * f2 + f1,
            ],
        }
    }
}
