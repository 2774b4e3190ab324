//! Planar geometry for scenario layouts.
//!
//! Everything is `f64` in scenario units (metres in practice).  The types are
//! deliberately small value types: `Vec2` is `Copy`, shapes own their points.
//! Only the predicates the lattice and the perception layer need are
//! implemented here; this is not a general computational-geometry library.

use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// Tolerance used by orientation tests.
const EPS: f64 = 1e-12;

// ── Vec2 ──────────────────────────────────────────────────────────────────────

/// A 2-D point or displacement.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    #[inline]
    pub fn distance(self, other: Vec2) -> f64 {
        (self - other).length()
    }

    #[inline]
    pub fn dot(self, other: Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// z-component of the 3-D cross product.  Positive when `other` lies
    /// counter-clockwise of `self`.
    #[inline]
    pub fn cross(self, other: Vec2) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Rotate counter-clockwise by `angle` radians about the origin.
    #[inline]
    pub fn rotate(self, angle: f64) -> Vec2 {
        let (sin, cos) = angle.sin_cos();
        Vec2::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    /// Linear interpolation: `self` at `t = 0`, `other` at `t = 1`.
    #[inline]
    pub fn lerp(self, other: Vec2, t: f64) -> Vec2 {
        self + (other - self) * t
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    #[inline]
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    #[inline]
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    #[inline]
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;
    #[inline]
    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    #[inline]
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

// ── Bounds ────────────────────────────────────────────────────────────────────

/// Axis-aligned bounding box.  `min` is component-wise ≤ `max` for any box
/// produced by the constructors here.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    /// Box spanning two arbitrary corners.
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: Vec2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Vec2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Smallest box containing every point, or `None` for an empty iterator.
    pub fn from_points<I: IntoIterator<Item = Vec2>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Bounds { min: first, max: first }, |b, p| b.include(p)))
    }

    /// Grow to include `p`.
    pub fn include(self, p: Vec2) -> Self {
        Self {
            min: Vec2::new(self.min.x.min(p.x), self.min.y.min(p.y)),
            max: Vec2::new(self.max.x.max(p.x), self.max.y.max(p.y)),
        }
    }

    /// Smallest box containing both.
    pub fn union(self, other: Bounds) -> Self {
        self.include(other.min).include(other.max)
    }

    /// Grow by `margin` on every side.
    pub fn expand(self, margin: f64) -> Self {
        Self {
            min: Vec2::new(self.min.x - margin, self.min.y - margin),
            max: Vec2::new(self.max.x + margin, self.max.y + margin),
        }
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.min.lerp(self.max, 0.5)
    }

    /// Closed containment test.
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

// ── Segment ───────────────────────────────────────────────────────────────────

/// Closed line segment from `a` to `b`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Segment {
    pub a: Vec2,
    pub b: Vec2,
}

impl Segment {
    #[inline]
    pub const fn new(a: Vec2, b: Vec2) -> Self {
        Self { a, b }
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.a.distance(self.b)
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.a, self.b)
    }

    /// Does the segment touch the closed axis-aligned box?
    ///
    /// Liang–Barsky clipping: the parametric interval `t ∈ [0, 1]` is narrowed
    /// against each of the four slabs; the segment touches the box iff the
    /// interval survives.
    pub fn intersects_box(&self, bounds: &Bounds) -> bool {
        let d = self.b - self.a;
        let mut t0 = 0.0_f64;
        let mut t1 = 1.0_f64;

        let clips = [
            (-d.x, self.a.x - bounds.min.x),
            ( d.x, bounds.max.x - self.a.x),
            (-d.y, self.a.y - bounds.min.y),
            ( d.y, bounds.max.y - self.a.y),
        ];

        for (p, q) in clips {
            if p.abs() < EPS {
                // Parallel to this slab: reject only if outside it.
                if q < 0.0 {
                    return false;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return false;
                }
                t0 = t0.max(r);
            } else {
                if r < t0 {
                    return false;
                }
                t1 = t1.min(r);
            }
        }
        t0 <= t1
    }

    /// Closed segment–segment intersection test (touching endpoints count).
    pub fn intersects(&self, other: &Segment) -> bool {
        let o1 = orientation(self.a, self.b, other.a);
        let o2 = orientation(self.a, self.b, other.b);
        let o3 = orientation(other.a, other.b, self.a);
        let o4 = orientation(other.a, other.b, self.b);

        if o1 * o2 < 0 && o3 * o4 < 0 {
            return true;
        }
        (o1 == 0 && on_segment(self.a, self.b, other.a))
            || (o2 == 0 && on_segment(self.a, self.b, other.b))
            || (o3 == 0 && on_segment(other.a, other.b, self.a))
            || (o4 == 0 && on_segment(other.a, other.b, self.b))
    }
}

/// Sign of the turn `a → b → c`: 1 counter-clockwise, -1 clockwise, 0 collinear.
fn orientation(a: Vec2, b: Vec2, c: Vec2) -> i32 {
    let v = (b - a).cross(c - a);
    if v > EPS {
        1
    } else if v < -EPS {
        -1
    } else {
        0
    }
}

/// `p` collinear with `a`-`b` and within their bounding box.
fn on_segment(a: Vec2, b: Vec2, p: Vec2) -> bool {
    p.x >= a.x.min(b.x) - EPS
        && p.x <= a.x.max(b.x) + EPS
        && p.y >= a.y.min(b.y) - EPS
        && p.y <= a.y.max(b.y) + EPS
}

// ── Polygon ───────────────────────────────────────────────────────────────────

/// Simple polygon given by its corner points in order.  The closing edge
/// (last → first) is implicit.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Polygon {
    pub vertices: Vec<Vec2>,
}

impl Polygon {
    pub fn new(vertices: Vec<Vec2>) -> Self {
        Self { vertices }
    }

    /// Axis-aligned rectangle with the given corners.
    pub fn rectangle(min: Vec2, max: Vec2) -> Self {
        Self::new(vec![
            min,
            Vec2::new(max.x, min.y),
            max,
            Vec2::new(min.x, max.y),
        ])
    }

    /// Boundary edges including the closing one.  Empty for fewer than two
    /// points.
    pub fn edges(&self) -> impl Iterator<Item = Segment> + '_ {
        let n = if self.vertices.len() < 2 { 0 } else { self.vertices.len() };
        (0..n).map(move |i| Segment::new(self.vertices[i], self.vertices[(i + 1) % n]))
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.vertices.iter().copied())
    }

    /// Vertex centroid.  Used as a fallback point of interest for areas.
    pub fn center(&self) -> Option<Vec2> {
        if self.vertices.is_empty() {
            return None;
        }
        let sum = self.vertices.iter().fold(Vec2::ZERO, |acc, &v| acc + v);
        Some(sum * (1.0 / self.vertices.len() as f64))
    }

    /// Even–odd ray-crossing test.  Points exactly on the boundary may land
    /// on either side; callers that care rasterize the border separately.
    pub fn contains(&self, p: Vec2) -> bool {
        let n = self.vertices.len();
        if n < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let vi = self.vertices[i];
            let vj = self.vertices[j];
            if (vi.y > p.y) != (vj.y > p.y) {
                let x_cross = vj.x + (p.y - vj.y) * (vi.x - vj.x) / (vi.y - vj.y);
                if p.x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }
}

// ── Circle ────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Circle {
    pub center: Vec2,
    pub radius: f64,
}

impl Circle {
    #[inline]
    pub const fn new(center: Vec2, radius: f64) -> Self {
        Self { center, radius }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.center, self.center).expand(self.radius)
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        self.center.distance(p) <= self.radius
    }
}
