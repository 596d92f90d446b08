use std::{iter::Sum, ops};

use super::{approx_eq::ApproxEq, point::Point, tuple::Tuple};

/// Direction in 3D: face and vertex normals, edges, light and eye directions.
#[derive(Copy, Clone, Debug, Default)]
pub struct Vector {
    x: f64,
    y: f64,
    z: f64,
}

impl Tuple for Vector {
    fn new(x: f64, y: f64, z: f64) -> Self {
        Vector { x, y, z }
    }

    fn x(&self) -> f64 {
        self.x
    }

    fn y(&self) -> f64 {
        self.y
    }

    fn z(&self) -> f64 {
        self.z
    }

    fn w(&self) -> f64 {
        0.
    }
}

impl Vector {
    pub fn zero() -> Self {
        Self::new(0., 0., 0.)
    }

    fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self::new(f(self.x), f(self.y), f(self.z))
    }

    fn zip(self, rhs: Self, f: impl Fn(f64, f64) -> f64) -> Self {
        Self::new(f(self.x, rhs.x), f(self.y, rhs.y), f(self.z, rhs.z))
    }

    pub fn dot(&self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    /// Right-handed cross product; for a counter-clockwise `(v0, v1, v2)` seen from the
    /// outside, `(v1 - v0).cross(v2 - v0)` points outward.
    pub fn cross(&self, rhs: Self) -> Self {
        Self::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }

    pub fn magnitude(&self) -> f64 {
        self.dot(*self).sqrt()
    }

    /// Unit vector; the zero vector stays zero.
    pub fn normalize(&self) -> Self {
        self.try_normalize(0.).unwrap_or_default()
    }

    /// Unit vector in the same direction, `None` when the length is below `min_len`.
    pub fn try_normalize(&self, min_len: f64) -> Option<Self> {
        let len = self.magnitude();
        if len <= min_len {
            return None;
        }
        Some(*self / len)
    }

    /// Mirror image of `self` about `normal`, used for the specular term.
    pub fn reflect(&self, normal: Self) -> Self {
        *self - normal * (2. * self.dot(normal))
    }

    /// Weighted sum of three vectors, with barycentric `weights` across a triangle.
    pub fn blend3(vectors: [Vector; 3], weights: [f64; 3]) -> Self {
        vectors
            .iter()
            .zip(weights)
            .map(|(&v, w)| v * w)
            .sum()
    }
}

impl ApproxEq for Vector {
    fn approx_eq_epsilon(&self, other: &Self, epsilon: f64) -> bool {
        let d = *self - *other;
        [d.x, d.y, d.z]
            .iter()
            .all(|c| c.approx_eq_epsilon(&0., epsilon))
    }
}

impl PartialEq for Vector {
    fn eq(&self, other: &Self) -> bool {
        self.approx_eq(other)
    }
}

impl ops::Add<Point> for Vector {
    type Output = Point;

    fn add(self, rhs: Point) -> Self::Output {
        rhs + self
    }
}

impl ops::Add for Vector {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        self.zip(rhs, |a, b| a + b)
    }
}

impl ops::AddAssign for Vector {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl ops::Sub for Vector {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self.zip(rhs, |a, b| a - b)
    }
}

impl ops::Neg for Vector {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.map(|c| -c)
    }
}

impl ops::Mul<f64> for Vector {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        self.map(|c| c * rhs)
    }
}

impl ops::Div<f64> for Vector {
    type Output = Self;

    fn div(self, rhs: f64) -> Self::Output {
        self.map(|c| c / rhs)
    }
}

impl Sum for Vector {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Vector::zero(), |acc, v| acc + v)
    }
}
