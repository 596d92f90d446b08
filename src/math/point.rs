use std::ops;

use super::{approx_eq::ApproxEq, tuple::Tuple, vector::Vector};

/// Position in 3D: vertices, centroids, the eye and light positions.
#[derive(Copy, Clone, Debug, Default)]
pub struct Point {
    x: f64,
    y: f64,
    z: f64,
}

impl Tuple for Point {
    fn new(x: f64, y: f64, z: f64) -> Self {
        Point { x, y, z }
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
        1.
    }
}

impl Point {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Offset of the point from the origin.
    pub fn as_vector(&self) -> Vector {
        *self - Self::zero()
    }

    /// Arithmetic mean of the points, `None` when there are none.
    pub fn mean<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Point> {
        let (sum, count) = points
            .into_iter()
            .fold((Vector::zero(), 0usize), |(sum, count), p| {
                (sum + p.as_vector(), count + 1)
            });
        (count > 0).then(|| Self::zero() + sum / count as f64)
    }
}

impl ApproxEq for Point {
    fn approx_eq_epsilon(&self, other: &Self, epsilon: f64) -> bool {
        (*self - *other).approx_eq_epsilon(&Vector::zero(), epsilon)
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.approx_eq(other)
    }
}

impl ops::Add<Vector> for Point {
    type Output = Point;

    fn add(self, rhs: Vector) -> Point {
        Point::new(self.x + rhs.x(), self.y + rhs.y(), self.z + rhs.z())
    }
}

impl ops::Sub<Vector> for Point {
    type Output = Point;

    fn sub(self, rhs: Vector) -> Point {
        self + -rhs
    }
}

/// Displacement from `rhs` to `self`.
impl ops::Sub for Point {
    type Output = Vector;

    fn sub(self, rhs: Point) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}
