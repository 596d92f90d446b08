use super::{
    matrix::Matrix,
    point::Point,
    tuple::{Axis, Plane},
    vector::Vector,
};

/// One step of a modelling transform, as written in scene files.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transformation {
    Scaling(f64, f64, f64),
    Translation(f64, f64, f64),
    Rotation(Axis, f64),
    Reflection(Plane),
    /// Rotation around the line through two points.
    RotationAboutLine(Point, Point, f64),
    /// Proportions in the order of `Matrix::shearing`.
    Shearing(f64, f64, f64, f64, f64, f64),
}

impl Transformation {
    pub fn scaling_uniform(f: f64) -> Self {
        Self::Scaling(f, f, f)
    }

    /// `None` for a rotation about a line whose two points coincide.
    pub fn matrix(self) -> Option<Matrix> {
        let m = match self {
            Self::Scaling(x, y, z) => Matrix::scaling(x, y, z),
            Self::Translation(x, y, z) => Matrix::translation(x, y, z),
            Self::Rotation(axis, radians) => Matrix::rotation(axis, radians),
            Self::Reflection(plane) => Matrix::reflection(plane),
            Self::RotationAboutLine(p1, p2, radians) => {
                return Matrix::rotation_about_line(p1, p2, radians)
            }
            Self::Shearing(xy, xz, yx, yz, zx, zy) => Matrix::shearing(xy, xz, yx, yz, zx, zy),
        };
        Some(m)
    }
}

/// Anything that can be moved by a matrix. Every step composes on the left,
/// so chained calls apply in the order they are written.
pub trait Transform: Sized {
    fn transform(&mut self, matrix: &Matrix);

    /// Ends a chain started on a temporary, e.g. `Point::zero().translate(..).transformed()`.
    fn transformed(self) -> Self {
        self
    }

    fn transform_chain(&mut self, matrix: &Matrix) -> &mut Self {
        self.transform(matrix);
        self
    }

    /// Applies a scene step; a rotation about coincident points leaves `self` unchanged.
    fn apply(&mut self, transformation: Transformation) -> &mut Self {
        if let Some(m) = transformation.matrix() {
            self.transform(&m);
        }
        self
    }

    fn translate(&mut self, x: f64, y: f64, z: f64) -> &mut Self {
        self.apply(Transformation::Translation(x, y, z))
    }

    fn scale(&mut self, x: f64, y: f64, z: f64) -> &mut Self {
        self.apply(Transformation::Scaling(x, y, z))
    }

    fn rotate_x(&mut self, radians: f64) -> &mut Self {
        self.apply(Transformation::Rotation(Axis::X, radians))
    }

    fn rotate_y(&mut self, radians: f64) -> &mut Self {
        self.apply(Transformation::Rotation(Axis::Y, radians))
    }

    fn rotate_z(&mut self, radians: f64) -> &mut Self {
        self.apply(Transformation::Rotation(Axis::Z, radians))
    }

    fn reflect(&mut self, plane: Plane) -> &mut Self {
        self.apply(Transformation::Reflection(plane))
    }

    fn rotate_about_line(&mut self, p1: Point, p2: Point, radians: f64) -> &mut Self {
        self.apply(Transformation::RotationAboutLine(p1, p2, radians))
    }
}

impl Transform for Point {
    fn transform(&mut self, matrix: &Matrix) {
        *self = matrix * *self;
    }
}

impl Transform for Vector {
    fn transform(&mut self, matrix: &Matrix) {
        *self = matrix * *self;
    }
}
