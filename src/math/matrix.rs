use std::{array, ops};

use super::{
    approx_eq::ApproxEq,
    point::Point,
    transform::Transform,
    tuple::{Axis, Plane, Tuple},
    vector::Vector,
};

/// Axis directions shorter than this are treated as coincident points.
pub const MIN_AXIS_LENGTH: f64 = 1.0e-6;

type Linear = [[f64; 3]; 3];

const IDENTITY_3: Linear = [[1., 0., 0.], [0., 1., 0.], [0., 0., 1.]];

/// Row-major 4x4 homogeneous matrix. Model, view and projection transforms all use it;
/// only the projection ever has a bottom row other than `0 0 0 1`.
#[derive(Debug, Clone, Copy)]
pub struct Matrix {
    rows: [[f64; 4]; 4],
}

impl Transform for Matrix {
    fn transform(&mut self, matrix: &Matrix) {
        *self = matrix * &*self;
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix {
    /// Sixteen values in row-major order.
    pub fn new(data: [f64; 16]) -> Self {
        Self {
            rows: array::from_fn(|r| array::from_fn(|c| data[r * 4 + c])),
        }
    }

    /// Linear part `linear` followed by a translation by `offset`.
    fn affine(linear: Linear, offset: [f64; 3]) -> Self {
        Self {
            rows: array::from_fn(|r| match r {
                3 => [0., 0., 0., 1.],
                _ => [linear[r][0], linear[r][1], linear[r][2], offset[r]],
            }),
        }
    }

    fn linear(&self) -> Linear {
        array::from_fn(|r| array::from_fn(|c| self.rows[r][c]))
    }

    pub fn identity() -> Self {
        Self::affine(IDENTITY_3, [0.; 3])
    }

    pub fn translation(x: f64, y: f64, z: f64) -> Self {
        Self::affine(IDENTITY_3, [x, y, z])
    }

    pub fn scaling(x: f64, y: f64, z: f64) -> Self {
        Self::affine([[x, 0., 0.], [0., y, 0.], [0., 0., z]], [0.; 3])
    }

    pub fn scaling_uniform(f: f64) -> Self {
        Self::scaling(f, f, f)
    }

    /// Rotation by `radians` around the unit vector `axis` through the origin,
    /// counter-clockwise when looking down the axis toward the origin (Rodrigues' formula).
    fn rotation_about_axis(axis: Vector, radians: f64) -> Self {
        let (x, y, z) = (axis.x(), axis.y(), axis.z());
        let (s, c) = radians.sin_cos();
        let t = 1. - c;
        Self::affine(
            [
                [t * x * x + c, t * x * y - s * z, t * x * z + s * y],
                [t * x * y + s * z, t * y * y + c, t * y * z - s * x],
                [t * x * z - s * y, t * y * z + s * x, t * z * z + c],
            ],
            [0.; 3],
        )
    }

    pub fn rotation(axis: Axis, radians: f64) -> Self {
        let direction = match axis {
            Axis::X => Vector::new(1., 0., 0.),
            Axis::Y => Vector::new(0., 1., 0.),
            Axis::Z => Vector::new(0., 0., 1.),
        };
        Self::rotation_about_axis(direction, radians)
    }

    pub fn rotation_x(radians: f64) -> Self {
        Self::rotation(Axis::X, radians)
    }

    pub fn rotation_y(radians: f64) -> Self {
        Self::rotation(Axis::Y, radians)
    }

    pub fn rotation_z(radians: f64) -> Self {
        Self::rotation(Axis::Z, radians)
    }

    /// Mirror about one of the coordinate planes.
    pub fn reflection(plane: Plane) -> Self {
        match plane {
            Plane::XY => Self::scaling(1., 1., -1.),
            Plane::XZ => Self::scaling(1., -1., 1.),
            Plane::YZ => Self::scaling(-1., 1., 1.),
        }
    }

    /// Rotation by `radians` around the line through `p1` and `p2`.
    /// Returns `None` when the points coincide and the axis is undefined.
    pub fn rotation_about_line(p1: Point, p2: Point, radians: f64) -> Option<Self> {
        let axis = (p2 - p1).try_normalize(MIN_AXIS_LENGTH)?;
        Some(Self::about_pivot(
            p1,
            Self::rotation_about_axis(axis, radians),
        ))
    }

    /// `linear` acting around `pivot` instead of the origin.
    pub fn about_pivot(pivot: Point, linear: Matrix) -> Self {
        Self::translation(pivot.x(), pivot.y(), pivot.z())
            * linear
            * Self::translation(-pivot.x(), -pivot.y(), -pivot.z())
    }

    /// Each argument moves the first coordinate in proportion to the second,
    /// e.g. `xy` adds `xy * y` to `x`.
    pub fn shearing(xy: f64, xz: f64, yx: f64, yz: f64, zx: f64, zy: f64) -> Self {
        Self::affine([[1., xy, xz], [yx, 1., yz], [zx, zy, 1.]], [0.; 3])
    }

    /// Determinant of the linear part; negative when the transform mirrors space.
    pub fn linear_determinant(&self) -> f64 {
        let m = self.linear();
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    /// Transform for surface normals: the cofactor matrix of the linear part, which is the
    /// inverse-transpose up to a positive factor. Normals need renormalizing afterwards.
    /// Unlike the inverse it exists for flattening scales too.
    pub fn normal_matrix(&self) -> Self {
        let m = self.linear();
        let cofactor = |r: usize, c: usize| {
            let (r1, r2) = ((r + 1) % 3, (r + 2) % 3);
            let (c1, c2) = ((c + 1) % 3, (c + 2) % 3);
            m[r1][c1] * m[r2][c2] - m[r1][c2] * m[r2][c1]
        };
        let sign = if self.linear_determinant() < 0. { -1. } else { 1. };
        Self::affine(
            array::from_fn(|r| array::from_fn(|c| sign * cofactor(r, c))),
            [0.; 3],
        )
    }

    /// Applies only the linear part, so translation never moves a direction.
    pub fn transform_direction(&self, v: Vector) -> Vector {
        let [x, y, z, _] = self.mul_homogeneous_w(v.x(), v.y(), v.z(), 0.);
        Vector::new(x, y, z)
    }

    /// Full homogeneous product of a point, keeping the `w` row that affine products drop.
    pub fn mul_homogeneous(&self, p: Point) -> [f64; 4] {
        self.mul_homogeneous_w(p.x(), p.y(), p.z(), 1.)
    }

    fn mul_homogeneous_w(&self, x: f64, y: f64, z: f64, w: f64) -> [f64; 4] {
        self.rows
            .map(|row| row[0] * x + row[1] * y + row[2] * z + row[3] * w)
    }
}

impl ApproxEq for Matrix {
    fn approx_eq_epsilon(&self, other: &Self, epsilon: f64) -> bool {
        self.rows
            .iter()
            .flatten()
            .zip(other.rows.iter().flatten())
            .all(|(a, b)| a.approx_eq_epsilon(b, epsilon))
    }
}

impl PartialEq for Matrix {
    fn eq(&self, other: &Matrix) -> bool {
        self.approx_eq(other)
    }
}

impl ops::Mul<&Matrix> for &Matrix {
    type Output = Matrix;

    fn mul(self, rhs: &Matrix) -> Matrix {
        Matrix {
            rows: array::from_fn(|r| {
                array::from_fn(|c| (0..4).map(|k| self.rows[r][k] * rhs.rows[k][c]).sum())
            }),
        }
    }
}

impl ops::Mul for Matrix {
    type Output = Matrix;

    fn mul(self, rhs: Matrix) -> Matrix {
        &self * &rhs
    }
}

impl<T: Tuple> ops::Mul<T> for &Matrix {
    type Output = T;

    /// Affine product; the homogeneous `w` of the result is dropped.
    fn mul(self, rhs: T) -> T {
        let [x, y, z, _] = self.mul_homogeneous_w(rhs.x(), rhs.y(), rhs.z(), rhs.w());
        T::new(x, y, z)
    }
}

impl<T: Tuple> ops::Mul<T> for Matrix {
    type Output = T;

    #[allow(clippy::op_ref)]
    fn mul(self, rhs: T) -> T {
        &self * rhs
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    use super::*;
    use crate::assert_approx_eq_low_prec;

    #[test]
    fn product_of_projection_and_view() {
        #[rustfmt::skip]
        let projection = Matrix::new([
            2., 0., 0., 0.,
            0., 2., 0., 0.,
            0., 0., 1., 0.,
            0., 0., 1., 0.,
        ]);
        let view = Matrix::translation(1., -1., 10.);
        #[rustfmt::skip]
        let expected = Matrix::new([
            2., 0., 0., 2.,
            0., 2., 0., -2.,
            0., 0., 1., 10.,
            0., 0., 1., 10.,
        ]);
        assert_approx_eq_low_prec!(projection * view, expected);
        assert_approx_eq_low_prec!(view * Matrix::identity(), view);
    }

    #[test]
    fn homogeneous_product_keeps_w() {
        #[rustfmt::skip]
        let m = Matrix::new([
            1., 0., 0., 0.,
            0., 1., 0., 0.,
            0., 0., 1., 0.,
            0., 0., 1., 0.,
        ]);
        assert_eq!(m.mul_homogeneous(Point::new(1., 2., 5.)), [1., 2., 5., 5.]);
    }

    #[test]
    fn points_move_but_directions_do_not() {
        let m = Matrix::translation(5., -3., 2.);
        assert_approx_eq_low_prec!(m * Point::new(-3., 4., 5.), Point::new(2., 1., 7.));
        assert_approx_eq_low_prec!(m * Vector::new(-3., 4., 5.), Vector::new(-3., 4., 5.));
        assert_approx_eq_low_prec!(
            m.transform_direction(Vector::new(1., 0., 0.)),
            Vector::new(1., 0., 0.)
        );
    }

    #[test]
    fn axis_rotations_are_counter_clockwise() {
        assert_approx_eq_low_prec!(
            Matrix::rotation_x(FRAC_PI_2) * Point::new(0., 1., 0.),
            Point::new(0., 0., 1.)
        );
        assert_approx_eq_low_prec!(
            Matrix::rotation_y(FRAC_PI_2) * Point::new(0., 0., 1.),
            Point::new(1., 0., 0.)
        );
        assert_approx_eq_low_prec!(
            Matrix::rotation_z(FRAC_PI_2) * Point::new(1., 0., 0.),
            Point::new(0., 1., 0.)
        );
    }

    #[test]
    fn opposite_rotations_cancel() {
        for axis in [Axis::X, Axis::Y, Axis::Z] {
            let m = Matrix::rotation(axis, 0.7) * Matrix::rotation(axis, -0.7);
            assert_approx_eq_low_prec!(m, Matrix::identity());
        }
    }

    #[test]
    fn reflections_flip_one_coordinate() {
        let p = Point::new(1., 2., 3.);
        assert_approx_eq_low_prec!(Matrix::reflection(Plane::XY) * p, Point::new(1., 2., -3.));
        assert_approx_eq_low_prec!(Matrix::reflection(Plane::XZ) * p, Point::new(1., -2., 3.));
        assert_approx_eq_low_prec!(Matrix::reflection(Plane::YZ) * p, Point::new(-1., 2., 3.));
    }

    #[test]
    fn rotation_about_line_through_origin_matches_axis_rotation() {
        let m = Matrix::rotation_about_line(Point::zero(), Point::new(0., 0., 4.), 0.3).unwrap();
        assert_approx_eq_low_prec!(m, Matrix::rotation_z(0.3));
    }

    #[test]
    fn rotation_about_offset_line_keeps_line_points_fixed() {
        let p1 = Point::new(1., 1., 0.);
        let p2 = Point::new(2., 2., 1.);
        let m = Matrix::rotation_about_line(p1, p2, 1.1).unwrap();
        assert_approx_eq_low_prec!(m * p1, p1);
        assert_approx_eq_low_prec!(m * p2, p2);
        // half a turn around a vertical line through (1, 0, 0)
        let half_turn =
            Matrix::rotation_about_line(Point::new(1., 0., 0.), Point::new(1., 1., 0.), PI).unwrap();
        assert_approx_eq_low_prec!(half_turn * Point::new(0., 5., 0.), Point::new(2., 5., 0.));
    }

    #[test]
    fn rotation_about_line_with_coincident_points_is_rejected() {
        let p = Point::new(1., 2., 3.);
        assert!(Matrix::rotation_about_line(p, p, 1.).is_none());
    }

    #[test]
    fn about_pivot_keeps_pivot_fixed() {
        let pivot = Point::new(10., 0., 0.);
        let m = Matrix::about_pivot(pivot, Matrix::scaling(2., 3., 4.));
        assert_approx_eq_low_prec!(m * pivot, pivot);
        assert_approx_eq_low_prec!(m * Point::new(11., 1., 1.), Point::new(12., 3., 4.));
    }

    #[test]
    fn shearing_moves_one_coordinate_by_another() {
        let p = Point::new(2., 3., 4.);
        assert_approx_eq_low_prec!(
            Matrix::shearing(1., 0., 0., 0., 0., 0.) * p,
            Point::new(5., 3., 4.)
        );
        assert_approx_eq_low_prec!(
            Matrix::shearing(0., 0., 0., 0., 0., 1.) * p,
            Point::new(2., 3., 7.)
        );
    }

    #[test]
    fn determinant_sign_tracks_mirroring() {
        assert!(Matrix::rotation_y(1.2).linear_determinant() > 0.);
        assert_approx_eq_low_prec!(Matrix::scaling(2., 3., 4.).linear_determinant(), 24.);
        let mirrored = Matrix::reflection(Plane::YZ) * Matrix::rotation_x(0.4);
        assert!(mirrored.linear_determinant() < 0.);
    }

    #[test]
    fn normal_matrix_keeps_normals_perpendicular() {
        let m = Matrix::scaling(2., 1., 1.) * Matrix::rotation_z(FRAC_PI_4);
        let (a, b) = (Point::new(0., 0., 0.), Point::new(1., -1., 3.));
        let normal = Vector::new(1., 1., 0.);
        assert_approx_eq_low_prec!(normal.dot(b - a), 0.);

        let n = m.normal_matrix().transform_direction(normal);
        assert_approx_eq_low_prec!(n.dot(m * b - m * a), 0.);
    }

    #[test]
    fn normal_matrix_of_mirror_keeps_outward_direction() {
        // the +x face of a box mirrored about YZ becomes the -x face
        let n = Matrix::reflection(Plane::YZ)
            .normal_matrix()
            .transform_direction(Vector::new(1., 0., 0.));
        assert_approx_eq_low_prec!(n.normalize(), Vector::new(-1., 0., 0.));
    }

    #[test]
    fn normal_matrix_survives_flattening() {
        let n = Matrix::scaling(1., 1., 0.)
            .normal_matrix()
            .transform_direction(Vector::new(0., 0., 1.));
        assert_approx_eq_low_prec!(n.normalize(), Vector::new(0., 0., 1.));
    }

    #[test]
    fn transform_composes_on_the_left() {
        let mut m = Matrix::translation(1., 0., 0.);
        m.transform(&Matrix::scaling(2., 2., 2.));
        assert_approx_eq_low_prec!(m * Point::zero(), Point::new(2., 0., 0.));
    }
}
