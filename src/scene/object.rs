pub mod generator;
pub mod material;
pub mod polygon;

use std::collections::HashSet;

use log::trace;

use crate::math::{
    matrix::Matrix,
    point::Point,
    transform::{Transform, Transformation},
    tuple::{Axis, Tuple},
    vector::Vector,
};

use material::Material;
use polygon::{Polygon, Vertex};

/// A step that may depend on where the object currently is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocalTransformation {
    Transformation(Transformation),
    /// Rotation around the axis-parallel line through the object's center.
    RotateAboutCenter(Axis, f64),
    ScaleAboutCenter(f64, f64, f64),
}

impl From<Transformation> for LocalTransformation {
    fn from(val: Transformation) -> Self {
        Self::Transformation(val)
    }
}

/// Mesh stored as a vertex arena plus faces that index into it.
/// Transformations accumulate in one model matrix; the arena itself is never rewritten,
/// world-space geometry is produced on demand by [`Object::polygons`].
#[derive(PartialEq, Debug, Clone)]
pub struct Object {
    vertices: Vec<Vertex>,
    faces: Vec<Vec<usize>>,
    transformation: Matrix,
    material: Material,
}

impl Transform for Object {
    fn transform(&mut self, matrix: &Matrix) {
        self.transformation = matrix * &self.transformation;
    }
}

impl Default for Object {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}

impl Object {
    /// Face indices that fall outside the arena are dropped when polygons are built.
    pub fn new(vertices: Vec<Vertex>, faces: Vec<Vec<usize>>) -> Self {
        Self {
            vertices,
            faces,
            transformation: Matrix::identity(),
            material: Material::default(),
        }
    }

    pub fn from_points(points: Vec<Point>, faces: Vec<Vec<usize>>) -> Self {
        Self::new(points.into_iter().map(Vertex::new).collect(), faces)
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    pub fn set_material(&mut self, material: Material) {
        self.material = material;
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn transformation(&self) -> &Matrix {
        &self.transformation
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Vec<usize>] {
        &self.faces
    }

    pub fn apply_transformation(&mut self, matrix: &Matrix) {
        self.transform(matrix);
    }

    fn world_position(&self, p: Point) -> Point {
        self.transformation * p
    }

    /// Mean of the distinct vertex positions in world space, the pivot for the
    /// `*_about_center` operations. Arena vertices that only differ in normal or texture
    /// coordinate count once.
    pub fn center(&self) -> Point {
        let mut seen = HashSet::new();
        let world: Vec<Point> = self
            .vertices
            .iter()
            .map(|v| v.position)
            // `+ 0.` folds -0.0 into 0.0 so both hash alike
            .filter(|p| seen.insert([p.x(), p.y(), p.z()].map(|c| (c + 0.).to_bits())))
            .map(|p| self.world_position(p))
            .collect();
        Point::mean(&world).unwrap_or_else(|| self.world_position(Point::zero()))
    }

    pub fn scale_about_center(&mut self, x: f64, y: f64, z: f64) -> &mut Self {
        let pivot = self.center();
        self.transform_chain(&Matrix::about_pivot(pivot, Matrix::scaling(x, y, z)))
    }

    pub fn rotate_about_center(&mut self, axis: Axis, radians: f64) -> &mut Self {
        let pivot = self.center();
        self.transform_chain(&Matrix::about_pivot(pivot, Matrix::rotation(axis, radians)))
    }

    /// Applies the steps in order, each seeing the center left by the previous ones.
    pub fn local_transform(&mut self, transformations: &[LocalTransformation]) -> &mut Self {
        for t in transformations {
            match *t {
                LocalTransformation::Transformation(t) => {
                    self.apply(t);
                }
                LocalTransformation::RotateAboutCenter(axis, radians) => {
                    self.rotate_about_center(axis, radians);
                }
                LocalTransformation::ScaleAboutCenter(x, y, z) => {
                    self.scale_about_center(x, y, z);
                }
            }
        }
        self
    }

    /// World-space copies of every face with freshly computed normals.
    /// Vertex normals go through the inverse-transpose of the model matrix.
    /// Mirroring transforms get their winding restored so normals keep pointing outward.
    pub fn polygons(&self) -> Vec<Polygon> {
        let m = &self.transformation;
        let normal_matrix = m.normal_matrix();
        let world: Vec<Vertex> = self
            .vertices
            .iter()
            .map(|v| Vertex {
                position: m * v.position,
                uv: v.uv,
                normal: v
                    .normal
                    .map(|n| normal_matrix.transform_direction(n).normalize()),
            })
            .collect();
        let mirrored = m.linear_determinant() < 0.;

        self.faces
            .iter()
            .map(|face| {
                let mut vertices: Vec<Vertex> =
                    face.iter().filter_map(|&i| world.get(i).copied()).collect();
                if vertices.len() != face.len() {
                    trace!("face {face:?} references vertices outside the arena");
                }
                // same reversal as `Polygon::reversed`, exact for planar faces
                if mirrored {
                    if let Some(rest) = vertices.get_mut(1..) {
                        rest.reverse();
                    }
                }
                Polygon::new(vertices)
            })
            .collect()
    }

    /// Replaces vertex normals with the average of the adjacent face normals, in object space.
    pub fn smooth_normals(&mut self) {
        let mut sums = vec![Vector::zero(); self.vertices.len()];
        for face in &self.faces {
            let polygon = Polygon::new(
                face.iter()
                    .filter_map(|&i| self.vertices.get(i).copied())
                    .collect(),
            );
            let Some(normal) = polygon.normal() else {
                continue;
            };
            for &i in face {
                if let Some(sum) = sums.get_mut(i) {
                    *sum += normal;
                }
            }
        }
        for (vertex, sum) in self.vertices.iter_mut().zip(sums) {
            vertex.normal = sum.try_normalize(polygon::MIN_NORMAL_LENGTH);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use super::*;
    use crate::{assert_approx_eq_low_prec, math::tuple::Plane};

    fn unit_square() -> Object {
        Object::from_points(
            vec![
                Point::new(0., 0., 0.),
                Point::new(2., 0., 0.),
                Point::new(2., 2., 0.),
                Point::new(0., 2., 0.),
            ],
            vec![vec![0, 1, 2, 3]],
        )
    }

    #[test]
    fn center_ignores_repeated_positions() {
        let up = Vector::new(0., 0., 1.);
        let down = Vector::new(0., 0., -1.);
        let obj = Object::new(
            vec![
                Vertex::with_normal(Point::new(0., 0., 0.), up),
                Vertex::with_normal(Point::new(3., 0., 0.), up),
                Vertex::with_normal(Point::new(0., 3., 0.), up),
                Vertex::with_normal(Point::new(0., 0., 0.), down),
                Vertex::with_normal(Point::new(-0., 3., 0.), down),
                Vertex::with_normal(Point::new(3., 0., 0.), down),
            ],
            vec![vec![0, 1, 2], vec![3, 4, 5]],
        );
        assert_approx_eq_low_prec!(obj.center(), Point::new(1., 1., 0.));
    }

    #[test]
    fn transforms_leave_arena_untouched() {
        let mut obj = unit_square();
        let original = obj.vertices().to_vec();
        obj.translate(5., 0., 0.).rotate_z(1.).scale(2., 2., 2.);

        assert_eq!(obj.vertices(), original.as_slice());
        assert_approx_eq_low_prec!(
            *obj.transformation(),
            Matrix::scaling(2., 2., 2.) * Matrix::rotation_z(1.) * Matrix::translation(5., 0., 0.)
        );
    }

    #[test]
    fn polygons_are_in_world_space() {
        let mut obj = unit_square();
        obj.translate(0., 0., 10.);
        let polygons = obj.polygons();

        assert_eq!(polygons.len(), 1);
        assert_approx_eq_low_prec!(polygons[0].vertices()[2].position, Point::new(2., 2., 10.));
        assert_approx_eq_low_prec!(polygons[0].normal().unwrap(), Vector::new(0., 0., 1.));
    }

    #[test]
    fn normals_follow_rotation() {
        let mut obj = unit_square();
        obj.rotate_x(FRAC_PI_2);
        assert_approx_eq_low_prec!(obj.polygons()[0].normal().unwrap(), Vector::new(0., -1., 0.));
    }

    #[test]
    fn center_is_mean_of_vertices() {
        let mut obj = unit_square();
        assert_approx_eq_low_prec!(obj.center(), Point::new(1., 1., 0.));
        obj.translate(1., 2., 3.);
        assert_approx_eq_low_prec!(obj.center(), Point::new(2., 3., 3.));
    }

    #[test]
    fn scale_about_center_keeps_center() {
        let mut obj = unit_square();
        obj.translate(10., -4., 7.);
        let before = obj.center();
        obj.scale_about_center(3., 0.5, 2.);

        assert_approx_eq_low_prec!(obj.center(), before);
        let p = obj.polygons()[0].vertices()[1].position;
        assert_approx_eq_low_prec!(p, Point::new(11. + 3., 1. - 4. - 0.5, 7.));
    }

    #[test]
    fn rotate_about_center_keeps_center() {
        let mut obj = unit_square();
        obj.translate(10., -4., 7.);
        let before = obj.center();
        obj.rotate_about_center(Axis::Z, FRAC_PI_2);

        assert_approx_eq_low_prec!(obj.center(), before);
        // (12, -4) rotates a quarter turn around (11, -3)
        assert_approx_eq_low_prec!(obj.polygons()[0].vertices()[1].position, Point::new(12., -2., 7.));
    }

    #[test]
    fn local_transformations_run_in_order() {
        let mut obj = unit_square();
        obj.local_transform(&[
            Transformation::Translation(4., 0., 0.).into(),
            LocalTransformation::ScaleAboutCenter(2., 2., 1.),
            LocalTransformation::RotateAboutCenter(Axis::Z, FRAC_PI_2),
        ]);

        assert_approx_eq_low_prec!(obj.center(), Point::new(5., 1., 0.));
        // (4, 0) -> (3, -1) when scaled around (5, 1), then a quarter turn takes it to (7, -1)
        assert_approx_eq_low_prec!(obj.polygons()[0].vertices()[0].position, Point::new(7., -1., 0.));
    }

    #[test]
    fn rotate_about_coincident_points_is_noop() {
        let mut obj = unit_square();
        let p = Point::new(1., 1., 1.);
        obj.rotate_about_line(p, p, 0.5);
        assert_approx_eq_low_prec!(*obj.transformation(), Matrix::identity());
    }

    #[test]
    fn reflection_keeps_normals_outward() {
        let mut obj = unit_square();
        obj.translate(0., 0., 5.).reflect(Plane::XY);
        let polygon = &obj.polygons()[0];

        assert_approx_eq_low_prec!(polygon.centroid().unwrap(), Point::new(1., 1., -5.));
        assert_approx_eq_low_prec!(polygon.normal().unwrap(), Vector::new(0., 0., -1.));
    }

    #[test]
    fn vertex_normals_stay_perpendicular_to_scaled_surface() {
        let mut obj = Object::new(
            vec![
                Vertex::with_normal(Point::new(0., 0., 0.), Vector::new(1., 1., 0.).normalize()),
                Vertex::new(Point::new(1., 0., 0.)),
                Vertex::new(Point::new(0., 1., 0.)),
            ],
            vec![vec![0, 1, 2]],
        );
        obj.scale(2., 1., 1.);
        let n = obj.polygons()[0].vertices()[0].normal.unwrap();
        // a plane x + y = c scaled by 2 in x becomes x / 2 + y = c
        assert_approx_eq_low_prec!(n, Vector::new(0.5, 1., 0.).normalize());
    }

    #[test]
    fn vertex_normals_follow_mirroring_and_flattening() {
        let vertex = Vertex::with_normal(Point::new(0., 0., 1.), Vector::new(0., 0., 1.));
        let mut mirrored = Object::new(vec![vertex; 3], vec![vec![0, 1, 2]]);
        mirrored.reflect(Plane::XY);
        let n = mirrored.polygons()[0].vertices()[0].normal.unwrap();
        assert_approx_eq_low_prec!(n, Vector::new(0., 0., -1.));

        // squashed flat onto z = 0, the surface still faces +z
        let mut flattened = Object::new(vec![vertex; 3], vec![vec![0, 1, 2]]);
        flattened.scale(1., 1., 0.);
        let n = flattened.polygons()[0].vertices()[0].normal.unwrap();
        assert_approx_eq_low_prec!(n, Vector::new(0., 0., 1.));
    }

    #[test]
    fn out_of_range_indices_are_dropped() {
        let obj = Object::from_points(vec![Point::zero(), Point::new(1., 0., 0.)], vec![vec![0, 1, 7]]);
        let polygons = obj.polygons();
        assert_eq!(polygons[0].len(), 2);
        assert!(polygons[0].normal().is_none());
    }

    #[test]
    fn smooth_normals_average_adjacent_faces() {
        let mut obj = Object::from_points(
            vec![
                Point::new(0., 0., 0.),
                Point::new(1., 0., 0.),
                Point::new(0., 1., 0.),
                Point::new(0., 0., 1.),
            ],
            vec![vec![0, 2, 1], vec![0, 1, 3]],
        );
        obj.smooth_normals();

        let shared = obj.vertices()[0].normal.unwrap();
        assert_approx_eq_low_prec!(shared, Vector::new(0., -1., -1.).normalize());
        assert_approx_eq_low_prec!(obj.vertices()[2].normal.unwrap(), Vector::new(0., 0., -1.));
    }
}
