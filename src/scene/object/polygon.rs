use crate::math::{point::Point, vector::Vector};

/// Cross products shorter than this mark a face as degenerate.
pub const MIN_NORMAL_LENGTH: f64 = 1.0e-12;

/// Texture coordinates of a vertex.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct TexCoord {
    pub u: f64,
    pub v: f64,
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub struct Vertex {
    pub position: Point,
    pub uv: Option<TexCoord>,
    pub normal: Option<Vector>,
}

impl Vertex {
    pub fn new(position: Point) -> Self {
        Self {
            position,
            uv: None,
            normal: None,
        }
    }

    pub fn with_normal(position: Point, normal: Vector) -> Self {
        Self {
            normal: Some(normal),
            ..Self::new(position)
        }
    }
}

impl From<Point> for Vertex {
    fn from(position: Point) -> Self {
        Self::new(position)
    }
}

/// Ordered vertex list with a face normal. The order is the winding and decides the normal's
/// sign, so the normal is recomputed whenever the vertices change.
#[derive(PartialEq, Debug, Clone)]
pub struct Polygon {
    vertices: Vec<Vertex>,
    normal: Option<Vector>,
}

impl Polygon {
    pub fn new(vertices: Vec<Vertex>) -> Self {
        let mut polygon = Self {
            vertices,
            normal: None,
        };
        polygon.calculate_face_normal();
        polygon
    }

    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Self {
        Self::new(points.into_iter().map(Vertex::new).collect())
    }

    /// `normalize((v1 - v0) x (v2 - v0))`, or `None` for fewer than three vertices
    /// or collinear leading vertices.
    pub fn calculate_face_normal(&mut self) {
        self.normal = match self.vertices.as_slice() {
            [v0, v1, v2, ..] => {
                let edge1 = v1.position - v0.position;
                let edge2 = v2.position - v0.position;
                edge1.cross(edge2).try_normalize(MIN_NORMAL_LENGTH)
            }
            _ => None,
        };
    }

    pub fn normal(&self) -> Option<Vector> {
        self.normal
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn positions(&self) -> impl Iterator<Item = Point> + '_ {
        self.vertices.iter().map(|v| v.position)
    }

    pub fn centroid(&self) -> Option<Point> {
        Point::mean(self.vertices.iter().map(|v| &v.position))
    }

    /// Normal used for lighting at vertex `i`: its own normal if it carries one,
    /// otherwise the face normal.
    pub fn vertex_normal(&self, i: usize) -> Option<Vector> {
        self.vertices
            .get(i)
            .and_then(|v| v.normal)
            .or(self.normal)
    }

    /// Same face with the opposite winding, starting from the same first vertex.
    /// The normal flips exactly only for planar faces; a warped face takes its new normal
    /// from a different triple.
    pub fn reversed(&self) -> Self {
        let mut vertices = self.vertices.clone();
        if let Some(rest) = vertices.get_mut(1..) {
            rest.reverse();
        }
        Self::new(vertices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assert_approx_eq_low_prec,
        math::{approx_eq::ApproxEq, tuple::Tuple},
    };

    fn sample_polygons() -> Vec<Polygon> {
        vec![
            Polygon::from_points([
                Point::new(0., 0., 0.),
                Point::new(1., 0., 0.),
                Point::new(0., 1., 0.),
            ]),
            // planar quad on x + y + z = 8
            Polygon::from_points([
                Point::new(3., -2., 7.),
                Point::new(-40., 12., 36.),
                Point::new(8., 8., -8.),
                Point::new(12., 4., -8.),
            ]),
            Polygon::from_points([
                Point::new(100., 100., 100.),
                Point::new(100.001, 100., 100.),
                Point::new(100., 100., 100.002),
            ]),
        ]
    }

    #[test]
    fn normal_of_ccw_triangle_points_toward_viewer() {
        let p = &sample_polygons()[0];
        assert_approx_eq_low_prec!(p.normal().unwrap(), Vector::new(0., 0., 1.));
    }

    #[test]
    fn face_normals_have_unit_length() {
        for p in sample_polygons() {
            let n = p.normal().unwrap();
            assert!(n.magnitude().approx_eq_epsilon(&1., 1e-5));
        }
    }

    #[test]
    fn reversing_winding_negates_normal() {
        for p in sample_polygons() {
            let n = p.normal().unwrap();
            let r = p.reversed().normal().unwrap();
            assert_approx_eq_low_prec!(r, -n);
        }
    }

    #[test]
    fn too_few_vertices_have_no_normal() {
        let p = Polygon::from_points([Point::new(0., 0., 0.), Point::new(1., 0., 0.)]);
        assert!(p.normal().is_none());
        assert!(Polygon::new(vec![]).normal().is_none());
    }

    #[test]
    fn collinear_vertices_have_no_normal() {
        let p = Polygon::from_points([
            Point::new(0., 0., 0.),
            Point::new(1., 1., 1.),
            Point::new(2., 2., 2.),
        ]);
        assert!(p.normal().is_none());
    }

    #[test]
    fn vertex_normal_falls_back_to_face_normal() {
        let p = Polygon::new(vec![
            Vertex::with_normal(Point::new(0., 0., 0.), Vector::new(1., 0., 0.)),
            Vertex::new(Point::new(1., 0., 0.)),
            Vertex::new(Point::new(0., 1., 0.)),
        ]);
        assert_approx_eq_low_prec!(p.vertex_normal(0).unwrap(), Vector::new(1., 0., 0.));
        assert_approx_eq_low_prec!(p.vertex_normal(1).unwrap(), Vector::new(0., 0., 1.));
        assert_approx_eq_low_prec!(p.centroid().unwrap(), Point::new(1. / 3., 1. / 3., 0.));
    }
}
