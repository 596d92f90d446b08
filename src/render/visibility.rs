use crate::{
    math::{matrix::Matrix, point::Point, tuple::Tuple, vector::Vector},
    scene::object::polygon::Polygon,
};

use super::projection::ProjectionMode;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    BackFacing,
    /// No face normal: fewer than three vertices or collinear ones.
    Degenerate,
}

/// Front-facing test in view space, where the camera sits at the origin looking along +z.
/// Perspective: the normal must point back toward the camera, against the line of sight to
/// the face. Axonometric: every line of sight is +z, so only the normal's z matters.
pub fn faces_camera(normal_view: Vector, centroid_view: Point, mode: ProjectionMode) -> bool {
    match mode {
        ProjectionMode::Perspective => normal_view.dot(centroid_view.as_vector()) < 0.,
        ProjectionMode::Axonometric => normal_view.z() < 0.,
    }
}

/// Classifies a world-space polygon. The normal is moved into view space with the
/// rotation part of `view` only, the centroid with the full transform.
pub fn classify(polygon: &Polygon, view: &Matrix, mode: ProjectionMode) -> Visibility {
    let (Some(normal), Some(centroid)) = (polygon.normal(), polygon.centroid()) else {
        return Visibility::Degenerate;
    };
    let normal_view = view.transform_direction(normal);
    let centroid_view = view * centroid;
    if faces_camera(normal_view, centroid_view, mode) {
        Visibility::Visible
    } else {
        Visibility::BackFacing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{camera::Camera, object::generator};

    fn visible_faces(camera: &Camera, mode: ProjectionMode) -> usize {
        generator::cube(200.)
            .polygons()
            .iter()
            .filter(|p| classify(p, &camera.view_matrix(), mode) == Visibility::Visible)
            .count()
    }

    #[test]
    fn face_on_cube_shows_only_front_face() {
        let camera = Camera::new(Point::new(0., 0., -500.));
        assert_eq!(visible_faces(&camera, ProjectionMode::Perspective), 1);
        assert_eq!(visible_faces(&camera, ProjectionMode::Axonometric), 1);
    }

    #[test]
    fn oblique_views_show_three_faces() {
        for (x, y, z) in [
            (400., 300., -500.),
            (-400., 300., -500.),
            (400., -300., 500.),
            (-350., -420., -380.),
            (600., 250., 410.),
        ] {
            let camera = Camera::looking_at(Point::new(x, y, z), Point::zero());
            assert_eq!(visible_faces(&camera, ProjectionMode::Perspective), 3, "{x} {y} {z}");
        }
    }

    #[test]
    fn convex_solid_never_shows_more_than_half() {
        let solids = [
            generator::cube(100.),
            generator::octahedron(100.),
            generator::icosahedron(100.),
            generator::dodecahedron(100.),
        ];
        for solid in solids {
            let polygons = solid.polygons();
            for i in 0..24 {
                let angle = i as f64 * std::f64::consts::TAU / 24.;
                let from = Point::new(600. * angle.cos(), 150. * (i % 5) as f64 - 300., 600. * angle.sin());
                let camera = Camera::looking_at(from, Point::zero());
                let view = camera.view_matrix();
                let visible = polygons
                    .iter()
                    .filter(|p| classify(p, &view, ProjectionMode::Perspective) == Visibility::Visible)
                    .count();
                // centrally symmetric solids: a face and its opposite are never both visible
                assert!(visible >= 1 && visible <= polygons.len() / 2, "{visible}");

                // visible exactly when the outward normal points back at the camera
                for p in &polygons {
                    let to_face = p.centroid().unwrap() - from;
                    let expected = p.normal().unwrap().dot(to_face) < 0.;
                    assert_eq!(
                        classify(p, &view, ProjectionMode::Perspective) == Visibility::Visible,
                        expected
                    );
                }
            }
        }
    }

    #[test]
    fn degenerate_polygon_is_never_visible() {
        let polygon = Polygon::from_points([Point::zero(), Point::new(1., 0., 0.)]);
        assert_eq!(
            classify(&polygon, &Matrix::identity(), ProjectionMode::Perspective),
            Visibility::Degenerate
        );
    }
}
