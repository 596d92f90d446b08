//! Procedural meshes: the platonic solids, surfaces of revolution and height fields.
//! Every generated face is wound counter-clockwise when seen from the side its normal points to.

use std::{f64::consts::PI, str::FromStr};

use crate::math::{point::Point, tuple::Tuple, vector::Vector};

use super::Object;

const GOLDEN_RATIO: f64 = 1.618_033_988_749_895;
/// Tolerance when grouping vertices onto a face plane, in unit-solid coordinates.
const FACE_PLANE_EPSILON: f64 = 1.0e-9;
/// Profile points closer than this to the axis of revolution collapse into one vertex.
const AXIS_EPSILON: f64 = 1.0e-9;

fn signs2() -> [(f64, f64); 4] {
    [(1., 1.), (1., -1.), (-1., 1.), (-1., -1.)]
}

fn signs3() -> impl Iterator<Item = (f64, f64, f64)> {
    signs2()
        .into_iter()
        .flat_map(|(a, b)| [(a, b, 1.), (a, b, -1.)])
}

/// The three cyclic coordinate permutations of `(0, a, b)` for all sign combinations.
fn cyclic_permutations(a: f64, b: f64) -> Vec<Vector> {
    signs2()
        .into_iter()
        .flat_map(|(sa, sb)| {
            let (a, b) = (sa * a, sb * b);
            [
                Vector::new(0., a, b),
                Vector::new(a, b, 0.),
                Vector::new(b, 0., a),
            ]
        })
        .collect()
}

fn corners() -> Vec<Vector> {
    signs3().map(|(x, y, z)| Vector::new(x, y, z)).collect()
}

/// Orders the vertex indices of a planar face counter-clockwise around `normal`.
fn wind_around(points: &[Point], face: &mut [usize], normal: Vector) {
    let Some(centroid) = Point::mean(face.iter().filter_map(|&i| points.get(i))) else {
        return;
    };
    let Some(&first) = face.first() else {
        return;
    };
    let u = (points[first] - centroid).normalize();
    let w = normal.normalize().cross(u);
    let angle = |i: usize| {
        let d = points[i] - centroid;
        d.dot(w).atan2(d.dot(u))
    };
    face.sort_by(|&a, &b| angle(a).total_cmp(&angle(b)));
}

/// Convex solid centred at the origin. Each face is the set of vertices that lie furthest
/// along one of `face_normals`; its winding follows that normal.
fn convex_solid(directions: Vec<Vector>, face_normals: Vec<Vector>, radius: f64) -> Object {
    let unit = directions[0].magnitude();
    let points: Vec<Point> = directions
        .iter()
        .map(|d| Point::zero() + *d * (radius / unit))
        .collect();

    let faces = face_normals
        .into_iter()
        .map(|n| {
            let heights: Vec<f64> = directions.iter().map(|d| d.dot(n)).collect();
            let top = heights.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let mut face: Vec<usize> = heights
                .iter()
                .enumerate()
                .filter(|(_, h)| (top - *h).abs() < FACE_PLANE_EPSILON)
                .map(|(i, _)| i)
                .collect();
            wind_around(&points, &mut face, n);
            face
        })
        .collect();

    Object::from_points(points, faces)
}

/// Axis-aligned cube with edge length `size`.
pub fn cube(size: f64) -> Object {
    let axes = vec![
        Vector::new(1., 0., 0.),
        Vector::new(-1., 0., 0.),
        Vector::new(0., 1., 0.),
        Vector::new(0., -1., 0.),
        Vector::new(0., 0., 1.),
        Vector::new(0., 0., -1.),
    ];
    // corners of the unit cube sit at distance sqrt(3) from its centre
    convex_solid(corners(), axes, size * 3f64.sqrt() / 2.)
}

/// Tetrahedron with circumradius `radius`.
pub fn tetrahedron(radius: f64) -> Object {
    let directions = vec![
        Vector::new(1., 1., 1.),
        Vector::new(1., -1., -1.),
        Vector::new(-1., 1., -1.),
        Vector::new(-1., -1., 1.),
    ];
    let face_normals = directions.iter().map(|d| -*d).collect();
    convex_solid(directions, face_normals, radius)
}

/// Octahedron with circumradius `radius`.
pub fn octahedron(radius: f64) -> Object {
    let directions = vec![
        Vector::new(1., 0., 0.),
        Vector::new(-1., 0., 0.),
        Vector::new(0., 1., 0.),
        Vector::new(0., -1., 0.),
        Vector::new(0., 0., 1.),
        Vector::new(0., 0., -1.),
    ];
    convex_solid(directions, corners(), radius)
}

/// Icosahedron with circumradius `radius`.
pub fn icosahedron(radius: f64) -> Object {
    let phi = GOLDEN_RATIO;
    // face normals point at the vertices of the dual dodecahedron
    let mut face_normals = corners();
    face_normals.extend(cyclic_permutations(phi, 1. / phi));
    convex_solid(cyclic_permutations(1., phi), face_normals, radius)
}

/// Dodecahedron with circumradius `radius`.
pub fn dodecahedron(radius: f64) -> Object {
    let phi = GOLDEN_RATIO;
    let mut directions = corners();
    directions.extend(cyclic_permutations(1. / phi, phi));
    convex_solid(directions, cyclic_permutations(phi, 1.), radius)
}

/// Revolves a profile of `(x, r)` points around the X axis in `segments` steps.
/// `r` is the distance from the axis; points on the axis become single vertices.
/// Faces are oriented away from the axis.
pub fn surface_of_revolution(profile: &[(f64, f64)], segments: usize) -> Object {
    let segments = segments.max(3);
    let mut points = Vec::new();
    // rings[i][j]: vertex of profile point i at segment j
    let rings: Vec<Vec<usize>> = profile
        .iter()
        .map(|&(x, r)| {
            if r.abs() < AXIS_EPSILON {
                points.push(Point::new(x, 0., 0.));
                vec![points.len() - 1; segments]
            } else {
                (0..segments)
                    .map(|j| {
                        let angle = 2. * PI * j as f64 / segments as f64;
                        points.push(Point::new(x, r * angle.cos(), r * angle.sin()));
                        points.len() - 1
                    })
                    .collect()
            }
        })
        .collect();

    let mut faces = Vec::new();
    for pair in rings.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        for j in 0..segments {
            let next = (j + 1) % segments;
            let mut face = vec![a[j], b[j], b[next], a[next]];
            face.dedup();
            if face.first() == face.last() {
                face.pop();
            }
            if face.len() < 3 {
                continue;
            }
            orient_away_from_axis(&points, &mut face);
            faces.push(face);
        }
    }
    Object::from_points(points, faces)
}

fn orient_away_from_axis(points: &[Point], face: &mut [usize]) {
    let vs: Vec<Point> = face.iter().map(|&i| points[i]).collect();
    let normal = (vs[1] - vs[0]).cross(vs[2] - vs[0]);
    let Some(centroid) = Point::mean(&vs) else {
        return;
    };
    let outward = Vector::new(0., centroid.y(), centroid.z());
    if normal.dot(outward) < 0. {
        face[1..].reverse();
    }
}

/// Named height fields available from scene files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceFunction {
    /// `x^2 + y^2`
    Paraboloid,
    /// `x^2 - y^2`
    Saddle,
    /// `sin(sqrt(x^2 + y^2))`
    Ripple,
    /// `sin(x) * cos(y)`
    Waves,
}

impl SurfaceFunction {
    pub fn eval(&self, x: f64, y: f64) -> f64 {
        match self {
            Self::Paraboloid => x * x + y * y,
            Self::Saddle => x * x - y * y,
            Self::Ripple => (x * x + y * y).sqrt().sin(),
            Self::Waves => x.sin() * y.cos(),
        }
    }
}

impl FromStr for SurfaceFunction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "paraboloid" => Ok(Self::Paraboloid),
            "saddle" => Ok(Self::Saddle),
            "ripple" => Ok(Self::Ripple),
            "waves" => Ok(Self::Waves),
            other => Err(format!("unknown surface function `{other}`")),
        }
    }
}

/// Height field `z = f(x, y)` sampled on a `steps` x `steps` grid, two triangles per cell,
/// facing +Z. Non-finite samples are flattened to zero.
pub fn function_surface(
    f: impl Fn(f64, f64) -> f64,
    x_range: (f64, f64),
    y_range: (f64, f64),
    steps: usize,
) -> Object {
    let steps = steps.max(1);
    let (x0, x1) = x_range;
    let (y0, y1) = y_range;
    let dx = (x1 - x0) / steps as f64;
    let dy = (y1 - y0) / steps as f64;

    let mut points = Vec::with_capacity((steps + 1) * (steps + 1));
    for i in 0..=steps {
        let y = y0 + i as f64 * dy;
        for j in 0..=steps {
            let x = x0 + j as f64 * dx;
            let z = f(x, y);
            points.push(Point::new(x, y, if z.is_finite() { z } else { 0. }));
        }
    }

    let index = |i: usize, j: usize| i * (steps + 1) + j;
    let mut faces = Vec::with_capacity(steps * steps * 2);
    for i in 0..steps {
        for j in 0..steps {
            let (a, b) = (index(i, j), index(i, j + 1));
            let (c, d) = (index(i + 1, j + 1), index(i + 1, j));
            faces.push(vec![a, b, c]);
            faces.push(vec![a, c, d]);
        }
    }
    Object::from_points(points, faces)
}
