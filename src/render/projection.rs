use std::{f64::consts::FRAC_PI_4, fmt::Display};

use clap::ValueEnum;

use crate::{
    math::{matrix::Matrix, point::Point, tuple::Tuple},
    render::shading::FaceShading,
};

/// Homogeneous `w` at or below this puts a point on or behind the projection plane.
pub const MIN_W: f64 = 1.0e-6;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, ValueEnum)]
pub enum ProjectionMode {
    #[default]
    Perspective,
    Axonometric,
}

impl Display for ProjectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectionMode::Perspective => write!(f, "perspective"),
            ProjectionMode::Axonometric => write!(f, "axonometric"),
        }
    }
}

/// Screen position in pixels (y grows downward) with the view-space depth it came from.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
    pub depth: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64, depth: f64) -> Self {
        Self { x, y, depth }
    }
}

/// Maps view-space points onto the screen plane.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Projection {
    /// Pinhole camera; `view_distance` is the distance to the image plane in pixels.
    Perspective { view_distance: f64 },
    /// Oblique parallel projection: depth shears points by `depth_ratio` along `angle`.
    Axonometric { angle: f64, depth_ratio: f64 },
}

impl Default for Projection {
    fn default() -> Self {
        Self::perspective(Self::DEFAULT_VIEW_DISTANCE)
    }
}

impl Projection {
    pub const DEFAULT_VIEW_DISTANCE: f64 = 400.;
    pub const DEFAULT_AXONOMETRIC_ANGLE: f64 = FRAC_PI_4;
    pub const DEFAULT_DEPTH_RATIO: f64 = 0.5;

    pub fn perspective(view_distance: f64) -> Self {
        Self::Perspective { view_distance }
    }

    pub fn axonometric(angle: f64) -> Self {
        Self::Axonometric {
            angle,
            depth_ratio: Self::DEFAULT_DEPTH_RATIO,
        }
    }

    pub fn mode(&self) -> ProjectionMode {
        match self {
            Self::Perspective { .. } => ProjectionMode::Perspective,
            Self::Axonometric { .. } => ProjectionMode::Axonometric,
        }
    }

    #[rustfmt::skip]
    pub fn matrix(&self) -> Matrix {
        match *self {
            Self::Perspective { view_distance: c } => Matrix::new([
                c, 0., 0., 0.,
                0., c, 0., 0.,
                0., 0., 1., 0.,
                0., 0., 1., 0.,
            ]),
            Self::Axonometric { angle, depth_ratio: k } => Matrix::new([
                1., 0., k * angle.cos(), 0.,
                0., 1., k * angle.sin(), 0.,
                0., 0., 1., 0.,
                0., 0., 0., 1.,
            ]),
        }
    }

    /// Projects a view-space point and moves it to the viewport centre `(cx, cy)`.
    /// Perspective projection fails for points at or behind the camera plane.
    pub fn project(&self, view_point: Point, center: (f64, f64)) -> Option<ScreenPoint> {
        let [x, y, _, w] = self.matrix().mul_homogeneous(view_point);
        let (x, y) = match self {
            Self::Perspective { .. } => {
                if w <= MIN_W {
                    return None;
                }
                (x / w, y / w)
            }
            Self::Axonometric { .. } => (x, y),
        };
        Some(ScreenPoint::new(center.0 + x, center.1 - y, view_point.z()))
    }

    /// Projects every vertex or none: a single failing vertex drops the whole polygon.
    /// This stands in for near-plane clipping.
    pub fn project_polygon(
        &self,
        view_points: impl IntoIterator<Item = Point>,
        center: (f64, f64),
    ) -> Option<Vec<ScreenPoint>> {
        view_points
            .into_iter()
            .map(|p| self.project(p, center))
            .collect()
    }
}

/// A visible polygon ready for rasterization.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonProjection {
    points: Vec<ScreenPoint>,
    depth: f64,
    shading: FaceShading,
}

impl PolygonProjection {
    /// `depth` is the mean of the vertex depths.
    pub fn new(points: Vec<ScreenPoint>, shading: FaceShading) -> Self {
        let depth = if points.is_empty() {
            f64::INFINITY
        } else {
            points.iter().map(|p| p.depth).sum::<f64>() / points.len() as f64
        };
        Self {
            points,
            depth,
            shading,
        }
    }

    pub fn points(&self) -> &[ScreenPoint] {
        &self.points
    }

    pub fn depth(&self) -> f64 {
        self.depth
    }

    pub fn shading(&self) -> &FaceShading {
        &self.shading
    }

    /// Fan triangulation from the first vertex: `(0, i, i + 1)`.
    pub fn triangles(&self) -> impl Iterator<Item = ([usize; 3], [ScreenPoint; 3])> + '_ {
        (1..self.points.len().saturating_sub(1)).map(|i| {
            let ids = [0, i, i + 1];
            (ids, ids.map(|id| self.points[id]))
        })
    }
}
