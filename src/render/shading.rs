use std::fmt::Display;

use clap::ValueEnum;

use crate::{
    math::{color::Color, point::Point, vector::Vector},
    scene::{
        light::point_light::PointLightSource,
        object::{material::Material, polygon::Polygon},
    },
};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, ValueEnum)]
pub enum ShadingMode {
    /// One Phong evaluation per face, at its centroid.
    #[default]
    Flat,
    /// Phong per vertex, colors interpolated across the face.
    Gouraud,
    /// Normals interpolated per pixel, Lambert intensity quantized by the toon ramp.
    PhongToon,
}

impl Display for ShadingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShadingMode::Flat => write!(f, "flat"),
            ShadingMode::Gouraud => write!(f, "gouraud"),
            ShadingMode::PhongToon => write!(f, "phong-toon"),
        }
    }
}

/// Quantizes a light intensity into discrete bands.
#[derive(Debug, Clone, PartialEq)]
pub struct ToonRamp {
    /// `(threshold, value)` pairs; the first band whose threshold the intensity reaches wins.
    bands: Vec<(f64, f64)>,
    floor: f64,
}

impl Default for ToonRamp {
    fn default() -> Self {
        Self::new(vec![(0.95, 1.0), (0.5, 0.7), (0.25, 0.4)], 0.2)
    }
}

impl ToonRamp {
    /// Bands are sorted by descending threshold so that the brightest matching band is taken.
    pub fn new(mut bands: Vec<(f64, f64)>, floor: f64) -> Self {
        bands.sort_by(|a, b| b.0.total_cmp(&a.0));
        Self { bands, floor }
    }

    pub fn bands(&self) -> &[(f64, f64)] {
        &self.bands
    }

    pub fn floor(&self) -> f64 {
        self.floor
    }

    pub fn quantize(&self, intensity: f64) -> f64 {
        self.bands
            .iter()
            .find(|(threshold, _)| intensity >= *threshold)
            .map_or(self.floor, |(_, value)| *value)
    }
}

/// Per-face shading data, computed once per visible polygon and sampled per pixel.
/// Per-vertex data is indexed like the polygon's vertices.
#[derive(Debug, Clone, PartialEq)]
pub enum FaceShading {
    Flat(Color),
    Gouraud(Vec<Color>),
    PhongToon {
        normals: Vec<Vector>,
        light_dir: Vector,
        base: Color,
    },
}

impl FaceShading {
    /// Lights `polygon` (in world space) for the given mode.
    /// `None` when the polygon has no face normal.
    pub fn compute(
        polygon: &Polygon,
        mode: ShadingMode,
        light: &PointLightSource,
        eye_pos: Point,
        material: &Material,
    ) -> Option<Self> {
        let normal = polygon.normal()?;
        let shading = match mode {
            ShadingMode::Flat => {
                let centroid = polygon.centroid()?;
                Self::Flat(light.shade(centroid, normal, eye_pos, material))
            }
            ShadingMode::Gouraud => Self::Gouraud(
                polygon
                    .vertices()
                    .iter()
                    .enumerate()
                    .map(|(i, v)| {
                        let n = polygon.vertex_normal(i).unwrap_or(normal);
                        light.shade(v.position, n, eye_pos, material)
                    })
                    .collect(),
            ),
            ShadingMode::PhongToon => Self::PhongToon {
                normals: (0..polygon.len())
                    .map(|i| polygon.vertex_normal(i).unwrap_or(normal))
                    .collect(),
                light_dir: light.direction_from(polygon.centroid()?),
                base: material.base_color(),
            },
        };
        Some(shading)
    }

    /// Color at a pixel of the fan triangle `ids`, given its barycentric `weights`.
    pub fn color_at(&self, ids: [usize; 3], weights: [f64; 3], ramp: &ToonRamp) -> Color {
        match self {
            Self::Flat(color) => *color,
            Self::Gouraud(colors) => Color::blend3(ids.map(|i| colors[i]), weights),
            Self::PhongToon {
                normals,
                light_dir,
                base,
            } => {
                let n = Vector::blend3(ids.map(|i| normals[i]), weights);
                let intensity = n.normalize().dot(*light_dir).max(0.);
                *base * ramp.quantize(intensity)
            }
        }
    }
}
