use std::fmt::Display;

use clap::ValueEnum;

use super::projection::PolygonProjection;

/// How visible polygons are resolved against each other.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, ValueEnum)]
pub enum DepthResolution {
    /// Sort whole polygons far to near by mean depth and overdraw.
    /// Wrong for interpenetrating or cyclically overlapping faces.
    Painter,
    /// Per-pixel depth test against a Z-buffer.
    #[default]
    ZBuffer,
}

impl Display for DepthResolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DepthResolution::Painter => write!(f, "painter"),
            DepthResolution::ZBuffer => write!(f, "z-buffer"),
        }
    }
}

impl DepthResolution {
    pub fn from_z_buffer_flag(enabled: bool) -> Self {
        if enabled {
            Self::ZBuffer
        } else {
            Self::Painter
        }
    }

    pub fn uses_depth_test(&self) -> bool {
        matches!(self, Self::ZBuffer)
    }

    /// Puts the projections in drawing order. The Z-buffer keeps submission order.
    pub fn order(&self, projections: &mut [PolygonProjection]) {
        if let Self::Painter = self {
            projections.sort_by(|a, b| b.depth().total_cmp(&a.depth()));
        }
    }
}
