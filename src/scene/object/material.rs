use crate::math::color::Color;

/// Phong reflection coefficients. Each term is a color multiplied with the light's intensity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub ambient: Color,
    pub diffuse: Color,
    pub specular: Color,
    pub shininess: f64, // [1;+inf) (typically up to 200.0)
}

impl Material {
    pub const DEFAULT_AMBIENT: f64 = 0.1;
    pub const DEFAULT_DIFFUSE: f64 = 0.7;
    pub const DEFAULT_SPECULAR: f64 = 1.0;
    pub const DEFAULT_SHININESS: f64 = 100.;

    /// Surface of a single base color: ambient and diffuse are scaled copies of it.
    pub fn with_color(color: Color) -> Self {
        Self {
            ambient: color * Self::DEFAULT_AMBIENT,
            diffuse: color * Self::DEFAULT_DIFFUSE,
            ..Default::default()
        }
    }

    pub fn matte_with_color(color: Color) -> Self {
        Self {
            specular: Color::gray(0.05),
            shininess: 15.,
            ..Self::with_color(color)
        }
    }

    /// Color used by the toon ramp and anywhere a single surface color is needed.
    pub fn base_color(&self) -> Color {
        self.diffuse
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: Color::gray(Self::DEFAULT_AMBIENT),
            diffuse: Color::gray(Self::DEFAULT_DIFFUSE),
            specular: Color::gray(Self::DEFAULT_SPECULAR),
            shininess: Self::DEFAULT_SHININESS,
        }
    }
}
