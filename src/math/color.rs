use std::{iter::Sum, ops};

use super::approx_eq::ApproxEq;

/// Linear RGB with unbounded components; lighting sums may exceed 1 until [`Color::clamped`].
#[derive(Copy, Clone, Debug, Default)]
pub struct Color {
    r: f64,
    g: f64,
    b: f64,
}

impl Color {
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub fn gray(v: f64) -> Self {
        Self::new(v, v, v)
    }

    pub fn black() -> Self {
        Self::gray(0.)
    }

    pub fn white() -> Self {
        Self::gray(1.)
    }

    pub fn red() -> Self {
        Self::new(1., 0., 0.)
    }

    pub fn green() -> Self {
        Self::new(0., 1., 0.)
    }

    pub fn blue() -> Self {
        Self::new(0., 0., 1.)
    }

    pub fn r(&self) -> f64 {
        self.r
    }

    pub fn g(&self) -> f64 {
        self.g
    }

    pub fn b(&self) -> f64 {
        self.b
    }

    fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self::new(f(self.r), f(self.g), f(self.b))
    }

    fn zip(self, rhs: Self, f: impl Fn(f64, f64) -> f64) -> Self {
        Self::new(f(self.r, rhs.r), f(self.g, rhs.g), f(self.b, rhs.b))
    }

    pub fn clamped(&self) -> Self {
        self.map(|c| c.clamp(0., 1.))
    }

    /// Weighted sum of three colors, with barycentric `weights` across a triangle.
    pub fn blend3(colors: [Color; 3], weights: [f64; 3]) -> Self {
        colors.iter().zip(weights).map(|(&c, w)| c * w).sum()
    }

    /// 8-bit channels, saturating outside 0..1 and rounding to nearest.
    pub fn to_rgb8(&self) -> [u8; 3] {
        let c = self.clamped();
        [c.r, c.g, c.b].map(|v| (v * 255.).round() as u8)
    }
}

impl ApproxEq for Color {
    fn approx_eq_epsilon(&self, other: &Self, epsilon: f64) -> bool {
        [self.r - other.r, self.g - other.g, self.b - other.b]
            .iter()
            .all(|d| d.approx_eq_epsilon(&0., epsilon))
    }
}

impl PartialEq for Color {
    fn eq(&self, other: &Self) -> bool {
        self.approx_eq(other)
    }
}

impl ops::Add for Color {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        self.zip(rhs, |a, b| a + b)
    }
}

impl ops::AddAssign for Color {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// Channel-wise product, how a light's intensity filters a material color.
impl ops::Mul for Color {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        self.zip(rhs, |a, b| a * b)
    }
}

impl ops::Mul<f64> for Color {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        self.map(|c| c * rhs)
    }
}

impl Sum for Color {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Color::black(), |acc, c| acc + c)
    }
}
