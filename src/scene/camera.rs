use std::str::FromStr;

use derive_builder::Builder;

use crate::math::{matrix::Matrix, point::Point, tuple::Tuple, vector::Vector};

/// Discrete per-frame input state, one flag per control.
/// Movement integrates along world axes, turning integrates Euler angles.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Default)]
pub struct CameraInput {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub yaw_left: bool,
    pub yaw_right: bool,
    pub pitch_up: bool,
    pub pitch_down: bool,
    pub roll_left: bool,
    pub roll_right: bool,
}

impl CameraInput {
    pub fn none() -> Self {
        Self::default()
    }

    /// Builds input from control names such as `forward` or `yaw-left`.
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<Self, String> {
        let mut input = Self::default();
        for name in names {
            *input.flag_mut(name)? = true;
        }
        Ok(input)
    }

    fn flag_mut(&mut self, name: &str) -> Result<&mut bool, String> {
        Ok(match name {
            "forward" => &mut self.forward,
            "back" => &mut self.back,
            "left" => &mut self.left,
            "right" => &mut self.right,
            "up" => &mut self.up,
            "down" => &mut self.down,
            "yaw-left" => &mut self.yaw_left,
            "yaw-right" => &mut self.yaw_right,
            "pitch-up" => &mut self.pitch_up,
            "pitch-down" => &mut self.pitch_down,
            "roll-left" => &mut self.roll_left,
            "roll-right" => &mut self.roll_right,
            other => return Err(format!("unknown camera control `{other}`")),
        })
    }
}

impl FromStr for CameraInput {
    type Err = String;

    /// Comma separated control names, e.g. `forward,yaw-left`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_names(s.split(',').map(str::trim).filter(|n| !n.is_empty()))
    }
}

/// Viewer position and orientation. View space puts the camera at the origin looking along +z,
/// with +x to the right and +y up.
#[derive(PartialEq, Debug, Clone, Builder)]
#[builder(default, derive(Debug, PartialEq))]
pub struct Camera {
    position: Point,
    /// Pitch, positive tilts the view down.
    angle_x: f64,
    /// Yaw, positive turns the view toward +x.
    angle_y: f64,
    /// Roll around the viewing axis.
    angle_z: f64,
    #[builder(default = "Camera::DEFAULT_MOVE_STEP")]
    move_step: f64,
    #[builder(default = "Camera::DEFAULT_TURN_STEP")]
    turn_step: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Point::zero(),
            angle_x: 0.,
            angle_y: 0.,
            angle_z: 0.,
            move_step: Self::DEFAULT_MOVE_STEP,
            turn_step: Self::DEFAULT_TURN_STEP,
        }
    }
}

impl CameraBuilder {
    /// Orients the camera so that `to` lies straight ahead of `from`.
    pub fn looking_at(&mut self, from: Point, to: Point) -> &mut Self {
        let (angle_x, angle_y) = Camera::angles_toward(from, to);
        self.position(from).angle_x(angle_x).angle_y(angle_y).angle_z(0.)
    }
}

impl Camera {
    pub const DEFAULT_MOVE_STEP: f64 = 5.;
    pub const DEFAULT_TURN_STEP: f64 = std::f64::consts::PI / 180.;

    pub fn new(position: Point) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn looking_at(from: Point, to: Point) -> Self {
        let (angle_x, angle_y) = Self::angles_toward(from, to);
        Self {
            position: from,
            angle_x,
            angle_y,
            ..Default::default()
        }
    }

    fn angles_toward(from: Point, to: Point) -> (f64, f64) {
        let d = (to - from).normalize();
        if d == Vector::zero() {
            return (0., 0.);
        }
        let angle_y = d.x().atan2(d.z());
        let angle_x = -d.y().clamp(-1., 1.).asin();
        (angle_x, angle_y)
    }

    /// World to view transform: undo the translation, then the yaw, pitch and roll.
    pub fn view_matrix(&self) -> Matrix {
        Matrix::rotation_z(-self.angle_z)
            * Matrix::rotation_x(-self.angle_x)
            * Matrix::rotation_y(-self.angle_y)
            * Matrix::translation(-self.position.x(), -self.position.y(), -self.position.z())
    }

    /// Unit vector the camera looks along, in world space.
    pub fn forward(&self) -> Vector {
        let (sin_x, cos_x) = self.angle_x.sin_cos();
        let (sin_y, cos_y) = self.angle_y.sin_cos();
        Vector::new(sin_y * cos_x, -sin_x, cos_y * cos_x)
    }

    /// Integrates one frame of input with fixed steps.
    pub fn update(&mut self, input: &CameraInput) {
        let step = |pos: bool, neg: bool, size: f64| match (pos, neg) {
            (true, false) => size,
            (false, true) => -size,
            _ => 0.,
        };
        let m = self.move_step;
        let t = self.turn_step;

        self.position = self.position
            + Vector::new(
                step(input.right, input.left, m),
                step(input.up, input.down, m),
                step(input.forward, input.back, m),
            );
        self.angle_y += step(input.yaw_right, input.yaw_left, t);
        self.angle_x += step(input.pitch_down, input.pitch_up, t);
        self.angle_z += step(input.roll_right, input.roll_left, t);
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn angle_x(&self) -> f64 {
        self.angle_x
    }

    pub fn angle_y(&self) -> f64 {
        self.angle_y
    }

    pub fn angle_z(&self) -> f64 {
        self.angle_z
    }
}
