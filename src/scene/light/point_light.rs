use crate::{
    math::{color::Color, point::Point, vector::Vector},
    scene::object::material::Material,
};

#[derive(PartialEq, Debug, Clone, Copy)]
pub struct PointLightSource {
    position: Point,
    intensity: Color,
}

impl Default for PointLightSource {
    fn default() -> Self {
        Self {
            position: Point::zero(),
            intensity: Color::white(),
        }
    }
}

impl PointLightSource {
    pub fn new(position: Point, intensity: Color) -> Self {
        Self {
            position,
            intensity,
        }
    }

    pub fn intensity(&self) -> Color {
        self.intensity
    }

    pub fn position(&self) -> Point {
        self.position
    }

    /// Unit vector from `point` toward the light.
    pub fn direction_from(&self, point: Point) -> Vector {
        (self.position - point).normalize()
    }

    /// Color of `point` lit by this source, using the Phong reflection model.
    /// `normal` must be a unit vector; the result is clamped into 0..1.
    pub fn shade(&self, point: Point, normal: Vector, eye_pos: Point, material: &Material) -> Color {
        let ambient = material.ambient * self.intensity;

        let light_v = self.direction_from(point);
        let light_dot_normal = light_v.dot(normal);

        // light on the other side of the surface: no diffuse and no highlight
        if light_dot_normal <= 0. {
            return ambient.clamped();
        }
        let diffuse = material.diffuse * self.intensity * light_dot_normal;

        let eye_v = (eye_pos - point).normalize();
        let reflect_dot_eye = (-light_v).reflect(normal).dot(eye_v);
        let specular = if reflect_dot_eye > 0. {
            material.specular * self.intensity * reflect_dot_eye.powf(material.shininess)
        } else {
            Color::black()
        };

        (ambient + diffuse + specular).clamped()
    }
}
