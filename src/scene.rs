pub mod camera;
pub mod io;
pub mod light;
pub mod object;

use derive_builder::Builder;

use crate::{
    math::{color::Color, point::Point, tuple::Tuple},
    scene::{light::point_light::PointLightSource, object::Object},
};

/// Everything that gets drawn: the meshes and the light that shades them.
#[derive(PartialEq, Debug, Clone, Builder)]
#[builder(default, derive(Debug, PartialEq))]
pub struct Scene {
    objects: Vec<Object>,
    light: PointLightSource,
}

impl Default for Scene {
    fn default() -> Self {
        Self::empty()
    }
}

impl SceneBuilder {
    pub fn add_object(&mut self, object: Object) -> &mut Self {
        self.objects.get_or_insert_with(Vec::new).push(object);
        self
    }
}

impl Scene {
    pub fn new(objects: Vec<Object>, light: PointLightSource) -> Self {
        Self { objects, light }
    }

    pub fn empty() -> Self {
        Self::new(
            Vec::new(),
            PointLightSource::new(Point::new(-500., 500., -500.), Color::white()),
        )
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut Vec<Object> {
        &mut self.objects
    }

    pub fn add_object(&mut self, object: Object) {
        self.objects.push(object);
    }

    pub fn light(&self) -> &PointLightSource {
        &self.light
    }

    pub fn set_light(&mut self, light: PointLightSource) {
        self.light = light;
    }
}
