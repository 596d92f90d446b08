pub mod math {
    pub mod approx_eq;
    pub mod color;
    pub mod matrix;
    pub mod point;
    pub mod transform;
    pub mod tuple;
    pub mod vector;
}

pub mod render {
    pub mod animator;
    pub mod canvas;
    pub mod depth;
    pub mod depth_buffer;
    pub mod projection;
    pub mod raster;
    pub mod renderer;
    pub mod shading;
    pub mod visibility;
}

pub mod scene;

pub use scene::io::{obj_model, yaml};
