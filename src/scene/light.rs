pub mod point_light;
