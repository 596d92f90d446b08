pub mod obj_model;
pub mod yaml;
