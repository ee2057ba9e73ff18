pub mod keyboards;
pub mod render;
