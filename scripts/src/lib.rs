pub mod common;
pub mod list;
pub mod refresh;
pub mod validate;
