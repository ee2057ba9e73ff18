pub mod compress;
pub mod video;

pub use crate::helpers::format::format_file_size;
