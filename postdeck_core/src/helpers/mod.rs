pub mod dto;
pub mod encryption;
pub mod env;
pub mod error;
pub mod format;
pub mod jwt;
