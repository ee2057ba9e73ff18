pub mod dto;
pub mod prompt;
pub mod tutor;
