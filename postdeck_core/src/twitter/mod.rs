pub mod auth;
pub mod client;
pub mod credential_file;
pub mod dto;
pub mod storage;
