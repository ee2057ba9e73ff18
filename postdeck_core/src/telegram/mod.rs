pub mod broadcast;
pub mod dto;
pub mod storage;
