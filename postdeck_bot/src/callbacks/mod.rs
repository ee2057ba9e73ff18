pub mod action;
pub mod handler;
