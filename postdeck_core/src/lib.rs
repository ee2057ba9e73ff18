pub mod accounts;
pub mod analytics;
pub mod english_learning;
pub mod helpers;
pub mod media;
pub mod oauth_config;
pub mod posts;
pub mod telegram;
pub mod twitter;
pub mod users;
