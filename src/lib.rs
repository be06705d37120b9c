pub mod app;
pub mod config;
pub mod domain;
pub mod features;
pub mod infrastructure;
pub mod mail;
pub mod models;
