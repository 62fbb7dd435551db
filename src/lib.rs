pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod service;
pub mod spotify;
pub mod store;
