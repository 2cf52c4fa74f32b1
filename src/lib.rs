#![deny(warnings)]

pub mod api;
pub mod app_config;
pub mod auth;
pub mod commands;
pub mod entities;
mod error;
pub use error::{json_config, ApiError, ErrorMessage};
pub mod queries;
