// src/handlers/mod.rs

pub mod auth;
pub mod comments;
pub mod ownership;
pub mod posts;
pub mod profile;
