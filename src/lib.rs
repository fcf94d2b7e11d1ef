//! Vitrine - backend service for a personal portfolio and blog
//!
//! This library provides the core functionality for the Vitrine service:
//! the GitHub project aggregator, the AI summary pipeline, and the blog.

pub mod ai;
pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod github;
pub mod models;
pub mod services;
