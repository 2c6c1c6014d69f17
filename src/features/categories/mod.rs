//! News categories: reference data with a display order and an active flag.
//!
//! Readers only ever see active categories; staff manage all of them.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;

pub use repository::{CategoryRepository, PgCategoryRepository};
pub use services::CategoryService;
