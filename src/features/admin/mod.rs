//! Editorial back office: bulk actions over news and image uploads for the
//! article editor. Every route requires staff access.

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use services::AdminService;
