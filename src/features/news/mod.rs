//! News articles: CRUD, soft deletion, publication and view counting.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Access |
//! |--------|----------|--------|
//! | GET, POST | `/api/news` | authenticated, POST staff |
//! | GET, PUT, PATCH, DELETE | `/api/news/{id}` | authenticated, writes staff |
//! | POST | `/api/news/{id}/restore` | staff |
//! | POST | `/api/news/{id}/publish` | staff |
//! | GET | `/api/news/stats` | staff |
//! | POST | `/api/news/{id}/increment_views` | anyone |
//! | GET | `/api/news/public`, `/api/public/news` | anyone |
//! | GET | `/api/public/news/{id}` | anyone |
//! | POST | `/api/public/news/{id}/view` | anyone |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;

pub use repository::{NewsRepository, PgNewsRepository};
pub use services::NewsService;
