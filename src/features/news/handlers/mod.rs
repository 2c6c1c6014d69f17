pub mod news_handler;
pub mod public_news_handler;

pub use news_handler::*;
pub use public_news_handler::*;
