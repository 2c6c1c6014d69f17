mod news;

pub use news::{NewNews, News, NewsChanges, NewsStats, NewsStatus, PublishOutcome};
