pub mod news_dto;

pub use news_dto::{
    CreateNewsDto, NewsDetailDto, NewsListItemDto, NewsPublicDto, NewsQueryParams, NewsStatsDto,
    PublicNewsQueryParams, UpdateNewsDto, ViewCountDto,
};
