pub mod category_dto;

pub use category_dto::{
    CategoryNewsQueryParams, CategoryQueryParams, CategoryResponseDto, CreateCategoryDto,
    UpdateCategoryDto,
};
