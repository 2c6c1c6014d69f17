/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Staff role - editorial staff, can create, edit, publish and delete news
pub const ROLE_STAFF: &str = "staff";

/// Admin role - implies staff access
pub const ROLE_ADMIN: &str = "admin";

// =============================================================================
// SLUGS
// =============================================================================

/// Maximum length of a slug column (news and categories)
pub const MAX_SLUG_LENGTH: usize = 255;

/// Room kept free at the end of a derived base slug for the `-N` suffix
pub const SLUG_SUFFIX_RESERVE: usize = 12;

/// Base slug used when a news title has no sluggable characters
pub const FALLBACK_NEWS_SLUG: &str = "news";

/// Base slug used when a category name has no sluggable characters
pub const FALLBACK_CATEGORY_SLUG: &str = "category";

/// How many times a news insert is retried after losing a slug race
pub const SLUG_INSERT_ATTEMPTS: usize = 5;

// =============================================================================
// IMAGE UPLOADS
// =============================================================================

/// Allowed MIME types for news images
pub const ALLOWED_IMAGE_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Maximum image size in bytes (5MB)
pub const MAX_IMAGE_SIZE: usize = 5 * 1024 * 1024;
