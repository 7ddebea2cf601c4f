pub mod auth;
pub mod error_pages;
pub mod logging;
pub mod page_cache;
