pub mod articles;
pub mod config;
pub mod dates;
pub mod logging;
pub mod sitemap;
pub mod storage;

pub const TARGET_WEB_REQUEST: &str = "web_request";
pub const TARGET_STORAGE: &str = "storage";
