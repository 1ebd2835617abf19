//! Environment-sourced configuration, loaded once at startup and passed by
//! reference into the fetcher, mapper, and uploader.

use std::env;

/// Environment variables that must all be present before uploads are attempted.
pub const REQUIRED_STORAGE_VARS: [&str; 3] =
    ["R2_ACCESS_KEY_ID", "R2_SECRET_ACCESS_KEY", "R2_BUCKET_NAME"];

/// Credentials and endpoint for the R2 bucket sitemaps are uploaded to.
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket_name: String,
    pub endpoint_url: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub api_base_url: String,
    pub site_base_url: String,
    pub image_cdn_base: String,
    /// `Some` only when every variable in [`REQUIRED_STORAGE_VARS`] is set.
    pub storage: Option<StorageConfig>,
    /// Filename template; `{year}` and `{month:02d}` are substituted.
    pub sitemap_filename: String,
    /// Key prefix inside the bucket. Empty disables the folder marker.
    pub sitemap_folder: String,
    /// Local directory the generated file is written into.
    pub sitemaps_dir: String,
    pub change_freq: String,
    pub priority: String,
    pub page_size: u32,
}

impl Config {
    pub fn from_env() -> Self {
        let storage = if missing_storage_vars().is_empty() {
            Some(StorageConfig {
                access_key_id: env::var("R2_ACCESS_KEY_ID").unwrap_or_default(),
                secret_access_key: env::var("R2_SECRET_ACCESS_KEY").unwrap_or_default(),
                bucket_name: env::var("R2_BUCKET_NAME").unwrap_or_default(),
                endpoint_url: env::var("R2_ENDPOINT_URL")
                    .unwrap_or("https://r2.cloudflarestorage.com".to_string()),
            })
        } else {
            None
        };

        let page_size: u32 = env::var("PAGE_SIZE")
            .unwrap_or("50".to_string())
            .parse()
            .unwrap_or(50);

        Config {
            api_base_url: env::var("API_BASE_URL")
                .unwrap_or("https://api.rajneete.com/api/v2/home".to_string()),
            site_base_url: env::var("SITE_BASE_URL").unwrap_or("https://rajneete.com".to_string()),
            image_cdn_base: env::var("IMAGE_CDN_BASE")
                .unwrap_or("https://cdn.rajneete.com/original_images".to_string()),
            storage,
            sitemap_filename: env::var("SITEMAP_FILENAME")
                .unwrap_or("sitemap-monthly-{year}-{month:02d}.xml".to_string()),
            sitemap_folder: env::var("SITEMAP_FOLDER").unwrap_or("sitemaps/".to_string()),
            sitemaps_dir: env::var("SITEMAPS_DIR").unwrap_or("sitemaps".to_string()),
            change_freq: env::var("CHANGE_FREQ").unwrap_or("daily".to_string()),
            priority: env::var("PRIORITY").unwrap_or("0.8".to_string()),
            page_size,
        }
    }

    /// Render the sitemap filename for a given month.
    pub fn render_filename(&self, year: i32, month: u32) -> String {
        self.sitemap_filename
            .replace("{year}", &year.to_string())
            .replace("{month:02d}", &format!("{:02}", month))
    }
}

/// Names of the required storage variables that are not set.
pub fn missing_storage_vars() -> Vec<&'static str> {
    REQUIRED_STORAGE_VARS
        .iter()
        .filter(|var| env::var(var).map(|v| v.is_empty()).unwrap_or(true))
        .copied()
        .collect()
}
