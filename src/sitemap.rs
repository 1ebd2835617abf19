//! Sitemap assembly: maps article records into Google News URL entries and
//! serializes the `urlset` document.
//!
//! # Output Format
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9" ...>
//!   <url>
//!     <loc>https://example.com/economy/general/abc123</loc>
//!     <lastmod>2025-06-30T23:51:20.912+06:00</lastmod>
//!     <news:news>...</news:news>
//!     <changefreq>daily</changefreq>
//!     <priority>0.8</priority>
//!   </url>
//! </urlset>
//! ```

use std::borrow::Cow;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use tracing::{info, warn};

use crate::articles::{fetch_articles, Article, CategoryRef, SubcategoryRef};
use crate::config::Config;
use crate::dates::MonthWindow;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
const NEWS_NS: &str = "http://www.google.com/schemas/sitemap-news/0.9";
const IMAGE_NS: &str = "http://www.google.com/schemas/sitemap-image/1.1";

const PUBLICATION_LANGUAGE: &str = "bn";

/// Category slug to Bengali publication name. Unknown slugs fall back to the
/// `news` label.
const PUBLICATION_NAMES: [(&str, &str); 5] = [
    ("domestic-politics", "রাজনীতি"),
    ("field-politics", "মাঠের রাজনীতি"),
    ("world-politics", "বিশ্ব রাজনীতি"),
    ("economy", "অর্থের রাজনীতি"),
    ("news", "খবরাখবর"),
];
const DEFAULT_PUBLICATION_NAME: &str = "খবরাখবর";

/// One `<url>` block, computed fresh per article and serialized immediately.
#[derive(Debug, Clone)]
pub struct SitemapEntry {
    pub loc: String,
    pub lastmod: String,
    pub publication_name: String,
    pub publication_date: String,
    pub title: String,
    pub image: Option<ImageEntry>,
    pub changefreq: String,
    pub priority: String,
}

#[derive(Debug, Clone)]
pub struct ImageEntry {
    pub loc: String,
    pub caption: String,
}

fn dhaka_offset() -> FixedOffset {
    // Asia/Dhaka is UTC+6 year-round, no DST
    FixedOffset::east_opt(6 * 3600).unwrap()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    match value {
        Some(s) if !s.is_empty() => Some(s),
        _ => None,
    }
}

fn first_present<'a>(candidates: &[&'a Option<String>]) -> Option<&'a str> {
    candidates
        .iter()
        .find_map(|candidate| non_empty(candidate.as_deref()))
}

/// Category slug candidates, in order: the explicit `category_slug` field,
/// the nested category object's slug, a bare string category, then `news`.
pub fn category_slug(article: &Article) -> &str {
    if let Some(slug) = non_empty(article.category_slug.as_deref()) {
        return slug;
    }
    match &article.category {
        Some(CategoryRef::Object { slug }) => non_empty(slug.as_deref()).unwrap_or("news"),
        Some(CategoryRef::Slug(slug)) => non_empty(Some(slug)).unwrap_or("news"),
        _ => "news",
    }
}

/// Subcategory slug candidates, in order: the explicit `subcategory_slug`
/// field, the first entry of the `subcategories` list (its slug if
/// structured, else its string form), then `general`.
pub fn subcategory_slug(article: &Article) -> String {
    if let Some(slug) = non_empty(article.subcategory_slug.as_deref()) {
        return slug.to_string();
    }
    match article.subcategories.first() {
        Some(SubcategoryRef::Object { slug }) => match non_empty(slug.as_deref()) {
            Some(slug) => slug.to_string(),
            None => "general".to_string(),
        },
        Some(SubcategoryRef::Text(text)) if !text.is_empty() => text.clone(),
        Some(SubcategoryRef::Other(value)) if value.is_number() => value.to_string(),
        _ => "general".to_string(),
    }
}

/// News identifier candidates, in order: `url_slug`, `slug`, the raw `id`.
pub fn news_identifier(article: &Article) -> String {
    if let Some(slug) = non_empty(article.url_slug.as_deref()) {
        return slug.to_string();
    }
    if let Some(slug) = non_empty(article.slug.as_deref()) {
        return slug.to_string();
    }
    match &article.id {
        Some(id) => id.as_string(),
        None => String::new(),
    }
}

/// Build the URL path `{category}/{subcategory}/{identifier}`.
pub fn url_path(article: &Article) -> String {
    format!(
        "{}/{}/{}",
        category_slug(article),
        subcategory_slug(article),
        news_identifier(article)
    )
}

pub fn publication_name(category_slug: &str) -> &'static str {
    PUBLICATION_NAMES
        .iter()
        .find(|(slug, _)| *slug == category_slug)
        .map(|(_, name)| *name)
        .unwrap_or(DEFAULT_PUBLICATION_NAME)
}

/// Format a timestamp as `YYYY-MM-DDTHH:MM:SS.mmm+06:00` in Asia/Dhaka time.
///
/// Total: absent, empty, and unparseable inputs all fall back to the current
/// time. Naive inputs are assumed UTC. Milliseconds are truncated from the
/// source precision, not rounded.
pub fn format_datetime(value: Option<&str>) -> String {
    let parsed = match non_empty(value) {
        Some(raw) => parse_datetime(raw),
        None => None,
    };
    let utc = parsed.unwrap_or_else(Utc::now);
    utc.with_timezone(&dhaka_offset())
        .format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        .to_string()
}

fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if raw.contains('T') {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }
        // Retry with an explicit fractional-seconds + offset pattern for
        // values RFC 3339 rejects, e.g. a `+0600` offset without the colon.
        if let Ok(parsed) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z") {
            return Some(parsed.with_timezone(&Utc));
        }
        warn!("Error formatting datetime {}: unrecognized ISO-8601 form", raw);
        None
    } else {
        // Date-only strings; naive, assumed UTC
        match NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
            Ok(naive) => Some(Utc.from_utc_datetime(&naive)),
            Err(err) => {
                warn!("Error formatting datetime {}: {}", raw, err);
                None
            }
        }
    }
}

fn image_entry(config: &Config, article: &Article) -> Option<ImageEntry> {
    let raw = first_present(&[
        &article.image_url,
        &article.featured_image,
        &article.thumbnail,
    ])?;
    let loc = if raw.starts_with("http") {
        raw.to_string()
    } else {
        format!("{}/{}", config.image_cdn_base.trim_end_matches('/'), raw)
    };
    let caption = first_present(&[&article.image_caption, &article.title])
        .unwrap_or_default()
        .to_string();
    Some(ImageEntry { loc, caption })
}

/// Derive the sitemap entry for one article. Every field has a fallback;
/// this never fails.
pub fn build_entry(config: &Config, article: &Article) -> SitemapEntry {
    SitemapEntry {
        loc: format!("{}/{}", config.site_base_url, url_path(article)),
        lastmod: format_datetime(first_present(&[
            &article.last_published_at,
            &article.updated_at,
            &article.created_at,
        ])),
        publication_name: publication_name(category_slug(article)).to_string(),
        publication_date: format_datetime(first_present(&[
            &article.published_at,
            &article.created_at,
        ])),
        title: article.title.clone().unwrap_or_default(),
        image: image_entry(config, article),
        changefreq: config.change_freq.clone(),
        priority: config.priority.clone(),
    }
}

fn push_element(xml: &mut String, indent: usize, name: &str, text: &str) {
    for _ in 0..indent {
        xml.push(' ');
    }
    xml.push('<');
    xml.push_str(name);
    xml.push('>');
    xml.push_str(&escape_xml(text));
    xml.push_str("</");
    xml.push_str(name);
    xml.push_str(">\n");
}

/// Serialize entries into the full `urlset` document. Child order inside each
/// `<url>` is fixed: loc, lastmod, news:news, image:image, changefreq,
/// priority.
pub fn entries_to_xml(entries: &[SitemapEntry]) -> Vec<u8> {
    let mut xml = String::with_capacity(4096);

    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(&format!(
        "<urlset xmlns=\"{}\" xmlns:news=\"{}\" xmlns:image=\"{}\">\n",
        SITEMAP_NS, NEWS_NS, IMAGE_NS
    ));

    for entry in entries {
        xml.push_str("  <url>\n");
        push_element(&mut xml, 4, "loc", &entry.loc);
        push_element(&mut xml, 4, "lastmod", &entry.lastmod);
        xml.push_str("    <news:news>\n");
        xml.push_str("      <news:publication>\n");
        push_element(&mut xml, 8, "news:name", &entry.publication_name);
        push_element(&mut xml, 8, "news:language", PUBLICATION_LANGUAGE);
        xml.push_str("      </news:publication>\n");
        push_element(&mut xml, 6, "news:publication_date", &entry.publication_date);
        push_element(&mut xml, 6, "news:title", &entry.title);
        xml.push_str("      <news:keywords/>\n");
        xml.push_str("    </news:news>\n");
        if let Some(image) = &entry.image {
            xml.push_str("    <image:image>\n");
            push_element(&mut xml, 6, "image:loc", &image.loc);
            push_element(&mut xml, 6, "image:caption", &image.caption);
            xml.push_str("    </image:image>\n");
        }
        push_element(&mut xml, 4, "changefreq", &entry.changefreq);
        push_element(&mut xml, 4, "priority", &entry.priority);
        xml.push_str("  </url>\n");
    }

    xml.push_str("</urlset>\n");
    xml.into_bytes()
}

/// Map articles to entries and serialize them.
pub fn generate(config: &Config, articles: &[Article]) -> Vec<u8> {
    let entries: Vec<SitemapEntry> = articles
        .iter()
        .map(|article| build_entry(config, article))
        .collect();
    entries_to_xml(&entries)
}

/// Fetch the month's articles and build the sitemap document.
///
/// A single page is requested; the API window is expected to fit within one
/// page of `page_size` items.
pub async fn generate_monthly(
    client: &reqwest::Client,
    config: &Config,
    window: &MonthWindow,
) -> Vec<u8> {
    let from_date = window.from_date();
    let to_date = window.to_date();
    info!("Generating sitemap for {} to {}", from_date, to_date);

    let articles = fetch_articles(client, config, &from_date, &to_date, 1).await;
    info!("Fetched {} articles for sitemap", articles.len());

    generate(config, &articles)
}

/// Escape special XML characters.
fn escape_xml(s: &str) -> Cow<'_, str> {
    // Fast path: check if escaping is needed
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    Cow::Owned(
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&apos;"),
    )
}
