use serde::Deserialize;

/// Main configuration structure for Kagami
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// Absolute URL the crawl starts from
    pub seed: String,

    /// Number of concurrent page fetchers
    #[serde(rename = "page-workers", default = "default_page_workers")]
    pub page_workers: usize,

    /// Number of concurrent image downloaders
    #[serde(rename = "image-workers", default = "default_image_workers")]
    pub image_workers: usize,

    /// Number of concurrent markup harvesters
    #[serde(default = "default_harvesters")]
    pub harvesters: usize,

    /// Capacity of each bounded work queue
    #[serde(rename = "queue-size", default = "default_queue_size")]
    pub queue_size: usize,
}

/// Discovery filter configuration
///
/// With neither field set, every discovered address passes. A pattern takes
/// precedence over keywords when both are present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterConfig {
    /// Regex pattern candidate addresses must match
    pub pattern: Option<String>,

    /// Keywords that must all appear in a candidate address
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the full user agent string sent with every request
    ///
    /// Format: CrawlerName/Version (+ContactURL; ContactEmail)
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Root directory receiving mirrored images
    #[serde(rename = "mirror-dir")]
    pub mirror_dir: String,

    /// Path to the SQLite state database
    #[serde(rename = "database-path")]
    pub database_path: String,
}

fn default_page_workers() -> usize {
    6
}

fn default_image_workers() -> usize {
    6
}

fn default_harvesters() -> usize {
    3
}

fn default_queue_size() -> usize {
    1000
}
