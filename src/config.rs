use std::path::PathBuf;
use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};

pub const PRODUCT_URL_BASE: &str = "https://globalbunjang.com/product";
pub const MEDIA_URL_BASE: &str = "https://media.bunjang.co.kr/product";
pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; PhotocardCatalog/0.1)";

/// Route fragment the marketplace redirects removed listings to.
pub const ERROR_ROUTE_MARKER: &str = "product-error";

/// Lower-cased phrases whose presence in a product page means the listing can
/// no longer be bought (deleted, sold, or rendered as the empty-product page).
pub const UNAVAILABLE_MARKERS: &[&str] = &[
    "this item is no longer available",
    "it may have been removed",
    "check out other products or go back to home",
    "sold out on bunjang",
    "sold on bunjang",
    "emptycase",
    "product-error/deleted",
];

pub const MAX_IN_FLIGHT_CHECKS: usize = 12;
pub const CHECK_TIMEOUT: Duration = Duration::from_secs(8);
pub const MIN_GROUP_SIZE: usize = 2;
pub const SERIES_CAP: usize = 30;
pub const MAX_REDIRECTS: usize = 10;

/// Completed verification units between progress log lines.
pub const PROGRESS_EVERY: usize = 50;

/// Seconds east of UTC for timestamps that carry no zone (marketplace local time).
pub const NAIVE_OFFSET_SECONDS: i32 = 9 * 3600;

pub fn default_naive_offset() -> FixedOffset {
    FixedOffset::east_opt(NAIVE_OFFSET_SECONDS).unwrap_or_else(|| Utc.fix())
}

pub fn product_url(product_id: &str) -> String {
    format!("{}/{}", PRODUCT_URL_BASE, product_id)
}

pub fn media_url(product_id: &str, epoch_seconds: i64) -> String {
    format!("{}/{}_1_{}_w640.jpg", MEDIA_URL_BASE, product_id, epoch_seconds)
}

pub fn default_data_dir() -> PathBuf {
    if let Some(data) = dirs::data_dir() {
        data.join("photocard-catalog")
    } else {
        PathBuf::from(".photocard-catalog")
    }
}

pub fn default_snapshot_path() -> PathBuf {
    default_data_dir().join("photocard_data.json")
}
