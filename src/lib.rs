//! Photocard catalog builder.
//!
//! Turns a snapshot of noisy marketplace listings into a catalog of distinct
//! collectible photocards. Each catalog entry carries outlier-trimmed price
//! statistics, a dated price series, and one representative listing whose
//! product page has optionally been checked for availability.
//!
//! # Quick start
//!
//! ```no_run
//! use photocard_catalog::{source, CatalogPipeline};
//!
//! # async fn example() -> photocard_catalog::Result<()> {
//! let snapshot = source::load_snapshot("photocard_data.json")?;
//! let pipeline = CatalogPipeline::builder().verify(true).build()?;
//! let catalog = pipeline.build(&snapshot.listings).await;
//!
//! for entry in catalog.entries.iter().take(5) {
//!     println!("{}: median {}", entry.official_name, entry.stats.median);
//! }
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod normalize;
pub mod select;
pub mod source;
pub mod stats;
pub mod verify;
pub mod vocabulary;

pub use aggregate::{Group, GroupSet};
pub use catalog::CatalogBuilder;
pub use error::{CatalogError, Result};
pub use models::{
    Catalog, CatalogEntry, CatalogReport, NormalizedCard, PricePoint, PriceStatistics, RawListing,
    Representative,
};
pub use normalize::Normalizer;
pub use verify::{Availability, HttpLinkVerifier, LinkVerifier, UnavailableReason};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::FixedOffset;

// ---------------------------------------------------------------------------
// CatalogPipelineBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`CatalogPipeline`].
///
/// Use [`CatalogPipeline::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](CatalogPipelineBuilder::build).
pub struct CatalogPipelineBuilder {
    verify: bool,
    timeout: Duration,
    max_in_flight: usize,
    min_group_size: usize,
    series_cap: usize,
    naive_offset: FixedOffset,
    verifier: Option<Arc<dyn LinkVerifier>>,
}

impl Default for CatalogPipelineBuilder {
    fn default() -> Self {
        Self {
            verify: false,
            timeout: config::CHECK_TIMEOUT,
            max_in_flight: config::MAX_IN_FLIGHT_CHECKS,
            min_group_size: config::MIN_GROUP_SIZE,
            series_cap: config::SERIES_CAP,
            naive_offset: config::default_naive_offset(),
            verifier: None,
        }
    }
}

impl CatalogPipelineBuilder {
    /// Enable or disable representative verification. Defaults to `false`.
    ///
    /// When disabled no request is ever made and every representative is
    /// reported as verified.
    pub fn verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Per-request timeout for availability checks. Defaults to 8 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Maximum number of groups being verified at once. Defaults to 12.
    pub fn max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight;
        self
    }

    /// Groups with fewer members are dropped. Defaults to 2.
    pub fn min_group_size(mut self, min_group_size: usize) -> Self {
        self.min_group_size = min_group_size;
        self
    }

    /// Number of most recent points kept in each price series. Defaults to 30.
    pub fn series_cap(mut self, series_cap: usize) -> Self {
        self.series_cap = series_cap;
        self
    }

    /// Offset used for timestamps that carry no zone. Defaults to UTC+9.
    pub fn naive_offset(mut self, offset: FixedOffset) -> Self {
        self.naive_offset = offset;
        self
    }

    /// Use a custom verifier instead of the HTTP one. Implies `verify(true)`.
    pub fn verifier(mut self, verifier: Arc<dyn LinkVerifier>) -> Self {
        self.verifier = Some(verifier);
        self.verify = true;
        self
    }

    /// Build the pipeline. Creates the HTTP client when verification is on
    /// and no custom verifier was supplied.
    pub fn build(self) -> Result<CatalogPipeline> {
        if self.max_in_flight == 0 {
            return Err(CatalogError::InvalidArgument(
                "max_in_flight must be at least 1".into(),
            ));
        }
        if self.min_group_size == 0 {
            return Err(CatalogError::InvalidArgument(
                "min_group_size must be at least 1".into(),
            ));
        }

        let verifier: Option<Arc<dyn LinkVerifier>> = match (self.verify, self.verifier) {
            (false, _) => None,
            (true, Some(v)) => Some(v),
            (true, None) => Some(Arc::new(HttpLinkVerifier::new(self.timeout)?)),
        };

        Ok(CatalogPipeline {
            normalizer: Normalizer::new(self.naive_offset),
            builder: CatalogBuilder::new(
                self.min_group_size,
                self.series_cap,
                self.max_in_flight,
                verifier,
            ),
        })
    }
}

// ---------------------------------------------------------------------------
// CatalogPipeline
// ---------------------------------------------------------------------------

/// Runs listings through normalization, grouping, pricing and representative
/// selection.
///
/// Created via [`CatalogPipeline::builder()`].
#[derive(Clone)]
pub struct CatalogPipeline {
    normalizer: Normalizer,
    builder: CatalogBuilder,
}

impl CatalogPipeline {
    pub fn builder() -> CatalogPipelineBuilder {
        CatalogPipelineBuilder::default()
    }

    fn normalize(&self, listings: &[RawListing]) -> (Vec<NormalizedCard>, CatalogReport) {
        let (cards, skipped) = self.normalizer.normalize_all(listings);
        let report = CatalogReport {
            records: listings.len(),
            skipped_records: skipped,
            ..CatalogReport::default()
        };
        (cards, report)
    }

    /// Build the catalog, verifying representatives if the pipeline was
    /// configured to. Returns once every verification unit has finished.
    pub async fn build(&self, listings: &[RawListing]) -> Catalog {
        let (cards, report) = self.normalize(listings);
        self.builder.build(cards, report).await
    }

    /// Build the catalog without verification, regardless of configuration.
    /// Needs no async runtime.
    pub fn build_unverified(&self, listings: &[RawListing]) -> Catalog {
        let (cards, report) = self.normalize(listings);
        self.builder.build_unverified(cards, report)
    }

    /// Build from a loaded snapshot, counting its malformed rows as skipped.
    pub async fn build_snapshot(&self, snapshot: &source::Snapshot) -> Catalog {
        let mut catalog = self.build(&snapshot.listings).await;
        catalog.report.records += snapshot.malformed;
        catalog.report.skipped_records += snapshot.malformed;
        catalog
    }

    pub fn verifies(&self) -> bool {
        self.builder.verifies()
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for CatalogPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CatalogPipeline(verify={})", self.verifies())
    }
}
