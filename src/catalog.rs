//! Catalog builder.
//!
//! Groups normalized cards, prices each group, picks its representative and
//! assembles the sorted [`Catalog`]. Only representative verification does I/O:
//! each group becomes one unit of work on a pool of at most `max_in_flight`
//! concurrent units, and the catalog is assembled once every unit has finished.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::aggregate::{Group, GroupSet};
use crate::config;
use crate::error::CatalogError;
use crate::models::{
    Catalog, CatalogEntry, CatalogReport, NormalizedCard, PricePoint, PriceStatistics,
    Representative,
};
use crate::select::{rank_candidates, select_unverified, select_verified};
use crate::stats;
use crate::verify::LinkVerifier;

/// Dated price points for a group, oldest first, keeping only the newest `cap`.
///
/// Points come from positively priced members ordered by their creation
/// timestamp string; the date is its first ten characters.
pub fn price_series(group: &Group, cap: usize) -> Vec<PricePoint> {
    let mut priced: Vec<&NormalizedCard> = group.priced_members().collect();
    priced.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    let skip = priced.len().saturating_sub(cap);
    priced
        .into_iter()
        .skip(skip)
        .map(|c| PricePoint {
            date: c.created_at.get(..10).unwrap_or(c.created_at.as_str()).to_string(),
            price: c.price.floor() as i64,
        })
        .collect()
}

/// Sort descending by transaction count. Stable, so ties keep group order.
pub fn sort_entries(entries: &mut [CatalogEntry]) {
    entries.sort_by(|a, b| b.stats.transaction_count.cmp(&a.stats.transaction_count));
}

/// A priced group waiting for its representative.
#[derive(Debug, Clone)]
struct PricedGroup {
    group: Group,
    stats: PriceStatistics,
    ranked: Vec<NormalizedCard>,
}

/// Assembles catalogs from normalized cards.
#[derive(Clone)]
pub struct CatalogBuilder {
    min_group_size: usize,
    series_cap: usize,
    max_in_flight: usize,
    verifier: Option<Arc<dyn LinkVerifier>>,
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self {
            min_group_size: config::MIN_GROUP_SIZE,
            series_cap: config::SERIES_CAP,
            max_in_flight: config::MAX_IN_FLIGHT_CHECKS,
            verifier: None,
        }
    }
}

impl CatalogBuilder {
    pub fn new(
        min_group_size: usize,
        series_cap: usize,
        max_in_flight: usize,
        verifier: Option<Arc<dyn LinkVerifier>>,
    ) -> Self {
        Self {
            min_group_size,
            series_cap,
            max_in_flight: max_in_flight.max(1),
            verifier,
        }
    }

    pub fn verifies(&self) -> bool {
        self.verifier.is_some()
    }

    /// Group, filter and price the cards. Groups that cannot be priced are
    /// dropped and counted in `report`.
    fn price_groups(
        &self,
        cards: Vec<NormalizedCard>,
        report: &mut CatalogReport,
    ) -> Vec<PricedGroup> {
        let mut groups = GroupSet::from_cards(cards);
        report.groups_formed = groups.len();
        report.groups_below_min_size = groups.retain_min_size(self.min_group_size);

        let mut priced = Vec::with_capacity(groups.len());
        for group in groups.into_groups() {
            match stats::estimate(&group.key, &group.valid_prices()) {
                Ok(stats) => {
                    let ranked = rank_candidates(&group.members, stats.exact_median);
                    priced.push(PricedGroup { group, stats, ranked });
                }
                Err(CatalogError::EmptyPriceSet(key)) => {
                    warn!(group = %key, "dropping group without positive prices");
                    report.groups_without_prices += 1;
                }
                Err(e) => {
                    warn!(group = %group.key, error = %e, "dropping group");
                    report.groups_without_prices += 1;
                }
            }
        }
        info!(
            groups = report.groups_formed,
            below_min_size = report.groups_below_min_size,
            without_prices = report.groups_without_prices,
            priced = priced.len(),
            "groups priced"
        );
        priced
    }

    fn finish(
        &self,
        priced: Vec<PricedGroup>,
        representatives: Vec<Option<Representative>>,
        mut report: CatalogReport,
    ) -> Catalog {
        let mut entries: Vec<CatalogEntry> = priced
            .into_iter()
            .zip(representatives)
            .filter_map(|(p, rep)| {
                let representative = rep.or_else(|| {
                    select_unverified(&p.ranked).map(|mut r| {
                        r.verified = false;
                        r
                    })
                })?;
                Some(CatalogEntry {
                    series: price_series(&p.group, self.series_cap),
                    group_key: p.group.key,
                    member: representative.card.member.clone(),
                    album: representative.card.album.clone(),
                    types: representative.card.types.clone(),
                    official_name: representative.card.official_name(),
                    stats: p.stats,
                    representative,
                })
            })
            .collect();
        sort_entries(&mut entries);

        report.entries_with_media = entries.iter().filter(|e| e.has_media()).count();
        report.entries_verified = entries.iter().filter(|e| e.representative.verified).count();
        info!(
            entries = entries.len(),
            with_media = report.entries_with_media,
            verified = report.entries_verified,
            verification_ran = report.verification_ran,
            "catalog built"
        );
        Catalog { entries, report }
    }

    /// Build without any network checks; every representative is the
    /// top-ranked candidate and marked verified.
    pub fn build_unverified(
        &self,
        cards: Vec<NormalizedCard>,
        mut report: CatalogReport,
    ) -> Catalog {
        report.verification_ran = false;
        let priced = self.price_groups(cards, &mut report);
        let reps = priced.iter().map(|p| select_unverified(&p.ranked)).collect();
        self.finish(priced, reps, report)
    }

    /// Build the catalog, verifying representatives when a verifier is set.
    pub async fn build(&self, cards: Vec<NormalizedCard>, mut report: CatalogReport) -> Catalog {
        let Some(verifier) = self.verifier.clone() else {
            return self.build_unverified(cards, report);
        };
        report.verification_ran = true;
        let priced = self.price_groups(cards, &mut report);
        let reps = self.verify_all(verifier, &priced).await;
        self.finish(priced, reps, report)
    }

    /// Run one selection unit per group on the bounded pool and wait for all of
    /// them. Results come back in group order; a unit that failed to complete
    /// leaves `None` in its slot.
    async fn verify_all(
        &self,
        verifier: Arc<dyn LinkVerifier>,
        priced: &[PricedGroup],
    ) -> Vec<Option<Representative>> {
        let pool = Arc::new(Semaphore::new(self.max_in_flight));
        let mut units = JoinSet::new();
        for (i, p) in priced.iter().enumerate() {
            let ranked = p.ranked.clone();
            let verifier = Arc::clone(&verifier);
            let pool = Arc::clone(&pool);
            units.spawn(async move {
                let Ok(_permit) = pool.acquire_owned().await else {
                    return (i, None);
                };
                (i, select_verified(&ranked, verifier.as_ref()).await)
            });
        }

        let total = priced.len();
        info!(groups = total, max_in_flight = self.max_in_flight, "verifying representatives");
        let mut chosen: Vec<Option<Representative>> = vec![None; total];
        let mut done = 0;
        while let Some(joined) = units.join_next().await {
            match joined {
                Ok((i, rep)) => chosen[i] = rep,
                Err(e) => warn!(error = %e, "verification unit did not complete"),
            }
            done += 1;
            if done % config::PROGRESS_EVERY == 0 {
                info!(done, total, "verification progress");
            }
        }
        chosen
    }
}
