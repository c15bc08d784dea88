//! Representative selection.
//!
//! Candidates are a group's positively priced listings, ranked so listings with
//! a thumbnail come first and, within that, listings priced closest to the
//! group median. Ties keep member order.

use std::cmp::Ordering;

use crate::models::{NormalizedCard, Representative};
use crate::verify::LinkVerifier;

fn rank_order(a: &NormalizedCard, b: &NormalizedCard, median: f64) -> Ordering {
    let media = |c: &NormalizedCard| c.media_url.is_none();
    media(a)
        .cmp(&media(b))
        .then_with(|| (a.price - median).abs().total_cmp(&(b.price - median).abs()))
}

/// Positively priced `members`, best candidate first.
pub fn rank_candidates<'a>(
    members: impl IntoIterator<Item = &'a NormalizedCard>,
    median: f64,
) -> Vec<NormalizedCard> {
    let mut ranked: Vec<NormalizedCard> = members
        .into_iter()
        .filter(|c| c.has_valid_price())
        .cloned()
        .collect();
    ranked.sort_by(|a, b| rank_order(a, b, median));
    ranked
}

fn representative(card: &NormalizedCard, verified: bool) -> Representative {
    Representative {
        url: card.product_url(),
        card: card.clone(),
        verified,
    }
}

/// Top-ranked candidate, unchecked. Marked verified since nothing was checked
/// against it.
pub fn select_unverified(ranked: &[NormalizedCard]) -> Option<Representative> {
    ranked.first().map(|c| representative(c, true))
}

/// Walk `ranked` and return the first candidate the verifier confirms.
///
/// Checks run one at a time in rank order and stop at the first confirmation.
/// When nothing is confirmed the top-ranked candidate is returned unverified.
pub async fn select_verified(
    ranked: &[NormalizedCard],
    verifier: &dyn LinkVerifier,
) -> Option<Representative> {
    for card in ranked {
        if verifier.check(&card.product_url()).await.is_available() {
            return Some(representative(card, true));
        }
    }
    ranked.first().map(|c| representative(c, false))
}
