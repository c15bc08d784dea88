//! Shared test fixtures for the photocard catalog integration tests.
//!
//! Provides raw listing builders and `ScriptedVerifier`, an in-memory
//! `LinkVerifier` that answers from a fixed script and records what it was
//! asked.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use photocard_catalog::config;
use photocard_catalog::{Availability, LinkVerifier, RawListing, UnavailableReason};

pub const MEMBERS_KR: &[&str] = &["알엠", "진", "슈가", "제이홉", "지민", "뷔", "정국"];
pub const ALBUMS_KR: &[&str] = &[
    "프루프",
    "맵솔",
    "비이",
    "윙스",
    "화양연화",
    "다크",
    "버터",
    "다이너마이트",
    "블랙스완",
    "아이돌",
    "봄날",
    "피땀눈물",
];

/// A listing with a creation timestamp and no images.
pub fn listing(id: &str, title: &str, price: f64, created_at: &str) -> RawListing {
    RawListing {
        title: Some(title.to_string()),
        price,
        product_id: id.to_string(),
        created_at: Some(created_at.to_string()),
        modified_at: None,
        image_count: 0,
    }
}

/// Same as [`listing`] but with one image, so it carries a media URL.
pub fn listing_with_media(id: &str, title: &str, price: f64, created_at: &str) -> RawListing {
    RawListing {
        image_count: 1,
        ..listing(id, title, price, created_at)
    }
}

/// Two listings for each of the first `groups` member/album combinations.
/// Product ids are `g{group}-{n}`.
pub fn distinct_groups(groups: usize) -> Vec<RawListing> {
    let mut rows = Vec::new();
    let combos = ALBUMS_KR
        .iter()
        .flat_map(|album| MEMBERS_KR.iter().map(move |member| (*member, *album)));
    for (g, (member, album)) in combos.take(groups).enumerate() {
        let title = format!("{member} {album} 포카");
        for n in 0..2 {
            rows.push(listing(
                &format!("g{g}-{n}"),
                &title,
                10_000.0 + n as f64 * 500.0,
                &format!("2024-02-0{} 12:00:00", n + 1),
            ));
        }
    }
    rows
}

pub fn product_url(id: &str) -> String {
    config::product_url(id)
}

/// In-memory verifier answering from a script.
///
/// Every product is available unless listed in `unavailable` (answered with a
/// sold-out marker). Products in `panic_on` make the check panic.
#[derive(Default)]
pub struct ScriptedVerifier {
    unavailable: HashSet<String>,
    panic_on: HashSet<String>,
    delay: Duration,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl ScriptedVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable(mut self, ids: &[&str]) -> Self {
        self.unavailable.extend(ids.iter().map(|id| product_url(id)));
        self
    }

    pub fn panic_on(mut self, ids: &[&str]) -> Self {
        self.panic_on.extend(ids.iter().map(|id| product_url(id)));
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// URLs checked so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Highest number of checks observed running at once.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LinkVerifier for ScriptedVerifier {
    async fn check(&self, url: &str) -> Availability {
        self.calls.lock().unwrap().push(url.to_string());
        if self.panic_on.contains(url) {
            panic!("scripted failure for {url}");
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.unavailable.contains(url) {
            Availability::Unavailable(UnavailableReason::Marker("sold on bunjang"))
        } else {
            Availability::Available
        }
    }
}
