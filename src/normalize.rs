//! Listing normalizer.
//!
//! Turns one [`RawListing`] into a [`NormalizedCard`]: the title is classified
//! against the keyword tables in [`crate::vocabulary`], the group key is derived
//! from the classification, and a media URL is built from the best available
//! timestamp. Everything here is a pure function of the input row.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use tracing::warn;

use crate::config;
use crate::error::{CatalogError, Result};
use crate::models::{NormalizedCard, RawListing};
use crate::vocabulary::{
    Vocabulary, ALBUMS, CARD_TYPES, GENERAL_TYPE, GROUP_MEMBER, MEMBERS, UNCLASSIFIED_ALBUM,
};

/// Separates the dimensions of a group key. Never appears in a canonical tag.
pub const KEY_DELIMITER: &str = "|";
/// Separates the tags of the type set inside a group key.
pub const TYPE_DELIMITER: &str = ",";

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// First tag (in table order) with an alias contained in `title_lower`.
pub fn classify_first(title_lower: &str, table: Vocabulary) -> Option<&'static str> {
    table
        .iter()
        .find(|(_, aliases)| aliases.iter().any(|alias| title_lower.contains(alias)))
        .map(|(tag, _)| *tag)
}

/// Every tag with an alias contained in `title_lower`, in table order.
pub fn classify_all(title_lower: &str, table: Vocabulary) -> Vec<&'static str> {
    table
        .iter()
        .filter(|(_, aliases)| aliases.iter().any(|alias| title_lower.contains(alias)))
        .map(|(tag, _)| *tag)
        .collect()
}

/// Identity attributes extracted from a listing title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub member: &'static str,
    pub album: &'static str,
    /// Never empty; `["general"]` when no special type matched.
    pub types: Vec<&'static str>,
}

impl Classification {
    pub fn from_title(title: &str) -> Self {
        let lower = title.to_lowercase();
        let mut types = classify_all(&lower, CARD_TYPES);
        if types.is_empty() {
            types.push(GENERAL_TYPE);
        }
        Self {
            member: classify_first(&lower, MEMBERS).unwrap_or(GROUP_MEMBER),
            album: classify_first(&lower, ALBUMS).unwrap_or(UNCLASSIFIED_ALBUM),
            types,
        }
    }

    /// `member|album|type,type,...`
    pub fn group_key(&self) -> String {
        let types = self.types.join(TYPE_DELIMITER);
        format!(
            "{}{d}{}{d}{}",
            self.member,
            self.album,
            types,
            d = KEY_DELIMITER
        )
    }
}

// ---------------------------------------------------------------------------
// Timestamps and media
// ---------------------------------------------------------------------------

type TimestampParser = fn(&str, FixedOffset) -> Option<DateTime<FixedOffset>>;

/// Tried in order; the first parser to succeed wins.
const TIMESTAMP_PARSERS: &[TimestampParser] = &[
    parse_iso_zoned,
    parse_iso_zoned_minutes,
    parse_iso_naive,
    parse_fixed,
];

const ISO_NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// `2024-03-01T10:00:00+09:00`, `2024-03-01T01:00:00Z`
fn parse_iso_zoned(raw: &str, _: FixedOffset) -> Option<DateTime<FixedOffset>> {
    if !raw.contains('T') {
        return None;
    }
    DateTime::parse_from_rfc3339(raw).ok()
}

/// `2024-03-01T10:00+09:00`, `2024-03-01T01:00Z`
fn parse_iso_zoned_minutes(raw: &str, _: FixedOffset) -> Option<DateTime<FixedOffset>> {
    if !raw.contains('T') {
        return None;
    }
    let zoned = match raw.strip_suffix('Z') {
        Some(head) => format!("{head}+00:00"),
        None => raw.to_string(),
    };
    DateTime::parse_from_str(&zoned, "%Y-%m-%dT%H:%M%:z").ok()
}

/// `2024-03-01T10:00:00`, `2024-03-01T10:00` (read in the marketplace offset)
fn parse_iso_naive(raw: &str, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    if !raw.contains('T') {
        return None;
    }
    let naive = ISO_NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())?;
    offset.from_local_datetime(&naive).single()
}

/// `2024-03-01 10:00:00`, anything after the seconds is ignored
fn parse_fixed(raw: &str, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    let head = raw.get(..19)?;
    let naive = NaiveDateTime::parse_from_str(head, "%Y-%m-%d %H:%M:%S").ok()?;
    offset.from_local_datetime(&naive).single()
}

/// Epoch seconds of `raw`, or `None` when no known format matches.
pub fn parse_timestamp(raw: &str, naive_offset: FixedOffset) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    TIMESTAMP_PARSERS
        .iter()
        .find_map(|parse| parse(raw, naive_offset))
        .map(|dt| dt.timestamp())
}

/// Build the listing's thumbnail URL.
///
/// The modification timestamp is preferred over the creation timestamp since
/// the media store keys images by the last edit. Absent when the listing has no
/// images or neither timestamp parses.
pub fn media_url(
    product_id: &str,
    created_at: Option<&str>,
    modified_at: Option<&str>,
    image_count: u32,
    naive_offset: FixedOffset,
) -> Option<String> {
    if image_count < 1 {
        return None;
    }
    [modified_at, created_at]
        .into_iter()
        .flatten()
        .find_map(|raw| parse_timestamp(raw, naive_offset))
        .map(|epoch| config::media_url(product_id, epoch))
}

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

/// Maps raw listings to classified cards.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    naive_offset: FixedOffset,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(config::default_naive_offset())
    }
}

impl Normalizer {
    pub fn new(naive_offset: FixedOffset) -> Self {
        Self { naive_offset }
    }

    /// Normalize one listing.
    ///
    /// Fails with [`CatalogError::SkippableRecord`] when the title is missing
    /// or blank; the caller drops the row and moves on.
    pub fn normalize(&self, raw: &RawListing) -> Result<NormalizedCard> {
        let title = match raw.title.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => {
                return Err(CatalogError::SkippableRecord {
                    product_id: raw.product_id.clone(),
                    reason: "empty title".into(),
                })
            }
        };

        let classification = Classification::from_title(title);
        let media_url = media_url(
            &raw.product_id,
            raw.created_at.as_deref(),
            raw.modified_at.as_deref(),
            raw.image_count,
            self.naive_offset,
        );

        Ok(NormalizedCard {
            group_key: classification.group_key(),
            member: classification.member.to_string(),
            album: classification.album.to_string(),
            types: classification.types.iter().map(|t| t.to_string()).collect(),
            title: title.to_string(),
            price: raw.price,
            product_id: raw.product_id.clone(),
            created_at: raw.created_at.clone().unwrap_or_default(),
            image_count: raw.image_count,
            media_url,
        })
    }

    /// Normalize every listing, returning the cards in input order and the
    /// number of rows skipped.
    pub fn normalize_all(&self, raws: &[RawListing]) -> (Vec<NormalizedCard>, usize) {
        let mut cards = Vec::with_capacity(raws.len());
        let mut skipped = 0;
        for raw in raws {
            match self.normalize(raw) {
                Ok(card) => cards.push(card),
                Err(e) => {
                    warn!(product_id = %raw.product_id, error = %e, "skipping listing");
                    skipped += 1;
                }
            }
        }
        (cards, skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kst() -> FixedOffset {
        FixedOffset::east_opt(9 * 3600).unwrap()
    }

    #[test]
    fn first_match_follows_table_order() {
        // "jin" and "jimin" both present; Jin is declared first.
        assert_eq!(classify_first("jin jimin", MEMBERS), Some("Jin"));
        assert_eq!(classify_first("nothing here", ALBUMS), None);
    }

    #[test]
    fn all_match_keeps_declared_order() {
        let types = classify_all("사인 럭드 위버스", CARD_TYPES);
        assert_eq!(types, vec!["Lucky Draw", "Weverse", "Signed"]);
    }

    #[test]
    fn unmatched_title_gets_reserved_tags() {
        let c = Classification::from_title("포토카드 양도");
        assert_eq!(c.member, GROUP_MEMBER);
        assert_eq!(c.album, UNCLASSIFIED_ALBUM);
        assert_eq!(c.types, vec![GENERAL_TYPE]);
        assert_eq!(c.group_key(), "Group|unclassified|general");
    }

    #[test]
    fn group_key_joins_types_in_order() {
        let c = Classification::from_title("지민 프루프 럭드 위버스 포카");
        assert_eq!(c.group_key(), "Jimin|PROOF|Lucky Draw,Weverse");
    }

    #[test]
    fn parses_each_timestamp_form() {
        let zoned = parse_timestamp("2024-03-01T10:00:00+09:00", kst()).unwrap();
        let utc_z = parse_timestamp("2024-03-01T01:00:00Z", kst()).unwrap();
        let naive = parse_timestamp("2024-03-01T10:00:00", kst()).unwrap();
        let fixed = parse_timestamp("2024-03-01 10:00:00.123", kst()).unwrap();
        assert_eq!(zoned, 1_709_254_800);
        assert_eq!(utc_z, zoned);
        assert_eq!(naive, zoned);
        assert_eq!(fixed, zoned);
        assert_eq!(parse_timestamp("03/01/2024", kst()), None);
        assert_eq!(parse_timestamp("", kst()), None);
    }

    #[test]
    fn parses_iso_timestamps_without_seconds() {
        let expected = 1_709_254_800;
        assert_eq!(parse_timestamp("2024-03-01T10:00+09:00", kst()), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01T01:00Z", kst()), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01T10:00", kst()), Some(expected));
        assert_eq!(
            media_url("7", None, Some("2024-03-01T10:00+09:00"), 1, kst()).as_deref(),
            Some("https://media.bunjang.co.kr/product/7_1_1709254800_w640.jpg")
        );
    }

    #[test]
    fn media_url_prefers_modified_then_falls_back() {
        let url = media_url(
            "42",
            Some("2024-03-01 10:00:00"),
            Some("garbage"),
            3,
            kst(),
        );
        assert_eq!(
            url.as_deref(),
            Some("https://media.bunjang.co.kr/product/42_1_1709254800_w640.jpg")
        );
        assert_eq!(media_url("42", Some("2024-03-01 10:00:00"), None, 0, kst()), None);
        assert_eq!(media_url("42", Some("bad"), Some("worse"), 2, kst()), None);
    }
}
