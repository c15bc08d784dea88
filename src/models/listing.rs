use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::config;

// ---------------------------------------------------------------------------
// RawListing — One marketplace row as exported by the query source
// ---------------------------------------------------------------------------

/// A single marketplace listing, exactly as the acquisition side supplies it.
///
/// Field names follow the marketplace export columns. Numeric columns are read
/// leniently: `null`, numbers, and numeric strings are all accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawListing {
    #[serde(rename = "상품명", default)]
    pub title: Option<String>,
    #[serde(rename = "상품가격", default, deserialize_with = "lenient_f64")]
    pub price: f64,
    #[serde(rename = "상품id", deserialize_with = "string_or_number")]
    pub product_id: String,
    #[serde(rename = "상품등록일자", default)]
    pub created_at: Option<String>,
    #[serde(rename = "수정일시", default)]
    pub modified_at: Option<String>,
    #[serde(rename = "이미지수", default, deserialize_with = "lenient_u32")]
    pub image_count: u32,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number product id, got {other}"
        ))),
    }
}

/// Finite number from a JSON number or numeric string. `inf` and `NaN`
/// spellings are rejected.
fn lenient_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|v| v.is_finite())
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_number(&Value::deserialize(deserializer)?).unwrap_or(0.0))
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let count = lenient_number(&Value::deserialize(deserializer)?).unwrap_or(0.0);
    Ok(if count.is_finite() && count > 0.0 {
        count.min(u32::MAX as f64) as u32
    } else {
        0
    })
}

// ---------------------------------------------------------------------------
// NormalizedCard — A classified listing carrying its identity key
// ---------------------------------------------------------------------------

/// A listing after classification. Immutable once built; owned by its group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedCard {
    pub group_key: String,
    pub member: String,
    pub album: String,
    pub types: Vec<String>,
    pub title: String,
    pub price: f64,
    pub product_id: String,
    /// Creation timestamp as supplied (empty when absent). Orders the price series.
    pub created_at: String,
    pub image_count: u32,
    pub media_url: Option<String>,
}

impl NormalizedCard {
    /// Human-readable product name, e.g. `BTS Jimin - PROOF (Album, Weverse)`.
    pub fn official_name(&self) -> String {
        format!(
            "BTS {} - {} ({})",
            self.member,
            self.album,
            self.types.join(", ")
        )
    }

    pub fn product_url(&self) -> String {
        config::product_url(&self.product_id)
    }

    /// Listings with a non-positive price stay in their group but never feed statistics.
    pub fn has_valid_price(&self) -> bool {
        self.price > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_listing_accepts_numeric_ids_and_string_prices() {
        let row: RawListing = serde_json::from_value(serde_json::json!({
            "상품명": "BTS 지민 포카",
            "상품가격": "12000",
            "상품id": 301_554_210u64,
            "상품등록일자": "2024-03-01 10:00:00",
            "이미지수": null
        }))
        .unwrap();

        assert_eq!(row.product_id, "301554210");
        assert_eq!(row.price, 12000.0);
        assert_eq!(row.image_count, 0);
        assert!(row.modified_at.is_none());
    }

    #[test]
    fn non_finite_price_strings_read_as_invalid() {
        for price in ["inf", "-inf", "infinity", "NaN"] {
            let row: RawListing = serde_json::from_value(serde_json::json!({
                "상품명": "BTS 지민 포카",
                "상품가격": price,
                "상품id": "1",
                "이미지수": "inf"
            }))
            .unwrap();
            assert_eq!(row.price, 0.0, "{price}");
            assert_eq!(row.image_count, 0, "{price}");
        }
    }

    #[test]
    fn raw_listing_rejects_missing_product_id() {
        let row = serde_json::from_value::<RawListing>(serde_json::json!({
            "상품명": "BTS 지민 포카",
            "상품가격": 12000
        }));
        assert!(row.is_err());
    }
}
