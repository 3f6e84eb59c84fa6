use crate::utils::error::{FeedError, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// 商品或活動
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ListingKind {
    Product,
    Event,
}

impl fmt::Display for ListingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListingKind::Product => write!(f, "product"),
            ListingKind::Event => write!(f, "event"),
        }
    }
}

impl FromStr for ListingKind {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "product" | "products" => Ok(ListingKind::Product),
            "event" | "events" => Ok(ListingKind::Event),
            other => Err(FeedError::InvalidConfigValueError {
                field: "kind".to_string(),
                value: other.to_string(),
                reason: "Expected 'product' or 'event'".to_string(),
            }),
        }
    }
}

/// A marketplace listing as consumed by the feed.
///
/// Only `id`, `is_boosted`, `boost_priority` and `created_at` take part in
/// ranking. Every other field the listing API returns is kept in
/// `attributes` and written back out untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    pub kind: ListingKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub is_boosted: bool,
    pub boost_priority: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

// 這些欄位由 Listing 本身承載，不重複放進 attributes
const KNOWN_FIELDS: &[&str] = &[
    "id",
    "_id",
    "kind",
    "type",
    "name",
    "shopId",
    "category",
    "isBoosted",
    "boostPriority",
    "createdAt",
];

const ENVELOPE_KEYS: &[&str] = &["products", "events", "listings", "data"];

impl Listing {
    pub fn new(id: impl Into<String>, kind: ListingKind) -> Self {
        Self {
            id: id.into(),
            kind,
            name: None,
            shop_id: None,
            category: None,
            is_boosted: false,
            boost_priority: None,
            created_at: None,
            attributes: Map::new(),
        }
    }

    pub fn boosted(mut self, priority: i64) -> Self {
        self.is_boosted = true;
        self.boost_priority = Some(priority);
        self
    }

    pub fn created(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    /// 寬鬆解析單筆 listing，缺少 id 時回傳 None
    ///
    /// Partially populated records never fail: a missing or malformed
    /// `isBoosted` becomes `false`, and a missing `boostPriority` or
    /// `createdAt` becomes `None`, which ranks lowest/oldest.
    pub fn from_json(value: &Value, default_kind: ListingKind) -> Option<Self> {
        let obj = value.as_object()?;
        let id = obj
            .get("id")
            .or_else(|| obj.get("_id"))
            .and_then(id_from_value)?;

        let kind = obj
            .get("kind")
            .or_else(|| obj.get("type"))
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
            .unwrap_or(default_kind);

        let attributes = obj
            .iter()
            .filter(|(key, _)| !KNOWN_FIELDS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Some(Self {
            id,
            kind,
            name: obj.get("name").and_then(string_from_value),
            shop_id: obj.get("shopId").and_then(id_from_value),
            category: obj.get("category").and_then(string_from_value),
            is_boosted: obj.get("isBoosted").map(bool_from_value).unwrap_or(false),
            boost_priority: obj.get("boostPriority").and_then(priority_from_value),
            created_at: obj.get("createdAt").and_then(timestamp_from_value),
            attributes,
        })
    }
}

fn id_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        // Mongo extended JSON: {"$oid": "..."}
        Value::Object(obj) => obj.get("$oid").and_then(id_from_value),
        _ => None,
    }
}

fn string_from_value(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

fn bool_from_value(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        _ => false,
    }
}

fn priority_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f.trunc() as i64),
        _ => None,
    }
}

fn timestamp_from_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        // Mongo extended JSON: {"$date": "..."} 或 {"$date": {"$numberLong": "..."}}
        Value::Object(obj) => match (obj.get("$date"), obj.get("$numberLong")) {
            (Some(date), _) => timestamp_from_value(date),
            (None, Some(Value::String(millis))) => millis
                .trim()
                .parse::<i64>()
                .ok()
                .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
            _ => None,
        },
        _ => None,
    }
}

/// 把 API 回應拆成 listing 清單
///
/// Accepts a bare array or the marketplace's `{ "success": true, "products": [...] }`
/// envelope (also `events`, `listings` or `data`). A `null` body is an empty feed.
/// Entries without an id are skipped.
pub fn parse_listings(payload: &Value, default_kind: ListingKind) -> Result<Vec<Listing>> {
    let items = match payload {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        Value::Object(obj) => ENVELOPE_KEYS
            .iter()
            .find_map(|key| obj.get(*key).and_then(Value::as_array))
            .ok_or_else(|| FeedError::InvalidPayloadError {
                message: format!(
                    "object payload has none of the keys: {}",
                    ENVELOPE_KEYS.join(", ")
                ),
            })?,
        other => {
            return Err(FeedError::InvalidPayloadError {
                message: format!("expected array or object, got {}", json_type_name(other)),
            })
        }
    };

    let mut listings = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match Listing::from_json(item, default_kind) {
            Some(listing) => listings.push(listing),
            None => tracing::warn!("Skipping listing #{} without a usable id", index),
        }
    }

    Ok(listings)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// 一次排序的結果，只存在於單次執行
#[derive(Debug, Clone, Default, Serialize)]
pub struct RankedFeed {
    pub listings: Vec<Listing>,
    pub boosted_count: usize,
}

impl RankedFeed {
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    pub fn boosted(&self) -> &[Listing] {
        &self.listings[..self.boosted_count]
    }

    pub fn organic(&self) -> &[Listing] {
        &self.listings[self.boosted_count..]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    /// 1-based
    pub number: usize,
    pub total_pages: usize,
    pub page_size: usize,
    pub items: Vec<Listing>,
}

#[derive(Debug, Clone)]
pub struct FeedOutput {
    pub feed: RankedFeed,
    pub pages: Vec<FeedPage>,
    pub page_size: usize,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct FeedReport {
    pub output_path: String,
    pub total_listings: usize,
    pub boosted_listings: usize,
    pub pages: usize,
    pub duration: std::time::Duration,
}
