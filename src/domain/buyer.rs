// src/domain/buyer.rs

use crate::domain::enums::{Bhk, City, PropertyType, Purpose, Source, Status, Timeline};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The normalized, validated attributes of a buyer lead.
/// Both the import schema and the form schema produce this, and it is the
/// snapshot the diff engine compares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerDraft {
    pub full_name: String,
    pub email: Option<String>,
    pub phone: String,
    pub city: City,
    pub property_type: PropertyType,
    pub bhk: Option<Bhk>,
    pub purpose: Purpose,
    pub budget_min: Option<i64>,
    pub budget_max: Option<i64>,
    pub timeline: Timeline,
    pub source: Source,
    pub status: Status,
    pub notes: Option<String>,
    pub tags: Vec<String>,
}

/// A buyer as stored in the `buyers` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Buyer {
    pub id: String,
    #[serde(flatten)]
    pub attrs: BuyerDraft,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Filters accepted by the list and export endpoints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuyerFilter {
    pub search: Option<String>,
    pub city: Option<City>,
    pub property_type: Option<PropertyType>,
    pub status: Option<Status>,
    pub timeline: Option<Timeline>,
}

/// Collapses repeated tags, keeping the first occurrence of each.
pub fn dedupe_tags<I>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() || out.iter().any(|t| t == tag) {
            continue;
        }
        out.push(tag.to_string());
    }
    out
}
