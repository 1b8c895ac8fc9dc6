use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Generic id/name pair used by every dropdown table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LookupItem {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RegionItem {
    pub id: i32,
    pub name: String,
    pub country_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Lookups {
    pub companies: Vec<LookupItem>,
    pub locations: Vec<LookupItem>,
    pub departments: Vec<LookupItem>,
    pub designations: Vec<LookupItem>,
    pub countries: Vec<LookupItem>,
    pub regions: Vec<RegionItem>,
    pub employment_types: &'static [&'static str],
    pub statuses: &'static [&'static str],
    pub genders: &'static [&'static str],
}
