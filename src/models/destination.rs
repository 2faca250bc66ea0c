use crate::models::Resource;
use crate::repository::Collection;
use crate::validation::{schemas, ValidationSchema};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    pub name: String,
    pub country: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_time_to_visit: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub highlights: Vec<String>,
}

impl Resource for Destination {
    const COLLECTION: Collection = Collection::Destinations;
    const LABEL: &'static str = "Destination";
    const FILTERS: &'static [&'static str] = &["country"];

    fn schema() -> &'static ValidationSchema {
        &schemas::DESTINATION
    }
}
