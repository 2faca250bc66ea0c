use crate::models::Resource;
use crate::repository::Collection;
use crate::validation::{schemas, ValidationSchema};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    pub name: String,
    pub continent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capital: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Resource for Country {
    const COLLECTION: Collection = Collection::Countries;
    const LABEL: &'static str = "Country";
    const FILTERS: &'static [&'static str] = &["continent"];

    fn schema() -> &'static ValidationSchema {
        &schemas::COUNTRY
    }
}
