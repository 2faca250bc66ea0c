use crate::models::Resource;
use crate::repository::Collection;
use crate::validation::{schemas, ValidationSchema};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blog {
    pub title: String,
    pub author: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_time: Option<u32>,
}

impl Resource for Blog {
    const COLLECTION: Collection = Collection::Blogs;
    const LABEL: &'static str = "Blog";
    const FILTERS: &'static [&'static str] = &["category", "author"];

    fn schema() -> &'static ValidationSchema {
        &schemas::BLOG
    }
}
