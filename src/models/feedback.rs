use crate::models::Resource;
use crate::repository::Collection;
use crate::validation::{schemas, ValidationSchema};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub age: u32,
    pub country: String,
    pub message: String,
}

impl Resource for Feedback {
    const COLLECTION: Collection = Collection::Feedbacks;
    const LABEL: &'static str = "Feedback";

    fn schema() -> &'static ValidationSchema {
        &schemas::FEEDBACK
    }
}
