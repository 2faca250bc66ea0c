use crate::models::Resource;
use crate::repository::Collection;
use crate::validation::{schemas, ValidationSchema};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub email: String,
}

impl Subscription {
    pub fn normalized(self) -> Self {
        Subscription {
            email: self.email.trim().to_lowercase(),
        }
    }
}

impl Resource for Subscription {
    const COLLECTION: Collection = Collection::Subscriptions;
    const LABEL: &'static str = "Subscription";

    fn schema() -> &'static ValidationSchema {
        &schemas::SUBSCRIPTION
    }
}
