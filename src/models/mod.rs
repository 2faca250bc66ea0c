pub mod blog;
pub mod country;
pub mod destination;
pub mod feedback;
pub mod response;
pub mod subscription;
pub mod token_claims;

use crate::repository::Collection;
use crate::validation::ValidationSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A stored content type served by the generic content handlers.
pub trait Resource: Serialize + DeserializeOwned + 'static {
    const COLLECTION: Collection;
    /// Singular name used in response messages.
    const LABEL: &'static str;
    /// Query parameters accepted as equality filters when listing.
    const FILTERS: &'static [&'static str] = &[];

    fn schema() -> &'static ValidationSchema;
}
