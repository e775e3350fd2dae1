//! Customer profile storage: raw records, the store contract and search.

mod record;
mod search;
mod store;

pub use record::{
    AddressRecord, BookingRecord, Commerce7Record, CreditCardRecord, CustomFieldsRecord,
    EcommerceRecord, ProfileRecord, ShopifyRecord, SubscriptionRecord,
};
pub(crate) use record::parse_flag;
pub use search::{CustomerSearch, MIN_QUERY_LEN, SearchOutcome, classify};
pub use store::{
    EMAIL_PARTITION_KEY, InMemoryProfileStore, MAX_SEARCH_RESULTS, ProfileStore, ProfileSummary,
    SearchIndex, StoreError, StoreFut, StoreKey,
};
