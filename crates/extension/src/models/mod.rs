//! Session domain models.
//!
//! - [`customer`] - The `SessionCustomer` aggregate root
//! - [`transaction`] - Mirror of the host terminal's order
//! - [`facets`] - Optional integration facets

pub mod customer;
pub mod facets;
pub mod transaction;

pub use customer::{Address, Identity, SessionCustomer};
pub use facets::{
    BookingFacet, Commerce7Facet, CreditCard, CrmFacet, CustomFields, ECommerceFacet,
    PlatformFacet, ShopifyFacet, Subscription,
};
pub use transaction::{AccountSnapshot, ActiveTransaction, Consumer, TransactionLine};
