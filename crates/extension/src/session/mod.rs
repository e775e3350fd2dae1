//! Injected session context: the current aggregate, UI flags and
//! change notifications.

mod flags;
mod store;

pub use flags::{DEFAULT_LOADING_MESSAGE, SessionFlags};
pub use store::{SessionStore, Subscription};
