//! Session UI flags.

use serde::Serialize;

/// Default loading banner text.
pub const DEFAULT_LOADING_MESSAGE: &str = "Loading Customer Profile";

/// Flags the host UI renders from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionFlags {
    pub loading: bool,
    pub loading_message: String,
    /// An error banner is showing.
    pub error: bool,
    pub error_message: String,
    /// The shopper search affordance is open.
    pub search_mode: bool,
    /// The create-customer form is open.
    pub create_mode: bool,
    /// A profile was resolved and mapped.
    pub ready: bool,
}

impl SessionFlags {
    /// Flags at the start of a session.
    #[must_use]
    pub fn starting() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }

    /// Enter search mode; loading ends.
    pub fn enter_search(&mut self) {
        self.loading = false;
        self.search_mode = true;
    }

    /// Enter create mode; loading and search end.
    pub fn enter_create(&mut self) {
        self.loading = false;
        self.search_mode = false;
        self.create_mode = true;
    }

    /// A profile was resolved; every affordance closes.
    pub fn mark_ready(&mut self) {
        self.loading = false;
        self.search_mode = false;
        self.create_mode = false;
        self.ready = true;
    }

    /// Show an error banner.
    pub fn raise_error(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = true;
        self.error_message = message.into();
    }
}

impl Default for SessionFlags {
    fn default() -> Self {
        Self {
            loading: false,
            loading_message: DEFAULT_LOADING_MESSAGE.to_string(),
            error: false,
            error_message: String::new(),
            search_mode: false,
            create_mode: false,
            ready: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_resolution_exit_clears_loading() {
        let mut flags = SessionFlags::starting();
        flags.enter_search();
        assert!(!flags.loading && flags.search_mode);

        let mut flags = SessionFlags::starting();
        flags.enter_create();
        assert!(!flags.loading && flags.create_mode && !flags.search_mode);

        let mut flags = SessionFlags::starting();
        flags.mark_ready();
        assert!(!flags.loading && flags.ready);

        let mut flags = SessionFlags::starting();
        flags.raise_error("boom");
        assert!(!flags.loading && flags.error);
        assert_eq!(flags.error_message, "boom");
    }
}
