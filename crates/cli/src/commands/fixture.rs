//! YAML session fixtures.
//!
//! A fixture describes what the simulated terminal and profile store hold,
//! and what staff do during the session:
//!
//! ```yaml
//! account:
//!   totalAmount: "25000"
//!   transactionLines:
//!     - identifier: L1
//!       accountingGroupName: Wine
//!   consumer:
//!     email: jane@example.com
//! profiles:
//!   - email: jane@example.com
//!     first_name: Jane
//!     group: Club Gold
//! select: jane@example.com
//! form:
//!   firstName: Jane
//! ```

use std::path::{Path, PathBuf};

use concierge_extension::models::AccountSnapshot;
use concierge_extension::profile::ProfileRecord;
use concierge_extension::workflow::CustomerForm;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("Failed to read fixture {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid fixture {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Fixture {
    /// Order on the terminal; `None` answers the account query without data.
    pub account: Option<AccountSnapshot>,
    pub profiles: Vec<ProfileRecord>,
    /// Email picked from the search results when the order has no consumer.
    pub select: Option<String>,
    /// Form submitted before closing; without it the session just closes.
    pub form: Option<CustomerForm>,
}

/// Read and parse a fixture file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid fixture.
pub async fn load(path: &Path) -> Result<Fixture, FixtureError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| FixtureError::Read {
            path: path.to_owned(),
            source,
        })?;
    let fixture: Fixture = serde_yaml::from_str(&content).map_err(|source| FixtureError::Parse {
        path: path.to_owned(),
        source,
    })?;
    info!(
        path = %path.display(),
        profiles = fixture.profiles.len(),
        has_account = fixture.account.is_some(),
        "Loaded fixture"
    );
    Ok(fixture)
}
