//! Shared test helpers, available to all `#[cfg(test)]` modules in the crate.

use std::sync::Arc;

use chrono::Utc;
use tempfile::TempDir;

use crate::config::{AuthConfig, Config, ServerConfig, StoreConfig};
use crate::storage::models::{Account, Role, SweetDraft};
use crate::storage::Database;
use crate::AppState;

/// Open a fresh database in a temporary directory.
///
/// Returns both the `Database` and the `TempDir` guard; the caller must
/// keep the `TempDir` alive for the duration of the test.
pub fn setup_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db = Database::open(temp_dir.path()).unwrap();
    (db, temp_dir)
}

/// A minimal `Config` suitable for unit tests (cheap bcrypt, generous timeout).
pub fn test_config() -> Config {
    Config {
        auth: AuthConfig {
            bcrypt_cost: 4,
            ..AuthConfig::default()
        },
        server: ServerConfig {
            bind_address: "127.0.0.1:8081".to_string(),
            data_dir: "/tmp/test".to_string(),
        },
        store: StoreConfig { timeout_ms: 10_000 },
    }
}

/// Build a full `Arc<AppState>` around the given database.
pub fn test_state(db: Database) -> Arc<AppState> {
    test_state_with_config(db, test_config())
}

pub fn test_state_with_config(db: Database, config: Config) -> Arc<AppState> {
    Arc::new(AppState::new(config, db))
}

/// Create an `Account` with a placeholder digest.
pub fn make_account(username: &str, email: &str, role: Role) -> Account {
    Account {
        created_at: Utc::now(),
        email: email.to_string(),
        password_digest: format!("digest_{username}"),
        role,
        username: username.to_string(),
    }
}

pub fn make_draft(name: &str, category: &str, price: f64, quantity: u32) -> SweetDraft {
    SweetDraft {
        category: category.to_string(),
        name: name.to_string(),
        price,
        quantity,
    }
}
