//! sweet-shop - An inventory service for a sweet shop catalog
//!
//! This crate provides:
//! - Account registration and login with bcrypt password digests
//! - Stateless, signed session tokens (HS256 JWT) with role claims
//! - A request authenticator that attaches the caller's identity to each request
//! - An inventory ledger whose purchase and restock never oversell or lose updates
//! - redb embedded database (ACID, MVCC, crash-safe)
//! - REST API

pub mod api;
pub mod auth;
pub mod config;
pub mod ledger;
pub mod storage;
#[cfg(test)]
pub mod testutil;
pub mod tokens;

use tokio::sync::OnceCell;

use config::Config;
use ledger::StockLocks;
use storage::Database;
use tokens::TokenService;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub db: Database,
    /// Digest verified against when a login names no account
    pub decoy_digest: OnceCell<String>,
    pub stock_locks: StockLocks,
    pub tokens: TokenService,
}

impl AppState {
    /// Build state with a freshly generated token signing key
    pub fn new(config: Config, db: Database) -> Self {
        let tokens = TokenService::generate(config.token_ttl());
        Self::with_tokens(config, db, tokens)
    }

    pub fn with_tokens(config: Config, db: Database, tokens: TokenService) -> Self {
        Self {
            config,
            db,
            decoy_digest: OnceCell::new(),
            stock_locks: StockLocks::new(),
            tokens,
        }
    }
}
