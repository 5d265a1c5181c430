use redb::{ReadableTable, ReadableTableMetadata};

use super::db::{Database, DatabaseError};
use super::models::Account;
use super::tables::*;

impl Database {
    // ========================================================================
    // Account operations
    // ========================================================================

    /// Insert an account unless its username or email is already taken.
    ///
    /// Usernames and emails share the login namespace, so each is checked
    /// against both tables. The checks and writes happen in one write
    /// transaction, so two racing registrations for the same identifier
    /// cannot both return `true`.
    pub fn insert_account_if_absent(&self, account: &Account) -> Result<bool, DatabaseError> {
        debug_assert!(!account.username.is_empty(), "username must not be empty");
        debug_assert!(!account.email.is_empty(), "email must not be empty");

        let write_txn = self.begin_write()?;
        let inserted = {
            let mut accounts = write_txn.open_table(ACCOUNTS)?;
            let mut emails = write_txn.open_table(ACCOUNT_EMAILS)?;

            let username = account.username.as_str();
            let email = account.email.as_str();
            let taken = accounts.get(username)?.is_some()
                || accounts.get(email)?.is_some()
                || emails.get(username)?.is_some()
                || emails.get(email)?.is_some();

            if taken {
                false
            } else {
                let data = rmp_serde::to_vec_named(account)?;
                accounts.insert(account.username.as_str(), data.as_slice())?;
                emails.insert(account.email.as_str(), account.username.as_str())?;
                true
            }
        };

        if inserted {
            write_txn.commit()?;
        } else {
            write_txn.abort()?;
        }
        Ok(inserted)
    }

    /// Get an account by username
    pub fn get_account(&self, username: &str) -> Result<Option<Account>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(ACCOUNTS)?;

        match table.get(username)? {
            Some(data) => {
                let account: Account = rmp_serde::from_slice(data.value())?;
                Ok(Some(account))
            }
            None => Ok(None),
        }
    }

    /// Get an account by username, falling back to the email index
    pub fn find_account(&self, identifier: &str) -> Result<Option<Account>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let accounts = read_txn.open_table(ACCOUNTS)?;

        if let Some(data) = accounts.get(identifier)? {
            return Ok(Some(rmp_serde::from_slice(data.value())?));
        }

        let emails = read_txn.open_table(ACCOUNT_EMAILS)?;
        let username = match emails.get(identifier)? {
            Some(name) => name.value().to_string(),
            None => return Ok(None),
        };

        match accounts.get(username.as_str())? {
            Some(data) => Ok(Some(rmp_serde::from_slice(data.value())?)),
            None => Ok(None),
        }
    }

    /// Whether any account already uses this username or email, as either
    /// a username or an email
    pub fn account_exists(&self, username: &str, email: &str) -> Result<bool, DatabaseError> {
        let read_txn = self.begin_read()?;
        let accounts = read_txn.open_table(ACCOUNTS)?;
        let emails = read_txn.open_table(ACCOUNT_EMAILS)?;

        Ok(accounts.get(username)?.is_some()
            || accounts.get(email)?.is_some()
            || emails.get(username)?.is_some()
            || emails.get(email)?.is_some())
    }

    /// Number of stored accounts
    pub fn count_accounts(&self) -> Result<u64, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(ACCOUNTS)?;
        Ok(table.len()?)
    }
}
