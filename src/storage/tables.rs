use redb::TableDefinition;

/// Accounts: username -> Account (msgpack)
pub const ACCOUNTS: TableDefinition<&str, &[u8]> = TableDefinition::new("accounts");

/// Uniqueness index: email -> username
pub const ACCOUNT_EMAILS: TableDefinition<&str, &str> = TableDefinition::new("account_emails");

/// Sweets: id -> Sweet (msgpack)
pub const SWEETS: TableDefinition<u64, &[u8]> = TableDefinition::new("sweets");

/// Id sequences: name -> last issued id
pub const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences");

/// Sequence name for sweet ids
pub const SWEET_SEQUENCE: &str = "sweets";
