//! Account store access layer
//!
//! The account store owns user records, per-provider access tokens, and the
//! raw favorites blobs. The presence/compatibility core only calls the
//! accessors exposed here; account creation and credential handling live in
//! the (out-of-scope) auth layer.

pub mod init;
pub mod store;

pub use init::{create_schema, init_db};
pub use store::{AccountStore, NewUser, SqliteAccountStore, StoredAccount, User};
