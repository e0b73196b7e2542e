//! Service layer for blob-backed user records.
//! - `users` holds the create/fetch/update handler contract and the record codec.
//! - `storage` abstracts the blob store so handlers can run against any backend.
//! - `ids` supplies fresh record identifiers.

pub mod errors;
pub mod ids;
pub mod storage;
pub mod users;
