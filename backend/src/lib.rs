//! Secret-key authentication and session service for the moodreel platform.
//!
//! Accounts are identified by the hash of a client-held access key; there are
//! no passwords. Logins mint signed, time-bounded tokens whose revocation
//! state lives in a server-side session table, so a token can be cut off
//! before its own expiry.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod repositories;
pub mod services;
pub mod utils;
