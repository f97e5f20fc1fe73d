//! Shopfront Core - Shared types library.
//!
//! This crate provides the types shared by every Shopfront component:
//! - `client` - API client, session and collection state
//! - `cli` - Command-line storefront front end
//! - `integration-tests` - Fake backend used by the end-to-end tests
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. Everything in
//! [`models`] is a snapshot of a server-owned record; the client never edits
//! these locally, it re-reads them.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, prices, quantities, roles and statuses
//! - [`models`] - Wire records exchanged with the storefront backend

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod models;
pub mod types;

pub use models::*;
pub use types::*;
