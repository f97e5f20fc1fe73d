//! Shopfront client library.
//!
//! Talks to the storefront REST backend and keeps thin, server-authoritative
//! state for the views built on top of it.
//!
//! # Architecture
//!
//! - [`api::ApiClient`] issues every HTTP request (base URL from config,
//!   bearer token, request IDs, `{ detail }` error envelope, catalog cache)
//! - [`session::Session`] holds the current identity
//! - [`collection::CartState`] and [`collection::WishlistState`] mirror the
//!   server-held collections and re-read them after every mutation
//! - [`routes`] maps paths to views and gates them on the identity
//! - [`context::Storefront`] is the root context that owns all of the above
//!   and propagates identity changes
//!
//! Commands never return errors to the view layer: failures become
//! [`notice::Notice`]s and the command reports `false`.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod collection;
pub mod config;
pub mod context;
pub mod error;
pub mod notice;
pub mod routes;
pub mod session;

pub use api::ApiClient;
pub use collection::{CartState, WishlistState};
pub use config::{ClientConfig, ConfigError, Credentials};
pub use context::Storefront;
pub use error::ApiError;
pub use notice::{Notice, NoticeLevel, Notices};
pub use routes::{Access, Requirement, Route};
pub use session::Session;
