//! finsight: recommendation sets for a personal-finance assistant.
//!
//! - `schema` - relational tables, insert validation and the SQLite store
//! - `api` / `cache` / `recommendations` - REST client, query cache and the
//!   data hook built on them
//! - `notify` - notices shown for action outcomes
//! - `views` / `ui` - Dioxus components

pub mod api;
pub mod app;
pub mod cache;
pub mod config;
pub mod error;
pub mod i18n;
pub mod notify;
pub mod recommendations;
pub mod schema;
pub mod theme;
pub mod types;
pub mod ui;
pub mod views;
