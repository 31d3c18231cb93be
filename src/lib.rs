//! Robotics Storefront client library
//!
//! Typed state layer for the robotics components storefront: the REST client,
//! the per-resource state slices, and the order lifecycle workflows (checkout
//! stepper, admin status transitions, tracking timeline).
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod api;
pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod store;

use serde::{Deserialize, Serialize};

pub use api::ApiClient;
pub use config::AppConfig;
pub use errors::ServiceError;
pub use store::{Services, Store};

/// `{ "data": ... }` wrapper around every successful backend response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Pagination metadata attached to list responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub current_page: u32,
    pub last_page: u32,
    pub per_page: u32,
    pub total: u64,
}

impl PaginationMeta {
    pub fn has_next(&self) -> bool {
        self.current_page < self.last_page
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }
}

/// Paginated list payload: `{ "data": [...], "current_page": 1, ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    #[serde(flatten)]
    pub meta: PaginationMeta,
}

impl<T> Paginated<T> {
    /// Wraps a complete list as a single page.
    pub fn single_page(data: Vec<T>) -> Self {
        let total = data.len() as u64;
        Self {
            meta: PaginationMeta {
                current_page: 1,
                last_page: 1,
                per_page: data.len().max(1) as u32,
                total,
            },
            data,
        }
    }
}
