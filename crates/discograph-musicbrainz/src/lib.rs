// SPDX-License-Identifier: GPL-3.0-or-later

//! The canonical metadata adapter: MusicBrainz.
//!
//! Every lookup and search method normalizes the upstream response into a
//! `discograph_domain` entity and never leaks a provider-native field name.
//! Requests are serialized through a per-client rate limiter and retried
//! with linear backoff on transient failure.

pub mod client;
#[cfg(test)]
mod client_tests;
pub mod error;
pub mod models;
pub mod rate_limiter;

pub use client::{recordings_from_release, CanonicalAdapter, MusicBrainzClient};
pub use error::{AdapterError, Result};
pub use models::Page;
