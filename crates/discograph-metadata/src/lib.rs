//! Text and artwork-url adapters: the encyclopedic and image providers that
//! back the `text` and `artwork-url` worker pools. Unlike the canonical
//! adapter, no single provider here covers every capability — each client
//! implements only the `TextAdapter`/`ArtworkAdapter` methods its upstream
//! API actually supports.

pub mod cover_art_fallback;
pub mod discogs;
pub mod error;
pub mod fanarttv;
pub mod image_download;
pub mod lastfm;
pub mod registry;
#[cfg(test)]
mod registry_tests;

pub use error::AdapterError;
pub use image_download::ImageDownloader;
pub use registry::{ArtworkAdapter, TextAdapter};
