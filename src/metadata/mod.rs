//! Client for the external song metadata service.
//!
//! New songs are enriched with a release date, lyrics and a link looked up
//! by title and group.

mod client;

pub use client::{HttpMetadataClient, MetadataClient, MetadataError};

#[cfg(any(test, feature = "mock"))]
pub use client::MockMetadataClient;
