//! MediaWiki API access.
//!
//! [`WikiClient`] is a thin HTTP wrapper; [`WikiService`] knows which
//! `action=` query answers which question and unpacks the JSON.

mod client;
mod service;

pub use client::WikiClient;
pub use service::{SearchHit, SectionInfo, WikiService};
