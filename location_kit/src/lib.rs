//! Building blocks of the AWS Location Service showcase.
//!
//! The interesting part is [`apply_language_preference`], which rewrites label expressions of a
//! MapLibre style document, so that labels are shown in a chosen language. The rest is plumbing:
//! [`LocationClient`] talking to AWS Location REST endpoints, and the [`Config`] it is built from.
#![deny(clippy::unwrap_used, rustdoc::broken_intra_doc_links)]

pub mod client;
pub mod config;
pub mod endpoints;
pub mod expression;
pub mod language;
mod latest;
pub mod style;
mod styles;

pub use client::{HeaderValue, HttpOptions, LocationClient};
pub use config::Config;
pub use endpoints::{Endpoints, Service};
pub use language::{InvalidLanguageCode, Language, LanguageCode, SUPPORTED_LANGUAGES};
pub use latest::{Latest, Ticket};
pub use style::{LayerGroup, apply_language_preference, set_group_visibility};
pub use styles::{ColorScheme, MapStyle, StyleRequest, UnknownColorScheme, UnknownMapStyle};
