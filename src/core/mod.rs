//! Core library modules for asset-mirror
//!
//! This module contains the internal implementation details of the asset-mirror library.

pub mod config;
pub mod downloader;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod mirror;
pub mod sanitize;
