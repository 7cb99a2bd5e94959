//! eSIM Global Core - Shared domain library.
//!
//! This crate provides the types and pure logic shared by the gateway:
//! - `gateway` - HTTP gateway republishing catalog and subscriber data
//!
//! # Architecture
//!
//! The core crate contains only types and synchronous logic - no I/O, no
//! HTTP clients, no async. This keeps it lightweight and lets the catalog
//! query semantics be tested in isolation.
//!
//! # Modules
//!
//! - [`types`] - Validated newtypes and enums (ICCID, data amounts, data sources)
//! - [`catalog`] - Product/country records and the filter semantics
//! - [`iccid_info`] - The client-visible ICCID lookup record
//! - [`sample`] - Built-in fixture data served when live sources are unavailable

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod iccid_info;
pub mod sample;
pub mod types;

pub use catalog::*;
pub use iccid_info::IccidInfo;
pub use types::*;
