//! Lab site core: shared types and the member filter engine.
//!
//! This crate is used by every other crate in the workspace:
//! - `client` - remote gateway, list store, submission workflow and auth gate
//! - `cli` - the `labsite` command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. Everything here can be exercised without a network.
//!
//! # Modules
//!
//! - [`types`] - Records (`Post`, `Member`), their ids, and email addresses
//! - [`filter`] - Member filtering by status, tag and name, plus the tag universe
//! - [`forms`] - Admin form state, defaults and validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod filter;
pub mod forms;
pub mod types;

pub use filter::{FilterState, Selection, filter_members, tag_universe};
pub use forms::{FormError, MemberForm, PostForm};
pub use types::*;
