//! Lab site client library.
//!
//! Everything the public and admin views do, minus the presentation:
//!
//! - [`gateway`] - the hosted backend behind the [`gateway::RemoteGateway`] seam
//! - [`store`] - posts and members as last read
//! - [`submission`] - upload-then-insert create path
//! - [`delete`] - confirm-gated delete
//! - [`auth`] - OAuth + allow-list or shared-secret admin gate

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod config;
pub mod delete;
pub mod error;
pub mod gateway;
pub mod image;
pub mod store;
pub mod submission;

pub use config::SiteConfig;
pub use error::{AppError, Result};
pub use gateway::{RemoteGateway, SupabaseClient};
pub use image::ImageFile;
pub use store::ListStore;
pub use submission::{RecordForm, SubmitError, Submission};
