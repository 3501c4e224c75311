//! OpenStack API layer
//!
//! Authentication, HTTP plumbing, and capability-scoped service surfaces.
//! Everything above this module talks to the cloud through
//! [`client::OpenStackClient`] and never holds tokens or endpoints itself.

pub mod auth;
pub mod client;
pub mod compute;
pub mod data_processing;
pub mod http;
pub mod image;

pub use auth::Credentials;
pub use client::OpenStackClient;
pub use image::{ImageRecord, IMAGE_ACTIVE_STATUS};
