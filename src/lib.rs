//! osenv - declarative environment seeding for OpenStack
//!
//! Provisions a fixed inventory of resources (security rules, key pairs,
//! flavors, images) from a declarative manifest against the OpenStack
//! control-plane APIs. One best-effort pass per invocation: resources that
//! already exist are tolerated, images are polled to completion, and
//! anything that looks like a configuration or connectivity defect aborts
//! the run.

pub mod config;
pub mod error;
pub mod openstack;
pub mod resource;
