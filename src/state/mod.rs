//! Resource state tracking
//!
//! This module defines the identity and lifecycle types shared by the whole
//! pipeline: what kind a resource is, and how far it has progressed.

mod resource;

pub use resource::{ResourceKind, ResourceState};
