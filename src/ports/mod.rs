//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the wizard and an external
//! system. Implementations live in `src/adapters/`.

pub mod image_service;

pub use image_service::{EditRequest, ImageService, LogoPlacementRequest, MockupRequest};
