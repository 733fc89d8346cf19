//! Implementations of the [`ImageService`](crate::ports::ImageService) port.
//!
//! `live` calls the hosted API, `recording` wraps it and writes a cassette,
//! and `replaying` answers from a cassette with no network access.

pub mod live;
pub mod recording;
pub mod replaying;
