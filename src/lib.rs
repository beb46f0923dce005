//! Pinboard: host runtime for the canvas editor core.
//!
//! The `canvas` crate holds the item store and interaction logic as plain
//! synchronous state. This crate runs it: a single-consumer session loop,
//! image decoding on the blocking pool, and environment-driven config.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | `EditorConfig` defaults and `PINBOARD_*` overrides |
//! | [`decode`] | `ImageDecoder` trait and the `data:` URL decoder |
//! | [`session`] | Session loop, `EditorHandle`, snapshot publishing |
//! | [`telemetry`] | `tracing` subscriber setup |

pub mod config;
pub mod decode;
pub mod session;
pub mod telemetry;

pub use canvas;
pub use config::{ConfigError, EditorConfig};
pub use decode::{DataUrlDecoder, DecodeError, ImageDecoder};
pub use session::{EditorHandle, SessionError, SessionMessage, spawn_session};
