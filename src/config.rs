//! Editor configuration with environment overrides.
//!
//! Every field has a default, so an embedding host can start from
//! `EditorConfig::default()`, deserialize one from JSON, or layer
//! `PINBOARD_*` environment variables over the defaults with
//! [`EditorConfig::from_env`].

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::str::FromStr;

use canvas::input::{InteractionKind, UnknownInteraction};
use canvas::viewport::Viewport;
use serde::Deserialize;

pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;
pub const DEFAULT_DECODE_CONCURRENCY: usize = 4;
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 32 * 1024 * 1024;
pub const DEFAULT_VIEWPORT_WIDTH: f64 = 1280.0;
pub const DEFAULT_VIEWPORT_HEIGHT: f64 = 720.0;

/// Errors produced while building an [`EditorConfig`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// `PINBOARD_INTERACTION` named an unknown strategy.
    #[error("invalid PINBOARD_INTERACTION: {0}")]
    Interaction(#[from] UnknownInteraction),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Bounded capacity of the session message queue.
    pub queue_capacity: usize,
    /// Maximum number of image decodes running at once.
    pub decode_concurrency: usize,
    /// Files larger than this are marked as failed without decoding.
    pub max_image_bytes: usize,
    /// Which interaction strategy turns pointer gestures into commands.
    pub interaction: InteractionKind,
    /// Keep helper-drag positions inside the viewport rectangle.
    pub clamp_drag_to_viewport: bool,
    /// Viewport assumed until the host reports a real one.
    pub initial_viewport: Viewport,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            decode_concurrency: DEFAULT_DECODE_CONCURRENCY,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            interaction: InteractionKind::default(),
            clamp_drag_to_viewport: false,
            initial_viewport: Viewport::new(DEFAULT_VIEWPORT_WIDTH, DEFAULT_VIEWPORT_HEIGHT),
        }
    }
}

impl EditorConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `PINBOARD_QUEUE_CAPACITY`: default 1024
    /// - `PINBOARD_DECODE_CONCURRENCY`: default 4
    /// - `PINBOARD_MAX_IMAGE_BYTES`: default 32 MiB
    /// - `PINBOARD_INTERACTION`: `helper` (default) or `native`
    /// - `PINBOARD_CLAMP_DRAG`: `true`/`false`, default false
    /// - `PINBOARD_VIEWPORT_WIDTH` / `PINBOARD_VIEWPORT_HEIGHT`: default 1280x720
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Interaction`] for an unknown interaction mode.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable source. Numeric values that
    /// fail to parse fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Interaction`] for an unknown interaction mode.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let interaction = match lookup("PINBOARD_INTERACTION") {
            Some(raw) => raw.parse::<InteractionKind>()?,
            None => defaults.interaction,
        };
        Ok(Self {
            queue_capacity: parse_or(lookup("PINBOARD_QUEUE_CAPACITY"), defaults.queue_capacity),
            decode_concurrency: parse_or(lookup("PINBOARD_DECODE_CONCURRENCY"), defaults.decode_concurrency),
            max_image_bytes: parse_or(lookup("PINBOARD_MAX_IMAGE_BYTES"), defaults.max_image_bytes),
            interaction,
            clamp_drag_to_viewport: parse_or(lookup("PINBOARD_CLAMP_DRAG"), defaults.clamp_drag_to_viewport),
            initial_viewport: Viewport::new(
                parse_or(lookup("PINBOARD_VIEWPORT_WIDTH"), defaults.initial_viewport.width),
                parse_or(lookup("PINBOARD_VIEWPORT_HEIGHT"), defaults.initial_viewport.height),
            ),
        })
    }
}

fn parse_or<T>(raw: Option<String>, default: T) -> T
where
    T: FromStr,
{
    raw.and_then(|v| v.trim().parse::<T>().ok()).unwrap_or(default)
}
