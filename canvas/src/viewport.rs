//! Coordinate translation between pixel space and viewport-percentage space.
//!
//! Item positions are stored as percentages of the live viewport so layout
//! stays responsive when the host window changes size. Pointer events arrive
//! in pixels and are converted here against the viewport current at the time
//! of the event.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use serde::{Deserialize, Serialize};

/// A point in pixel space, relative to the viewport's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A position expressed as percentages of viewport width and height.
///
/// `0..=100` is on screen; values outside that range are allowed and simply
/// place the item off screen.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Percent {
    pub x: f64,
    pub y: f64,
}

impl Percent {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Visible surface dimensions in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero, negative, or not finite.
    /// No percentage conversion is possible against such a viewport.
    #[must_use]
    pub fn is_degenerate(self) -> bool {
        !(self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0)
    }
}

/// Error returned by [`to_percentage`].
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ViewportError {
    /// The viewport has a zero, negative, or non-finite dimension.
    #[error("degenerate viewport: {width}x{height}")]
    Degenerate { width: f64, height: f64 },
    /// The pixel offset itself is NaN or infinite.
    #[error("non-finite pixel offset: ({x}, {y})")]
    NonFinitePoint { x: f64, y: f64 },
}

/// Convert a pixel offset into viewport percentages.
///
/// # Errors
///
/// Returns [`ViewportError::Degenerate`] when the viewport cannot be divided
/// by, and [`ViewportError::NonFinitePoint`] when the offset is NaN/infinite.
pub fn to_percentage(pixel: Point, viewport: Viewport) -> Result<Percent, ViewportError> {
    if viewport.is_degenerate() {
        return Err(ViewportError::Degenerate { width: viewport.width, height: viewport.height });
    }
    if !pixel.is_finite() {
        return Err(ViewportError::NonFinitePoint { x: pixel.x, y: pixel.y });
    }
    Ok(Percent {
        x: pixel.x / viewport.width * 100.0,
        y: pixel.y / viewport.height * 100.0,
    })
}

/// Convert viewport percentages back into a pixel offset.
#[must_use]
pub fn to_pixels(percent: Percent, viewport: Viewport) -> Point {
    Point {
        x: percent.x / 100.0 * viewport.width,
        y: percent.y / 100.0 * viewport.height,
    }
}
