//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They sit between
//! the [`pipeline`](crate::pipeline) (which decides what to produce) and the
//! [`backend`](super::backend) (which does the pixel and byte work).
//!
//! ## Types
//!
//! - [`Quality`]: lossy encoding quality (1–100). Clamped on construction.
//! - [`Dimensions`]: a width/height pair, used for resize targets and reports.

use serde::Serialize;
use std::fmt;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quality(pub u32);

impl Quality {
    pub const fn new(value: u32) -> Self {
        let clamped = if value < 1 {
            1
        } else if value > 100 {
            100
        } else {
            value
        };
        Self(clamped)
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

/// Quality used for every lossy format in the registry.
///
/// Fixed so output sizes stay predictable; clients cannot tune it.
pub const LOSSY_QUALITY: Quality = Quality::new(75);

/// Width and height of a raster, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn of(image: &image::DynamicImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
        }
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
