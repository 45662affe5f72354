//! Pixel operations applied between decode and encode.

use super::params::Dimensions;
use image::DynamicImage;
use image::imageops::FilterType;

/// Resampling kernel used for every resize.
///
/// `Triangle` is bilinear interpolation. Swapping kernels means changing this
/// constant, not adding a request parameter.
pub const RESIZE_FILTER: FilterType = FilterType::Triangle;

/// Resize to exactly `target`, stretching if the aspect ratio differs.
///
/// Callers guarantee both target dimensions are non-zero.
pub fn resize(image: &DynamicImage, target: Dimensions) -> DynamicImage {
    image.resize_exact(target.width, target.height, RESIZE_FILTER)
}
