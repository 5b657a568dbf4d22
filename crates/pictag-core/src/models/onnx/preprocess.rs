//! Image preprocessing for the ONNX vision models.
//!
//! All three models take RGB NCHW float tensors; they differ in input size,
//! resize policy and per-channel normalization.

use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};
use ndarray::Array4;

/// Per-channel normalization: `(pixel / 255 - mean) / std`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalization {
    pub mean: [f32; 3],
    pub std: [f32; 3],
}

/// MobileNetV2 (Google export): scales to [-1, 1].
pub const MOBILENET: Normalization = Normalization {
    mean: [0.5, 0.5, 0.5],
    std: [0.5, 0.5, 0.5],
};

/// ImageNet statistics, used by DETR.
pub const IMAGENET: Normalization = Normalization {
    mean: [0.485, 0.456, 0.406],
    std: [0.229, 0.224, 0.225],
};

/// OpenAI CLIP statistics.
pub const CLIP: Normalization = Normalization {
    mean: [0.481_454_66, 0.457_827_5, 0.408_210_73],
    std: [0.268_629_54, 0.261_302_58, 0.275_777_1],
};

/// How the source image is brought to model size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resize {
    /// Stretch to exactly `size × size`
    Exact(u32),
    /// Scale to cover `size × size`, then center-crop
    CenterCrop(u32),
    /// Scale so the longest edge is `size`, keeping aspect ratio
    LongestEdge(u32),
}

/// Resize and normalize an image into a `[1, 3, H, W]` tensor.
pub fn preprocess(image: &DynamicImage, resize: Resize, norm: Normalization) -> Array4<f32> {
    let resized = match resize {
        Resize::Exact(size) => image.resize_exact(size, size, FilterType::Triangle),
        Resize::CenterCrop(size) => image.resize_to_fill(size, size, FilterType::CatmullRom),
        Resize::LongestEdge(size) => image.resize(size, size, FilterType::Triangle),
    };
    to_nchw(&resized.to_rgb8(), norm)
}

fn to_nchw(rgb: &RgbImage, norm: Normalization) -> Array4<f32> {
    let (width, height) = rgb.dimensions();
    Array4::from_shape_fn(
        (1, 3, height as usize, width as usize),
        |(_, c, y, x)| {
            let value = rgb.get_pixel(x as u32, y as u32)[c] as f32 / 255.0;
            (value - norm.mean[c]) / norm.std[c]
        },
    )
}

/// Split a tensor into the `(shape, data)` pair ONNX Runtime accepts.
pub fn into_ort_parts(tensor: &Array4<f32>) -> (Vec<i64>, Vec<f32>) {
    let shape = tensor.shape().iter().map(|&d| d as i64).collect();
    let data = tensor.iter().copied().collect();
    (shape, data)
}
