//! File-facing stages around recognition.
//!
//! - **validate**: existence, size limit and signature checks
//! - **hash**: BLAKE3 content hashing
//! - **decode**: bytes to image, with limits and timeout
//! - **discovery**: walking directories for images
//! - **processor**: runs the stages and recognition for one file

pub mod decode;
pub mod discovery;
pub mod hash;
pub mod processor;
pub mod validate;

pub use decode::{DecodedImage, ImageDecoder};
pub use discovery::{DiscoveredFile, FileDiscovery};
pub use processor::{ImageProcessor, ProcessOptions};
pub use validate::Validator;
