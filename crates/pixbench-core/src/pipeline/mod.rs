//! Image processing pipeline components.
//!
//! - **discovery**: Find image files in the input directory
//! - **outputs**: Stage names and per-run output directories
//! - **decode**: Load and decode images
//! - **transform**: Grayscale, half-size, Gaussian blur, Canny
//! - **processor**: One image through decode, transform and write
//! - **batch**: Sequential and worker-pool drivers

pub mod batch;
pub mod decode;
pub mod discovery;
pub mod outputs;
pub mod processor;
pub mod transform;

// Re-exports for convenient access
pub use batch::BatchRunner;
pub use discovery::FileDiscovery;
pub use outputs::{OutputDirs, Stage};
pub use processor::ImageProcessor;
pub use transform::StageImages;
