// THEORY:
// This file is the main entry point for the `dynamic_lighting` library crate.
// The engine turns a flat color image into a tangent-space normal map and relights
// the image with a simple diffuse + specular model.
//
// The raw interface is five operations over `PixelBuffer`s:
//
//     decode_buffer(bgra, width, height) -> PixelBuffer
//     encode_buffer(&buffer)             -> bgra
//     smooth(&buffer)                    -> PixelBuffer
//     normal_map(&buffer, strength)      -> PixelBuffer
//     relight(&buffer, &normals, &light, &eye) -> PixelBuffer
//
// Every filter is pure: it reads its inputs and returns a freshly allocated buffer.
// `LightingPipeline` strings them together and caches the normal map, and
// `PreviewWorker` puts a pipeline behind an async queue for interactive callers.

pub mod core_modules;
pub mod error;
pub mod parallel_pipeline;
pub mod pipeline;

pub use core_modules::normal_map::normal_map;
pub use core_modules::pixel::pixel::Pixel;
pub use core_modules::pixel_buffer::{PixelBuffer, decode_buffer, encode_buffer};
pub use core_modules::relight::relight;
pub use core_modules::smoothing::smooth;
pub use core_modules::vector::Vector3;
pub use error::LightingError;
