pub mod normal_map;
pub mod pixel;
pub mod pixel_buffer;
pub mod relight;
pub mod smoothing;
pub mod utils;
pub mod vector;
