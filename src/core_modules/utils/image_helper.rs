// Bridges the engine's raw B, G, R, A byte layout and on-disk images. Decoding and
// encoding are left entirely to the `image` crate; this module only reorders
// channels so the engine never sees a container format.

use image::ImageEncoder;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

const CHANNELS: usize = 4;

/// Raw pixels plus their dimensions, as exchanged with `decode_buffer`/`encode_buffer`.
pub struct RawImage {
    pub bgra: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

fn swap_red_blue(bytes: &mut [u8]) {
    for pixel in bytes.chunks_exact_mut(CHANNELS) {
        pixel.swap(0, 2);
    }
}

/// Loads any format the `image` crate understands and packs it as BGRA.
pub fn load(path: &Path) -> Result<RawImage, image::ImageError> {
    let rgba = image::open(path)?.into_rgba8();
    let (width, height) = rgba.dimensions();
    let mut bgra = rgba.into_raw();
    swap_red_blue(&mut bgra);
    Ok(RawImage { bgra, width, height })
}

/// Writes BGRA bytes to `path` as an RGBA PNG.
pub fn save_png(path: &Path, bgra: &[u8], width: u32, height: u32) -> Result<(), image::ImageError> {
    let mut rgba = bgra.to_vec();
    swap_red_blue(&mut rgba);

    let output = BufWriter::new(File::create(path)?);
    let encoder = image::codecs::png::PngEncoder::new(output);
    encoder.write_image(&rgba, width, height, image::ExtendedColorType::Rgba8)?;

    Ok(())
}
