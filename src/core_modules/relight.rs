// THEORY:
// Per-pixel lighting with a stripped-down Phong model: no ambient term, one light,
// one viewer.
//
//     n        = decoded normal (not renormalized)
//     r        = l - 2n(n . l)
//     light    = clamp(n . l + r . v, 0, 1)
//     output   = source * light (alpha untouched)
//
// The light and eye vectors are taken as given. The caller decides whether they
// are unit length; intensity grows with their magnitude.

use crate::core_modules::pixel::pixel::Pixel;
use crate::core_modules::pixel_buffer::{Cell, PixelBuffer};
use crate::core_modules::vector::{Vector3, reflect};
use crate::error::{LightingError, Result};
use rayon::prelude::*;

/// Decodes the normal stored in a normal-map pixel's R, G, B channels.
pub fn decode_normal(pixel: &Pixel) -> Vector3 {
    Vector3::new(Pixel::unmap(pixel.red), Pixel::unmap(pixel.green), Pixel::unmap(pixel.blue))
}

/// Diffuse plus specular reflection for one surface normal, clamped to [0, 1].
pub fn light_intensity(normal: &Vector3, light: &Vector3, eye: &Vector3) -> f64 {
    let reflected = reflect(light, normal);
    let diffuse = normal.dot(light);
    let specular = reflected.dot(eye);
    (diffuse + specular).clamp(0.0, 1.0)
}

/// Relights `buffer` using `normals`. Both buffers must have the same dimensions.
///
/// Cells where either the source or the normal map is absent stay absent.
pub fn relight(
    buffer: &PixelBuffer,
    normals: &PixelBuffer,
    light: &Vector3,
    eye: &Vector3,
) -> Result<PixelBuffer> {
    if buffer.dimensions() != normals.dimensions() {
        return Err(LightingError::DimensionMismatch {
            expected: buffer.dimensions(),
            got: normals.dimensions(),
        });
    }

    let (width, height) = buffer.dimensions();
    let row_len = width.max(1) as usize;
    let mut cells: Vec<Cell> = vec![None; width as usize * height as usize];

    cells
        .par_chunks_mut(row_len)
        .zip(buffer.cells().par_chunks(row_len))
        .zip(normals.cells().par_chunks(row_len))
        .for_each(|((row_out, source_row), normal_row)| {
            for ((cell, source), normal) in row_out.iter_mut().zip(source_row).zip(normal_row) {
                if let (Some(pixel), Some(normal_pixel)) = (source, normal) {
                    let normal = decode_normal(normal_pixel);
                    *cell = Some(pixel.scale(light_intensity(&normal, light, eye)));
                }
            }
        });

    Ok(PixelBuffer::from_cells(width, height, cells))
}
