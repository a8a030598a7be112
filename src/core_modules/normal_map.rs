// THEORY:
// Derives a tangent-space normal map from pixel intensity with a Sobel kernel.
//
// Intensity is treated as height. For an interior pixel with neighbors
//
//     a b c
//     d x e
//     f g h
//
// the slopes are
//
//     gx = (f + 2g + h) - (a + 2b + c)
//     gy = (c + 2e + h) - (a + 2d + f)
//     gz = 1 / strength
//
// and the unit vector (gx, gy, gz) is stored in R, G, B through `Pixel::map`.
// A flat region therefore encodes as (0, 0, 1). A larger strength shrinks gz and
// exaggerates the bumps; a smaller one flattens them.
//
// Only cells with a complete 3x3 neighborhood get a normal. The outer ring of the
// image, and any cell next to an absent source cell, stays absent in the output.

use crate::core_modules::pixel::pixel::Pixel;
use crate::core_modules::pixel_buffer::{Cell, PixelBuffer};
use crate::core_modules::vector::{Vector3, normalized_or_zero};
use crate::error::{LightingError, Result};
use rayon::prelude::*;

/// Rejects strengths that are not finite and strictly positive.
pub fn validate_strength(strength: f64) -> Result<()> {
    if strength.is_finite() && strength > 0.0 {
        Ok(())
    } else {
        Err(LightingError::InvalidStrength { strength })
    }
}

/// Unit surface normal for a full 3x3 window, or `None` if any cell is absent.
fn sobel_normal(window: &[Cell; 9], inverse_strength: f64) -> Option<(Vector3, Pixel)> {
    let [Some(a), Some(b), Some(c), Some(d), Some(center), Some(e), Some(f), Some(g), Some(h)] = *window
    else {
        return None;
    };

    let [a, b, c, d, e, f, g, h] = [a, b, c, d, e, f, g, h].map(|pixel| pixel.intensity());

    let gradient = Vector3::new(
        (f + 2.0 * g + h) - (a + 2.0 * b + c),
        (c + 2.0 * e + h) - (a + 2.0 * d + f),
        inverse_strength,
    );

    Some((normalized_or_zero(&gradient), center))
}

/// Builds the normal map of `buffer`. `strength` must be finite and > 0.
pub fn normal_map(buffer: &PixelBuffer, strength: f64) -> Result<PixelBuffer> {
    validate_strength(strength)?;

    let (width, height) = buffer.dimensions();
    let inverse_strength = 1.0 / strength;
    let mut cells: Vec<Cell> = vec![None; width as usize * height as usize];

    cells
        .par_chunks_mut(width.max(1) as usize)
        .enumerate()
        .for_each(|(y, row_out)| {
            let y = y as u32;
            if y == 0 || y + 1 >= height {
                return;
            }
            for x in 1..width.saturating_sub(1) {
                let window = buffer.neighborhood(x, y);
                if let Some((normal, center)) = sobel_normal(&window, inverse_strength) {
                    row_out[x as usize] = Some(Pixel::new(
                        Pixel::map(normal.x),
                        Pixel::map(normal.y),
                        Pixel::map(normal.z),
                        center.alpha,
                    ));
                }
            }
        });

    Ok(PixelBuffer::from_cells(width, height, cells))
}
