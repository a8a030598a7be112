// THEORY:
// Box blur over a 3x3 window. It runs before gradient extraction to knock down
// high-frequency noise that would otherwise show up as speckle in the normal map.
//
// Each output cell is the channel-wise mean of the present cells in the window
// around it. Border cells simply have fewer present neighbors. A window with no
// present cell at all (only possible when the source itself has absent cells, or
// is degenerate) is an error rather than a silent zero.
//
// Rows are independent, so the output is filled row-parallel with rayon.

use crate::core_modules::pixel::pixel::Pixel;
use crate::core_modules::pixel_buffer::{Cell, PixelBuffer};
use crate::error::{LightingError, Result};
use rayon::prelude::*;

/// Returns a mean-filtered copy of `buffer` with identical dimensions.
pub fn smooth(buffer: &PixelBuffer) -> Result<PixelBuffer> {
    let (width, height) = buffer.dimensions();
    let mut cells: Vec<Cell> = vec![None; width as usize * height as usize];

    cells
        .par_chunks_mut(width.max(1) as usize)
        .enumerate()
        .try_for_each(|(y, row_out)| {
            let y = y as u32;
            for (x, cell) in row_out.iter_mut().enumerate() {
                let x = x as u32;
                let window = buffer.neighborhood(x, y);
                let mean = Pixel::mean(&window).ok_or(LightingError::EmptyNeighborhood { x, y })?;
                *cell = Some(mean);
            }
            Ok::<(), LightingError>(())
        })?;

    Ok(PixelBuffer::from_cells(width, height, cells))
}
