// THEORY:
// A `PixelBuffer` is a row-major 2D grid of optional pixels. A cell is either a
// present `Pixel` or absent (`None`). Absent cells are how the engine expresses
// "no value here": reads outside the grid return `None`, and the normal-map
// extractor leaves its border cells absent because a full 3x3 neighborhood does
// not exist there.
//
// Buffers are never shared between filter stages. Every filter builds and returns
// a fresh buffer of the same dimensions, so a source image, its normal map and the
// relit result each own their storage.
//
// The raw byte layout exchanged with image codecs is 4 bytes per pixel in
// B, G, R, A order, rows packed back to back with `stride = width * 4`.

use crate::core_modules::pixel::pixel::{Byte, CHANNELS, Pixel};
use crate::error::{LightingError, Result};

pub type Cell = Option<Pixel>;

#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
}

impl PixelBuffer {
    /// Creates a buffer where every cell is absent.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
        }
    }

    /// Builds a buffer by evaluating `f(x, y)` for every cell in row-major order.
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> Cell,
    {
        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                cells.push(f(x, y));
            }
        }
        Self { width, height, cells }
    }

    /// Builds a buffer where every cell holds `pixel`.
    pub fn filled(width: u32, height: u32, pixel: Pixel) -> Self {
        Self {
            width,
            height,
            cells: vec![Some(pixel); width as usize * height as usize],
        }
    }

    pub(crate) fn from_cells(width: u32, height: u32, cells: Vec<Cell>) -> Self {
        debug_assert_eq!(cells.len(), width as usize * height as usize);
        Self { width, height, cells }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Bytes per packed row.
    #[inline]
    pub fn stride(&self) -> usize {
        self.width as usize * CHANNELS
    }

    /// Bytes in the packed image.
    #[inline]
    pub fn size(&self) -> usize {
        self.stride() * self.height as usize
    }

    /// Bounds-checked read. Coordinates outside the grid yield `None`, never a panic.
    #[inline]
    pub fn get(&self, x: i64, y: i64) -> Cell {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        self.cells[y as usize * self.width as usize + x as usize]
    }

    /// Writes a cell. Writes outside the grid are ignored.
    pub fn set(&mut self, x: u32, y: u32, cell: Cell) {
        if x < self.width && y < self.height {
            let index = y as usize * self.width as usize + x as usize;
            self.cells[index] = cell;
        }
    }

    /// The 3x3 neighborhood centered on (x, y) in row-major order, center at index 4.
    pub fn neighborhood(&self, x: u32, y: u32) -> [Cell; 9] {
        let (x, y) = (x as i64, y as i64);
        [
            self.get(x - 1, y - 1),
            self.get(x, y - 1),
            self.get(x + 1, y - 1),
            self.get(x - 1, y),
            self.get(x, y),
            self.get(x + 1, y),
            self.get(x - 1, y + 1),
            self.get(x, y + 1),
            self.get(x + 1, y + 1),
        ]
    }

    /// All cells, row-major.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Rows of cells, top to bottom. Always yields `height` rows, even when
    /// `width` is zero.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        let width = self.width as usize;
        (0..self.height as usize).map(move |y| &self.cells[y * width..(y + 1) * width])
    }

    pub fn present_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }
}

/// Interprets tightly packed B, G, R, A bytes (row-major, `stride = width * 4`).
pub fn decode_buffer(raw: &[Byte], width: u32, height: u32) -> Result<PixelBuffer> {
    let expected = width as usize * height as usize * CHANNELS;
    if raw.len() != expected {
        return Err(LightingError::BufferSizeMismatch { expected, got: raw.len() });
    }

    let cells = raw
        .chunks_exact(CHANNELS)
        .map(|bytes| Some(Pixel::from_bgra([bytes[0], bytes[1], bytes[2], bytes[3]])))
        .collect();

    Ok(PixelBuffer::from_cells(width, height, cells))
}

/// Packs a buffer into B, G, R, A bytes. Absent cells become four zero bytes.
pub fn encode_buffer(buffer: &PixelBuffer) -> Vec<Byte> {
    let mut raw = Vec::with_capacity(buffer.size());
    for cell in buffer.cells() {
        match cell {
            Some(pixel) => raw.extend_from_slice(&pixel.to_bgra()),
            None => raw.extend_from_slice(&[0; CHANNELS]),
        }
    }
    raw
}
