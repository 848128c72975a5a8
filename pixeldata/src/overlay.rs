//! Single-bit overlay planes.
//!
//! Overlay data (and pixel data with _Bits Allocated_ = 1)
//! packs one pixel per bit,
//! starting from the least significant bit of the first byte.

use snafu::ensure;

use crate::gray::GrayPixels;
use crate::{InsufficientPixelDataSnafu, Result};

/// A bit-packed overlay plane, as found in _Overlay Data_.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Overlay<'a> {
    /// _Overlay Columns_
    pub columns: u32,
    /// _Overlay Rows_
    pub rows: u32,
    /// the packed bits, one per pixel
    pub data: &'a [u8],
}

impl<'a> Overlay<'a> {
    pub fn new(columns: u32, rows: u32, data: &'a [u8]) -> Self {
        Overlay {
            columns,
            rows,
            data,
        }
    }

    /// Expand the plane into one byte per pixel, each either 0 or 1.
    pub fn expand(&self) -> Result<GrayPixels<u8>> {
        let count = self.columns as usize * self.rows as usize;
        let samples = unpack_bits(self.data, count)?;
        GrayPixels::new(self.columns, self.rows, samples)
    }
}

/// Unpack the first `count` bits of `data` into one byte per bit.
pub fn unpack_bits(data: &[u8], count: usize) -> Result<Vec<u8>> {
    let needed = (count + 7) / 8;
    ensure!(
        data.len() >= needed,
        InsufficientPixelDataSnafu {
            expected: needed,
            got: data.len(),
        }
    );
    Ok((0..count).map(|i| (data[i / 8] >> (i % 8)) & 1).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_row_of_eight() {
        let overlay = Overlay::new(8, 1, &[0b1010_0011]);
        let pixels = overlay.expand().unwrap();
        assert_eq!(pixels.samples(), &[1, 1, 0, 0, 0, 1, 0, 1]);
    }

    #[test]
    fn bits_span_bytes() {
        let bits = unpack_bits(&[0xFF, 0x01], 10).unwrap();
        assert_eq!(bits, vec![1, 1, 1, 1, 1, 1, 1, 1, 1, 0]);
    }

    #[test]
    fn not_enough_bits() {
        let overlay = Overlay::new(3, 3, &[0xFF]);
        assert!(matches!(
            overlay.expand(),
            Err(crate::Error::InsufficientPixelData {
                expected: 2,
                got: 1
            })
        ));
    }
}
