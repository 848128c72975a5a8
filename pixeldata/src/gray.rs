//! Single sample (grayscale or palette index) pixel data.

use snafu::ensure;

use crate::attribute::{BitDepth, Endianness};
use crate::lut::LookupTable;
use crate::normalize::{decode_samples, Sample};
use crate::parallel::Parallelism;
use crate::resample::resize_gray;
use crate::stats::{scan_min_max, MinMax};
use crate::{render, InsufficientPixelDataSnafu, Result, SampleCountMismatchSnafu};

/// A frame of normalized single sample pixels,
/// stored in row-major order.
///
/// The sample type is one of
/// `u8`, `u16`, `i16`, `u32` or `i32`.
#[derive(Debug, Clone, PartialEq)]
pub struct GrayPixels<T> {
    width: u32,
    height: u32,
    samples: Vec<T>,
}

impl<T: Sample> GrayPixels<T> {
    /// Wrap already normalized samples.
    ///
    /// Fails if the number of samples is not `width * height`.
    pub fn new(width: u32, height: u32, samples: Vec<T>) -> Result<Self> {
        let expected = width as usize * height as usize;
        ensure!(
            samples.len() == expected,
            SampleCountMismatchSnafu {
                expected,
                got: samples.len(),
            }
        );
        Ok(GrayPixels {
            width,
            height,
            samples,
        })
    }

    /// Decode and normalize the samples of a native frame.
    ///
    /// Bytes past the end of the frame are ignored.
    pub fn decode(
        width: u32,
        height: u32,
        bytes: &[u8],
        bit_depth: &BitDepth,
        endianness: Endianness,
        parallelism: &Parallelism,
    ) -> Result<Self> {
        let count = width as usize * height as usize;
        let needed = count * T::SIZE;
        ensure!(
            bytes.len() >= needed,
            InsufficientPixelDataSnafu {
                expected: needed,
                got: bytes.len(),
            }
        );
        if bytes.len() > needed {
            tracing::warn!(
                expected = needed,
                got = bytes.len(),
                "frame buffer is larger than needed, ignoring trailing bytes"
            );
        }
        let samples = decode_samples(&bytes[..needed], bit_depth, endianness, parallelism);
        Ok(GrayPixels {
            width,
            height,
            samples,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The normalized samples, in row-major order.
    #[inline]
    pub fn samples(&self) -> &[T] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<T> {
        self.samples
    }

    /// The sample at the given column and row, if inside the frame.
    pub fn get(&self, x: u32, y: u32) -> Option<T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.samples
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// The lowest and highest sample values, ignoring `padding`.
    /// `None` means that there is no data left to measure.
    pub fn min_max(&self, padding: Option<T>) -> Option<MinMax<T>> {
        scan_min_max(&self.samples, padding)
    }

    /// Resample the frame to the given dimensions.
    pub fn resize(&self, new_width: u32, new_height: u32) -> Result<Self> {
        let samples = resize_gray(
            &self.samples,
            self.width,
            self.height,
            new_width,
            new_height,
        )?;
        GrayPixels::new(new_width, new_height, samples)
    }

    /// Write one display value per pixel into `output`.
    pub fn render(
        &self,
        lut: Option<&dyn LookupTable>,
        output: &mut [i32],
        parallelism: &Parallelism,
    ) -> Result<()> {
        render::render_gray(
            &self.samples,
            self.width,
            self.height,
            lut,
            output,
            parallelism,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_16bit_signed() {
        let bytes = [0xFF, 0x0F, 0xFF, 0x07, 0x00, 0x08, 0x01, 0x00];
        let pixels: GrayPixels<i16> = GrayPixels::decode(
            2,
            2,
            &bytes,
            &BitDepth::new(16, 12),
            Endianness::Little,
            &Parallelism::Sequential,
        )
        .unwrap();
        assert_eq!(pixels.samples(), &[-1, 2047, -2048, 1]);
        assert_eq!(pixels.get(1, 1), Some(1));
        assert_eq!(pixels.get(2, 0), None);
        assert_eq!(
            pixels.min_max(None),
            Some(MinMax {
                min: -2048,
                max: 2047
            })
        );
    }

    #[test]
    fn decode_too_short() {
        let res = GrayPixels::<u16>::decode(
            2,
            2,
            &[0; 7],
            &BitDepth::full(16),
            Endianness::Little,
            &Parallelism::default(),
        );
        assert!(matches!(
            res,
            Err(crate::Error::InsufficientPixelData {
                expected: 8,
                got: 7
            })
        ));
    }

    #[test]
    fn new_checks_sample_count() {
        assert!(GrayPixels::new(2, 2, vec![0_u8; 4]).is_ok());
        assert!(GrayPixels::new(2, 2, vec![0_u8; 5]).is_err());
    }

    #[test]
    fn resize_uniform_frame() {
        let pixels = GrayPixels::new(4, 4, vec![100_u16; 16]).unwrap();
        let half = pixels.resize(2, 2).unwrap();
        assert_eq!(half.width(), 2);
        assert_eq!(half.height(), 2);
        assert_eq!(half.samples(), &[100, 100, 100, 100]);

        let pixels = GrayPixels::new(2, 2, vec![-300_i32; 4]).unwrap();
        let double = pixels.resize(4, 4).unwrap();
        assert!(double.samples().iter().all(|&v| v == -300));
    }

    #[test]
    fn render_identity() {
        let pixels = GrayPixels::new(3, 1, vec![3_u32, 2, 1]).unwrap();
        let mut out = vec![0; 3];
        pixels
            .render(None, &mut out, &Parallelism::Sequential)
            .unwrap();
        assert_eq!(out, vec![3, 2, 1]);
    }
}
