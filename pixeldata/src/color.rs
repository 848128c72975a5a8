//! Three sample, 8 bits per channel color pixel data.

use snafu::ensure;

use crate::lut::LookupTable;
use crate::parallel::Parallelism;
use crate::resample::resize_rgb;
use crate::{render, InsufficientPixelDataSnafu, Result, SampleCountMismatchSnafu};

/// A frame of 24-bit color pixels,
/// stored as interleaved byte triples in row-major order.
///
/// The channels are kept as they were in the frame,
/// so `YBR_FULL` data is not converted to RGB.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorPixels {
    width: u32,
    height: u32,
    samples: Vec<u8>,
}

impl ColorPixels {
    /// Wrap interleaved samples (`R1 G1 B1 R2 G2 B2 ...`).
    ///
    /// Fails if the number of samples is not `width * height * 3`.
    pub fn new(width: u32, height: u32, samples: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 3;
        ensure!(
            samples.len() == expected,
            SampleCountMismatchSnafu {
                expected,
                got: samples.len(),
            }
        );
        Ok(ColorPixels {
            width,
            height,
            samples,
        })
    }

    /// Copy the interleaved samples of a native frame.
    /// Bytes past the end of the frame are ignored.
    pub fn from_interleaved(width: u32, height: u32, bytes: &[u8]) -> Result<Self> {
        let needed = frame_len(width, height, bytes)?;
        Ok(ColorPixels {
            width,
            height,
            samples: bytes[..needed].to_vec(),
        })
    }

    /// Reorder the samples of a planar native frame
    /// (`R1 R2 ... G1 G2 ... B1 B2 ...`) into interleaved triples.
    pub fn from_planar(width: u32, height: u32, bytes: &[u8]) -> Result<Self> {
        frame_len(width, height, bytes)?;
        let pixels = width as usize * height as usize;
        Ok(ColorPixels {
            width,
            height,
            samples: planar_to_interleaved(&bytes[..pixels * 3], pixels),
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

    /// The interleaved samples.
    #[inline]
    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<u8> {
        self.samples
    }

    /// The three channel values at the given column and row, if inside the frame.
    pub fn get(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        let px = self.samples.get(i..i + 3)?;
        Some([px[0], px[1], px[2]])
    }

    /// Resample the frame to the given dimensions.
    pub fn resize(&self, new_width: u32, new_height: u32) -> Result<Self> {
        let samples = resize_rgb(
            &self.samples,
            self.width,
            self.height,
            new_width,
            new_height,
        )?;
        ColorPixels::new(new_width, new_height, samples)
    }

    /// Write one packed `0x00RRGGBB` value per pixel into `output`.
    pub fn render(
        &self,
        lut: Option<&dyn LookupTable>,
        output: &mut [i32],
        parallelism: &Parallelism,
    ) -> Result<()> {
        render::render_rgb(
            &self.samples,
            self.width,
            self.height,
            lut,
            output,
            parallelism,
        )
    }
}

fn frame_len(width: u32, height: u32, bytes: &[u8]) -> Result<usize> {
    let needed = width as usize * height as usize * 3;
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
    Ok(needed)
}

/// Turn `pixels` samples of each of the three planes into interleaved triples.
fn planar_to_interleaved(planes: &[u8], pixels: usize) -> Vec<u8> {
    let (red, rest) = planes.split_at(pixels);
    let (green, blue) = rest.split_at(pixels);
    red.iter()
        .zip(green)
        .zip(blue)
        .flat_map(|((&r, &g), &b)| [r, g, b])
        .collect()
}
