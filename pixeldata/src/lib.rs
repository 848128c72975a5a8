//! This crate turns native DICOM pixel data frames
//! into normalized samples and renders them for display.
//!
//! A frame arrives here as raw bytes
//! (already extracted from the data set and decompressed),
//! along with the [`FrameInfo`] describing its layout.
//! [`select_for_frame`] picks the fitting representation:
//!
//! - 8-bit unsigned, 16-bit signed or unsigned,
//!   or 32-bit signed or unsigned grayscale samples,
//!   masked to _Bits Stored_ and sign extended when signed;
//! - 24-bit color samples, interleaved;
//! - overlay planes, expanded from one bit to one byte per pixel
//!   (see [`select_for_overlay`]).
//!
//! The resulting [`PixelData`] can report its sample value range,
//! be resampled to another resolution,
//! and be rendered through an optional [`LookupTable`]
//! into a buffer of packed `i32` pixels.
//!
//! # Examples
//!
//! ```
//! # use dicom_pixelrender::{select_for_frame, BitDepth, FrameInfo, PixelRepresentation};
//! # fn main() -> Result<(), dicom_pixelrender::Error> {
//! // 2x1 frame, 12 bits stored in 16, signed
//! let info = FrameInfo::monochrome(2, 1, BitDepth::new(16, 12), PixelRepresentation::Signed);
//! let frame = [0xFF, 0x0F, 0xFF, 0x07];
//!
//! let pixels = select_for_frame(&info, &frame)?;
//! let mut out = vec![0; 2];
//! pixels.render(None, &mut out)?;
//! assert_eq!(out, vec![-1, 2047]);
//! #   Ok(())
//! # }
//! ```
//!
//! # Parallelism
//!
//! With the `rayon` feature (enabled by default),
//! sample normalization and rendering run on Rayon's global thread pool.
//! The `*_with` variants of these operations take a [`Parallelism`]
//! to use a specific pool or to run sequentially instead.

use snafu::Snafu;
use std::borrow::Cow;
use std::fmt;

pub mod attribute;
mod color;
mod frame;
mod gray;
mod lut;
mod normalize;
mod overlay;
mod parallel;
mod render;
mod resample;
mod select;
mod stats;

pub use attribute::{
    BitDepth, Endianness, FrameInfo, PhotometricInterpretation, PixelRepresentation,
    PlanarConfiguration,
};
pub use color::ColorPixels;
pub use frame::{FrameSource, NativePixelData};
pub use gray::GrayPixels;
pub use lut::{FnLut, LookupTable, Lut};
pub use normalize::{normalize, Sample};
pub use overlay::{unpack_bits, Overlay};
pub use parallel::Parallelism;
pub use render::pack_rgb;
pub use resample::scaled_dimensions;
pub use select::{select_for_frame, select_for_frame_with, select_for_overlay, select_frame};
pub use stats::{scan_min_max, MinMax};

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("Unsupported photometric interpretation `{}`", pi))]
    UnsupportedPhotometricInterpretation { pi: PhotometricInterpretation },

    #[snafu(display("Unsupported bits allocated {}, must be between 1 and 32", bits_allocated))]
    UnsupportedBitsAllocated { bits_allocated: u16 },

    #[snafu(display(
        "Unsupported bits allocated {} for color pixel data, must be 8",
        bits_allocated
    ))]
    UnsupportedColorBitsAllocated { bits_allocated: u16 },

    #[snafu(display(
        "Invalid samples per pixel {} for photometric interpretation `{}`",
        samples_per_pixel,
        pi
    ))]
    InvalidSamplesPerPixel {
        samples_per_pixel: u16,
        pi: PhotometricInterpretation,
    },

    #[snafu(display("Operation `{}` is not supported for {} pixel data", operation, kind))]
    UnsupportedOperation {
        operation: &'static str,
        kind: PixelKind,
    },

    #[snafu(display(
        "Invalid bit depth (allocated: {}, stored: {}, high bit: {})",
        bits_allocated,
        bits_stored,
        high_bit
    ))]
    InvalidBitDepth {
        bits_allocated: u16,
        bits_stored: u16,
        high_bit: u16,
    },

    #[snafu(display("Insufficient pixel data: expected {} bytes, got {}", expected, got))]
    InsufficientPixelData { expected: usize, got: usize },

    #[snafu(display("Invalid number of samples: expected {}, got {}", expected, got))]
    SampleCountMismatch { expected: usize, got: usize },

    #[snafu(display("Frame #{} is out of range (number of frames: {})", frame, number_of_frames))]
    FrameOutOfRange { frame: u32, number_of_frames: u32 },

    #[snafu(display("Output buffer has {} pixels, expected {}", got, expected))]
    OutputSizeMismatch { expected: usize, got: usize },

    #[snafu(display("Invalid rescale factor {}", factor))]
    InvalidRescaleFactor { factor: f64 },

    #[snafu(display("Could not resample {}x{} pixel data", width, height))]
    Resample { width: u32, height: u32 },
}

impl Error {
    /// Whether the error means that the frame's format is not handled here.
    pub fn is_unsupported_format(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedPhotometricInterpretation { .. }
                | Error::UnsupportedBitsAllocated { .. }
                | Error::UnsupportedColorBitsAllocated { .. }
                | Error::InvalidSamplesPerPixel { .. }
        )
    }

    /// Whether the error means that the operation has no meaning
    /// for that kind of pixel data.
    pub fn is_unsupported_operation(&self) -> bool {
        matches!(self, Error::UnsupportedOperation { .. })
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The kind of a [`PixelData`] value.
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
pub enum PixelKind {
    /// 8-bit unsigned grayscale
    Gray8,
    /// 16-bit unsigned grayscale
    Gray16,
    /// 16-bit signed grayscale
    GraySigned16,
    /// 32-bit unsigned grayscale
    Gray32,
    /// 32-bit signed grayscale
    GraySigned32,
    /// 8 bits per channel, 3 channel color
    Rgb24,
    /// single bit overlay plane, one byte per pixel
    Overlay,
}

impl fmt::Display for PixelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PixelKind::Gray8 => "8-bit unsigned grayscale",
            PixelKind::Gray16 => "16-bit unsigned grayscale",
            PixelKind::GraySigned16 => "16-bit signed grayscale",
            PixelKind::Gray32 => "32-bit unsigned grayscale",
            PixelKind::GraySigned32 => "32-bit signed grayscale",
            PixelKind::Rgb24 => "24-bit color",
            PixelKind::Overlay => "overlay",
        })
    }
}

/// Normalized pixel data of a single frame.
///
/// Values are created by [`select_for_frame`] or [`select_for_overlay`]
/// (or by rescaling another value),
/// and are never modified afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelData {
    Gray8(GrayPixels<u8>),
    Gray16(GrayPixels<u16>),
    GraySigned16(GrayPixels<i16>),
    Gray32(GrayPixels<u32>),
    GraySigned32(GrayPixels<i32>),
    Rgb24(ColorPixels),
    Overlay(GrayPixels<u8>),
}

/// Evaluate an expression for whichever grayscale variant `$data` holds,
/// or `$color` for color pixel data.
macro_rules! dispatch {
    ($data:expr, $p:ident => $gray:expr, $c:ident => $color:expr) => {
        match $data {
            PixelData::Gray8($p) | PixelData::Overlay($p) => $gray,
            PixelData::Gray16($p) => $gray,
            PixelData::GraySigned16($p) => $gray,
            PixelData::Gray32($p) => $gray,
            PixelData::GraySigned32($p) => $gray,
            PixelData::Rgb24($c) => $color,
        }
    };
}

impl PixelData {
    pub fn kind(&self) -> PixelKind {
        match self {
            PixelData::Gray8(_) => PixelKind::Gray8,
            PixelData::Gray16(_) => PixelKind::Gray16,
            PixelData::GraySigned16(_) => PixelKind::GraySigned16,
            PixelData::Gray32(_) => PixelKind::Gray32,
            PixelData::GraySigned32(_) => PixelKind::GraySigned32,
            PixelData::Rgb24(_) => PixelKind::Rgb24,
            PixelData::Overlay(_) => PixelKind::Overlay,
        }
    }

    /// The frame width in pixels.
    pub fn width(&self) -> u32 {
        dispatch!(self, p => p.width(), c => c.width())
    }

    /// The frame height in pixels.
    pub fn height(&self) -> u32 {
        dispatch!(self, p => p.height(), c => c.height())
    }

    /// The number of samples per pixel: 3 for color, 1 otherwise.
    pub fn components(&self) -> u16 {
        match self {
            PixelData::Rgb24(_) => 3,
            _ => 1,
        }
    }

    /// The total number of samples (`width * height * components`).
    pub fn len(&self) -> usize {
        dispatch!(self, p => p.samples().len(), c => c.samples().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The lowest and highest sample values of the frame,
    /// excluding every sample equal to `padding`.
    ///
    /// Returns `Ok(None)` when there is no data to measure,
    /// which happens when every sample is padding.
    ///
    /// # Errors
    ///
    /// The operation is not supported on 32-bit unsigned
    /// and color pixel data,
    /// and fails with [`Error::UnsupportedOperation`] for those.
    pub fn min_max(&self, padding: Option<i64>) -> Result<Option<MinMax>> {
        fn scan<T: Sample>(pixels: &GrayPixels<T>, padding: Option<i64>) -> Option<MinMax> {
            // a padding value the sample type cannot hold matches no sample
            let padding = padding.and_then(|p| num_traits::cast::<i64, T>(p));
            pixels.min_max(padding).map(|m| m.map(Sample::widen))
        }

        match self {
            PixelData::Gray8(p) | PixelData::Overlay(p) => Ok(scan(p, padding)),
            PixelData::Gray16(p) => Ok(scan(p, padding)),
            PixelData::GraySigned16(p) => Ok(scan(p, padding)),
            PixelData::GraySigned32(p) => Ok(scan(p, padding)),
            PixelData::Gray32(_) | PixelData::Rgb24(_) => UnsupportedOperationSnafu {
                operation: "min_max",
                kind: self.kind(),
            }
            .fail(),
        }
    }

    /// Resample the pixel data by the given factor.
    ///
    /// A factor of exactly 1 returns this very value, borrowed.
    /// Otherwise, the new dimensions are
    /// `floor(width * factor)` by `floor(height * factor)`,
    /// and a new value of the same kind is returned.
    pub fn rescale(&self, factor: f64) -> Result<Cow<'_, PixelData>> {
        if factor == 1. {
            return Ok(Cow::Borrowed(self));
        }
        let (width, height) = scaled_dimensions(self.width(), self.height(), factor)?;
        tracing::debug!(
            kind = %self.kind(),
            from_width = self.width(),
            from_height = self.height(),
            width,
            height,
            "rescaling pixel data"
        );
        let out = match self {
            PixelData::Gray8(p) => PixelData::Gray8(p.resize(width, height)?),
            PixelData::Gray16(p) => PixelData::Gray16(p.resize(width, height)?),
            PixelData::GraySigned16(p) => PixelData::GraySigned16(p.resize(width, height)?),
            PixelData::Gray32(p) => PixelData::Gray32(p.resize(width, height)?),
            PixelData::GraySigned32(p) => PixelData::GraySigned32(p.resize(width, height)?),
            PixelData::Rgb24(c) => PixelData::Rgb24(c.resize(width, height)?),
            PixelData::Overlay(p) => PixelData::Overlay(p.resize(width, height)?),
        };
        Ok(Cow::Owned(out))
    }

    /// Render the frame into `output`, one `i32` per pixel in row-major order,
    /// using the default [`Parallelism`].
    ///
    /// Without a lookup table, grayscale samples are copied as they are
    /// and color pixels are packed as `0x00RRGGBB`.
    /// With a table, every sample (every channel, for color)
    /// is replaced by the table's output before packing.
    ///
    /// The table receives the sample widened to `i64`,
    /// so it sees the full range of every sample type.
    /// Without a table, 32-bit unsigned samples above `i32::MAX`
    /// wrap around to negative outputs (`0xFFFF_FFFF` renders as `-1`),
    /// since every output value is an `i32`.
    /// Pass a table to map such frames into a meaningful range.
    ///
    /// # Errors
    ///
    /// Fails if `output` does not hold exactly `width * height` values.
    ///
    /// # Panics
    ///
    /// Panics if the lookup table panics for a sample value,
    /// as slice and unsigned [`Lut`] tables do
    /// for values outside of their range.
    /// With a parallel [`Parallelism`], the panic is propagated
    /// to the caller once the worker threads have stopped.
    pub fn render(&self, lut: Option<&dyn LookupTable>, output: &mut [i32]) -> Result<()> {
        self.render_with(lut, output, &Parallelism::default())
    }

    /// Render the frame into `output`,
    /// distributing rows according to `parallelism`.
    ///
    /// See [`render`](PixelData::render) for the output values
    /// and panic conditions.
    pub fn render_with(
        &self,
        lut: Option<&dyn LookupTable>,
        output: &mut [i32],
        parallelism: &Parallelism,
    ) -> Result<()> {
        dispatch!(
            self,
            p => p.render(lut, output, parallelism),
            c => c.render(lut, output, parallelism)
        )
    }

    /// Render the frame into a newly allocated buffer.
    pub fn render_to_vec(&self, lut: Option<&dyn LookupTable>) -> Result<Vec<i32>> {
        let mut output = vec![0; self.width() as usize * self.height() as usize];
        self.render(lut, &mut output)?;
        Ok(output)
    }

    pub fn as_gray8(&self) -> Option<&GrayPixels<u8>> {
        match self {
            PixelData::Gray8(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_gray16(&self) -> Option<&GrayPixels<u16>> {
        match self {
            PixelData::Gray16(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_gray_signed16(&self) -> Option<&GrayPixels<i16>> {
        match self {
            PixelData::GraySigned16(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_gray32(&self) -> Option<&GrayPixels<u32>> {
        match self {
            PixelData::Gray32(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_gray_signed32(&self) -> Option<&GrayPixels<i32>> {
        match self {
            PixelData::GraySigned32(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_rgb24(&self) -> Option<&ColorPixels> {
        match self {
            PixelData::Rgb24(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_overlay(&self) -> Option<&GrayPixels<u8>> {
        match self {
            PixelData::Overlay(p) => Some(p),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn gray16(samples: Vec<u16>, width: u32) -> PixelData {
        let height = samples.len() as u32 / width;
        PixelData::Gray16(GrayPixels::new(width, height, samples).unwrap())
    }

    #[test]
    fn min_max_with_padding() {
        let data = gray16(vec![5, 10, 10, 3], 2);
        assert_eq!(
            data.min_max(Some(10)).unwrap(),
            Some(MinMax { min: 3, max: 5 })
        );
        assert_eq!(
            data.min_max(None).unwrap(),
            Some(MinMax { min: 3, max: 10 })
        );
        // cannot be held by u16, so nothing is padding
        assert_eq!(
            data.min_max(Some(-1)).unwrap(),
            Some(MinMax { min: 3, max: 10 })
        );
    }

    #[test]
    fn min_max_all_padding() {
        let data = gray16(vec![10; 6], 3);
        assert_eq!(data.min_max(Some(10)).unwrap(), None);
    }

    #[test]
    fn min_max_signed() {
        let data = PixelData::GraySigned32(GrayPixels::new(3, 1, vec![-7, 0, 1 << 20]).unwrap());
        assert_eq!(
            data.min_max(Some(0)).unwrap(),
            Some(MinMax {
                min: -7,
                max: 1 << 20
            })
        );
    }

    #[rstest]
    #[case(PixelData::Gray32(GrayPixels::new(1, 1, vec![1]).unwrap()))]
    #[case(PixelData::Rgb24(ColorPixels::new(1, 1, vec![1, 2, 3]).unwrap()))]
    fn min_max_unsupported(#[case] data: PixelData) {
        for _ in 0..3 {
            let err = data.min_max(None).unwrap_err();
            assert!(err.is_unsupported_operation());
            assert!(!err.is_unsupported_format());
            assert!(matches!(
                err,
                Error::UnsupportedOperation {
                    operation: "min_max",
                    ..
                }
            ));
        }
    }

    #[test]
    fn rescale_by_one_is_same_instance() {
        let data = gray16(vec![1, 2, 3, 4], 2);
        let same = data.rescale(1.0).unwrap();
        assert!(matches!(same, Cow::Borrowed(_)));
        assert!(std::ptr::eq(&*same, &data));
    }

    #[test]
    fn rescale_keeps_kind() {
        let data = PixelData::Overlay(GrayPixels::new(4, 2, vec![1; 8]).unwrap());
        let half = data.rescale(0.5).unwrap();
        assert_eq!(half.kind(), PixelKind::Overlay);
        assert_eq!((half.width(), half.height()), (2, 1));
        assert_eq!(half.as_overlay().unwrap().samples(), &[1, 1]);

        let color = PixelData::Rgb24(ColorPixels::new(3, 3, vec![50; 27]).unwrap());
        let bigger = color.rescale(1.5).unwrap().into_owned();
        assert_eq!(bigger.kind(), PixelKind::Rgb24);
        assert_eq!((bigger.width(), bigger.height()), (4, 4));
        assert_eq!(bigger.len(), 48);
    }

    #[test]
    fn render_to_vec_matches_samples() {
        let data = gray16(vec![0, 4095, 17, 1], 2);
        assert_eq!(data.render_to_vec(None).unwrap(), vec![0, 4095, 17, 1]);
    }

    #[test]
    fn render_unsigned_32_wraps_without_lut() {
        let data =
            PixelData::Gray32(GrayPixels::new(3, 1, vec![u32::MAX, 0x8000_0000, 7]).unwrap());
        assert_eq!(
            data.render_to_vec(None).unwrap(),
            vec![-1, i32::MIN, 7]
        );

        // the table sees the full unsigned value
        let shift = FnLut(|v: i64| (v >> 24) as i32);
        assert_eq!(
            data.render_to_vec(Some(&shift)).unwrap(),
            vec![255, 128, 0]
        );
    }

    #[test]
    #[should_panic]
    fn render_panics_on_values_outside_of_table() {
        let data = PixelData::Gray8(GrayPixels::new(2, 1, vec![1, 200]).unwrap());
        let table: Vec<i32> = vec![0; 16];
        let mut out = vec![0; 2];
        let _ = data.render_with(Some(&table), &mut out, &Parallelism::Sequential);
    }

    #[test]
    fn accessors() {
        let data = gray16(vec![1, 2], 2);
        assert_eq!(data.len(), 2);
        assert!(!data.is_empty());
        assert!(data.as_gray16().is_some());
        assert!(data.as_gray8().is_none());
        assert!(data.as_rgb24().is_none());
        assert_eq!(PixelKind::Gray16.to_string(), "16-bit unsigned grayscale");
    }
}
