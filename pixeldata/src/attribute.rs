//! Key attributes describing how a frame's pixel data is laid out.
//!
//! These types mirror the DICOM image pixel module attributes
//! that the pixel data selector needs in order to pick a sample representation.
//! They are produced by whichever component parses the data set,
//! and consumed here as plain values.

use snafu::ensure;
use std::fmt;
use std::str::FromStr;

use crate::{InvalidBitDepthSnafu, Result};

/// An interpreted representation of the DICOM _Pixel Representation_ attribute.
#[derive(Debug, Copy, Clone, Default, Eq, Hash, PartialEq)]
pub enum PixelRepresentation {
    /// unsigned pixel data sample values
    #[default]
    Unsigned,
    /// signed pixel data sample values
    Signed,
}

impl PixelRepresentation {
    /// Interpret the raw attribute value,
    /// returning `None` if it is neither 0 nor 1.
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            0 => Some(PixelRepresentation::Unsigned),
            1 => Some(PixelRepresentation::Signed),
            _ => None,
        }
    }

    #[inline]
    pub fn is_signed(self) -> bool {
        self == PixelRepresentation::Signed
    }
}

/// An interpreted representation of the DICOM _Planar Configuration_ attribute.
#[derive(Debug, Copy, Clone, Default, Eq, Hash, PartialEq)]
pub enum PlanarConfiguration {
    /// color samples are interleaved per pixel (R1 G1 B1 R2 G2 B2 ...)
    #[default]
    Standard,
    /// color samples are stored one plane per channel (R1 R2 ... G1 G2 ... B1 B2 ...)
    PixelFirst,
}

impl PlanarConfiguration {
    /// Interpret the raw attribute value,
    /// returning `None` if it is neither 0 nor 1.
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            0 => Some(PlanarConfiguration::Standard),
            1 => Some(PlanarConfiguration::PixelFirst),
            _ => None,
        }
    }
}

/// Byte order of multi-byte samples in the native frame buffer.
#[derive(Debug, Copy, Clone, Default, Eq, Hash, PartialEq)]
pub enum Endianness {
    #[default]
    Little,
    /// only found in the retired Explicit VR Big Endian transfer syntax
    Big,
}

/// A DICOM _Photometric Interpretation_.
#[derive(Debug, Clone, Eq, Hash, PartialEq)]
pub enum PhotometricInterpretation {
    /// MONOCHROME1: minimum sample value is white
    Monochrome1,
    /// MONOCHROME2: minimum sample value is black
    Monochrome2,
    /// PALETTE COLOR: single sample used as an index into color palettes
    PaletteColor,
    /// RGB
    Rgb,
    /// YBR_FULL
    YbrFull,
    /// YBR_FULL_422
    YbrFull422,
    /// Any other interpretation, kept verbatim
    Other(String),
}

impl PhotometricInterpretation {
    /// Whether the frame holds a single sample per pixel
    /// which is rendered as a grayscale value or a palette index.
    pub fn is_grayscale_family(&self) -> bool {
        matches!(
            self,
            PhotometricInterpretation::Monochrome1
                | PhotometricInterpretation::Monochrome2
                | PhotometricInterpretation::PaletteColor
        )
    }

    /// Whether the frame holds three full resolution color samples per pixel.
    pub fn is_color_family(&self) -> bool {
        matches!(
            self,
            PhotometricInterpretation::Rgb | PhotometricInterpretation::YbrFull
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            PhotometricInterpretation::Monochrome1 => "MONOCHROME1",
            PhotometricInterpretation::Monochrome2 => "MONOCHROME2",
            PhotometricInterpretation::PaletteColor => "PALETTE COLOR",
            PhotometricInterpretation::Rgb => "RGB",
            PhotometricInterpretation::YbrFull => "YBR_FULL",
            PhotometricInterpretation::YbrFull422 => "YBR_FULL_422",
            PhotometricInterpretation::Other(s) => s,
        }
    }
}

impl FromStr for PhotometricInterpretation {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // attribute values of type CS may be padded with trailing spaces
        Ok(match s.trim() {
            "MONOCHROME1" => PhotometricInterpretation::Monochrome1,
            "MONOCHROME2" => PhotometricInterpretation::Monochrome2,
            "PALETTE COLOR" => PhotometricInterpretation::PaletteColor,
            "RGB" => PhotometricInterpretation::Rgb,
            "YBR_FULL" => PhotometricInterpretation::YbrFull,
            "YBR_FULL_422" => PhotometricInterpretation::YbrFull422,
            other => PhotometricInterpretation::Other(other.to_string()),
        })
    }
}

impl From<&str> for PhotometricInterpretation {
    fn from(s: &str) -> Self {
        match s.parse::<PhotometricInterpretation>() {
            Ok(pi) => pi,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for PhotometricInterpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the bits of a stored sample map to its logical value:
/// _Bits Allocated_, _Bits Stored_ and _High Bit_.
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
pub struct BitDepth {
    /// the number of bits reserved for each sample
    pub bits_allocated: u16,
    /// the number of bits effectively used by each sample
    pub bits_stored: u16,
    /// the index of the most significant bit of each sample
    pub high_bit: u16,
}

impl BitDepth {
    /// Create a bit depth descriptor with the usual high bit
    /// (`bits_stored - 1`).
    pub fn new(bits_allocated: u16, bits_stored: u16) -> Self {
        BitDepth {
            bits_allocated,
            bits_stored,
            high_bit: bits_stored.saturating_sub(1),
        }
    }

    /// Create a bit depth descriptor where all allocated bits are stored.
    pub fn full(bits_allocated: u16) -> Self {
        Self::new(bits_allocated, bits_allocated)
    }

    /// Check that the descriptor is internally consistent:
    /// `1 <= bits_stored <= bits_allocated` and `high_bit < bits_allocated`.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.bits_stored >= 1
                && self.bits_stored <= self.bits_allocated
                && self.high_bit < self.bits_allocated,
            InvalidBitDepthSnafu {
                bits_allocated: self.bits_allocated,
                bits_stored: self.bits_stored,
                high_bit: self.high_bit,
            }
        );
        Ok(())
    }
}

/// Everything needed to interpret one native frame of pixel data.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameInfo {
    /// _Columns_, the frame width
    pub columns: u32,
    /// _Rows_, the frame height
    pub rows: u32,
    pub samples_per_pixel: u16,
    pub bit_depth: BitDepth,
    pub pixel_representation: PixelRepresentation,
    pub photometric_interpretation: PhotometricInterpretation,
    pub planar_configuration: PlanarConfiguration,
    pub endianness: Endianness,
}

impl FrameInfo {
    /// Describe a single sample grayscale frame (MONOCHROME2).
    pub fn monochrome(
        columns: u32,
        rows: u32,
        bit_depth: BitDepth,
        pixel_representation: PixelRepresentation,
    ) -> Self {
        FrameInfo {
            columns,
            rows,
            samples_per_pixel: 1,
            bit_depth,
            pixel_representation,
            photometric_interpretation: PhotometricInterpretation::Monochrome2,
            planar_configuration: PlanarConfiguration::Standard,
            endianness: Endianness::Little,
        }
    }

    /// Describe an 8 bits per channel RGB frame.
    pub fn rgb(columns: u32, rows: u32, planar_configuration: PlanarConfiguration) -> Self {
        FrameInfo {
            columns,
            rows,
            samples_per_pixel: 3,
            bit_depth: BitDepth::full(8),
            pixel_representation: PixelRepresentation::Unsigned,
            photometric_interpretation: PhotometricInterpretation::Rgb,
            planar_configuration,
            endianness: Endianness::Little,
        }
    }

    /// Replace the photometric interpretation.
    pub fn with_photometric_interpretation(
        mut self,
        photometric_interpretation: impl Into<PhotometricInterpretation>,
    ) -> Self {
        self.photometric_interpretation = photometric_interpretation.into();
        self
    }

    /// Replace the sample byte order.
    pub fn with_endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = endianness;
        self
    }

    /// The number of pixels in one frame.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    /// The number of bytes used by each sample in the native buffer,
    /// following the bits allocated bracket (8, 16 or 32 bits).
    /// Bit-packed frames (bits allocated = 1) report 0.
    pub fn bytes_per_sample(&self) -> usize {
        match self.bit_depth.bits_allocated {
            1 => 0,
            2..=8 => 1,
            9..=16 => 2,
            _ => 4,
        }
    }

    /// The number of bytes one native frame occupies.
    pub fn frame_size(&self) -> usize {
        let samples = self.pixel_count() * self.samples_per_pixel as usize;
        if self.bit_depth.bits_allocated == 1 {
            (samples + 7) / 8
        } else {
            samples * self.bytes_per_sample()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn photometric_interpretation_from_padded_str() {
        assert_eq!(
            "MONOCHROME2 ".parse::<PhotometricInterpretation>().unwrap(),
            PhotometricInterpretation::Monochrome2
        );
        assert_eq!(
            PhotometricInterpretation::from("PALETTE COLOR"),
            PhotometricInterpretation::PaletteColor
        );
        let other = PhotometricInterpretation::from("HSV");
        assert_eq!(other, PhotometricInterpretation::Other("HSV".into()));
        assert_eq!(other.to_string(), "HSV");
        assert!(!other.is_grayscale_family());
        assert!(!other.is_color_family());
        assert!(!PhotometricInterpretation::YbrFull422.is_color_family());
    }

    #[test]
    fn bit_depth_validation() {
        assert!(BitDepth::new(16, 12).validate().is_ok());
        assert!(BitDepth::full(32).validate().is_ok());
        assert!(BitDepth::new(8, 12).validate().is_err());
        assert!(BitDepth::new(16, 0).validate().is_err());
        let odd = BitDepth {
            bits_allocated: 16,
            bits_stored: 12,
            high_bit: 16,
        };
        assert!(odd.validate().is_err());
    }

    #[test]
    fn frame_sizes() {
        let info = FrameInfo::monochrome(3, 2, BitDepth::new(16, 12), PixelRepresentation::Signed);
        assert_eq!(info.bytes_per_sample(), 2);
        assert_eq!(info.frame_size(), 12);

        let info = FrameInfo::rgb(4, 4, PlanarConfiguration::PixelFirst);
        assert_eq!(info.frame_size(), 48);

        let info = FrameInfo::monochrome(3, 3, BitDepth::full(1), PixelRepresentation::Unsigned);
        assert_eq!(info.frame_size(), 2);
    }

    #[test]
    fn raw_attribute_values() {
        assert_eq!(
            PixelRepresentation::from_u16(1),
            Some(PixelRepresentation::Signed)
        );
        assert_eq!(PixelRepresentation::from_u16(2), None);
        assert_eq!(
            PlanarConfiguration::from_u16(1),
            Some(PlanarConfiguration::PixelFirst)
        );
        assert_eq!(PlanarConfiguration::from_u16(7), None);
    }
}
