//! Selection of the pixel data representation for a frame.

use snafu::ensure;

use crate::attribute::{FrameInfo, PlanarConfiguration};
use crate::color::ColorPixels;
use crate::frame::FrameSource;
use crate::gray::GrayPixels;
use crate::overlay::{unpack_bits, Overlay};
use crate::parallel::Parallelism;
use crate::{
    InvalidSamplesPerPixelSnafu, PixelData, Result,
    UnsupportedBitsAllocatedSnafu, UnsupportedColorBitsAllocatedSnafu,
    UnsupportedPhotometricInterpretationSnafu,
};

/// Decode a native frame into the pixel data representation
/// fitting its photometric interpretation and bit depth,
/// using the default [`Parallelism`].
///
/// - MONOCHROME1, MONOCHROME2 and PALETTE COLOR frames
///   become grayscale pixel data of 8, 16 or 32 bits,
///   signed or unsigned according to the pixel representation
///   (8-bit frames are always unsigned).
/// - RGB and YBR_FULL frames with 8 bits allocated
///   become 24-bit color pixel data,
///   reordered to interleaved samples if stored plane by plane.
///
/// Every other combination is rejected.
pub fn select_for_frame(info: &FrameInfo, frame: &[u8]) -> Result<PixelData> {
    select_for_frame_with(info, frame, &Parallelism::default())
}

/// Decode a native frame into the fitting pixel data representation,
/// normalizing samples with the given [`Parallelism`].
///
/// See [`select_for_frame`] for the selection rules.
pub fn select_for_frame_with(
    info: &FrameInfo,
    frame: &[u8],
    parallelism: &Parallelism,
) -> Result<PixelData> {
    let pi = &info.photometric_interpretation;
    let bits_allocated = info.bit_depth.bits_allocated;
    let (width, height) = (info.columns, info.rows);

    let data = if pi.is_grayscale_family() {
        ensure!(
            info.samples_per_pixel == 1,
            InvalidSamplesPerPixelSnafu {
                samples_per_pixel: info.samples_per_pixel,
                pi: pi.clone(),
            }
        );
        ensure!(
            (1..=32).contains(&bits_allocated),
            UnsupportedBitsAllocatedSnafu { bits_allocated }
        );
        info.bit_depth.validate()?;

        let depth = &info.bit_depth;
        let endianness = info.endianness;
        let signed = info.pixel_representation.is_signed();
        match bits_allocated {
            1 => PixelData::Gray8(GrayPixels::new(
                width,
                height,
                unpack_bits(frame, info.pixel_count())?,
            )?),
            2..=8 => PixelData::Gray8(GrayPixels::decode(
                width,
                height,
                frame,
                depth,
                endianness,
                parallelism,
            )?),
            9..=16 if signed => PixelData::GraySigned16(GrayPixels::decode(
                width,
                height,
                frame,
                depth,
                endianness,
                parallelism,
            )?),
            9..=16 => PixelData::Gray16(GrayPixels::decode(
                width,
                height,
                frame,
                depth,
                endianness,
                parallelism,
            )?),
            _ if signed => PixelData::GraySigned32(GrayPixels::decode(
                width,
                height,
                frame,
                depth,
                endianness,
                parallelism,
            )?),
            _ => PixelData::Gray32(GrayPixels::decode(
                width,
                height,
                frame,
                depth,
                endianness,
                parallelism,
            )?),
        }
    } else if pi.is_color_family() {
        ensure!(
            info.samples_per_pixel == 3,
            InvalidSamplesPerPixelSnafu {
                samples_per_pixel: info.samples_per_pixel,
                pi: pi.clone(),
            }
        );
        ensure!(
            bits_allocated == 8,
            UnsupportedColorBitsAllocatedSnafu { bits_allocated }
        );
        match info.planar_configuration {
            PlanarConfiguration::Standard => {
                PixelData::Rgb24(ColorPixels::from_interleaved(width, height, frame)?)
            }
            PlanarConfiguration::PixelFirst => {
                PixelData::Rgb24(ColorPixels::from_planar(width, height, frame)?)
            }
        }
    } else {
        return UnsupportedPhotometricInterpretationSnafu { pi: pi.clone() }.fail();
    };

    tracing::debug!(
        kind = %data.kind(),
        width,
        height,
        photometric_interpretation = %pi,
        "selected pixel data representation"
    );
    Ok(data)
}

/// Read frame number `frame` from a frame source
/// and decode it with [`select_for_frame`].
pub fn select_frame<S>(source: &S, frame: u32) -> Result<PixelData>
where
    S: FrameSource + ?Sized,
{
    let data = source.frame_data(frame)?;
    select_for_frame(source.frame_info(), &data)
}

/// Expand a bit-packed overlay plane into overlay pixel data.
pub fn select_for_overlay(overlay: &Overlay<'_>) -> Result<PixelData> {
    let pixels = overlay.expand()?;
    tracing::debug!(
        width = overlay.columns,
        height = overlay.rows,
        "expanded overlay plane"
    );
    Ok(PixelData::Overlay(pixels))
}
