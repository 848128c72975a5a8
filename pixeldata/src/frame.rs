//! Access to the native bytes of individual frames.

use snafu::ensure;
use std::borrow::Cow;

use crate::attribute::FrameInfo;
use crate::{FrameOutOfRangeSnafu, InsufficientPixelDataSnafu, Result};

/// A provider of native (uncompressed) frame buffers.
///
/// This is the boundary with the component which parses the DICOM data set
/// and decodes encapsulated pixel data.
pub trait FrameSource {
    /// The layout shared by every frame.
    fn frame_info(&self) -> &FrameInfo;

    /// The number of frames available.
    fn number_of_frames(&self) -> u32;

    /// The native bytes of the frame at `frame` (0-based).
    fn frame_data(&self, frame: u32) -> Result<Cow<'_, [u8]>>;
}

/// A native pixel data buffer holding one or more contiguous frames.
#[derive(Debug, Clone, PartialEq)]
pub struct NativePixelData<'a> {
    info: FrameInfo,
    number_of_frames: u32,
    data: Cow<'a, [u8]>,
}

impl<'a> NativePixelData<'a> {
    pub fn new(info: FrameInfo, number_of_frames: u32, data: impl Into<Cow<'a, [u8]>>) -> Self {
        NativePixelData {
            info,
            number_of_frames,
            data: data.into(),
        }
    }

    /// The whole pixel data buffer.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl FrameSource for NativePixelData<'_> {
    fn frame_info(&self) -> &FrameInfo {
        &self.info
    }

    fn number_of_frames(&self) -> u32 {
        self.number_of_frames
    }

    fn frame_data(&self, frame: u32) -> Result<Cow<'_, [u8]>> {
        ensure!(
            frame < self.number_of_frames,
            FrameOutOfRangeSnafu {
                frame,
                number_of_frames: self.number_of_frames,
            }
        );

        if self.info.bit_depth.bits_allocated == 1 {
            // frames of bit-packed data are not necessarily byte aligned
            let bits = self.info.pixel_count() * self.info.samples_per_pixel as usize;
            return bit_frame(&self.data, frame as usize * bits, bits);
        }

        let size = self.info.frame_size();
        let start = frame as usize * size;
        let end = start + size;
        ensure!(
            end <= self.data.len(),
            InsufficientPixelDataSnafu {
                expected: end,
                got: self.data.len(),
            }
        );
        Ok(Cow::Borrowed(&self.data[start..end]))
    }
}

/// Extract `bits` bits starting at bit offset `start_bit`,
/// realigning them to the start of a new buffer when needed.
fn bit_frame(data: &[u8], start_bit: usize, bits: usize) -> Result<Cow<'_, [u8]>> {
    let len = (bits + 7) / 8;
    let end_byte = (start_bit + bits + 7) / 8;
    ensure!(
        end_byte <= data.len(),
        InsufficientPixelDataSnafu {
            expected: end_byte,
            got: data.len(),
        }
    );
    let first = start_bit / 8;
    let shift = start_bit % 8;
    if shift == 0 {
        return Ok(Cow::Borrowed(&data[first..first + len]));
    }
    let out = (0..len)
        .map(|j| {
            let lo = data[first + j] >> shift;
            let hi = data.get(first + j + 1).map_or(0, |b| b << (8 - shift));
            lo | hi
        })
        .collect();
    Ok(Cow::Owned(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::{BitDepth, PixelRepresentation};

    #[test]
    fn frames_are_contiguous() {
        let info = FrameInfo::monochrome(2, 1, BitDepth::full(16), PixelRepresentation::Unsigned);
        let data: Vec<u8> = (0..12).collect();
        let source = NativePixelData::new(info, 3, data);
        assert_eq!(source.number_of_frames(), 3);
        assert_eq!(&*source.frame_data(0).unwrap(), &[0, 1, 2, 3]);
        assert_eq!(&*source.frame_data(2).unwrap(), &[8, 9, 10, 11]);
        assert!(matches!(
            source.frame_data(3),
            Err(crate::Error::FrameOutOfRange {
                frame: 3,
                number_of_frames: 3
            })
        ));
    }

    #[test]
    fn truncated_buffer() {
        let info = FrameInfo::monochrome(2, 2, BitDepth::full(8), PixelRepresentation::Unsigned);
        let data = [0_u8; 6];
        let source = NativePixelData::new(info, 2, &data[..]);
        assert!(source.frame_data(0).is_ok());
        assert!(matches!(
            source.frame_data(1),
            Err(crate::Error::InsufficientPixelData {
                expected: 8,
                got: 6
            })
        ));
    }

    #[test]
    fn unaligned_bit_frames() {
        // 3x1 frames, 1 bit per pixel: frame 0 = bits 0..3, frame 1 = bits 3..6
        let info = FrameInfo::monochrome(3, 1, BitDepth::full(1), PixelRepresentation::Unsigned);
        let data = [0b0010_1101_u8];
        let source = NativePixelData::new(info, 2, &data[..]);
        assert_eq!(&*source.frame_data(0).unwrap(), &[0b0010_1101]);
        assert_eq!(&*source.frame_data(1).unwrap(), &[0b0000_0101]);
    }
}
