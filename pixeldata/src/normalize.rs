//! Sample decoding and bit depth normalization.
//!
//! Native pixel data samples occupy _Bits Allocated_ bits,
//! of which only _Bits Stored_ are meaningful.
//! The remaining bits may hold anything (including overlay planes in old files),
//! so every sample is masked down to the stored bits once, right after decoding.
//! Signed samples are additionally sign extended from the _High Bit_.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use num_traits::PrimInt;
use std::fmt::Debug;

use crate::attribute::{BitDepth, Endianness};
use crate::parallel::Parallelism;

/// A native integer sample type of a grayscale frame.
///
/// Implemented for the five storage widths:
/// `u8`, `u16`, `i16`, `u32` and `i32`.
/// The [`image::Primitive`] bound lets samples go through the resampler.
pub trait Sample: PrimInt + image::Primitive + Debug + Default + Send + Sync + 'static {
    /// number of bits of the storage type
    const WIDTH: u32;
    /// whether the storage type is signed
    const SIGNED: bool;
    /// number of bytes of the storage type
    const SIZE: usize;

    /// Read one sample from the start of `bytes`.
    ///
    /// # Panics
    ///
    /// Panics if `bytes` is shorter than [`SIZE`](Sample::SIZE).
    fn read(bytes: &[u8], endianness: Endianness) -> Self;

    /// The sample value as a 64-bit signed integer.
    fn widen(self) -> i64;

    /// Truncate a 64-bit integer to the storage type.
    fn from_bits(bits: i64) -> Self;
}

macro_rules! impl_sample {
    ($t:ty, $signed:expr, $read_le:expr, $read_be:expr) => {
        impl Sample for $t {
            const WIDTH: u32 = <$t>::BITS;
            const SIGNED: bool = $signed;
            const SIZE: usize = std::mem::size_of::<$t>();

            #[inline]
            fn read(bytes: &[u8], endianness: Endianness) -> Self {
                match endianness {
                    Endianness::Little => $read_le(bytes),
                    Endianness::Big => $read_be(bytes),
                }
            }

            #[inline]
            fn widen(self) -> i64 {
                self as i64
            }

            #[inline]
            fn from_bits(bits: i64) -> Self {
                bits as $t
            }
        }
    };
}

impl_sample!(u8, false, |b: &[u8]| b[0], |b: &[u8]| b[0]);
impl_sample!(u16, false, LittleEndian::read_u16, BigEndian::read_u16);
impl_sample!(i16, true, LittleEndian::read_i16, BigEndian::read_i16);
impl_sample!(u32, false, LittleEndian::read_u32, BigEndian::read_u32);
impl_sample!(i32, true, LittleEndian::read_i32, BigEndian::read_i32);

/// Precomputed masking parameters for one bit depth and sample type.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct Normalizer {
    mask: i64,
    /// set for signed sample types only
    sign_bit: Option<i64>,
}

impl Normalizer {
    /// Prepare the normalization of samples of type `T`.
    /// Returns `None` when all bits of the storage type are stored,
    /// in which case samples are kept as they are.
    pub(crate) fn new<T: Sample>(depth: &BitDepth) -> Option<Self> {
        let stored = u32::from(depth.bits_stored);
        if stored >= T::WIDTH {
            return None;
        }
        let mask = (1_i64 << stored) - 1;
        let sign_bit = if T::SIGNED {
            Some(1_i64 << depth.high_bit.min(62))
        } else {
            None
        };
        Some(Normalizer { mask, sign_bit })
    }

    #[inline]
    pub(crate) fn apply<T: Sample>(&self, sample: T) -> T {
        let v = sample.widen();
        let out = match self.sign_bit {
            Some(sign_bit) if v & sign_bit != 0 => -(((!v) & self.mask) + 1),
            _ => v & self.mask,
        };
        T::from_bits(out)
    }
}

/// Normalize a single sample to the given bit depth.
///
/// Unsigned samples are masked to the stored bits.
/// Signed samples whose high bit is set
/// are reconstructed as negative two's complement values.
/// Samples of a type no wider than _Bits Stored_ are returned unchanged.
///
/// ```
/// # use dicom_pixelrender::{normalize, BitDepth};
/// let depth = BitDepth::new(16, 12);
/// assert_eq!(normalize(0x0FFF_i16, &depth), -1);
/// assert_eq!(normalize(0x07FF_i16, &depth), 2047);
/// assert_eq!(normalize(0xF123_u16, &depth), 0x0123);
/// ```
pub fn normalize<T: Sample>(sample: T, depth: &BitDepth) -> T {
    match Normalizer::new::<T>(depth) {
        Some(normalizer) => normalizer.apply(sample),
        None => sample,
    }
}

/// Decode all complete samples of `bytes` and normalize them.
///
/// Decoding and normalization happen in the same pass,
/// so the returned buffer is never observed in a partially normalized state.
pub(crate) fn decode_samples<T: Sample>(
    bytes: &[u8],
    depth: &BitDepth,
    endianness: Endianness,
    parallelism: &Parallelism,
) -> Vec<T> {
    match Normalizer::new::<T>(depth) {
        Some(normalizer) => parallelism.map_chunks(bytes, T::SIZE, move |chunk| {
            normalizer.apply(T::read(chunk, endianness))
        }),
        None => {
            tracing::trace!(
                bits_stored = depth.bits_stored,
                width = T::WIDTH,
                "all sample bits are stored, skipping normalization"
            );
            parallelism.map_chunks(bytes, T::SIZE, move |chunk| T::read(chunk, endianness))
        }
    }
}
