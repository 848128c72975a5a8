//! Resolution changes, delegated to the `image` crate's resampler
//! except for 32-bit samples, which are filtered in `f64`.

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Luma, Rgb};
use snafu::{ensure, OptionExt};

use crate::normalize::Sample;
use crate::{InvalidRescaleFactorSnafu, ResampleSnafu, Result};

/// Bilinear interpolation
const FILTER: FilterType = FilterType::Triangle;

/// Compute the dimensions of a frame scaled by `factor`,
/// truncating towards zero.
///
/// Fails if the factor is not a positive finite number,
/// or if either dimension would become zero.
pub fn scaled_dimensions(width: u32, height: u32, factor: f64) -> Result<(u32, u32)> {
    ensure!(
        factor.is_finite() && factor > 0.,
        InvalidRescaleFactorSnafu { factor }
    );
    let new_width = (width as f64 * factor).floor();
    let new_height = (height as f64 * factor).floor();
    ensure!(
        new_width >= 1.
            && new_height >= 1.
            && new_width <= u32::MAX as f64
            && new_height <= u32::MAX as f64,
        InvalidRescaleFactorSnafu { factor }
    );
    Ok((new_width as u32, new_height as u32))
}

/// Resample single sample pixels with a bilinear filter.
///
/// 8 and 16-bit samples go through the `image` resampler,
/// which accumulates in `f32`: exact for every value of those types.
/// 32-bit samples do not fit in an `f32` mantissa
/// (`i32::MAX` and `u32::MAX` round up out of range),
/// so they are filtered in `f64` instead,
/// where every `i32` and `u32` value is exact.
/// Results are rounded to the nearest integer
/// and clamped to the range of the sample type.
pub(crate) fn resize_gray<T: Sample>(
    samples: &[T],
    width: u32,
    height: u32,
    new_width: u32,
    new_height: u32,
) -> Result<Vec<T>> {
    if T::WIDTH > 16 {
        ensure!(
            samples.len() == width as usize * height as usize,
            ResampleSnafu { width, height }
        );
        return Ok(resize_wide(samples, width, height, new_width, new_height));
    }
    let src: ImageBuffer<Luma<T>, &[T]> =
        ImageBuffer::from_raw(width, height, samples).context(ResampleSnafu { width, height })?;
    Ok(imageops::resize(&src, new_width, new_height, FILTER).into_raw())
}

/// Triangle filter weights along one axis:
/// for each output coordinate,
/// the first contributing input coordinate and the normalized weights.
///
/// Laid out as in `image::imageops::resize`,
/// so both paths sample the same input pixels.
fn triangle_weights(src: u32, dst: u32) -> Vec<(usize, Vec<f64>)> {
    let ratio = f64::from(src) / f64::from(dst);
    // widen the kernel when downscaling
    let sratio = ratio.max(1.);
    let last = i64::from(src) - 1;
    (0..dst)
        .map(|out| {
            let center = (f64::from(out) + 0.5) * ratio;
            let left = ((center - sratio).floor() as i64).clamp(0, last);
            let right = ((center + sratio).ceil() as i64).clamp(left + 1, last + 1);
            let center = center - 0.5;
            let mut weights: Vec<f64> = (left..right)
                .map(|i| (1. - ((i as f64 - center) / sratio).abs()).max(0.))
                .collect();
            let sum: f64 = weights.iter().sum();
            if sum > 0. {
                weights.iter_mut().for_each(|w| *w /= sum);
            }
            (left as usize, weights)
        })
        .collect()
}

fn resize_wide<T: Sample>(
    samples: &[T],
    width: u32,
    height: u32,
    new_width: u32,
    new_height: u32,
) -> Vec<T> {
    let (w, h, nw, nh) = (
        width as usize,
        height as usize,
        new_width as usize,
        new_height as usize,
    );
    if w == 0 || h == 0 {
        return vec![T::zero(); nw * nh];
    }

    let columns = triangle_weights(width, new_width);
    let mut horizontal = Vec::with_capacity(nw * h);
    for row in samples.chunks_exact(w) {
        horizontal.extend(columns.iter().map(|(left, weights)| {
            weights
                .iter()
                .zip(&row[*left..])
                .map(|(wt, v)| wt * v.widen() as f64)
                .sum::<f64>()
        }));
    }

    let lo = T::min_value().widen() as f64;
    let hi = T::max_value().widen() as f64;
    let rows = triangle_weights(height, new_height);
    let mut out = Vec::with_capacity(nw * nh);
    for (top, weights) in &rows {
        out.extend((0..nw).map(|x| {
            let v: f64 = weights
                .iter()
                .enumerate()
                .map(|(k, wt)| wt * horizontal[(top + k) * nw + x])
                .sum();
            T::from_bits(v.round().clamp(lo, hi) as i64)
        }));
    }
    out
}

pub(crate) fn resize_rgb(
    samples: &[u8],
    width: u32,
    height: u32,
    new_width: u32,
    new_height: u32,
) -> Result<Vec<u8>> {
    let src: ImageBuffer<Rgb<u8>, &[u8]> =
        ImageBuffer::from_raw(width, height, samples).context(ResampleSnafu { width, height })?;
    Ok(imageops::resize(&src, new_width, new_height, FILTER).into_raw())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(10, 7, 0.5, (5, 3))]
    #[case(10, 7, 2.0, (20, 14))]
    #[case(3, 3, 0.7, (2, 2))]
    #[case(512, 512, 0.999, (511, 511))]
    fn dimensions_are_truncated(
        #[case] width: u32,
        #[case] height: u32,
        #[case] factor: f64,
        #[case] expected: (u32, u32),
    ) {
        assert_eq!(scaled_dimensions(width, height, factor).unwrap(), expected);
    }

    #[rstest]
    #[case(0.)]
    #[case(-1.)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    #[case(0.01)]
    fn bad_factors(#[case] factor: f64) {
        assert!(matches!(
            scaled_dimensions(10, 10, factor),
            Err(crate::Error::InvalidRescaleFactor { .. })
        ));
    }

    #[test]
    fn wide_samples_keep_extremes() {
        for v in [i32::MIN, -1, 0, 123_456_789, i32::MAX] {
            let out = resize_gray(&[v; 6], 3, 2, 7, 5).unwrap();
            assert_eq!(out, vec![v; 35]);
            let out = resize_gray(&[v; 16], 4, 4, 1, 2).unwrap();
            assert_eq!(out, vec![v; 2]);
        }
        for v in [0, 1, 0x00FF_FFFF, u32::MAX] {
            let out = resize_gray(&[v; 4], 2, 2, 1, 1).unwrap();
            assert_eq!(out, vec![v]);
        }
    }

    #[test]
    fn wide_samples_interpolate() {
        // one row ramp, upscaled: output stays within the input range
        // and keeps its order
        let src = [0_i32, 1_000_000, 2_000_000, 3_000_000];
        let out = resize_gray(&src, 4, 1, 8, 1).unwrap();
        assert_eq!(out.len(), 8);
        assert_eq!(out[0], 0);
        assert_eq!(out[7], 3_000_000);
        assert!(out.windows(2).all(|p| p[0] <= p[1]));

        // same pixels as the 16-bit path
        let narrow: Vec<u16> = vec![0, 100, 200, 300];
        let wide: Vec<u32> = narrow.iter().map(|&v| u32::from(v)).collect();
        let a = resize_gray(&narrow, 2, 2, 3, 3).unwrap();
        let b = resize_gray(&wide, 2, 2, 3, 3).unwrap();
        let a: Vec<u32> = a.into_iter().map(u32::from).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn resize_rejects_short_buffers() {
        assert!(matches!(
            resize_gray(&[0_u16; 3], 2, 2, 1, 1),
            Err(crate::Error::Resample {
                width: 2,
                height: 2
            })
        ));
        assert!(matches!(
            resize_gray(&[0_i32; 3], 2, 2, 1, 1),
            Err(crate::Error::Resample { .. })
        ));
    }
}
