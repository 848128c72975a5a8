#![no_main]
use byteorder::ReadBytesExt;
use dicom_pixelrender::{
    select_for_frame_with, BitDepth, Endianness, FrameInfo, FnLut, Parallelism,
    PhotometricInterpretation, PixelRepresentation, PlanarConfiguration,
};
use libfuzzer_sys::fuzz_target;
use std::error::Error;

fuzz_target!(|data: &[u8]| {
    let _ = fuzz(data);
});

/// Obtain a frame description from the first bytes of the payload,
/// leaving the rest as the frame itself.
fn build_frame_info(reader: &mut &[u8]) -> Result<FrameInfo, Box<dyn Error>> {
    // keep frames small
    let rows = u32::from(reader.read_u8()?);
    let columns = u32::from(reader.read_u8()?);
    let flags = reader.read_u8()?;
    let bits_allocated = u16::from(reader.read_u8()?);
    let bits_stored = u16::from(reader.read_u8()?);
    let high_bit = u16::from(reader.read_u8()?);

    let (samples_per_pixel, pi) = match flags & 0b11 {
        0 => (1, PhotometricInterpretation::Monochrome2),
        1 => (1, PhotometricInterpretation::Monochrome1),
        2 => (3, PhotometricInterpretation::Rgb),
        _ => (3, PhotometricInterpretation::YbrFull),
    };
    let pixel_representation = if flags & 0b100 != 0 {
        PixelRepresentation::Signed
    } else {
        PixelRepresentation::Unsigned
    };
    let planar_configuration = if flags & 0b1000 != 0 {
        PlanarConfiguration::PixelFirst
    } else {
        PlanarConfiguration::Standard
    };
    let endianness = if flags & 0b1_0000 != 0 {
        Endianness::Big
    } else {
        Endianness::Little
    };

    Ok(FrameInfo {
        columns,
        rows,
        samples_per_pixel,
        bit_depth: BitDepth {
            bits_allocated,
            bits_stored,
            high_bit,
        },
        pixel_representation,
        photometric_interpretation: pi,
        planar_configuration,
        endianness,
    })
}

fn fuzz(data: &[u8]) -> Result<(), Box<dyn Error>> {
    let mut reader = data;
    let info = build_frame_info(&mut reader)?;
    let rescale = reader.read_u8()?;

    let pixels = select_for_frame_with(&info, reader, &Parallelism::Sequential)?;

    // errors are fine, panics are not
    let _ = pixels.min_max(Some(0));
    let _ = pixels.min_max(None);

    let mut out = vec![0; pixels.width() as usize * pixels.height() as usize];
    pixels.render_with(None, &mut out, &Parallelism::Sequential)?;
    let lut = FnLut(|v: i64| (v >> 4) as i32);
    pixels.render_with(Some(&lut), &mut out, &Parallelism::Sequential)?;

    let factor = f64::from(rescale) / 64.;
    if let Ok(scaled) = pixels.rescale(factor) {
        assert!(scaled.width() as f64 <= (pixels.width() as f64 * factor).floor());
    }
    Ok(())
}
