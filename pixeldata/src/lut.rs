//! Look-up table (LUT) capability consumed by the renderer.
//!
//! The renderer does not know how a table was built
//! (modality rescale, window level, presentation LUT, palette...).
//! It only needs to map a normalized sample value to a display value,
//! which is what the [`LookupTable`] trait expresses.
//!
//! A plain dense table type, [`Lut`], is provided,
//! along with implementations for slices and closures.

#[cfg(feature = "rayon")]
use rayon::iter::{IntoParallelIterator, ParallelIterator};

/// A mapping from normalized sample values to display values.
///
/// Implementations must behave as pure functions,
/// since they may be called concurrently from several rows at once.
pub trait LookupTable: Sync {
    /// Map a sample value to its display value.
    fn lookup(&self, value: i64) -> i32;
}

impl<L: LookupTable + ?Sized> LookupTable for &L {
    #[inline]
    fn lookup(&self, value: i64) -> i32 {
        (**self).lookup(value)
    }
}

/// Slices are indexed directly by the sample value.
///
/// # Panics
///
/// Panics if the value is negative or not lower than the slice length.
impl LookupTable for [i32] {
    #[inline]
    fn lookup(&self, value: i64) -> i32 {
        assert!(
            value >= 0 && (value as u64) < self.len() as u64,
            "sample value {} out of LUT range 0..{}",
            value,
            self.len()
        );
        self[value as usize]
    }
}

impl LookupTable for Vec<i32> {
    #[inline]
    fn lookup(&self, value: i64) -> i32 {
        self.as_slice().lookup(value)
    }
}

/// Wrapper turning a function into a lookup table.
///
/// ```
/// # use dicom_pixelrender::{FnLut, LookupTable};
/// let invert = FnLut(|v: i64| 255 - v as i32);
/// assert_eq!(invert.lookup(0), 255);
/// ```
#[derive(Debug, Copy, Clone)]
pub struct FnLut<F>(pub F);

impl<F> LookupTable for FnLut<F>
where
    F: Fn(i64) -> i32 + Sync,
{
    #[inline]
    fn lookup(&self, value: i64) -> i32 {
        (self.0)(value)
    }
}

/// A dense look up table covering every value
/// representable with a given number of stored bits.
///
/// For unsigned samples the table is indexed directly by the sample value.
/// For signed samples, negative values wrap around to the upper half of the table,
/// so that entry `2^bits_stored - 1` holds the output for `-1`.
///
/// # Example
///
/// ```
/// # use dicom_pixelrender::{Lut, LookupTable};
/// // 10-bit signed input, doubled
/// let lut = Lut::new_with_fn(10, true, |x| (x * 2) as i32);
/// assert_eq!(lut.lookup(-1), -2);
/// assert_eq!(lut.lookup(511), 1022);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Lut {
    /// the table which maps an index to a transformed value,
    /// of size 2 to the power of `bits_stored`
    table: Vec<i32>,
    /// whether the input sample values are signed (Pixel Representation = 1)
    signed: bool,
}

impl Lut {
    /// Create a new LUT with the given characteristics
    /// and populate it with the outputs of the provided function.
    /// The function may be called concurrently.
    ///
    /// - `bits_stored`:
    ///   the number of bits effectively used to represent the sample values
    ///   (the _Bits Stored_ DICOM attribute)
    /// - `signed`:
    ///   whether the input sample values are expected to be signed
    ///   (_Pixel Representation_ = 1)
    /// - `f`: the mapping function, receiving the sample value
    ///
    /// # Panics
    ///
    /// Panics if `bits_stored` is 0 or larger than 24.
    pub fn new_with_fn(bits_stored: u16, signed: bool, f: impl Fn(i64) -> i32 + Sync) -> Self {
        assert!(bits_stored != 0 && bits_stored <= 24);
        let size = 1_usize << bits_stored;

        #[cfg(feature = "rayon")]
        let iter = (0..size).into_par_iter();
        #[cfg(not(feature = "rayon"))]
        let iter = 0..size;

        let table = iter
            .map(|i| {
                // account for signedness to determine input pixel value
                let x = if signed && i >= size / 2 {
                    i as i64 - size as i64
                } else {
                    i as i64
                };
                f(x)
            })
            .collect();
        Lut { table, signed }
    }

    /// Create a LUT from an existing table.
    /// The table length must be a power of two if `signed` is true.
    pub fn from_table(table: Vec<i32>, signed: bool) -> Self {
        debug_assert!(!signed || table.len().is_power_of_two());
        Lut { table, signed }
    }

    /// Whether the table expects signed sample values.
    pub fn is_signed(&self) -> bool {
        self.signed
    }

    /// The table entries.
    pub fn table(&self) -> &[i32] {
        &self.table
    }
}

impl LookupTable for Lut {
    /// # Panics
    ///
    /// Panics if an unsigned sample value is out of the table's range.
    #[inline]
    fn lookup(&self, value: i64) -> i32 {
        if self.signed {
            // adjust for signedness by masking out the extra sign bits
            let mask = self.table.len() - 1;
            self.table[value as usize & mask]
        } else {
            self.table.as_slice().lookup(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lut_signed_numbers() {
        // 10-bit precision input, signed output
        let lut = Lut::new_with_fn(10, true, |v| 2 * v as i32 - 1024);

        assert_eq!(lut.lookup(0), -1024);
        assert_eq!(lut.lookup(1), -1022);
        assert_eq!(lut.lookup(-1), -1026);
        assert_eq!(lut.lookup(-2), -1028);
        assert_eq!(lut.lookup(500), -24);
        assert_eq!(lut.table().len(), 1024);
    }

    #[test]
    fn lut_unsigned_numbers() {
        let lut = Lut::new_with_fn(8, false, |v| 255 - v as i32);
        assert!(!lut.is_signed());
        assert_eq!(lut.lookup(0), 255);
        assert_eq!(lut.lookup(255), 0);
    }

    #[test]
    #[should_panic]
    fn lut_unsigned_out_of_range() {
        let lut = Lut::new_with_fn(4, false, |v| v as i32);
        lut.lookup(16);
    }

    #[test]
    fn slices_and_functions() {
        let table = vec![10, 20, 30];
        assert_eq!(table.lookup(2), 30);
        assert_eq!(table.as_slice().lookup(0), 10);

        let f = FnLut(|v: i64| (v * 3) as i32);
        let by_ref: &dyn LookupTable = &f;
        assert_eq!(by_ref.lookup(7), 21);
    }
}
