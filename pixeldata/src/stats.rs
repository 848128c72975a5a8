//! Sample value statistics.

/// The lowest and highest sample values of a frame.
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
pub struct MinMax<T = i64> {
    pub min: T,
    pub max: T,
}

impl<T> MinMax<T> {
    /// Convert both bounds with the given function.
    pub fn map<U>(self, f: impl Fn(T) -> U) -> MinMax<U> {
        MinMax {
            min: f(self.min),
            max: f(self.max),
        }
    }
}

/// Find the lowest and highest values in `samples`,
/// skipping every sample equal to `padding`.
///
/// Returns `None` when no sample is left to inspect
/// (empty input, or every sample is padding).
pub fn scan_min_max<T>(samples: &[T], padding: Option<T>) -> Option<MinMax<T>>
where
    T: Copy + Ord,
{
    let mut values = samples.iter().copied().filter(|v| Some(*v) != padding);
    let first = values.next()?;
    let mut out = MinMax {
        min: first,
        max: first,
    };
    for v in values {
        if v < out.min {
            out.min = v;
        }
        if v > out.max {
            out.max = v;
        }
    }
    Some(out)
}
