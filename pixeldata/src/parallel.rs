//! Work partitioning for sample normalization and row rendering.
//!
//! Pixel data values never own threads.
//! Instead, the operations which benefit from parallelism
//! receive a [`Parallelism`] value saying where the work should run.

#[cfg(feature = "rayon")]
use rayon::prelude::*;
#[cfg(feature = "rayon")]
use std::sync::Arc;

/// Where per-sample and per-row work is executed.
///
/// The default is [`Global`](Parallelism::Global)
/// when the `rayon` feature is enabled,
/// and [`Sequential`](Parallelism::Sequential) otherwise.
#[derive(Debug, Clone)]
pub enum Parallelism {
    /// Run everything on the calling thread, in order.
    Sequential,
    /// Fork-join on Rayon's global thread pool.
    #[cfg(feature = "rayon")]
    Global,
    /// Fork-join on the given thread pool.
    #[cfg(feature = "rayon")]
    Pool(Arc<rayon::ThreadPool>),
}

impl Default for Parallelism {
    fn default() -> Self {
        #[cfg(feature = "rayon")]
        {
            Parallelism::Global
        }
        #[cfg(not(feature = "rayon"))]
        {
            Parallelism::Sequential
        }
    }
}

#[cfg(feature = "rayon")]
impl From<rayon::ThreadPool> for Parallelism {
    fn from(pool: rayon::ThreadPool) -> Self {
        Parallelism::Pool(Arc::new(pool))
    }
}

impl Parallelism {
    /// Whether work may run on more than one thread.
    pub fn is_parallel(&self) -> bool {
        !matches!(self, Parallelism::Sequential)
    }

    /// Map each `chunk_size`-byte chunk of `bytes` to a value,
    /// collecting the results in chunk order.
    /// Trailing bytes which do not fill a chunk are ignored.
    pub(crate) fn map_chunks<T, F>(&self, bytes: &[u8], chunk_size: usize, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(&[u8]) -> T + Sync + Send,
    {
        match self {
            Parallelism::Sequential => bytes.chunks_exact(chunk_size).map(f).collect(),
            #[cfg(feature = "rayon")]
            Parallelism::Global => bytes.par_chunks_exact(chunk_size).map(f).collect(),
            #[cfg(feature = "rayon")]
            Parallelism::Pool(pool) => {
                pool.install(|| bytes.par_chunks_exact(chunk_size).map(f).collect())
            }
        }
    }

    /// Call `f` once for each row of `output`,
    /// with the row index and the mutable row slice.
    /// Rows never overlap, so no synchronization is needed inside `f`.
    pub(crate) fn for_each_row<T, F>(&self, output: &mut [T], width: usize, f: F)
    where
        T: Send,
        F: Fn(usize, &mut [T]) + Sync + Send,
    {
        if width == 0 {
            return;
        }
        match self {
            Parallelism::Sequential => output
                .chunks_mut(width)
                .enumerate()
                .for_each(|(y, row)| f(y, row)),
            #[cfg(feature = "rayon")]
            Parallelism::Global => output
                .par_chunks_mut(width)
                .enumerate()
                .for_each(|(y, row)| f(y, row)),
            #[cfg(feature = "rayon")]
            Parallelism::Pool(pool) => pool.install(|| {
                output
                    .par_chunks_mut(width)
                    .enumerate()
                    .for_each(|(y, row)| f(y, row))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strategies() -> Vec<Parallelism> {
        #[allow(unused_mut)]
        let mut out = vec![Parallelism::Sequential];
        #[cfg(feature = "rayon")]
        {
            out.push(Parallelism::Global);
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(3)
                .build()
                .unwrap();
            out.push(Parallelism::from(pool));
        }
        out
    }

    #[test]
    fn map_chunks_keeps_order() {
        let bytes: Vec<u8> = (0..=200).collect();
        for par in strategies() {
            let sums: Vec<u16> = par.map_chunks(&bytes, 2, |c| c[0] as u16 + c[1] as u16);
            assert_eq!(sums.len(), 100, "{:?}", par);
            assert_eq!(sums[0], 1);
            assert_eq!(sums[99], 198 + 199);
        }
    }

    #[test]
    fn rows_are_visited_once() {
        for par in strategies() {
            let mut out = vec![0_i32; 7 * 5];
            par.for_each_row(&mut out, 7, |y, row| {
                for (x, v) in row.iter_mut().enumerate() {
                    *v += (y * 7 + x) as i32;
                }
            });
            let expected: Vec<i32> = (0..35).collect();
            assert_eq!(out, expected, "{:?}", par);
        }
    }

    #[test]
    fn empty_rows_are_fine() {
        let mut out: Vec<i32> = vec![];
        Parallelism::default().for_each_row(&mut out, 0, |_, _| unreachable!());
        Parallelism::Sequential.for_each_row(&mut out, 4, |_, _| unreachable!());
    }
}
