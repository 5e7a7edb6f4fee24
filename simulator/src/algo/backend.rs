//! Array backends for the per-frame numeric work.
//!
//! Capturing a simulated frame spends most of its time on three element-wise
//! passes: squared magnitude of the far-field, nearest-neighbour resampling
//! onto camera pixels, and the exposure gain. An [`ArrayBackend`] performs
//! these passes. The serial and rayon-parallel implementations produce
//! identical results; which one a camera uses is fixed by its type parameter
//! and [`DefaultBackend`] is chosen by the `parallel` cargo feature.

use ndarray::{Array2, Zip};
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use rustfft::num_complex::Complex64;
use std::fmt;
use std::sync::Arc;

/// Element-wise array operations used by the far-field sampler.
pub trait ArrayBackend: Send + Sync {
    /// Short identifier for logging
    fn name(&self) -> &'static str;

    /// Squared magnitude of a complex field
    fn intensity(&self, field: &Array2<Complex64>) -> Array2<f64>;

    /// Order-0 (nearest neighbour) sampling of `data` at fractional indices.
    ///
    /// Output pixel `p` takes `data[round(rows[p]), round(cols[p])]`. Indices
    /// that fall outside `data` (or are NaN) produce `0.0`.
    ///
    /// # Panics
    /// Panics if `rows` and `cols` have different shapes.
    fn sample_nearest(
        &self,
        data: &Array2<f64>,
        rows: &Array2<f64>,
        cols: &Array2<f64>,
    ) -> Array2<f64>;

    /// Multiply every element by `gain`
    fn scale(&self, image: Array2<f64>, gain: f64) -> Array2<f64>;
}

#[inline]
fn nearest_or_zero(data: &Array2<f64>, row: f64, col: f64) -> f64 {
    let (n_rows, n_cols) = data.dim();
    let r = row.round();
    let c = col.round();
    // Written so that NaN coordinates also fall through to zero
    if r >= 0.0 && c >= 0.0 && r < n_rows as f64 && c < n_cols as f64 {
        data[[r as usize, c as usize]]
    } else {
        0.0
    }
}

/// Single-threaded backend built on `ndarray::Zip`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialBackend;

impl ArrayBackend for SerialBackend {
    fn name(&self) -> &'static str {
        "serial"
    }

    fn intensity(&self, field: &Array2<Complex64>) -> Array2<f64> {
        field.mapv(|v| v.norm_sqr())
    }

    fn sample_nearest(
        &self,
        data: &Array2<f64>,
        rows: &Array2<f64>,
        cols: &Array2<f64>,
    ) -> Array2<f64> {
        let mut out = Array2::zeros(rows.dim());
        Zip::from(&mut out)
            .and(rows)
            .and(cols)
            .for_each(|o, &r, &c| *o = nearest_or_zero(data, r, c));
        out
    }

    fn scale(&self, mut image: Array2<f64>, gain: f64) -> Array2<f64> {
        image.mapv_inplace(|v| v * gain);
        image
    }
}

/// Multi-threaded backend using rayon through ndarray's parallel `Zip`.
///
/// Runs on the global rayon pool unless a dedicated pool was requested with
/// [`ParallelBackend::with_threads`].
#[derive(Clone, Default)]
pub struct ParallelBackend {
    pool: Option<Arc<ThreadPool>>,
}

impl fmt::Debug for ParallelBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParallelBackend")
            .field("threads", &self.num_threads())
            .finish()
    }
}

impl ParallelBackend {
    /// Backend with a dedicated pool of `threads` workers
    pub fn with_threads(threads: usize) -> Result<Self, ThreadPoolBuildError> {
        let pool = ThreadPoolBuilder::new().num_threads(threads).build()?;
        Ok(Self {
            pool: Some(Arc::new(pool)),
        })
    }

    /// Number of worker threads the backend runs on
    pub fn num_threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}

impl ArrayBackend for ParallelBackend {
    fn name(&self) -> &'static str {
        "parallel"
    }

    fn intensity(&self, field: &Array2<Complex64>) -> Array2<f64> {
        self.install(|| {
            let mut out = Array2::zeros(field.dim());
            Zip::from(&mut out)
                .and(field)
                .par_for_each(|o, v| *o = v.norm_sqr());
            out
        })
    }

    fn sample_nearest(
        &self,
        data: &Array2<f64>,
        rows: &Array2<f64>,
        cols: &Array2<f64>,
    ) -> Array2<f64> {
        self.install(|| {
            let mut out = Array2::zeros(rows.dim());
            Zip::from(&mut out)
                .and(rows)
                .and(cols)
                .par_for_each(|o, &r, &c| *o = nearest_or_zero(data, r, c));
            out
        })
    }

    fn scale(&self, mut image: Array2<f64>, gain: f64) -> Array2<f64> {
        self.install(|| image.par_mapv_inplace(|v| v * gain));
        image
    }
}

/// Backend used when none is specified
#[cfg(feature = "parallel")]
pub type DefaultBackend = ParallelBackend;

/// Backend used when none is specified
#[cfg(not(feature = "parallel"))]
pub type DefaultBackend = SerialBackend;
