//! rayon or sequential execution, chosen by the `parallel` feature.
//!
//! Parallel code in this crate only uses `into_par_iter()` followed by
//! ordinary adaptor chains (`map`, `collect`). Without rayon, the shim
//! below turns `into_par_iter()` into `into_iter()`, so the same chain
//! runs on a plain `Iterator` and yields identical results.

#[cfg(feature = "parallel")]
pub use rayon::prelude::*;

#[cfg(not(feature = "parallel"))]
mod sequential {
    /// Sequential stand-in for `rayon::prelude::IntoParallelIterator`.
    pub trait IntoParallelIterator {
        type Iter: Iterator<Item = Self::Item>;
        type Item;
        fn into_par_iter(self) -> Self::Iter;
    }

    impl<I: IntoIterator> IntoParallelIterator for I {
        type Iter = I::IntoIter;
        type Item = I::Item;
        fn into_par_iter(self) -> Self::Iter {
            self.into_iter()
        }
    }
}

#[cfg(not(feature = "parallel"))]
pub use sequential::*;
