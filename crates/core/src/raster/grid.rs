//! Main Raster type

use crate::error::{Error, Result};
use crate::raster::{GridDims, RasterElement};
use ndarray::{Array2, ArrayView2};

/// A row-major 2D grid of cell values with an optional no-data sentinel.
///
/// Values live in one flat buffer addressed by the linear index
/// `row * cols + col`, which is the index space shared by the
/// hydrology algorithms and by flow networks.
///
/// # Type Parameters
///
/// - `T`: The cell value type, must implement [`RasterElement`]
///
/// # Example
///
/// ```
/// use topohydro_core::Raster;
///
/// let mut dem: Raster<f64> = Raster::from_vec(vec![0.0; 12], 3, 4)?;
/// dem.set(1, 2, 42.0)?;
/// assert_eq!(dem.get(1, 2)?, 42.0);
/// assert_eq!(dem.value(6), 42.0);
/// # Ok::<(), topohydro_core::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Raster<T: RasterElement> {
    /// Cell values in row-major order
    data: Vec<T>,
    dims: GridDims,
    /// No-data value
    nodata: Option<T>,
}

impl<T: RasterElement> Raster<T> {
    /// Create a new raster filled with zeros
    pub fn new(dims: GridDims) -> Self {
        Self::filled(dims, T::zero())
    }

    /// Create a new raster filled with a specific value
    pub fn filled(dims: GridDims, value: T) -> Self {
        Self {
            data: vec![value; dims.len()],
            dims,
            nodata: None,
        }
    }

    /// Create a raster from a flat row-major buffer
    pub fn from_vec(data: Vec<T>, rows: usize, cols: usize) -> Result<Self> {
        let dims = GridDims::for_buffer(data.len(), rows, cols)?;
        Ok(Self {
            data,
            dims,
            nodata: None,
        })
    }

    /// Create a raster from an ndarray, in logical (row, col) order
    pub fn from_array(array: Array2<T>) -> Result<Self> {
        let (rows, cols) = array.dim();
        let dims = GridDims::new(rows, cols)?;
        Ok(Self {
            data: array.iter().copied().collect(),
            dims,
            nodata: None,
        })
    }

    /// Builder-style no-data assignment
    pub fn with_nodata(mut self, nodata: T) -> Self {
        self.nodata = Some(nodata);
        self
    }

    // Dimensions

    /// Grid dimensions
    pub fn dims(&self) -> GridDims {
        self.dims
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.dims.rows()
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.dims.cols()
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.dims.shape()
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the raster is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    // Data access

    /// Get value at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        let i = self.dims.checked_index(row, col)?;
        Ok(self.data[i])
    }

    /// Set value at (row, col)
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        let i = self.dims.checked_index(row, col)?;
        self.data[i] = value;
        Ok(())
    }

    /// Value at linear index `i`.
    ///
    /// # Panics
    /// If `i >= self.len()`, like slice indexing.
    pub fn value(&self, i: usize) -> T {
        self.data[i]
    }

    /// Flat row-major values
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Mutable flat row-major values
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the raster and return the flat buffer
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// 2D view of the underlying buffer
    pub fn view(&self) -> Result<ArrayView2<'_, T>> {
        ArrayView2::from_shape(self.dims.shape(), self.data.as_slice())
            .map_err(|e| Error::Other(e.to_string()))
    }

    // Metadata

    /// Get the no-data value
    pub fn nodata(&self) -> Option<T> {
        self.nodata
    }

    /// Set the no-data value
    pub fn set_nodata(&mut self, nodata: Option<T>) {
        self.nodata = nodata;
    }

    // Value checks

    /// Check if a value is no-data
    pub fn is_nodata(&self, value: T) -> bool {
        value.is_nodata(self.nodata)
    }

    /// Check if the cell at linear index `i` contains no-data
    pub fn is_nodata_at(&self, i: usize) -> bool {
        self.is_nodata(self.data[i])
    }

    /// One flag per cell, true where the cell is no-data
    pub fn nodata_mask(&self) -> Vec<bool> {
        self.data.iter().map(|&v| self.is_nodata(v)).collect()
    }

    /// In-bounds D8 neighbors of `i` that are not no-data.
    ///
    /// The sequence is lazy and can be restarted by cloning it.
    pub fn neighbors(&self, i: usize) -> impl Iterator<Item = usize> + Clone + '_ {
        self.dims.neighbors(i).filter(move |&n| !self.is_nodata_at(n))
    }

    // Statistics

    /// Calculate basic statistics (min, max, mean, count of valid cells)
    pub fn statistics(&self) -> RasterStatistics<T> {
        let mut min: Option<T> = None;
        let mut max: Option<T> = None;
        let mut sum: f64 = 0.0;
        let mut count: usize = 0;

        for &value in self.data.iter().filter(|&&v| !self.is_nodata(v)) {
            if min.map_or(true, |m| value < m) {
                min = Some(value);
            }
            if max.map_or(true, |m| value > m) {
                max = Some(value);
            }
            if let Some(v) = value.to_f64() {
                sum += v;
                count += 1;
            }
        }

        let mean = if count > 0 {
            Some(sum / count as f64)
        } else {
            None
        };

        RasterStatistics {
            min,
            max,
            mean,
            valid_count: count,
            nodata_count: self.len() - count,
        }
    }
}

/// Basic statistics for a raster
#[derive(Debug, Clone)]
pub struct RasterStatistics<T> {
    pub min: Option<T>,
    pub max: Option<T>,
    pub mean: Option<f64>,
    pub valid_count: usize,
    pub nodata_count: usize,
}
