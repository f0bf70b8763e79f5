//! Priority-Flood depression filling
//!
//! O(n log n) algorithm for filling depressions in a DEM.
//! Uses a priority queue (min-heap) to process cells in elevation order,
//! starting from the DEM boundary.
//!
//! Each cell is resolved exactly once: it is raised to the level of the
//! cell it was reached from when it lies below it, and pushed with that
//! level as its key. Cells that pop with equal keys come out in the order
//! they were pushed, so the traversal is fully deterministic.
//!
//! Reference:
//! Barnes, R., Lehman, C., & Mulla, D. (2014). Priority-Flood: An optimal
//! depression-filling and watershed-labeling algorithm for digital elevation
//! models. *Computers & Geosciences*, 62, 117–127.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use topohydro_core::raster::{GridDims, Raster};
use topohydro_core::{Algorithm, Error, Result};
use tracing::debug;

/// A cell in the priority queue, ordered by elevation then insertion order.
#[derive(Debug, Clone, Copy)]
struct Cell {
    elevation: f64,
    seq: u64,
    index: usize,
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Cell {}

impl PartialOrd for Cell {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Reversed so BinaryHeap (max-heap) acts as a min-heap on (elevation, seq)
impl Ord for Cell {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .elevation
            .total_cmp(&self.elevation)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-priority queue with FIFO order among equal elevations.
#[derive(Debug, Default)]
struct FloodQueue {
    heap: BinaryHeap<Cell>,
    next_seq: u64,
}

impl FloodQueue {
    fn push(&mut self, elevation: f64, index: usize) {
        self.heap.push(Cell {
            elevation,
            seq: self.next_seq,
            index,
        });
        self.next_seq += 1;
    }

    fn pop(&mut self) -> Option<Cell> {
        self.heap.pop()
    }
}

/// Counters collected during one fill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillReport {
    /// Cells pushed to the queue. Equals the number of valid cells.
    pub resolved: usize,
    /// Cells whose elevation was raised
    pub raised: usize,
    /// Regions walled in by no-data that had to be seeded from their own
    /// lowest cell because no boundary cell could reach them
    pub closed_basins: usize,
}

/// Priority-Flood fill algorithm
#[derive(Debug, Clone, Default)]
pub struct PriorityFlood;

impl Algorithm for PriorityFlood {
    type Input = Raster<f64>;
    type Output = Raster<f64>;
    type Params = ();
    type Error = Error;

    fn name(&self) -> &'static str {
        "Priority-Flood"
    }

    fn description(&self) -> &'static str {
        "Fill depressions using Priority-Flood (Barnes 2014)"
    }

    fn execute(&self, mut input: Self::Input, _params: Self::Params) -> Result<Self::Output> {
        priority_flood_in_place(&mut input);
        Ok(input)
    }
}

/// Fill depressions in a DEM using the Priority-Flood algorithm (Barnes 2014).
///
/// Returns a new raster of identical dimensions and no-data value in which
/// every cell is at least as high as in `dem`, boundary cells are unchanged,
/// and every valid interior cell has a non-increasing path to the boundary.
/// No-data cells keep their value.
pub fn priority_flood(dem: &Raster<f64>) -> Raster<f64> {
    let mut output = dem.clone();
    priority_flood_in_place(&mut output);
    output
}

/// Fill depressions, overwriting `dem`.
///
/// # Algorithm
/// 1. Push every valid boundary cell into a min-heap and mark it resolved
/// 2. Pop the lowest cell `c`
/// 3. For each unresolved valid neighbor `n`:
///    - Set `n = max(n, c)`, mark `n` resolved, push it with that key
/// 4. Repeat until the heap is empty
///
/// No-data cells are impassable. A valid region entirely walled in by
/// no-data cannot be reached from the boundary; it is flooded from its
/// own lowest cell instead, which keeps that cell as the region's pit.
pub fn priority_flood_in_place(dem: &mut Raster<f64>) -> FillReport {
    let dims = dem.dims();
    let mut resolved = dem.nodata_mask();
    let z = dem.as_mut_slice();

    let mut queue = FloodQueue::default();
    let mut report = FillReport::default();

    for i in dims.boundary_indices() {
        if !resolved[i] {
            resolved[i] = true;
            queue.push(z[i], i);
            report.resolved += 1;
        }
    }
    flood(dims, z, &mut resolved, &mut queue, &mut report);

    // Unreached cells still hold their original values.
    let mut pending: Vec<usize> = (0..dims.len()).filter(|&i| !resolved[i]).collect();
    if !pending.is_empty() {
        pending.sort_by(|&a, &b| z[a].total_cmp(&z[b]).then(a.cmp(&b)));
        for i in pending {
            if resolved[i] {
                continue;
            }
            resolved[i] = true;
            queue.push(z[i], i);
            report.resolved += 1;
            report.closed_basins += 1;
            flood(dims, z, &mut resolved, &mut queue, &mut report);
        }
    }

    debug!(
        rows = dims.rows(),
        cols = dims.cols(),
        resolved = report.resolved,
        raised = report.raised,
        closed_basins = report.closed_basins,
        "priority-flood complete"
    );

    report
}

fn flood(
    dims: GridDims,
    z: &mut [f64],
    resolved: &mut [bool],
    queue: &mut FloodQueue,
    report: &mut FillReport,
) {
    while let Some(cell) = queue.pop() {
        for n in dims.neighbors(cell.index) {
            if resolved[n] {
                continue;
            }
            resolved[n] = true;

            // Raise the depression to the level of its lowest escape route.
            if z[n] < cell.elevation {
                z[n] = cell.elevation;
                report.raised += 1;
            }
            queue.push(z[n], n);
            report.resolved += 1;
        }
    }
}

/// Fill sinks in a flat row-major elevation buffer.
///
/// NaN cells are treated as no-data. Fails with [`Error::InvalidGrid`]
/// when `rows` or `cols` is zero or `elevations.len() != rows * cols`.
///
/// ```
/// use topohydro_algorithms::hydrology::fill_sinks;
///
/// let dem = [
///     10.0, 10.0, 10.0,
///     10.0,  1.0, 10.0,
///     10.0, 10.0, 10.0,
/// ];
/// let filled = fill_sinks(&dem, 3, 3)?;
/// assert_eq!(filled[4], 10.0);
/// # Ok::<(), topohydro_core::Error>(())
/// ```
pub fn fill_sinks(elevations: &[f64], rows: usize, cols: usize) -> Result<Vec<f64>> {
    let mut dem = Raster::from_vec(elevations.to_vec(), rows, cols)?;
    priority_flood_in_place(&mut dem);
    Ok(dem.into_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raster(values: &[f64], rows: usize, cols: usize) -> Raster<f64> {
        Raster::from_vec(values.to_vec(), rows, cols).unwrap()
    }

    fn create_dem_with_sink() -> Raster<f64> {
        // 7x7 DEM with a depression in the center
        raster(
            &[
                9.0, 9.0, 9.0, 9.0, 9.0, 9.0, 9.0,
                9.0, 8.0, 8.0, 8.0, 8.0, 8.0, 9.0,
                9.0, 8.0, 7.0, 7.0, 7.0, 8.0, 9.0,
                9.0, 8.0, 7.0, 3.0, 7.0, 8.0, 9.0,
                9.0, 8.0, 7.0, 7.0, 7.0, 8.0, 9.0,
                9.0, 8.0, 8.0, 8.0, 8.0, 8.0, 9.0,
                9.0, 9.0, 9.0, 9.0, 9.0, 9.0, 9.0,
            ],
            7,
            7,
        )
    }

    #[test]
    fn test_queue_breaks_ties_fifo() {
        let mut queue = FloodQueue::default();
        queue.push(5.0, 10);
        queue.push(2.0, 20);
        queue.push(5.0, 30);
        queue.push(2.0, 40);
        queue.push(5.0, 50);

        let order: Vec<usize> = std::iter::from_fn(|| queue.pop()).map(|c| c.index).collect();
        assert_eq!(order, vec![20, 40, 10, 30, 50]);
    }

    #[test]
    fn test_center_pit_rises_to_ring() {
        let dem = raster(
            &[
                10.0, 10.0, 10.0,
                10.0, 1.0, 10.0,
                10.0, 10.0, 10.0,
            ],
            3,
            3,
        );
        let filled = priority_flood(&dem);
        assert_eq!(filled.as_slice(), &[10.0; 9]);
    }

    #[test]
    fn test_priority_flood_fills_sink() {
        let dem = create_dem_with_sink();
        let filled = priority_flood(&dem);

        // Every interior ring is lower than the 9.0 border, so the whole
        // bowl, including the 3.0 pit at (3,3), fills to the rim.
        assert_eq!(filled.get(3, 3).unwrap(), 9.0);
        assert!(filled.as_slice().iter().all(|&v| v == 9.0));
    }

    #[test]
    fn test_priority_flood_preserves_border() {
        let dem = create_dem_with_sink();
        let filled = priority_flood(&dem);

        for i in dem.dims().boundary_indices() {
            assert_eq!(filled.value(i), dem.value(i));
        }
    }

    #[test]
    fn test_priority_flood_no_change_on_clean_dem() {
        // Sloped plane: no sinks
        let values: Vec<f64> = (0..100).map(|i| ((i / 10) + (i % 10)) as f64).collect();
        let dem = raster(&values, 10, 10);

        let mut filled = dem.clone();
        let report = priority_flood_in_place(&mut filled);

        assert_eq!(filled, dem);
        assert_eq!(report.raised, 0);
        assert_eq!(report.resolved, 100);
    }

    #[test]
    fn test_priority_flood_outlet_respects_low_border() {
        // 5x5 DEM: border=10 except outlet at (4,2)=2, center sink at (2,2)=1
        let mut dem = Raster::filled(GridDims::new(5, 5).unwrap(), 5.0);
        for i in dem.dims().boundary_indices().collect::<Vec<_>>() {
            dem.as_mut_slice()[i] = 10.0;
        }
        dem.set(2, 2, 1.0).unwrap();
        dem.set(4, 2, 2.0).unwrap();

        let filled = priority_flood(&dem);

        // The sink only needs to reach the level of the interior rim.
        assert_eq!(filled.get(2, 2).unwrap(), 5.0);
        assert_eq!(filled.get(1, 1).unwrap(), 5.0);
        assert_eq!(filled.get(4, 2).unwrap(), 2.0);
    }

    #[test]
    fn test_nested_depression_fills_to_lowest_spill() {
        // Two pits share a wall at 4; the outer rim spills at 6 on the left.
        let dem = raster(
            &[
                9.0, 9.0, 9.0, 9.0, 9.0, 9.0,
                6.0, 1.0, 4.0, 2.0, 8.0, 9.0,
                9.0, 9.0, 9.0, 9.0, 9.0, 9.0,
            ],
            3,
            6,
        );
        let filled = priority_flood(&dem);
        assert_eq!(&filled.as_slice()[6..12], &[6.0, 6.0, 6.0, 6.0, 8.0, 9.0]);
    }

    #[test]
    fn test_nodata_is_preserved_and_impassable() {
        // A wall of no-data splits the interior: the left pit drains through
        // the low border cell, the right pit must go over the 9-rim.
        let nd = -9999.0;
        let dem = raster(
            &[
                9.0, 9.0, 9.0, 9.0, 9.0,
                3.0, 1.0, nd,  2.0, 9.0,
                9.0, 9.0, nd,  9.0, 9.0,
                9.0, 9.0, 9.0, 9.0, 9.0,
            ],
            4,
            5,
        )
        .with_nodata(nd);

        let mut filled = dem.clone();
        let report = priority_flood_in_place(&mut filled);

        assert_eq!(filled.get(1, 1).unwrap(), 3.0);
        assert_eq!(filled.get(1, 2).unwrap(), nd);
        assert_eq!(filled.get(2, 2).unwrap(), nd);
        assert_eq!(filled.get(1, 3).unwrap(), 9.0);
        assert_eq!(report.resolved, 18);
        assert_eq!(report.closed_basins, 0);
    }

    #[test]
    fn test_nan_cells_round_trip() {
        let values = [
            5.0, 5.0, 5.0, 5.0,
            5.0, f64::NAN, 1.0, 5.0,
            5.0, 5.0, 5.0, 5.0,
        ];
        let filled = fill_sinks(&values, 3, 4).unwrap();
        assert!(filled[5].is_nan());
        assert_eq!(filled[6], 5.0);
    }

    #[test]
    fn test_enclosed_region_is_seeded_from_its_lowest_cell() {
        let nd = f64::NAN;
        let dem = raster(
            &[
                5.0, 5.0, 5.0, 5.0, 5.0,
                5.0, nd,  nd,  nd,  5.0,
                5.0, nd,  1.0, nd,  5.0,
                5.0, nd,  nd,  nd,  5.0,
                5.0, 5.0, 5.0, 5.0, 5.0,
            ],
            5,
            5,
        );
        let mut filled = dem.clone();
        let report = priority_flood_in_place(&mut filled);

        assert_eq!(filled.get(2, 2).unwrap(), 1.0);
        assert_eq!(report.closed_basins, 1);
        assert_eq!(report.resolved, 17);
    }

    #[test]
    fn test_all_boundary_grids_are_unchanged() {
        for (rows, cols) in [(1, 1), (1, 5), (5, 1), (2, 2), (2, 4)] {
            let values: Vec<f64> = (0..rows * cols).map(|i| ((i * 7) % 5) as f64).collect();
            let filled = fill_sinks(&values, rows, cols).unwrap();
            assert_eq!(filled, values, "{}x{}", rows, cols);
        }
    }

    #[test]
    fn test_fill_sinks_rejects_bad_dimensions() {
        assert!(matches!(
            fill_sinks(&[], 0, 0),
            Err(Error::InvalidGrid { .. })
        ));
        assert!(matches!(
            fill_sinks(&[1.0; 5], 2, 3),
            Err(Error::InvalidGrid { len: 5, .. })
        ));
    }

    #[test]
    fn test_algorithm_trait() {
        let algo = PriorityFlood;
        assert_eq!(algo.name(), "Priority-Flood");
        let filled = algo.execute_default(create_dem_with_sink()).unwrap();
        assert_eq!(filled.get(3, 3).unwrap(), 9.0);
    }
}
