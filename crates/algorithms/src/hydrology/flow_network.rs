//! Flow network edge lists
//!
//! A flow network routes every cell to at most one receiver: it is a
//! functional graph over the linear index space of a grid, given as
//! parallel `source`/`target` arrays. Cells that never appear as a
//! source, or whose only edge points to themselves, are outlets.
//!
//! This module only validates and queries networks. Deriving receivers
//! from a filled DEM is left to the caller.

use topohydro_core::{Error, GridDims, Result};

/// Validated single-receiver flow network over a grid.
///
/// Receivers are stored as an index map `cell -> receiver cell`, so a
/// network never owns node objects and cannot form ownership cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowNetwork {
    dims: GridDims,
    source: Vec<usize>,
    target: Vec<usize>,
    /// Receiver per cell; `None` for outlets, including self edges
    receivers: Vec<Option<usize>>,
    nodata: Option<Vec<bool>>,
}

impl FlowNetwork {
    /// Validate an edge list against grid dimensions.
    ///
    /// Fails with [`Error::MalformedNetwork`] when the arrays differ in
    /// length, an index is outside `[0, rows * cols)`, or a cell appears
    /// more than once as a source.
    pub fn new(source: Vec<usize>, target: Vec<usize>, dims: GridDims) -> Result<Self> {
        if source.len() != target.len() {
            return Err(Error::malformed(
                source.len().min(target.len()),
                format!(
                    "source has {} entries but target has {}",
                    source.len(),
                    target.len()
                ),
            ));
        }

        let cells = dims.len();
        let mut receivers = vec![None; cells];
        let mut seen = vec![false; cells];

        for (edge, (&s, &t)) in source.iter().zip(&target).enumerate() {
            if s >= cells {
                return Err(Error::malformed(
                    edge,
                    format!("source {} outside grid of {} cells", s, cells),
                ));
            }
            if t >= cells {
                return Err(Error::malformed(
                    edge,
                    format!("target {} outside grid of {} cells", t, cells),
                ));
            }
            if seen[s] {
                return Err(Error::malformed(
                    edge,
                    format!("cell {} appears more than once as a source", s),
                ));
            }
            seen[s] = true;
            if s != t {
                receivers[s] = Some(t);
            }
        }

        Ok(Self {
            dims,
            source,
            target,
            receivers,
            nodata: None,
        })
    }

    /// Validate flat edge arrays with explicit dimensions.
    pub fn from_edges(source: &[usize], target: &[usize], rows: usize, cols: usize) -> Result<Self> {
        let dims = GridDims::new(rows, cols)?;
        Self::new(source.to_vec(), target.to_vec(), dims)
    }

    /// Build a network from one optional receiver per cell.
    pub fn from_receivers(dims: GridDims, receivers: &[Option<usize>]) -> Result<Self> {
        if receivers.len() != dims.len() {
            return Err(Error::invalid_grid(
                dims.rows(),
                dims.cols(),
                receivers.len(),
                "receiver array length does not match rows * cols",
            ));
        }
        let (source, target): (Vec<usize>, Vec<usize>) = receivers
            .iter()
            .enumerate()
            .filter_map(|(cell, r)| r.map(|t| (cell, t)))
            .unzip();
        Self::new(source, target, dims)
    }

    /// Mark no-data cells. They are excluded from basin labeling, so no
    /// edge may start or end on one.
    pub fn with_nodata(mut self, mask: Vec<bool>) -> Result<Self> {
        if mask.len() != self.dims.len() {
            return Err(Error::invalid_grid(
                self.dims.rows(),
                self.dims.cols(),
                mask.len(),
                "no-data mask length does not match rows * cols",
            ));
        }
        for (edge, (&s, &t)) in self.source.iter().zip(&self.target).enumerate() {
            if mask[s] || mask[t] {
                return Err(Error::malformed(
                    edge,
                    format!("edge {} -> {} touches a no-data cell", s, t),
                ));
            }
        }
        self.nodata = Some(mask);
        Ok(self)
    }

    /// Grid dimensions
    pub fn dims(&self) -> GridDims {
        self.dims
    }

    /// Number of edges, self edges included
    pub fn edge_count(&self) -> usize {
        self.source.len()
    }

    /// Edge sources
    pub fn sources(&self) -> &[usize] {
        &self.source
    }

    /// Edge targets
    pub fn targets(&self) -> &[usize] {
        &self.target
    }

    /// Receiver per cell, `None` for outlets
    pub fn receivers(&self) -> &[Option<usize>] {
        &self.receivers
    }

    /// Receiver of `cell`, or `None` when it is an outlet
    pub fn receiver(&self, cell: usize) -> Option<usize> {
        self.receivers[cell]
    }

    /// Whether `cell` was marked no-data
    pub fn is_nodata(&self, cell: usize) -> bool {
        self.nodata.as_ref().is_some_and(|m| m[cell])
    }

    /// Whether `cell` is a valid cell without a receiver
    pub fn is_outlet(&self, cell: usize) -> bool {
        !self.is_nodata(cell) && self.receivers[cell].is_none()
    }

    /// Outlet cells in ascending index order
    pub fn outlets(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.dims.len()).filter(move |&c| self.is_outlet(c))
    }

    /// Follow receivers from `cell` to its outlet without caching.
    ///
    /// Fails with [`Error::CyclicNetwork`] if no outlet is reached within
    /// `rows * cols` steps.
    pub fn outlet_of(&self, cell: usize) -> Result<usize> {
        let mut current = cell;
        for _ in 0..self.dims.len() {
            match self.receivers[current] {
                None => return Ok(current),
                Some(next) => current = next,
            }
        }
        Err(Error::CyclicNetwork {
            cell: current,
            steps: self.dims.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(rows: usize, cols: usize) -> GridDims {
        GridDims::new(rows, cols).unwrap()
    }

    #[test]
    fn test_receivers_and_outlets() {
        let net = FlowNetwork::from_edges(&[0, 1, 2, 3], &[1, 1, 1, 2], 1, 5).unwrap();
        assert_eq!(net.edge_count(), 4);
        assert_eq!(
            net.receivers(),
            &[Some(1), None, Some(1), Some(2), None]
        );
        assert_eq!(net.outlets().collect::<Vec<_>>(), vec![1, 4]);
        assert!(net.is_outlet(1));
        assert!(!net.is_outlet(3));
    }

    #[test]
    fn test_rejects_out_of_range_indices() {
        let err = FlowNetwork::from_edges(&[0, 9], &[1, 1], 2, 2).unwrap_err();
        assert!(matches!(err, Error::MalformedNetwork { edge: 1, .. }));

        let err = FlowNetwork::from_edges(&[0], &[4], 2, 2).unwrap_err();
        assert!(matches!(err, Error::MalformedNetwork { edge: 0, .. }));
    }

    #[test]
    fn test_rejects_duplicate_source() {
        let err = FlowNetwork::from_edges(&[0, 2, 0], &[1, 1, 3], 2, 2).unwrap_err();
        match err {
            Error::MalformedNetwork { edge, reason } => {
                assert_eq!(edge, 2);
                assert!(reason.contains("cell 0"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rejects_length_mismatch() {
        let err = FlowNetwork::new(vec![0, 1], vec![1], dims(1, 3)).unwrap_err();
        assert!(matches!(err, Error::MalformedNetwork { edge: 1, .. }));
    }

    #[test]
    fn test_rejects_invalid_dimensions() {
        assert!(matches!(
            FlowNetwork::from_edges(&[], &[], 0, 3),
            Err(Error::InvalidGrid { .. })
        ));
    }

    #[test]
    fn test_from_receivers_matches_edges() {
        let net = FlowNetwork::from_receivers(dims(2, 2), &[Some(1), None, Some(3), Some(3)]).unwrap();
        assert_eq!(net.sources(), &[0, 2, 3]);
        assert_eq!(net.targets(), &[1, 3, 3]);
        assert_eq!(net.outlets().collect::<Vec<_>>(), vec![1, 3]);

        assert!(FlowNetwork::from_receivers(dims(2, 2), &[None; 3]).is_err());
    }

    #[test]
    fn test_nodata_mask() {
        let net = FlowNetwork::from_edges(&[0], &[1], 1, 3).unwrap();
        let net = net.with_nodata(vec![false, false, true]).unwrap();
        assert!(net.is_nodata(2));
        assert_eq!(net.outlets().collect::<Vec<_>>(), vec![1]);

        let net = FlowNetwork::from_edges(&[0], &[2], 1, 3).unwrap();
        assert!(matches!(
            net.clone().with_nodata(vec![false, false, true]),
            Err(Error::MalformedNetwork { edge: 0, .. })
        ));
        assert!(matches!(
            net.with_nodata(vec![false; 2]),
            Err(Error::InvalidGrid { len: 2, .. })
        ));
    }

    #[test]
    fn test_outlet_of_walks_and_detects_cycles() {
        let net = FlowNetwork::from_edges(&[0, 1, 2], &[1, 2, 3], 1, 4).unwrap();
        assert_eq!(net.outlet_of(0).unwrap(), 3);
        assert_eq!(net.outlet_of(3).unwrap(), 3);

        let cyclic = FlowNetwork::from_edges(&[0, 1], &[1, 0], 1, 2).unwrap();
        assert!(matches!(cyclic.outlet_of(0), Err(Error::CyclicNetwork { .. })));
    }
}
