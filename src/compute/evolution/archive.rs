//! MAP-Elites archive: one elite slot per feature coordinate.

use crate::schema::{ArchiveSnapshot, Coordinate, Individual, Objective};

/// N-dimensional grid of elites stored as a flat row-major arena.
#[derive(Debug, Clone, PartialEq)]
pub struct Archive {
    /// Cells per dimension.
    shape: Vec<usize>,
    /// Row-major cells; `None` marks an empty cell.
    cells: Vec<Option<Individual>>,
    /// Comparison rule for replacing elites.
    objective: Objective,
}

/// Outcome of [`Archive::place`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The cell was empty.
    Inserted,
    /// The candidate beat the previous elite.
    Replaced,
    /// The previous elite was at least as good; the candidate was dropped.
    Rejected,
    /// The candidate had no coordinate and was dropped.
    Unclassified,
}

/// Archive contract violations.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ArchiveError {
    #[error("Archive needs at least one dimension")]
    NoDimensions,
    #[error("Archive dimension {0} has zero cells")]
    EmptyDimension(usize),
    #[error("Coordinate {coordinate} lies outside archive shape {shape:?}")]
    CoordinateOutOfBounds {
        coordinate: Coordinate,
        shape: Vec<usize>,
    },
}

impl Archive {
    /// Create an empty archive.
    pub fn new(shape: Vec<usize>, objective: Objective) -> Result<Self, ArchiveError> {
        if shape.is_empty() {
            return Err(ArchiveError::NoDimensions);
        }
        if let Some(dim) = shape.iter().position(|&n| n == 0) {
            return Err(ArchiveError::EmptyDimension(dim));
        }

        let capacity = shape.iter().product();
        Ok(Self {
            shape,
            cells: vec![None; capacity],
            objective,
        })
    }

    /// Cells per dimension.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Comparison rule used by [`Archive::place`].
    pub fn objective(&self) -> Objective {
        self.objective
    }

    /// Total number of cells.
    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    /// Number of occupied cells.
    pub fn len(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Check if no cell is occupied.
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    /// Try to store an individual in its cell.
    ///
    /// Replacement requires a strictly better fitness, so ties keep the
    /// current elite.
    pub fn place(&mut self, individual: Individual) -> Result<Placement, ArchiveError> {
        let Some(coordinate) = individual.coordinate.as_ref() else {
            return Ok(Placement::Unclassified);
        };
        let offset = self.offset(coordinate)?;

        let cell = &mut self.cells[offset];
        match cell {
            None => {
                *cell = Some(individual);
                Ok(Placement::Inserted)
            }
            Some(elite) if self.objective.is_better(individual.fitness, elite.fitness) => {
                *elite = individual;
                Ok(Placement::Replaced)
            }
            Some(_) => Ok(Placement::Rejected),
        }
    }

    /// Elite at a coordinate.
    pub fn get(&self, coordinate: &Coordinate) -> Option<&Individual> {
        let offset = self.offset(coordinate).ok()?;
        self.cells[offset].as_ref()
    }

    /// Occupied coordinates in row-major order.
    pub fn elite_coordinates(&self) -> Vec<Coordinate> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_some())
            .map(|(offset, _)| self.coordinate_at(offset))
            .collect()
    }

    /// Occupied individuals in row-major order.
    pub fn elites(&self) -> impl Iterator<Item = &Individual> {
        self.cells.iter().flatten()
    }

    /// Best elite under the archive's objective.
    pub fn best(&self) -> Option<&Individual> {
        self.elites()
            .max_by(|a, b| self.objective.compare(a.fitness, b.fitness))
    }

    /// Copy every cell for reporting.
    pub fn snapshot(&self) -> ArchiveSnapshot {
        ArchiveSnapshot {
            shape: self.shape.clone(),
            cells: self.cells.clone(),
        }
    }

    /// Row-major offset of a coordinate.
    fn offset(&self, coordinate: &Coordinate) -> Result<usize, ArchiveError> {
        let indices = coordinate.indices();
        let in_bounds = indices.len() == self.shape.len()
            && indices.iter().zip(&self.shape).all(|(i, n)| i < n);
        if !in_bounds {
            return Err(ArchiveError::CoordinateOutOfBounds {
                coordinate: coordinate.clone(),
                shape: self.shape.clone(),
            });
        }

        Ok(indices
            .iter()
            .zip(&self.shape)
            .fold(0, |offset, (i, n)| offset * n + i))
    }

    /// Coordinate of a row-major offset.
    fn coordinate_at(&self, mut offset: usize) -> Coordinate {
        let mut indices = vec![0; self.shape.len()];
        for (slot, n) in indices.iter_mut().zip(&self.shape).rev() {
            *slot = offset % n;
            offset /= n;
        }
        Coordinate(indices)
    }
}
