//! Deterministic doubles shared by unit, behaviour and downstream tests.

use std::cell::Cell;
use std::sync::atomic::{AtomicUsize, Ordering};

use geo::Coord;

use crate::{
    GeocodeError, Geocoder, Restaurant, RestaurantId, SimilarityError, SimilarityIndex,
};

/// Geocoder returning a fixed answer and counting service calls.
///
/// Blank addresses are rejected before the counter moves, mirroring a real
/// client that never sends them.
#[derive(Debug)]
pub struct StubGeocoder {
    answer: Result<Coord<f64>, GeocodeError>,
    calls: Cell<usize>,
}

impl StubGeocoder {
    /// Stub resolving every address to `location`.
    #[must_use]
    pub const fn found(location: Coord<f64>) -> Self {
        Self {
            answer: Ok(location),
            calls: Cell::new(0),
        }
    }

    /// Stub failing every lookup with `error`.
    #[must_use]
    pub const fn failing(error: GeocodeError) -> Self {
        Self {
            answer: Err(error),
            calls: Cell::new(0),
        }
    }

    /// Number of non-blank lookups performed.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl Geocoder for StubGeocoder {
    fn geocode(&self, address: &str) -> Result<Coord<f64>, GeocodeError> {
        if address.trim().is_empty() {
            return Err(GeocodeError::EmptyAddress);
        }
        self.calls.set(self.calls.get().saturating_add(1));
        self.answer.clone()
    }
}

/// Identity similarity index that records how often it is queried.
#[derive(Debug, Default)]
pub struct CountingIndex {
    size: usize,
    lookups: AtomicUsize,
}

impl CountingIndex {
    /// Index covering `size` records.
    #[must_use]
    pub const fn new(size: usize) -> Self {
        Self {
            size,
            lookups: AtomicUsize::new(0),
        }
    }

    /// Number of [`SimilarityIndex::similarity`] calls so far.
    #[must_use]
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }
}

impl SimilarityIndex for CountingIndex {
    fn len(&self) -> usize {
        self.size
    }

    fn similarity(
        &self,
        reference: RestaurantId,
        candidates: &[RestaurantId],
    ) -> Result<Vec<f32>, SimilarityError> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        if reference >= self.size {
            return Err(SimilarityError::UnknownRecord { id: reference });
        }
        candidates
            .iter()
            .map(|&id| {
                if id >= self.size {
                    Err(SimilarityError::UnknownRecord { id })
                } else if id == reference {
                    Ok(1.0)
                } else {
                    Ok(0.0)
                }
            })
            .collect()
    }
}

/// Restaurant on the equator, `longitude` degrees east of the origin.
#[must_use]
pub fn restaurant_at(id: RestaurantId, name: &str, longitude: f64) -> Restaurant {
    Restaurant::new(id, name).with_coordinates(Coord {
        x: longitude,
        y: 0.0,
    })
}
