//! Scenario geometry and perception configuration.
//!
//! A [`Scenario`] is everything pre-processing needs to know about the
//! simulated area: its extent, the obstacles, the origin areas where
//! pedestrians appear, and any lattices that were built elsewhere and may be
//! reused for ray casting.

use ped_core::{AreaId, Bounds, LatticeId, Polygon, Vec2};
use ped_lattice::{Lattice, Shape};

use crate::{PerceptionError, PerceptionResult};

// ── Area ──────────────────────────────────────────────────────────────────────

/// A named region with a representative point.
///
/// Visibility of an area is visibility of its point of interest, which
/// defaults to the polygon's vertex centroid.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Area {
    pub id:                AreaId,
    pub polygon:           Polygon,
    pub point_of_interest: Vec2,
}

impl Area {
    pub fn new(id: AreaId, polygon: Polygon) -> Self {
        let point_of_interest = polygon
            .center()
            .or_else(|| polygon.vertices.first().copied())
            .unwrap_or(Vec2::ZERO);
        Self { id, polygon, point_of_interest }
    }

    /// Override the representative point (e.g. a door rather than the
    /// room's centre).
    pub fn with_point_of_interest(mut self, point: Vec2) -> Self {
        self.point_of_interest = point;
        self
    }

    /// Geometric centre used as a flood seed.
    pub fn center(&self) -> Vec2 {
        self.polygon.center().unwrap_or(self.point_of_interest)
    }
}

// ── Scenario ──────────────────────────────────────────────────────────────────

/// Scenario geometry consumed by [`VisibilityMap::preprocess`](crate::VisibilityMap::preprocess).
#[derive(Clone, Debug)]
pub struct Scenario {
    /// Extent of the simulated area.
    pub bounds:    Bounds,
    /// Obstacle outlines.  Segments block along their length, polygons over
    /// their whole footprint.
    pub obstacles: Vec<Shape>,
    /// Where pedestrians appear; their centres seed the reachability flood.
    pub origins:   Vec<Area>,
    /// Destinations and other named regions.
    pub areas:     Vec<Area>,
    /// Pre-built lattices that may be reused via `PerceptionConfig::lattice_id`.
    pub lattices:  Vec<Lattice>,
}

impl Scenario {
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            obstacles: Vec::new(),
            origins:   Vec::new(),
            areas:     Vec::new(),
            lattices:  Vec::new(),
        }
    }

    pub fn with_obstacle(mut self, obstacle: impl Into<Shape>) -> Self {
        self.obstacles.push(obstacle.into());
        self
    }

    pub fn with_origin(mut self, origin: Area) -> Self {
        self.origins.push(origin);
        self
    }

    pub fn with_area(mut self, area: Area) -> Self {
        self.areas.push(area);
        self
    }

    pub fn with_lattice(mut self, lattice: Lattice) -> Self {
        self.lattices.push(lattice);
        self
    }

    pub fn lattice(&self, id: LatticeId) -> Option<&Lattice> {
        self.lattices.iter().find(|l| l.id() == id)
    }

    pub fn area(&self, id: AreaId) -> Option<&Area> {
        self.areas.iter().chain(self.origins.iter()).find(|a| a.id == id)
    }

    /// Reject bounds that cannot carry a grid.
    pub fn validate(&self) -> PerceptionResult<()> {
        let b = self.bounds;
        if !b.min.is_finite() || !b.max.is_finite() || !(b.width() > 0.0) || !(b.height() > 0.0) {
            return Err(PerceptionError::Config(format!(
                "scenario bounds must have positive, finite extent, got {:?}",
                b
            )));
        }
        Ok(())
    }
}

// ── PerceptionConfig ──────────────────────────────────────────────────────────

/// Visibility-engine parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PerceptionConfig {
    /// Reuse this scenario lattice instead of building one.  Its cell edge
    /// then replaces `accuracy`.
    pub lattice_id: Option<LatticeId>,

    /// Fixed ray-cast range in world units.  `None` derives the range from
    /// the longest graph edge.
    pub perception_distance: Option<f64>,

    /// Cell edge of a freshly built visibility lattice.  Default: 0.1.
    pub accuracy: f64,
}

impl PerceptionConfig {
    pub fn validate(&self) -> PerceptionResult<()> {
        if !(self.accuracy > 0.0) || !self.accuracy.is_finite() {
            return Err(PerceptionError::Config(format!(
                "accuracy must be positive and finite, got {}",
                self.accuracy
            )));
        }
        if let Some(d) = self.perception_distance {
            if !(d >= 0.0) || !d.is_finite() {
                return Err(PerceptionError::Config(format!(
                    "perception_distance must be non-negative and finite, got {d}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            lattice_id:          None,
            perception_distance: None,
            accuracy:            0.1,
        }
    }
}
