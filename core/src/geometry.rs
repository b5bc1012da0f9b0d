//! Canvas geometry shared by placement validation, movement and rendering.

use serde::{Deserialize, Serialize};

/// Continuous location on the level canvas measured in virtual pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    x: f32,
    y: f32,
}

impl Position {
    /// Creates a new position from its coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Euclidean distance to another position.
    #[must_use]
    pub fn distance_to(self, other: Position) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Moves up to `step` units toward `target`.
    ///
    /// Returns the new position together with a flag reporting whether the
    /// target was reached. The target is snapped to when the remaining
    /// distance is shorter than one step.
    #[must_use]
    pub fn step_toward(self, target: Position, step: f32) -> (Position, bool) {
        let remaining = self.distance_to(target);
        if remaining < step || remaining <= f32::EPSILON {
            return (target, true);
        }

        let scale = step / remaining;
        (
            Position::new(
                self.x + (target.x - self.x) * scale,
                self.y + (target.y - self.y) * scale,
            ),
            false,
        )
    }
}

/// Shortest distance from `point` to the segment between `start` and `end`.
///
/// The projection onto the segment is clamped to its endpoints. A degenerate
/// segment collapses to the distance to `start`.
#[must_use]
pub fn distance_to_segment(point: Position, start: Position, end: Position) -> f32 {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let length_squared = dx * dx + dy * dy;
    if length_squared <= f32::EPSILON {
        return point.distance_to(start);
    }

    let t = (((point.x - start.x) * dx + (point.y - start.y) * dy) / length_squared).clamp(0.0, 1.0);
    point.distance_to(Position::new(start.x + t * dx, start.y + t * dy))
}

/// Rectangular region anchored at the canvas origin that may hold towers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayArea {
    width: f32,
    height: f32,
}

impl PlayArea {
    /// Creates a play area spanning `width` by `height` canvas units.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Play area of the first level: the canvas minus the side menu column.
    #[must_use]
    pub const fn level_one() -> Self {
        Self::new(1160.0, 800.0)
    }

    /// Width of the area.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Height of the area.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Reports whether the position lies inside the area.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        (0.0..self.width).contains(&position.x) && (0.0..self.height).contains(&position.y)
    }
}

/// Errors raised when constructing a waypoint path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// A path needs at least a start and an end.
    #[error("a path needs at least two waypoints, found {count}")]
    TooFewWaypoints {
        /// Number of waypoints supplied.
        count: usize,
    },
}

/// Ordered waypoints enemies walk from spawn to exit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaypointPath {
    waypoints: Vec<Position>,
}

impl WaypointPath {
    /// Creates a path from at least two waypoints.
    pub fn new(waypoints: Vec<Position>) -> Result<Self, PathError> {
        if waypoints.len() < 2 {
            return Err(PathError::TooFewWaypoints {
                count: waypoints.len(),
            });
        }
        Ok(Self { waypoints })
    }

    /// Path used by the first level.
    #[must_use]
    pub fn level_one() -> Self {
        Self {
            waypoints: vec![
                Position::new(100.0, 400.0),
                Position::new(400.0, 400.0),
                Position::new(400.0, 700.0),
                Position::new(1000.0, 700.0),
                Position::new(1000.0, 100.0),
            ],
        }
    }

    /// All waypoints in walking order.
    #[must_use]
    pub fn waypoints(&self) -> &[Position] {
        &self.waypoints
    }

    /// Waypoint where enemies spawn.
    #[must_use]
    pub fn start(&self) -> Position {
        self.waypoints[0]
    }

    /// Waypoint at `index`, if it exists.
    #[must_use]
    pub fn waypoint(&self, index: usize) -> Option<Position> {
        self.waypoints.get(index).copied()
    }

    /// Index of the exit waypoint.
    #[must_use]
    pub fn final_index(&self) -> usize {
        self.waypoints.len() - 1
    }

    /// Consecutive waypoint pairs.
    pub fn segments(&self) -> impl Iterator<Item = (Position, Position)> + '_ {
        self.waypoints.windows(2).map(|pair| (pair[0], pair[1]))
    }

    /// Shortest distance from `point` to any segment of the path.
    #[must_use]
    pub fn distance_to(&self, point: Position) -> f32 {
        self.segments()
            .map(|(start, end)| distance_to_segment(point, start, end))
            .fold(f32::INFINITY, f32::min)
    }
}
