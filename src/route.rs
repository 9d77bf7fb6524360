use std::fmt::{Debug, Display};

use serde::{Deserialize, Serialize};

use crate::vehicle::{Direction, VehicleType};

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteId(pub String);

impl Debug for RouteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("r#{}", self.0))
    }
}

impl Display for RouteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for RouteId {
    fn from(value: &str) -> Self {
        RouteId(value.to_string())
    }
}

/// A fixed line served by one vehicle type. A stop may appear twice to close a loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub name: String,
    #[serde(rename = "type")]
    pub vehicle_type: VehicleType,
    pub stops: Vec<String>,
}

impl Route {
    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    pub fn stop(&self, index: usize) -> &str {
        &self.stops[index]
    }

    /// Index of the first occurrence of `stop`.
    pub fn position_of(&self, stop: &str) -> Option<usize> {
        self.stops.iter().position(|it| it == stop)
    }

    pub fn is_first(&self, index: usize) -> bool {
        index == 0
    }

    pub fn is_last(&self, index: usize) -> bool {
        index + 1 == self.stops.len()
    }

    pub fn next_index(&self, index: usize, direction: Direction) -> usize {
        (index as isize + direction.step()).rem_euclid(self.stops.len() as isize) as usize
    }
}

/// Inclusive speed bounds in km/h.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedRange {
    pub min: f64,
    pub max: f64,
}

#[cfg(test)]
impl SpeedRange {
    pub fn contains(&self, speed: f64) -> bool {
        self.min <= speed && speed <= self.max
    }
}
