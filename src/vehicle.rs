use std::fmt::{Debug, Display};

use serde::{Deserialize, Serialize};

use crate::route::RouteId;

pub const MIN_OCCUPANCY: u8 = 0;
pub const MAX_OCCUPANCY: u8 = 4;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct VehicleId(pub u32);

impl Debug for VehicleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("V{:04}", self.0))
    }
}

impl Display for VehicleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self, f)
    }
}

impl From<VehicleId> for String {
    fn from(id: VehicleId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for VehicleId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value
            .strip_prefix('V')
            .and_then(|digits| digits.parse::<u32>().ok())
            .map(VehicleId)
            .ok_or_else(|| format!("invalid vehicle id: {value}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    Bus,
    Train,
    Tram,
}

impl Display for VehicleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            VehicleType::Bus => "bus",
            VehicleType::Train => "train",
            VehicleType::Tram => "tram",
        })
    }
}

/// Traversal direction through a route's stop list, serialized as `1` / `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn step(self) -> isize {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

impl From<Direction> for i8 {
    fn from(direction: Direction) -> Self {
        direction.step() as i8
    }
}

impl TryFrom<i8> for Direction {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Direction::Forward),
            -1 => Ok(Direction::Backward),
            other => Err(format!("direction must be 1 or -1, got {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    InService,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    pub id: VehicleId,
    pub vehicle_type: VehicleType,
    pub route_id: RouteId,
    pub status: ServiceStatus,
    pub current_stop_index: usize,
    pub next_stop: String,
    pub direction: Direction,
    /// Accumulated delay in seconds.
    pub delay: u32,
    pub latitude: f64,
    pub longitude: f64,
    /// km/h, zero while standing at a stop.
    pub speed: f64,
    /// Degrees in `[0, 360)`.
    pub bearing: u16,
    /// Ordinal fill level in `[MIN_OCCUPANCY, MAX_OCCUPANCY]`.
    pub occupancy: u8,
}

#[cfg(test)]
mod tests {
    use super::{Direction, VehicleId};

    #[test]
    fn test_vehicle_id_format() {
        assert_eq!(VehicleId(7).to_string(), "V0007");
        assert_eq!(VehicleId(12345).to_string(), "V12345");
        assert_eq!(VehicleId::try_from("V0042".to_string()), Ok(VehicleId(42)));
        assert!(VehicleId::try_from("X0042".to_string()).is_err());
    }

    #[test]
    fn test_direction_serialization() {
        assert_eq!(serde_json::to_string(&Direction::Backward).unwrap(), "-1");
        assert_eq!(
            serde_json::from_str::<Direction>("1").unwrap(),
            Direction::Forward
        );
        assert!(serde_json::from_str::<Direction>("0").is_err());
    }
}
