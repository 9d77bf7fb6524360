use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::clock::simulation_time;
use crate::error::ConfigError;
use crate::route::{Route, RouteId, SpeedRange};
use crate::vehicle::VehicleType;

/// Reference point around which the fleet is scattered at start-up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Origin {
    pub latitude: f64,
    pub longitude: f64,
    /// Maximum absolute offset in degrees applied to each coordinate.
    pub jitter: f64,
}

impl Default for Origin {
    fn default() -> Self {
        Origin {
            latitude: 40.7128,
            longitude: -74.0060,
            jitter: 0.1,
        }
    }
}

/// Tuning constants of the per-step vehicle update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepParams {
    pub at_stop_probability: f64,
    pub delay_probability: f64,
    /// Degrees of random walk per km/h of speed.
    pub movement_scale: f64,
}

impl Default for StepParams {
    fn default() -> Self {
        StepParams {
            at_stop_probability: 0.1,
            delay_probability: 0.2,
            movement_scale: 1.0 / 1000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub fleet_size: usize,
    pub seed: u64,
    pub start_time: NaiveDateTime,
    pub time_step_seconds: u32,
    pub output_dir: PathBuf,
    pub routes: BTreeMap<RouteId, Route>,
    pub speed_ranges: BTreeMap<VehicleType, SpeedRange>,
    pub origin: Origin,
    pub step: StepParams,
}

fn route(name: &str, vehicle_type: VehicleType, stops: &[&str]) -> Route {
    Route {
        name: name.to_string(),
        vehicle_type,
        stops: stops.iter().map(|it| it.to_string()).collect(),
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let routes = [
            (
                "1",
                route("Downtown Express", VehicleType::Bus, &["A1", "A2", "A3", "A4", "A5"]),
            ),
            (
                "2",
                route("Airport Line", VehicleType::Train, &["B1", "B2", "B3", "B4"]),
            ),
            (
                "3",
                route(
                    "University Route",
                    VehicleType::Bus,
                    &["C1", "C2", "C3", "C4", "C5", "C6"],
                ),
            ),
            (
                "4",
                route(
                    "Central Loop",
                    VehicleType::Tram,
                    &["D1", "D2", "D3", "D4", "D5", "D1"],
                ),
            ),
            (
                "5",
                route("Suburban Express", VehicleType::Train, &["E1", "E2", "E3"]),
            ),
        ]
        .into_iter()
        .map(|(id, route)| (RouteId::from(id), route))
        .collect();

        let speed_ranges = [
            (VehicleType::Bus, SpeedRange { min: 10.0, max: 60.0 }),
            (VehicleType::Train, SpeedRange { min: 20.0, max: 120.0 }),
            (VehicleType::Tram, SpeedRange { min: 10.0, max: 50.0 }),
        ]
        .into_iter()
        .collect();

        SimulationConfig {
            fleet_size: 100,
            seed: 42,
            start_time: NaiveDate::from_ymd_opt(2023, 1, 1)
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .unwrap_or_default(),
            time_step_seconds: 30,
            output_dir: PathBuf::from("data").join("generated"),
            routes,
            speed_ranges,
            origin: Origin::default(),
            step: StepParams::default(),
        }
    }
}

fn check_probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidProbability { name, value })
    }
}

fn check_magnitude(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidMagnitude { name, value })
    }
}

/// Offsets are drawn from `-half_width..=half_width`, whose width has to stay finite.
fn check_offset(name: &'static str, value: f64, half_width: f64) -> Result<(), ConfigError> {
    if (2.0 * half_width).is_finite() {
        Ok(())
    } else {
        Err(ConfigError::OffsetOverflow { name, value })
    }
}

impl SimulationConfig {
    /// Reads a JSON config. Missing keys fall back to the defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file)).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_reader(stream: impl std::io::Read) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(stream)
    }

    /// Checks that the config is internally consistent. Must pass before any vehicle is created.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.routes.is_empty() {
            return Err(ConfigError::EmptyRouteTable);
        }
        for (vehicle_type, range) in &self.speed_ranges {
            let ordered = 0.0 <= range.min && range.min <= range.max;
            if !(range.min.is_finite() && range.max.is_finite() && ordered) {
                return Err(ConfigError::InvalidSpeedRange {
                    vehicle_type: *vehicle_type,
                    min: range.min,
                    max: range.max,
                });
            }
        }
        for (id, route) in &self.routes {
            if route.stops.is_empty() {
                return Err(ConfigError::EmptyStopList(id.clone()));
            }
            if !self.speed_ranges.contains_key(&route.vehicle_type) {
                return Err(ConfigError::MissingSpeedRange {
                    route: id.clone(),
                    vehicle_type: route.vehicle_type,
                });
            }
        }
        if self.time_step_seconds == 0 {
            return Err(ConfigError::ZeroTimeStep);
        }
        if simulation_time(self.start_time, 1, self.time_step_seconds).is_none() {
            return Err(ConfigError::TimeOutOfRange { step: 1 });
        }
        check_probability("at_stop_probability", self.step.at_stop_probability)?;
        check_probability("delay_probability", self.step.delay_probability)?;

        let scale = self.step.movement_scale;
        check_magnitude("movement_scale", scale)?;
        for range in self.speed_ranges.values() {
            check_offset("movement_scale", scale, range.max * scale)?;
        }
        check_magnitude("origin.jitter", self.origin.jitter)?;
        check_offset("origin.jitter", self.origin.jitter, self.origin.jitter)?;
        if self.fleet_size == 0 {
            warn!("Fleet size is 0, every batch will be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use crate::error::ConfigError;
    use crate::route::{RouteId, SpeedRange};
    use crate::vehicle::VehicleType;

    use super::SimulationConfig;

    #[test]
    fn test_default_config_is_valid() {
        let config = SimulationConfig::default();
        config.validate().unwrap();
        assert_eq!(config.routes.len(), 5);
        assert_eq!(config.fleet_size, 100);
        assert_eq!(config.start_time.to_string(), "2023-01-01 00:00:00");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let content = r#"{
            "fleet_size": 3,
            "seed": 7,
            "start_time": "2024-03-04T08:00:00",
            "routes": {
                "9": {"name": "Shuttle", "type": "tram", "stops": ["X", "Y"]}
            }
        }"#;
        let config = SimulationConfig::from_reader(content.as_bytes()).unwrap();
        config.validate().unwrap();
        assert_eq!(config.fleet_size, 3);
        assert_eq!(config.seed, 7);
        assert_eq!(config.time_step_seconds, 30);
        assert_eq!(config.routes[&RouteId::from("9")].stops, ["X", "Y"]);
        assert_eq!(config.step.at_stop_probability, 0.1);
    }

    #[test]
    fn test_empty_route_table_is_rejected() {
        let mut config = SimulationConfig::default();
        config.routes.clear();
        assert!(matches!(config.validate(), Err(ConfigError::EmptyRouteTable)));
    }

    #[test]
    fn test_missing_speed_range_is_rejected() {
        let mut config = SimulationConfig::default();
        config.speed_ranges.remove(&VehicleType::Tram);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingSpeedRange {
                vehicle_type: VehicleType::Tram,
                ..
            })
        ));
    }

    #[test]
    fn test_empty_stop_list_is_rejected() {
        let mut config = SimulationConfig::default();
        config
            .routes
            .get_mut(&RouteId::from("2"))
            .unwrap()
            .stops
            .clear();
        assert!(matches!(config.validate(), Err(ConfigError::EmptyStopList(_))));
    }

    #[test]
    fn test_bad_probability_is_rejected() {
        let mut config = SimulationConfig::default();
        config.step.delay_probability = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidProbability {
                name: "delay_probability",
                ..
            })
        ));
    }

    #[test]
    fn test_huge_jitter_is_rejected() {
        let mut config = SimulationConfig::default();
        config.origin.jitter = 1e308;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OffsetOverflow {
                name: "origin.jitter",
                ..
            })
        ));
        config.origin.jitter = 1.0;
        config.validate().unwrap();
    }

    #[test]
    fn test_huge_movement_scale_is_rejected() {
        let mut config = SimulationConfig::default();
        config.step.movement_scale = 1e307;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OffsetOverflow {
                name: "movement_scale",
                ..
            })
        ));

        // The limit depends on the fastest vehicle type.
        let mut config = SimulationConfig::default();
        config.step.movement_scale = 1e300;
        config.validate().unwrap();
        config.speed_ranges.insert(
            VehicleType::Train,
            SpeedRange {
                min: 20.0,
                max: 1e10,
            },
        );
        assert!(matches!(config.validate(), Err(ConfigError::OffsetOverflow { .. })));
    }

    #[test]
    fn test_unrepresentable_start_is_rejected() {
        let mut config = SimulationConfig::default();
        config.start_time = NaiveDateTime::MAX;
        assert!(matches!(config.validate(), Err(ConfigError::TimeOutOfRange { step: 1 })));
    }
}
