use std::path::PathBuf;

use crate::{route::RouteId, vehicle::VehicleType};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("route table is empty")]
    EmptyRouteTable,
    #[error("route {0} has no stops")]
    EmptyStopList(RouteId),
    #[error("route {route} uses vehicle type {vehicle_type} which has no speed range")]
    MissingSpeedRange {
        route: RouteId,
        vehicle_type: VehicleType,
    },
    #[error("speed range for {vehicle_type} is invalid: min {min}, max {max}")]
    InvalidSpeedRange {
        vehicle_type: VehicleType,
        min: f64,
        max: f64,
    },
    #[error("{name} must be a probability in [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f64 },
    #[error("{name} must be finite and non-negative, got {value}")]
    InvalidMagnitude { name: &'static str, value: f64 },
    #[error("{name} = {value} makes the range of random offsets overflow")]
    OffsetOverflow { name: &'static str, value: f64 },
    #[error("time step must be at least one second")]
    ZeroTimeStep,
    #[error("step {step} lies beyond the representable date range")]
    TimeOutOfRange { step: u64 },
    #[error("could not read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error("i/o failure at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum GeneratorError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("writing step {step} failed after {completed_steps} completed steps")]
    Sink {
        step: u64,
        completed_steps: u64,
        #[source]
        source: SinkError,
    },
}
