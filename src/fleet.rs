use log::{debug, info};
use rand::Rng;

use crate::config::SimulationConfig;
use crate::error::ConfigError;
use crate::random::uniform_rounded;
use crate::vehicle::{Direction, ServiceStatus, Vehicle, VehicleId, MAX_OCCUPANCY, MIN_OCCUPANCY};

const POSITION_PRECISION: i32 = 6;

/// Creates `config.fleet_size` vehicles, each placed on a uniformly chosen route.
pub fn initialize_fleet(
    config: &SimulationConfig,
    rng: &mut impl Rng,
) -> Result<Vec<Vehicle>, ConfigError> {
    config.validate()?;
    let routes = config.routes.iter().collect::<Vec<_>>();
    let jitter = config.origin.jitter;

    let vehicles = (0..config.fleet_size as u32)
        .map(|id| {
            let (route_id, route) = routes[rng.random_range(0..routes.len())];
            let current_stop_index = rng.random_range(0..route.stop_count());
            let direction = Direction::Forward;
            let next_stop = route
                .stop(route.next_index(current_stop_index, direction))
                .to_string();
            let latitude = config.origin.latitude
                + uniform_rounded(rng, -jitter, jitter, POSITION_PRECISION);
            let longitude = config.origin.longitude
                + uniform_rounded(rng, -jitter, jitter, POSITION_PRECISION);
            let vehicle = Vehicle {
                id: VehicleId(id),
                vehicle_type: route.vehicle_type,
                route_id: route_id.clone(),
                status: ServiceStatus::InService,
                current_stop_index,
                next_stop,
                direction,
                delay: 0,
                latitude,
                longitude,
                speed: 0.0,
                bearing: rng.random_range(0..360),
                occupancy: rng.random_range(MIN_OCCUPANCY..=MAX_OCCUPANCY),
            };
            debug!(
                "{:?} starts on route {} at stop {} heading to {}",
                vehicle.id,
                vehicle.route_id,
                route.stop(current_stop_index),
                vehicle.next_stop
            );
            vehicle
        })
        .collect::<Vec<_>>();

    info!("Initialized {} simulated vehicles", vehicles.len());
    Ok(vehicles)
}
