use chrono::NaiveDateTime;
use log::debug;
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;

use crate::clock::is_rush_hour;
use crate::config::StepParams;
use crate::error::ConfigError;
use crate::random::uniform_rounded;
use crate::route::{Route, SpeedRange};
use crate::vehicle::{Direction, Vehicle, MAX_OCCUPANCY, MIN_OCCUPANCY};

const RUSH_HOUR_DELTAS: [i8; 4] = [-1, 0, 1, 2];
const RUSH_HOUR_WEIGHTS: [f64; 4] = [0.1, 0.2, 0.5, 0.2];
const OFF_PEAK_DELTAS: [i8; 3] = [-1, 0, 1];
const OFF_PEAK_WEIGHTS: [f64; 3] = [0.4, 0.4, 0.2];

const MAX_NEW_DELAY: u32 = 120;
const MAX_DELAY_RECOVERY: u32 = 30;
const MAX_BEARING_CHANGE: i32 = 20;

const SPEED_PRECISION: i32 = 2;
const POSITION_PRECISION: i32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    AtStop,
    Moving,
}

/// Per-step state transition of a single vehicle.
pub struct StepModel {
    params: StepParams,
    rush_hour: WeightedIndex<f64>,
    off_peak: WeightedIndex<f64>,
}

impl StepModel {
    pub fn new(params: StepParams) -> Result<Self, ConfigError> {
        let table = |weights: &[f64]| {
            WeightedIndex::new(weights.iter().copied())
                .map_err(|_| ConfigError::InvalidMagnitude {
                    name: "occupancy weights",
                    value: weights.iter().sum(),
                })
        };
        Ok(StepModel {
            params,
            rush_hour: table(&RUSH_HOUR_WEIGHTS)?,
            off_peak: table(&OFF_PEAK_WEIGHTS)?,
        })
    }

    /// Decides whether the vehicle is at a stop or moving and applies the matching update.
    pub fn step_vehicle(
        &self,
        vehicle: &mut Vehicle,
        route: &Route,
        speed_range: SpeedRange,
        time: NaiveDateTime,
        rng: &mut impl Rng,
    ) -> StepOutcome {
        if rng.random_bool(self.params.at_stop_probability) {
            self.arrive_at_stop(vehicle, route, is_rush_hour(time), rng);
            StepOutcome::AtStop
        } else {
            self.drive(vehicle, speed_range, rng);
            StepOutcome::Moving
        }
    }

    pub fn arrive_at_stop(
        &self,
        vehicle: &mut Vehicle,
        route: &Route,
        rush_hour: bool,
        rng: &mut impl Rng,
    ) {
        let delta = self.occupancy_delta(rush_hour, rng);
        vehicle.occupancy = (vehicle.occupancy as i8 + delta)
            .clamp(MIN_OCCUPANCY as i8, MAX_OCCUPANCY as i8) as u8;
        vehicle.speed = 0.0;

        // The stop just reached is the one the vehicle was heading to.
        let index = route
            .position_of(&vehicle.next_stop)
            .unwrap_or(vehicle.current_stop_index);
        let bounced = match vehicle.direction {
            Direction::Backward if route.is_first(index) => Some(Direction::Forward),
            Direction::Forward if route.is_last(index) => Some(Direction::Backward),
            _ => None,
        };
        if let Some(direction) = bounced {
            debug!(
                "{:?} reached the end of route {} at {}, turning {:?}",
                vehicle.id, vehicle.route_id, vehicle.next_stop, direction
            );
            vehicle.direction = direction;
        }
        vehicle.next_stop = route
            .stop(route.next_index(index, vehicle.direction))
            .to_string();

        if rng.random_bool(self.params.delay_probability) {
            vehicle.delay += rng.random_range(0..=MAX_NEW_DELAY);
        } else {
            vehicle.delay = vehicle
                .delay
                .saturating_sub(rng.random_range(0..=MAX_DELAY_RECOVERY));
        }
    }

    /// Random walk around the current position. Occupancy and delay are left untouched.
    pub fn drive(&self, vehicle: &mut Vehicle, speed_range: SpeedRange, rng: &mut impl Rng) {
        vehicle.speed = uniform_rounded(rng, speed_range.min, speed_range.max, SPEED_PRECISION);

        let scale = vehicle.speed * self.params.movement_scale;
        vehicle.latitude += uniform_rounded(rng, -scale, scale, POSITION_PRECISION);
        vehicle.longitude += uniform_rounded(rng, -scale, scale, POSITION_PRECISION);

        let turn = rng.random_range(-MAX_BEARING_CHANGE..=MAX_BEARING_CHANGE);
        vehicle.bearing = (vehicle.bearing as i32 + turn).rem_euclid(360) as u16;
    }

    fn occupancy_delta(&self, rush_hour: bool, rng: &mut impl Rng) -> i8 {
        if rush_hour {
            RUSH_HOUR_DELTAS[self.rush_hour.sample(rng)]
        } else {
            OFF_PEAK_DELTAS[self.off_peak.sample(rng)]
        }
    }
}
