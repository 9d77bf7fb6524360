use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::iso_timestamp;
use crate::route::RouteId;
use crate::vehicle::{Direction, ServiceStatus, Vehicle, VehicleId, VehicleType};

/// One vehicle's state at one simulation step. This is the unit written to the sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub vehicle_id: VehicleId,
    pub vehicle_type: VehicleType,
    pub route_id: RouteId,
    pub status: ServiceStatus,
    pub current_stop_index: usize,
    pub next_stop: String,
    pub direction: Direction,
    pub delay: u32,
    pub latitude: f64,
    pub longitude: f64,
    pub speed: f64,
    pub bearing: u16,
    #[serde(rename = "occupancy_status")]
    pub occupancy: u8,
    pub timestamp: String,
    pub event_id: Uuid,
}

impl SnapshotRecord {
    pub fn capture(vehicle: &Vehicle, time: NaiveDateTime, event_id: Uuid) -> Self {
        SnapshotRecord {
            vehicle_id: vehicle.id,
            vehicle_type: vehicle.vehicle_type,
            route_id: vehicle.route_id.clone(),
            status: vehicle.status,
            current_stop_index: vehicle.current_stop_index,
            next_stop: vehicle.next_stop.clone(),
            direction: vehicle.direction,
            delay: vehicle.delay,
            latitude: vehicle.latitude,
            longitude: vehicle.longitude,
            speed: vehicle.speed,
            bearing: vehicle.bearing,
            occupancy: vehicle.occupancy,
            timestamp: iso_timestamp(time),
            event_id,
        }
    }
}
