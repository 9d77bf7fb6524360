use std::path::PathBuf;
use std::time::Instant;

use chrono::NaiveDateTime;
use log::info;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::clock::simulation_time;
use crate::config::SimulationConfig;
use crate::error::{ConfigError, GeneratorError};
use crate::fleet::initialize_fleet;
use crate::random::event_id;
use crate::sink::{OutputFormat, PartitionedFileSink, SnapshotSink, VEHICLE_ENTITY};
use crate::snapshot::SnapshotRecord;
use crate::step::{StepModel, StepOutcome};
use crate::vehicle::Vehicle;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepSummary {
    pub vehicles: usize,
    pub at_stop: usize,
    pub mean_occupancy: f64,
    pub mean_delay: f64,
}

/// Owns the fleet and the seeded generator and advances both one step at a time.
pub struct TransitVehicleGenerator {
    config: SimulationConfig,
    model: StepModel,
    vehicles: Vec<Vehicle>,
    current_step: u64,
    rng: ChaCha8Rng,
}

impl TransitVehicleGenerator {
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self::with_rng(config, rng)
    }

    pub fn with_rng(config: SimulationConfig, mut rng: ChaCha8Rng) -> Result<Self, ConfigError> {
        config.validate()?;
        let model = StepModel::new(config.step)?;
        let vehicles = initialize_fleet(&config, &mut rng)?;
        Ok(TransitVehicleGenerator {
            config,
            model,
            vehicles,
            current_step: 0,
            rng,
        })
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn current_step(&self) -> u64 {
        self.current_step
    }

    fn time_at(&self, step: u64) -> Result<NaiveDateTime, ConfigError> {
        simulation_time(self.config.start_time, step, self.config.time_step_seconds)
            .ok_or(ConfigError::TimeOutOfRange { step })
    }

    /// Advances the simulation by one step and returns the snapshot of the whole fleet.
    /// Fails without touching the fleet when the step's timestamp is out of range.
    pub fn advance(
        &mut self,
    ) -> Result<(NaiveDateTime, Vec<SnapshotRecord>, StepSummary), ConfigError> {
        let time = self.time_at(self.current_step.saturating_add(1))?;
        self.current_step += 1;

        let mut at_stop = 0;
        for vehicle in &mut self.vehicles {
            let route = &self.config.routes[&vehicle.route_id];
            let speed_range = self.config.speed_ranges[&route.vehicle_type];
            let outcome = self
                .model
                .step_vehicle(vehicle, route, speed_range, time, &mut self.rng);
            if outcome == StepOutcome::AtStop {
                at_stop += 1;
            }
        }

        let records = self
            .vehicles
            .iter()
            .map(|vehicle| SnapshotRecord::capture(vehicle, time, event_id(&mut self.rng)))
            .collect::<Vec<_>>();

        let count = self.vehicles.len().max(1) as f64;
        let total_occupancy: f64 = self.vehicles.iter().map(|it| it.occupancy as f64).sum();
        let total_delay: f64 = self.vehicles.iter().map(|it| it.delay as f64).sum();
        let summary = StepSummary {
            vehicles: self.vehicles.len(),
            at_stop,
            mean_occupancy: total_occupancy / count,
            mean_delay: total_delay / count,
        };
        Ok((time, records, summary))
    }

    /// Runs `steps` steps, handing every batch to `sink`. Returns the step counter reached.
    /// A horizon past the representable date range is rejected before the first step.
    pub fn generate(
        &mut self,
        steps: u64,
        sink: &mut impl SnapshotSink,
    ) -> Result<u64, GeneratorError> {
        self.time_at(self.current_step.saturating_add(steps))?;
        for _ in 0..steps {
            let (time, records, summary) = self.advance()?;
            sink.write_batch(time, &records)
                .map_err(|source| GeneratorError::Sink {
                    step: self.current_step,
                    completed_steps: self.current_step - 1,
                    source,
                })?;
            info!(
                "Generated data for {} vehicles at step {} \
                 ({} at a stop, mean occupancy {:.2}, mean delay {:.1}s)",
                summary.vehicles,
                self.current_step,
                summary.at_stop,
                summary.mean_occupancy,
                summary.mean_delay
            );
        }
        Ok(self.current_step)
    }
}

/// Builds the fleet once and writes `steps` partitioned batches below `output_dir`.
/// Returns the number of steps completed and the directory holding the batches.
pub fn generate_to_directory(
    config: SimulationConfig,
    output_dir: PathBuf,
    steps: u64,
    format: OutputFormat,
) -> Result<(u64, PathBuf), GeneratorError> {
    let start = Instant::now();
    let mut generator = TransitVehicleGenerator::new(config)?;
    let mut sink = PartitionedFileSink::new(output_dir, VEHICLE_ENTITY, format);
    let completed = generator.generate(steps, &mut sink)?;
    info!(
        "Wrote {} batches in {:.2}s",
        completed,
        start.elapsed().as_secs_f64()
    );
    Ok((completed, sink.entity_dir()))
}
