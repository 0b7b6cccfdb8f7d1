pub mod integrator;
pub mod projection;
pub mod wind;

pub use integrator::Direction;

lazy_static::lazy_static! {
    /// hard ceiling on the number of integration steps of a single simulation
    pub static ref MAXIMUM_STEPS: usize = 10_000_000;
}

custom_error::custom_error! {pub PredictionError
    Configuration { message: String } = "invalid configuration: {message}",
    Data { message: String } = "invalid wind data: {message}",
    Divergence { steps: usize, limit: usize } = "descent did not reach the ground within {steps} steps (limit {limit})",
    GeodesicSingularity { latitude: f64 } = "local projection is undefined at latitude {latitude}",
}

/// computed descent path and its duration in seconds
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationResult {
    pub path: crate::location::track::DescentTrack,
    pub total_time: f64,
}

impl SimulationResult {
    pub fn release(&self) -> Option<&crate::location::DescentLocation> {
        self.path.first()
    }

    pub fn landing(&self) -> Option<&crate::location::DescentLocation> {
        self.path.last()
    }

    pub fn total_duration(&self) -> chrono::Duration {
        chrono::Duration::milliseconds((self.total_time * 1000.0).round() as i64)
    }

    pub fn to_geojson(&self, name: &str) -> geojson::FeatureCollection {
        self.path.to_geojson(name)
    }
}

/// drift a payload released at `start` (`start_altitude` m AMSL) down to sea level
pub fn simulate(
    start: &geo::Coord,
    start_altitude: f64,
    profile: &crate::model::DescentProfile,
    wind: &wind::WindField,
    terrain: &dyn crate::connection::TerrainModel,
    time_step: f64,
) -> Result<SimulationResult, PredictionError> {
    let limit = step_limit(start, start_altitude, profile, time_step)?;
    let locations = descend(
        crate::location::DescentLocation::new(*start, start_altitude),
        profile,
        wind,
        terrain,
        time_step,
        Direction::Forward,
        limit,
    )?;

    let steps = locations.len() - 1;
    if let Some(landing) = locations.last() {
        log::debug!(
            "forward simulation landed at ({:.5}, {:.5}) after {:} steps",
            landing.coord.x,
            landing.coord.y,
            steps,
        );
    }

    Ok(SimulationResult {
        path: crate::location::track::DescentTrack::new(locations),
        total_time: steps as f64 * time_step,
    })
}

/// estimate where a payload must be released (at `target_altitude` m AMSL) to land at `target`
///
/// Steps upwind from the target and reverses the result, so the path starts at the
/// required release point and ends at the target. Exact only for altitude-invariant wind.
pub fn project_reverse(
    target: &geo::Coord,
    target_altitude: f64,
    profile: &crate::model::DescentProfile,
    wind: &wind::WindField,
    terrain: &dyn crate::connection::TerrainModel,
    time_step: f64,
) -> Result<SimulationResult, PredictionError> {
    let limit = step_limit(target, target_altitude, profile, time_step)?;
    let reversed = descend(
        crate::location::DescentLocation::new(*target, target_altitude),
        profile,
        wind,
        terrain,
        time_step,
        Direction::Reverse,
        limit,
    )?;

    // positions run release -> target, altitude and time keep their physical order
    let count = reversed.len();
    let locations: Vec<crate::location::DescentLocation> = (0..count)
        .map(|index| crate::location::DescentLocation {
            coord: reversed[count - 1 - index].coord,
            altitude: reversed[index].altitude,
            elapsed: reversed[index].elapsed,
        })
        .collect();

    let steps = count - 1;
    if let Some(release) = locations.first() {
        log::debug!(
            "reverse projection placed release at ({:.5}, {:.5}) after {:} steps",
            release.coord.x,
            release.coord.y,
            steps,
        );
    }

    Ok(SimulationResult {
        path: crate::location::track::DescentTrack::new(locations),
        total_time: steps as f64 * time_step,
    })
}

/// validate inputs and bound the number of steps a descent may take
fn step_limit(
    start: &geo::Coord,
    start_altitude: f64,
    profile: &crate::model::DescentProfile,
    time_step: f64,
) -> Result<usize, PredictionError> {
    if !time_step.is_finite() || time_step <= 0.0 {
        return Err(PredictionError::Configuration {
            message: format!("time step must be a positive number of seconds; got {time_step}"),
        });
    }
    if !start_altitude.is_finite() || start_altitude <= 0.0 {
        return Err(PredictionError::Configuration {
            message: format!("start altitude must be above sea level; got {start_altitude} m"),
        });
    }
    crate::location::validate_coord(start)?;

    // the sink rate never falls below the minimum rate
    let required = (start_altitude / (profile.min_rate() * time_step)).ceil();
    if required >= *MAXIMUM_STEPS as f64 {
        return Err(PredictionError::Configuration {
            message: format!(
                "descent from {start_altitude} m would take more than {} steps of {time_step} s",
                *MAXIMUM_STEPS
            ),
        });
    }

    Ok(required as usize + 1)
}

/// step from `start` until the altitude reaches sea level
fn descend(
    start: crate::location::DescentLocation,
    profile: &crate::model::DescentProfile,
    wind: &wind::WindField,
    terrain: &dyn crate::connection::TerrainModel,
    time_step: f64,
    direction: Direction,
    limit: usize,
) -> Result<Vec<crate::location::DescentLocation>, PredictionError> {
    let mut locations = vec![start];
    let mut current = start;

    while current.altitude > 0.0 {
        let steps = locations.len() - 1;
        if steps >= limit {
            return Err(PredictionError::Divergence { steps, limit });
        }

        let next = integrator::step(&current, time_step, wind, profile, terrain, direction)?;
        // NaN or non-positive sink rates would never reach the ground
        if !(next.altitude < current.altitude) {
            return Err(PredictionError::Divergence {
                steps: steps + 1,
                limit,
            });
        }

        locations.push(next);
        current = next;
    }

    Ok(locations)
}
