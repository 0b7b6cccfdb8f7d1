/// sign of the horizontal displacement applied at each step
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// drift downwind, from release towards landing
    #[default]
    Forward,
    /// drift upwind, from landing back towards release
    Reverse,
}

/// advance a descent state by one time step (seconds)
///
/// The payload first descends at the sink rate for its current height above ground,
/// then drifts with the wind found at the *new* altitude.
pub fn step(
    state: &crate::location::DescentLocation,
    time_step: f64,
    wind: &super::wind::WindField,
    profile: &crate::model::DescentProfile,
    terrain: &dyn crate::connection::TerrainModel,
    direction: Direction,
) -> Result<crate::location::DescentLocation, super::PredictionError> {
    let altitude_agl = state.altitude - terrain.terrain_height(&state.coord);
    let sink_rate = profile.sink_rate(altitude_agl);
    let altitude = state.altitude - sink_rate * time_step;

    let (speed, wind_direction) = wind.wind_at(altitude);
    let (mut east, mut north) = super::projection::wind_components(speed, wind_direction);
    if direction == Direction::Reverse {
        east = -east;
        north = -north;
    }

    let coord = super::projection::project(&state.coord, east * time_step, north * time_step)?;

    Ok(crate::location::DescentLocation {
        coord,
        altitude,
        elapsed: state.elapsed + time_step,
    })
}
