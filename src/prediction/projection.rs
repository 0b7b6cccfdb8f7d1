// local tangent-plane approximation; fine for a few hundred kilometers of displacement
pub const METERS_PER_DEGREE_LATITUDE: f64 = 111_320.0;
pub const EQUATORIAL_CIRCUMFERENCE: f64 = 40_075_000.0;

/// beyond this latitude the meridians converge too fast for the approximation
pub const POLAR_LIMIT: f64 = 89.9;

/// horizontal velocity `(east, north)` in m/s of a meteorological wind (direction blowing FROM)
pub fn wind_components(speed: f64, direction: f64) -> (f64, f64) {
    let direction = direction.to_radians();
    (-speed * direction.sin(), -speed * direction.cos())
}

/// displace a coordinate by `east` and `north` meters
pub fn project(
    coord: &geo::Coord,
    east: f64,
    north: f64,
) -> Result<geo::Coord, super::PredictionError> {
    if !coord.y.is_finite() || coord.y.abs() > POLAR_LIMIT {
        return Err(super::PredictionError::GeodesicSingularity { latitude: coord.y });
    }

    let latitude = coord.y + north / METERS_PER_DEGREE_LATITUDE;
    let longitude = coord.x
        + east / (EQUATORIAL_CIRCUMFERENCE * coord.y.to_radians().cos() / 360.0);

    if !latitude.is_finite() || latitude.abs() > 90.0 {
        return Err(super::PredictionError::GeodesicSingularity { latitude });
    }

    Ok(geo::coord! { x: wrap_longitude(longitude), y: latitude })
}

/// wrap a longitude into [-180, 180)
pub fn wrap_longitude(longitude: f64) -> f64 {
    if (-180.0..180.0).contains(&longitude) {
        longitude
    } else {
        (longitude + 180.0).rem_euclid(360.0) - 180.0
    }
}
