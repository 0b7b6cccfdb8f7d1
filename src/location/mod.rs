pub mod track;

/// state of a descending payload at one instant of a simulation
#[derive(Clone, Copy, Debug)]
pub struct DescentLocation {
    /// `x` is longitude, `y` is latitude, both in decimal degrees
    pub coord: geo::Coord,
    /// meters above mean sea level
    pub altitude: f64,
    /// seconds since the start of the descent
    pub elapsed: f64,
}

impl DescentLocation {
    pub fn new(coord: geo::Coord, altitude: f64) -> Self {
        Self {
            coord,
            altitude,
            elapsed: 0.0,
        }
    }

    pub fn point(&self) -> geo::Point {
        geo::Point::from(self.coord)
    }

    pub fn elapsed_duration(&self) -> chrono::Duration {
        chrono::Duration::milliseconds((self.elapsed * 1000.0).round() as i64)
    }
}

impl PartialEq for DescentLocation {
    fn eq(&self, other: &Self) -> bool {
        crate::parse::approx_equal(self.coord.x, other.coord.x, 6)
            && crate::parse::approx_equal(self.coord.y, other.coord.y, 6)
            && crate::parse::approx_equal(self.altitude, other.altitude, 3)
            && crate::parse::approx_equal(self.elapsed, other.elapsed, 3)
    }
}

/// whether a coordinate is a valid WGS84 position
pub fn validate_coord(coord: &geo::Coord) -> Result<(), crate::prediction::PredictionError> {
    if !coord.y.is_finite() || !(-90.0..=90.0).contains(&coord.y) {
        return Err(crate::prediction::PredictionError::Configuration {
            message: format!("latitude {} is outside [-90, 90]", coord.y),
        });
    }
    if !coord.x.is_finite() || !(-180.0..=180.0).contains(&coord.x) {
        return Err(crate::prediction::PredictionError::Configuration {
            message: format!("longitude {} is outside [-180, 180]", coord.x),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_coord() {
        assert!(validate_coord(&geo::coord! { x: 8.55, y: 47.37 }).is_ok());
        assert!(validate_coord(&geo::coord! { x: -180.0, y: -90.0 }).is_ok());
        assert!(validate_coord(&geo::coord! { x: 8.55, y: 91.0 }).is_err());
        assert!(validate_coord(&geo::coord! { x: 181.0, y: 47.37 }).is_err());
        assert!(validate_coord(&geo::coord! { x: f64::NAN, y: 47.37 }).is_err());
    }

    #[test]
    fn test_elapsed_duration() {
        let mut location = DescentLocation::new(geo::coord! { x: 8.55, y: 47.37 }, 6000.0);
        location.elapsed = 1577.5;

        assert_eq!(
            location.elapsed_duration(),
            chrono::Duration::milliseconds(1_577_500)
        );
    }
}
