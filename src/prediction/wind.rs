/// wind observed or forecast at a single altitude
#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize)]
pub struct WindSample {
    /// meters above mean sea level
    pub altitude: f64,
    /// meters per second
    pub speed: f64,
    /// degrees clockwise from north that the wind is blowing FROM
    pub direction: f64,
}

impl WindSample {
    pub fn new(altitude: f64, speed: f64, direction: f64) -> Self {
        Self {
            altitude,
            speed,
            direction,
        }
    }
}

/// how wind direction is interpolated between two profile samples
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionInterpolation {
    /// arithmetic on raw degrees; 350° and 10° meet at 180°
    #[default]
    Linear,
    /// along the shorter arc; 350° and 10° meet at 0°
    Circular,
}

/// altitude-indexed wind profile, strictly ascending by altitude
#[derive(Clone, Debug, PartialEq)]
pub struct WindField {
    samples: Vec<WindSample>,
    interpolation: DirectionInterpolation,
    model_time: Option<String>,
}

impl WindField {
    pub fn new(
        samples: Vec<WindSample>,
        model_time: Option<String>,
    ) -> Result<Self, super::PredictionError> {
        if samples.is_empty() {
            return Err(super::PredictionError::Data {
                message: "wind profile has no samples".to_string(),
            });
        }

        for sample in &samples {
            if !sample.altitude.is_finite() {
                return Err(super::PredictionError::Data {
                    message: format!("wind sample altitude is not finite ({})", sample.altitude),
                });
            }
            if !sample.speed.is_finite() || sample.speed < 0.0 {
                return Err(super::PredictionError::Data {
                    message: format!(
                        "wind speed at {} m is invalid ({} m/s)",
                        sample.altitude, sample.speed
                    ),
                });
            }
            if !(0.0..=360.0).contains(&sample.direction) {
                return Err(super::PredictionError::Data {
                    message: format!(
                        "wind direction at {} m is outside 0-360 degrees ({})",
                        sample.altitude, sample.direction
                    ),
                });
            }
        }

        for pair in samples.windows(2) {
            if pair[1].altitude <= pair[0].altitude {
                return Err(super::PredictionError::Data {
                    message: format!(
                        "wind profile altitudes must be strictly ascending; {} m follows {} m",
                        pair[1].altitude, pair[0].altitude
                    ),
                });
            }
        }

        Ok(Self {
            samples,
            interpolation: DirectionInterpolation::default(),
            model_time,
        })
    }

    pub fn with_interpolation(mut self, interpolation: DirectionInterpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    pub fn samples(&self) -> &[WindSample] {
        &self.samples
    }

    pub fn interpolation(&self) -> DirectionInterpolation {
        self.interpolation
    }

    /// timestamp of the weather model run the profile came from, if known
    pub fn model_time(&self) -> Option<&str> {
        self.model_time.as_deref()
    }

    /// interpolated `(speed, direction)` at the given altitude (m AMSL),
    /// clamped to the lowest / highest sample outside the profile
    pub fn wind_at(&self, altitude: f64) -> (f64, f64) {
        let index = self
            .samples
            .partition_point(|sample| sample.altitude <= altitude);

        if index == 0 {
            let lowest = &self.samples[0];
            return (lowest.speed, lowest.direction);
        }
        if index == self.samples.len() {
            let highest = &self.samples[index - 1];
            return (highest.speed, highest.direction);
        }

        let lower = &self.samples[index - 1];
        let upper = &self.samples[index];
        let fraction = (altitude - lower.altitude) / (upper.altitude - lower.altitude);

        let speed = lower.speed + fraction * (upper.speed - lower.speed);
        let direction = match self.interpolation {
            DirectionInterpolation::Linear => {
                lower.direction + fraction * (upper.direction - lower.direction)
            }
            DirectionInterpolation::Circular => {
                let difference = (upper.direction - lower.direction + 540.0).rem_euclid(360.0) - 180.0;
                (lower.direction + fraction * difference).rem_euclid(360.0)
            }
        };

        (speed, direction)
    }
}
