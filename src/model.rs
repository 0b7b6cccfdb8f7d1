/// height above ground (m) below which the payload always descends at the minimum rate
pub const FLARE_HEIGHT: f64 = 100.0;

/// piecewise-linear descent rate as a function of height above ground
///
/// full `base_rate` above `knee_height`, tapering linearly down to `min_rate` at 100 m AGL,
/// and floored at `min_rate` below that (canopy flare)
#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize)]
#[serde(try_from = "DescentRates")]
pub struct DescentProfile {
    base_rate: f64,
    min_rate: f64,
    knee_height: f64,
}

impl DescentProfile {
    pub fn new(
        base_rate: f64,
        min_rate: f64,
        knee_height: f64,
    ) -> Result<Self, crate::prediction::PredictionError> {
        if !(base_rate.is_finite() && min_rate.is_finite() && knee_height.is_finite()) {
            return Err(crate::prediction::PredictionError::Configuration {
                message: format!(
                    "descent rates must be finite numbers; got base rate {base_rate}, minimum rate {min_rate}, knee height {knee_height}"
                ),
            });
        }
        if min_rate <= 0.0 {
            return Err(crate::prediction::PredictionError::Configuration {
                message: format!("minimum descent rate must be positive; got {min_rate} m/s"),
            });
        }
        if min_rate > base_rate {
            return Err(crate::prediction::PredictionError::Configuration {
                message: format!(
                    "minimum descent rate ({min_rate} m/s) exceeds base descent rate ({base_rate} m/s)"
                ),
            });
        }
        if knee_height <= FLARE_HEIGHT {
            return Err(crate::prediction::PredictionError::Configuration {
                message: format!(
                    "knee height must be above {FLARE_HEIGHT} m AGL; got {knee_height} m"
                ),
            });
        }

        Ok(Self {
            base_rate,
            min_rate,
            knee_height,
        })
    }

    pub fn base_rate(&self) -> f64 {
        self.base_rate
    }

    pub fn min_rate(&self) -> f64 {
        self.min_rate
    }

    pub fn knee_height(&self) -> f64 {
        self.knee_height
    }

    /// instantaneous descent speed (m/s, positive down) at the given height above ground
    pub fn sink_rate(&self, altitude_agl: f64) -> f64 {
        if altitude_agl > self.knee_height {
            self.base_rate
        } else if altitude_agl > FLARE_HEIGHT {
            self.min_rate
                + (altitude_agl - FLARE_HEIGHT) / (self.knee_height - FLARE_HEIGHT)
                    * (self.base_rate - self.min_rate)
        } else {
            self.min_rate
        }
    }

    /// copy of this profile with some parameters replaced, validated again
    pub fn with_overrides(
        &self,
        base_rate: Option<f64>,
        min_rate: Option<f64>,
        knee_height: Option<f64>,
    ) -> Result<Self, crate::prediction::PredictionError> {
        Self::new(
            base_rate.unwrap_or(self.base_rate),
            min_rate.unwrap_or(self.min_rate),
            knee_height.unwrap_or(self.knee_height),
        )
    }
}

#[derive(serde::Deserialize)]
struct DescentRates {
    base_rate: f64,
    min_rate: f64,
    knee_height: f64,
}

impl TryFrom<DescentRates> for DescentProfile {
    type Error = crate::prediction::PredictionError;

    fn try_from(rates: DescentRates) -> Result<Self, Self::Error> {
        Self::new(rates.base_rate, rates.min_rate, rates.knee_height)
    }
}
