use serde_with::serde_as;

#[derive(serde::Deserialize, Debug, PartialEq)]
#[serde(untagged)]
pub enum PredictionConfiguration {
    Single(Prediction),
    Cloud {
        default: Prediction,
        perturbations: std::collections::HashMap<String, Perturbation>,
    },
}

impl PredictionConfiguration {
    pub fn default_prediction(&self) -> &Prediction {
        match self {
            Self::Single(prediction) => prediction,
            Self::Cloud { default, .. } => default,
        }
    }

    /// perturbations ordered by name; empty for a single prediction
    pub fn perturbations(&self) -> Vec<(&String, &Perturbation)> {
        match self {
            Self::Single(_) => vec![],
            Self::Cloud { perturbations, .. } => {
                let mut perturbations: Vec<(&String, &Perturbation)> =
                    perturbations.iter().collect();
                perturbations.sort_by(|a, b| a.0.cmp(b.0));
                perturbations
            }
        }
    }
}

fn default_time_step() -> chrono::Duration {
    *crate::DEFAULT_TIME_STEP
}

#[serde_as]
#[derive(serde::Deserialize, PartialEq, Debug)]
pub struct Prediction {
    #[serde(default)]
    pub mode: crate::prediction::Direction,
    pub start: StartLocation,
    pub profile: crate::model::DescentProfile,
    #[serde(default = "default_time_step")]
    #[serde_as(as = "serde_with::DurationSecondsWithFrac<f64>")]
    pub time_step: chrono::Duration,
    #[serde(default)]
    pub direction_interpolation: crate::prediction::wind::DirectionInterpolation,
    pub wind: WindSource,
    #[serde(default)]
    pub terrain: crate::connection::Terrain,
}

impl Prediction {
    pub fn time_step_seconds(&self) -> f64 {
        duration_seconds(self.time_step)
    }

    /// fetch the wind profile at the start location and build a validated wind field
    pub fn wind_field(
        &self,
    ) -> Result<crate::prediction::wind::WindField, crate::run::RunError> {
        let (coord, _) = self.start.to_coord()?;
        let profile = self.wind.retrieve_wind_profile(&coord)?;
        Ok(profile
            .into_wind_field()?
            .with_interpolation(self.direction_interpolation))
    }
}

fn duration_seconds(duration: chrono::Duration) -> f64 {
    match duration.num_microseconds() {
        Some(microseconds) => microseconds as f64 / 1e6,
        None => duration.num_milliseconds() as f64 / 1e3,
    }
}

/// `[longitude, latitude, altitude]`; coordinates may be written as `8.55E` / `47.37N`
#[derive(serde::Deserialize, PartialEq, Debug)]
pub struct StartLocation {
    pub location: Vec<crate::parse::CoordinateValue>,
}

impl StartLocation {
    pub fn to_coord(&self) -> Result<(geo::Coord, f64), crate::parse::ParseError> {
        if self.location.len() != 3 {
            return Err(crate::parse::ParseError::InvalidLocation {
                message: format!(
                    "start location needs longitude, latitude and altitude; got {:} values",
                    self.location.len()
                ),
            });
        }

        let x = self.location[0].to_degrees(crate::parse::Axis::Longitude)?;
        let y = self.location[1].to_degrees(crate::parse::Axis::Latitude)?;
        let altitude = match &self.location[2] {
            crate::parse::CoordinateValue::Number(altitude) => *altitude,
            crate::parse::CoordinateValue::Text(value) => {
                value
                    .trim()
                    .trim_end_matches('m')
                    .trim()
                    .parse::<f64>()
                    .map_err(|error| crate::parse::ParseError::InvalidLocation {
                        message: format!("altitude {value:?} is not a number; {error}"),
                    })?
            }
        };

        Ok((geo::coord! { x: x, y: y }, altitude))
    }
}

#[derive(serde::Deserialize, PartialEq, Debug)]
#[serde(rename_all = "snake_case")]
pub enum WindSource {
    Samples(Vec<crate::prediction::wind::WindSample>),
    File(crate::connection::file::WindProfileFile),
    OpenMeteo(crate::connection::open_meteo::OpenMeteoQuery),
}

impl WindSource {
    pub fn retrieve_wind_profile(
        &self,
        coord: &geo::Coord,
    ) -> Result<crate::connection::WindProfile, crate::connection::ConnectionError> {
        match self {
            Self::Samples(samples) => Ok(crate::connection::WindProfile {
                samples: samples.to_owned(),
                model_time: None,
            }),
            Self::File(file) => file.read_wind_profile(),
            Self::OpenMeteo(query) => query.retrieve_wind_profile(coord),
        }
    }
}

/// parameters that differ from the default prediction
#[serde_as]
#[derive(serde::Deserialize, PartialEq, Debug, Default, Clone)]
pub struct Perturbation {
    pub base_rate: Option<f64>,
    pub min_rate: Option<f64>,
    pub knee_height: Option<f64>,
    /// release (or target) altitude, m AMSL
    pub altitude: Option<f64>,
    #[serde(default)]
    #[serde_as(as = "Option<serde_with::DurationSecondsWithFrac<f64>>")]
    pub time_step: Option<chrono::Duration>,
}

impl Perturbation {
    pub fn apply(
        &self,
        profile: &crate::model::DescentProfile,
        altitude: f64,
        time_step: f64,
    ) -> Result<(crate::model::DescentProfile, f64, f64), crate::prediction::PredictionError> {
        Ok((
            profile.with_overrides(self.base_rate, self.min_rate, self.knee_height)?,
            self.altitude.unwrap_or(altitude),
            self.time_step.map(duration_seconds).unwrap_or(time_step),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_prediction() {
        let configuration: PredictionConfiguration = serde_yaml::from_str(
            r#"
            start:
              location: [8.55, 47.37, 6000.0]
            profile:
              base_rate: 4.5
              min_rate: 0.5
              knee_height: 300.0
            wind:
              samples:
                - { altitude: 0, speed: 5, direction: 270 }
            "#,
        )
        .unwrap();

        assert!(configuration.perturbations().is_empty());

        let prediction = configuration.default_prediction();
        assert_eq!(prediction.mode, crate::prediction::Direction::Forward);
        assert_eq!(prediction.time_step, chrono::Duration::seconds(10));
        assert_eq!(prediction.time_step_seconds(), 10.0);
        assert_eq!(
            prediction.direction_interpolation,
            crate::prediction::wind::DirectionInterpolation::Linear
        );
        assert_eq!(prediction.terrain, crate::connection::Terrain::SeaLevel);
        assert_eq!(
            prediction.start.to_coord().unwrap(),
            (geo::coord! { x: 8.55, y: 47.37 }, 6000.0)
        );

        let wind = prediction.wind_field().unwrap();
        assert_eq!(
            wind.interpolation(),
            crate::prediction::wind::DirectionInterpolation::Linear
        );
        assert_eq!(wind.wind_at(3000.0), (5.0, 270.0));
    }

    #[test]
    fn test_cloud_prediction() {
        let configuration: PredictionConfiguration = serde_yaml::from_str(
            r#"
            default:
              mode: reverse
              start:
                location: [8.55E, 47.37N, 6000]
              profile: { base_rate: 4.5, min_rate: 0.5, knee_height: 300 }
              time_step: 2.5
              direction_interpolation: circular
              wind:
                samples:
                  - { altitude: 0, speed: 5, direction: 270 }
              terrain:
                constant: 408
            perturbations:
              slow:
                base_rate: 3.5
              high:
                altitude: 8000
                time_step: 5
            "#,
        )
        .unwrap();

        let prediction = configuration.default_prediction();
        assert_eq!(prediction.mode, crate::prediction::Direction::Reverse);
        assert_eq!(prediction.time_step_seconds(), 2.5);
        assert_eq!(
            prediction.wind_field().unwrap().interpolation(),
            crate::prediction::wind::DirectionInterpolation::Circular
        );
        assert_eq!(prediction.terrain, crate::connection::Terrain::Constant(408.0));
        assert_eq!(
            prediction.start.to_coord().unwrap(),
            (geo::coord! { x: 8.55, y: 47.37 }, 6000.0)
        );

        let perturbations = configuration.perturbations();
        assert_eq!(perturbations.len(), 2);
        assert_eq!(perturbations[0].0, "high");
        assert_eq!(perturbations[1].0, "slow");

        let (profile, altitude, time_step) = perturbations[0]
            .1
            .apply(&prediction.profile, 6000.0, 2.5)
            .unwrap();
        assert_eq!(profile, prediction.profile);
        assert_eq!(altitude, 8000.0);
        assert_eq!(time_step, 5.0);

        let (profile, altitude, time_step) = perturbations[1]
            .1
            .apply(&prediction.profile, 6000.0, 2.5)
            .unwrap();
        assert_eq!(profile.base_rate(), 3.5);
        assert_eq!(altitude, 6000.0);
        assert_eq!(time_step, 2.5);
    }

    #[test]
    fn test_invalid_perturbation() {
        let profile = crate::model::DescentProfile::new(4.5, 0.5, 300.0).unwrap();
        let perturbation = Perturbation {
            min_rate: Some(5.0),
            ..Default::default()
        };

        assert!(matches!(
            perturbation.apply(&profile, 6000.0, 10.0),
            Err(crate::prediction::PredictionError::Configuration { .. })
        ));
    }

    #[test]
    fn test_invalid_start_location() {
        let start: StartLocation = serde_yaml::from_str("location: [8.55, 47.37]").unwrap();
        assert!(start.to_coord().is_err());

        let start: StartLocation =
            serde_yaml::from_str("location: [47.37N, 8.55E, 6000]").unwrap();
        assert!(start.to_coord().is_err());
    }

    #[test]
    fn test_invalid_profile() {
        let result: Result<Prediction, _> = serde_yaml::from_str(
            r#"
            start: { location: [8.55, 47.37, 6000] }
            profile: { base_rate: 4.5, min_rate: 0.5, knee_height: 50 }
            wind: { samples: [ { altitude: 0, speed: 5, direction: 270 } ] }
            "#,
        );
        assert!(result.is_err());
    }
}
