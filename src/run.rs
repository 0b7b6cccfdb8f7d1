use rayon::prelude::*;

custom_error::custom_error! {pub RunError
    Prediction { source: crate::prediction::PredictionError } = "{source}",
    Connection { source: crate::connection::ConnectionError } = "{source}",
    Parse { source: crate::parse::ParseError } = "{source}",
    Output { path: String, message: String } = "could not write {path}; {message}",
}

/// outcome of one named prediction in a run
#[derive(Debug)]
pub struct PredictionRun {
    pub name: String,
    pub mode: crate::prediction::Direction,
    pub result: Result<crate::prediction::SimulationResult, crate::prediction::PredictionError>,
}

impl PredictionRun {
    /// the end of the path the run was asked for; landing point forward, release point in reverse
    pub fn solution(&self) -> Option<&crate::location::DescentLocation> {
        match &self.result {
            Ok(result) => match self.mode {
                crate::prediction::Direction::Forward => result.landing(),
                crate::prediction::Direction::Reverse => result.release(),
            },
            Err(_) => None,
        }
    }
}

struct Job<'a> {
    name: String,
    profile: crate::model::DescentProfile,
    altitude: f64,
    time_step: f64,
    perturbation: Option<&'a crate::configuration::prediction::Perturbation>,
}

/// run the default prediction and every perturbation over one shared wind field
///
/// Fails only when the shared inputs cannot be resolved; individual prediction
/// failures are reported in the returned runs.
pub fn run(
    configuration: &crate::configuration::RunConfiguration,
    mode: Option<crate::prediction::Direction>,
) -> Result<Vec<PredictionRun>, RunError> {
    let prediction = configuration.prediction.default_prediction();
    let mode = mode.unwrap_or(prediction.mode);
    let (coord, altitude) = prediction.start.to_coord()?;

    let wind = prediction.wind_field()?;
    match wind.model_time() {
        Some(model_time) => log::info!(
            "using {:} wind samples from model time {:}",
            wind.samples().len(),
            model_time
        ),
        None => log::info!("using {:} wind samples", wind.samples().len()),
    }

    let mut jobs = vec![Job {
        name: configuration.name.to_owned(),
        profile: prediction.profile,
        altitude,
        time_step: prediction.time_step_seconds(),
        perturbation: None,
    }];
    for (name, perturbation) in configuration.prediction.perturbations() {
        jobs.push(Job {
            name: name.to_owned(),
            profile: prediction.profile,
            altitude,
            time_step: prediction.time_step_seconds(),
            perturbation: Some(perturbation),
        });
    }

    log::debug!("running {:} {:?} predictions", jobs.len(), mode);
    let runs: Vec<PredictionRun> = jobs
        .par_iter()
        .map(|job| {
            let result = match job.perturbation {
                Some(perturbation) => perturbation.apply(&job.profile, job.altitude, job.time_step),
                None => Ok((job.profile, job.altitude, job.time_step)),
            }
            .and_then(|(profile, altitude, time_step)| match mode {
                crate::prediction::Direction::Forward => crate::prediction::simulate(
                    &coord,
                    altitude,
                    &profile,
                    &wind,
                    &prediction.terrain,
                    time_step,
                ),
                crate::prediction::Direction::Reverse => crate::prediction::project_reverse(
                    &coord,
                    altitude,
                    &profile,
                    &wind,
                    &prediction.terrain,
                    time_step,
                ),
            });

            PredictionRun {
                name: job.name.to_owned(),
                mode,
                result,
            }
        })
        .collect();

    for run in &runs {
        match &run.result {
            Ok(result) => {
                if let Some(location) = run.solution() {
                    log::info!(
                        "{:} - {:} {:} after {:}, drifting {:}",
                        run.name,
                        match mode {
                            crate::prediction::Direction::Forward => "lands at",
                            crate::prediction::Direction::Reverse => "release at",
                        },
                        crate::utilities::coord_string(&location.coord),
                        crate::utilities::duration_string(result.total_duration()),
                        crate::utilities::distance_string(result.path.drift()),
                    );
                }
            }
            Err(error) => log::error!("{:} - {:}", run.name, error),
        }
    }

    Ok(runs)
}

/// combine the paths of all successful runs into one feature collection
pub fn to_geojson(runs: &[PredictionRun]) -> geojson::FeatureCollection {
    let mut features = vec![];
    for run in runs {
        if let Ok(result) = &run.result {
            features.extend(result.to_geojson(&run.name).features);
        }
    }

    geojson::FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

pub fn write_geojson(runs: &[PredictionRun], path: &std::path::Path) -> Result<(), RunError> {
    let geojson = geojson::GeoJson::from(to_geojson(runs));
    std::fs::write(path, geojson.to_string()).map_err(|error| RunError::Output {
        path: path.display().to_string(),
        message: error.to_string(),
    })?;

    log::info!("wrote {:} predictions to {:}", runs.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configuration(yaml: &str) -> crate::configuration::RunConfiguration {
        serde_yaml::from_str(yaml).unwrap()
    }

    const CLOUD: &str = r#"
        name: westerly
        prediction:
          default:
            start:
              location: [8.55, 47.37, 6000.0]
            profile: { base_rate: 4.5, min_rate: 0.5, knee_height: 300.0 }
            wind:
              samples:
                - { altitude: 0, speed: 5, direction: 270 }
          perturbations:
            fast:
              base_rate: 6.0
            broken:
              min_rate: 5.0
        "#;

    #[test]
    fn test_single_forward() {
        let configuration = configuration(
            r#"
            prediction:
              start:
                location: [8.55, 47.37, 6000.0]
              profile: { base_rate: 4.5, min_rate: 0.5, knee_height: 300.0 }
              wind:
                samples:
                  - { altitude: 0, speed: 5, direction: 270 }
            "#,
        );

        let runs = run(&configuration, None).unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].name, "unnamed_drop");

        let landing = runs[0].solution().unwrap();
        assert!(landing.altitude <= 0.0);
        assert!(landing.coord.x > 8.55);
        approx::assert_relative_eq!(landing.coord.y, 47.37, epsilon = 1e-9);
    }

    #[test]
    fn test_cloud() {
        let runs = run(&configuration(CLOUD), None).unwrap();
        assert_eq!(runs.len(), 3);

        assert_eq!(runs[0].name, "westerly");
        assert_eq!(runs[1].name, "broken");
        assert_eq!(runs[2].name, "fast");

        assert!(matches!(
            runs[1].result,
            Err(crate::prediction::PredictionError::Configuration { .. })
        ));

        let default = runs[0].result.as_ref().unwrap();
        let fast = runs[2].result.as_ref().unwrap();
        assert!(fast.total_time < default.total_time);
        assert!(fast.path.drift() < default.path.drift());

        let geojson = to_geojson(&runs);
        assert_eq!(geojson.features.len(), 6);
    }

    #[test]
    fn test_reverse_override() {
        let configuration = configuration(CLOUD);

        let forward = run(&configuration, None).unwrap();
        let reverse = run(&configuration, Some(crate::prediction::Direction::Reverse)).unwrap();

        let landing = forward[0].solution().unwrap();
        let release = reverse[0].solution().unwrap();

        assert_eq!(reverse[0].mode, crate::prediction::Direction::Reverse);
        assert!(release.coord.x < 8.55);
        approx::assert_relative_eq!(
            landing.coord.x - 8.55,
            8.55 - release.coord.x,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_invalid_wind() {
        let configuration = configuration(
            r#"
            prediction:
              start:
                location: [8.55, 47.37, 6000.0]
              profile: { base_rate: 4.5, min_rate: 0.5, knee_height: 300.0 }
              wind:
                samples: []
            "#,
        );

        assert!(matches!(
            run(&configuration, None),
            Err(RunError::Prediction {
                source: crate::prediction::PredictionError::Data { .. }
            })
        ));
    }

    #[test]
    fn test_write_geojson() {
        let runs = run(&configuration(CLOUD), None).unwrap();
        let path = std::env::temp_dir().join("dropzone_test_write_geojson.geojson");

        write_geojson(&runs, &path).unwrap();

        let geojson: geojson::GeoJson = std::fs::read_to_string(&path).unwrap().parse().unwrap();
        match geojson {
            geojson::GeoJson::FeatureCollection(collection) => {
                assert_eq!(collection.features.len(), 6)
            }
            _ => panic!("expected a feature collection"),
        }

        std::fs::remove_file(path).unwrap();
    }
}
