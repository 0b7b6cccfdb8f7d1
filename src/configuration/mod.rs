pub mod prediction;

fn default_name() -> String {
    String::from("unnamed_drop")
}

#[derive(serde::Deserialize, Debug)]
pub struct RunConfiguration {
    #[serde(default = "default_name")]
    pub name: String,
    pub output: Option<PathConfiguration>,
    pub prediction: crate::configuration::prediction::PredictionConfiguration,
}

impl RunConfiguration {
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigurationError> {
        let file = std::fs::File::open(path).map_err(|error| ConfigurationError::Reading {
            path: path.display().to_string(),
            message: error.to_string(),
        })?;
        serde_yaml::from_reader(file).map_err(|error| ConfigurationError::Reading {
            path: path.display().to_string(),
            message: error.to_string(),
        })
    }
}

#[derive(serde::Deserialize, PartialEq, Debug, Clone)]
pub struct PathConfiguration {
    pub filename: std::path::PathBuf,
}

custom_error::custom_error! {pub ConfigurationError
    Reading { path: String, message: String } = "could not read configuration {path}; {message}",
}
