use std::collections::HashMap;

lazy_static::lazy_static! {
    static ref FORECAST_URL: String = String::from("https://api.open-meteo.com/v1/forecast");
    static ref ELEVATION_URL: String = String::from("https://api.open-meteo.com/v1/elevation");
    static ref TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);
}

/// GFS isobaric levels served by Open-Meteo (hPa)
const PRESSURE_LEVELS: [u16; 19] = [
    1000, 975, 950, 925, 900, 850, 800, 700, 600, 500, 400, 300, 250, 200, 150, 100, 70, 50, 30,
];

/// heights (m above ground) of the surface wind variables
const SURFACE_HEIGHTS: [u16; 2] = [10, 100];

const HOUR_FORMAT: &str = "%Y-%m-%dT%H:%M";
const REQUEST_HOUR_FORMAT: &str = "%Y-%m-%dT%H:00";

fn default_pressure_levels() -> bool {
    true
}

fn client() -> Result<reqwest::blocking::Client, super::ConnectionError> {
    reqwest::blocking::Client::builder()
        .user_agent(super::USER_AGENT.to_owned())
        .timeout(Some(*TIMEOUT))
        .build()
        .map_err(|error| super::ConnectionError::FailedToEstablish {
            connection: "Open-Meteo".to_string(),
            message: error.to_string(),
        })
}

// https://open-meteo.com/en/docs
#[derive(serde::Deserialize, Debug, PartialEq, Clone, Default)]
pub struct OpenMeteoQuery {
    pub api_url: Option<String>,
    /// forecast time; the nearest hourly slot is used
    #[serde(default)]
    #[serde(with = "crate::parse::optional_utc_datetime_string")]
    pub time: Option<chrono::DateTime<chrono::Utc>>,
    /// include upper-air winds from isobaric levels, not just 10 m / 100 m
    #[serde(default = "default_pressure_levels")]
    pub pressure_levels: bool,
}

impl OpenMeteoQuery {
    pub fn new(time: Option<chrono::DateTime<chrono::Utc>>, pressure_levels: bool) -> Self {
        Self {
            api_url: None,
            time,
            pressure_levels,
        }
    }

    fn variables(&self) -> Vec<String> {
        let mut variables = vec![];
        for height in SURFACE_HEIGHTS {
            variables.push(format!("wind_speed_{height}m"));
            variables.push(format!("wind_direction_{height}m"));
        }
        if self.pressure_levels {
            for level in PRESSURE_LEVELS {
                variables.push(format!("wind_speed_{level}hPa"));
                variables.push(format!("wind_direction_{level}hPa"));
                variables.push(format!("geopotential_height_{level}hPa"));
            }
        }
        variables
    }

    fn parameters(&self, coord: &geo::Coord) -> Vec<(&str, String)> {
        let mut parameters = vec![
            ("latitude", format!("{:.4}", coord.y)),
            ("longitude", format!("{:.4}", coord.x)),
            ("hourly", self.variables().join(",")),
            ("wind_speed_unit", "ms".to_string()),
            ("timezone", "UTC".to_string()),
        ];

        match self.time {
            Some(time) => {
                let start = time - chrono::Duration::hours(1);
                let end = time + chrono::Duration::hours(1);
                parameters.push(("start_hour", start.format(REQUEST_HOUR_FORMAT).to_string()));
                parameters.push(("end_hour", end.format(REQUEST_HOUR_FORMAT).to_string()));
            }
            None => {
                parameters.push(("forecast_days", "1".to_string()));
            }
        }

        parameters
    }

    fn get(&self, coord: &geo::Coord) -> Result<OpenMeteoResponse, super::ConnectionError> {
        let url = self.api_url.to_owned().unwrap_or(FORECAST_URL.to_owned());
        let response = client()?
            .get(&url)
            .query(&self.parameters(coord))
            .send()
            .map_err(|error| super::ConnectionError::FailedToEstablish {
                connection: url.to_owned(),
                message: error.to_string(),
            })?;
        let url = response.url().to_string();

        match response.status() {
            reqwest::StatusCode::OK => {
                response
                    .json::<OpenMeteoResponse>()
                    .map_err(|error| super::ConnectionError::Parsing {
                        message: format!("error parsing forecast response; {error}"),
                    })
            }
            status => match response.json::<OpenMeteoErrorResponse>() {
                Ok(error) => Err(super::ConnectionError::ApiError {
                    message: format!("HTTP error {:} - {:}", status.as_u16(), error.reason),
                    url,
                }),
                Err(error) => Err(super::ConnectionError::Parsing {
                    message: error.to_string(),
                }),
            },
        }
    }

    /// wind profile above the given coordinate
    pub fn retrieve_wind_profile(
        &self,
        coord: &geo::Coord,
    ) -> Result<super::WindProfile, super::ConnectionError> {
        let response = self.get(coord)?;
        let profile = response.to_wind_profile(self.time)?;
        log::debug!(
            "retrieved {:} wind samples from Open-Meteo for {:}",
            profile.samples.len(),
            profile.model_time.as_deref().unwrap_or("unknown time"),
        );
        Ok(profile)
    }
}

#[derive(serde::Deserialize)]
struct OpenMeteoErrorResponse {
    reason: String,
}

#[derive(serde::Deserialize)]
struct OpenMeteoResponse {
    elevation: Option<f64>,
    hourly: OpenMeteoHourly,
}

#[derive(serde::Deserialize)]
struct OpenMeteoHourly {
    time: Vec<String>,
    #[serde(flatten)]
    variables: HashMap<String, Vec<Option<f64>>>,
}

impl OpenMeteoResponse {
    /// index of the hourly slot closest to the requested time, or the first slot
    fn slot(&self, time: Option<chrono::DateTime<chrono::Utc>>) -> Result<usize, super::ConnectionError> {
        if self.hourly.time.is_empty() {
            return Err(super::ConnectionError::Parsing {
                message: "forecast response contains no hourly data".to_string(),
            });
        }

        let time = match time {
            Some(time) => time,
            None => return Ok(0),
        };

        let mut closest: Option<(usize, i64)> = None;
        for (index, slot) in self.hourly.time.iter().enumerate() {
            let slot = chrono::NaiveDateTime::parse_from_str(slot, HOUR_FORMAT)
                .map_err(|error| super::ConnectionError::Parsing {
                    message: format!("unrecognized forecast time {slot:?}; {error}"),
                })?
                .and_utc();
            let offset = (slot - time).num_seconds().abs();
            if closest.map_or(true, |(_, best)| offset < best) {
                closest = Some((index, offset));
            }
        }

        Ok(closest.map_or(0, |(index, _)| index))
    }

    fn value(&self, variable: &str, slot: usize) -> Option<f64> {
        self.hourly
            .variables
            .get(variable)
            .and_then(|values| values.get(slot).copied().flatten())
            .filter(|value| value.is_finite())
    }

    fn to_wind_profile(
        &self,
        time: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Result<super::WindProfile, super::ConnectionError> {
        let slot = self.slot(time)?;
        let elevation = self.elevation.unwrap_or(0.0);

        let mut samples = vec![];
        for height in SURFACE_HEIGHTS {
            if let (Some(speed), Some(direction)) = (
                self.value(&format!("wind_speed_{height}m"), slot),
                self.value(&format!("wind_direction_{height}m"), slot),
            ) {
                samples.push(crate::prediction::wind::WindSample::new(
                    elevation + height as f64,
                    speed,
                    direction,
                ));
            }
        }

        for level in PRESSURE_LEVELS {
            if let (Some(speed), Some(direction), Some(altitude)) = (
                self.value(&format!("wind_speed_{level}hPa"), slot),
                self.value(&format!("wind_direction_{level}hPa"), slot),
                self.value(&format!("geopotential_height_{level}hPa"), slot),
            ) {
                // isobaric levels below ground are extrapolated
                if altitude >= elevation + SURFACE_HEIGHTS[0] as f64 {
                    samples.push(crate::prediction::wind::WindSample::new(
                        altitude, speed, direction,
                    ));
                }
            }
        }

        samples.sort_by(|a, b| a.altitude.total_cmp(&b.altitude));
        let mut ascending: Vec<crate::prediction::wind::WindSample> = vec![];
        for sample in samples {
            match ascending.last() {
                Some(last) if sample.altitude <= last.altitude => continue,
                _ => ascending.push(sample),
            }
        }

        Ok(super::WindProfile {
            samples: ascending,
            model_time: Some(self.hourly.time[slot].to_owned()),
        })
    }
}

/// terrain heights from the Open-Meteo elevation API, cached per 0.001 degree cell
///
/// After the first failed lookup the service is considered unavailable and every
/// further height is the sea level fallback.
#[derive(serde::Deserialize, Debug, Default)]
pub struct ElevationQuery {
    pub api_url: Option<String>,
    #[serde(skip)]
    cache: std::sync::Mutex<HashMap<(i64, i64), f64>>,
    #[serde(skip)]
    client: std::sync::OnceLock<reqwest::blocking::Client>,
    #[serde(skip)]
    unavailable: std::sync::atomic::AtomicBool,
}

impl PartialEq for ElevationQuery {
    fn eq(&self, other: &Self) -> bool {
        self.api_url == other.api_url
    }
}

#[derive(serde::Deserialize)]
struct ElevationResponse {
    elevation: Vec<f64>,
}

fn cell(coord: &geo::Coord) -> (i64, i64) {
    (
        (coord.x * 1000.0).round() as i64,
        (coord.y * 1000.0).round() as i64,
    )
}

impl ElevationQuery {
    pub fn new(api_url: Option<String>) -> Self {
        Self {
            api_url,
            ..Default::default()
        }
    }

    fn http_client(&self) -> Result<&reqwest::blocking::Client, super::ConnectionError> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }
        let client = client()?;
        Ok(self.client.get_or_init(|| client))
    }

    pub fn is_unavailable(&self) -> bool {
        self.unavailable.load(std::sync::atomic::Ordering::Relaxed)
    }

    pub fn retrieve_elevation(&self, coord: &geo::Coord) -> Result<f64, super::ConnectionError> {
        let url = self.api_url.to_owned().unwrap_or(ELEVATION_URL.to_owned());
        let response = self
            .http_client()?
            .get(&url)
            .query(&[
                ("latitude", format!("{:.4}", coord.y)),
                ("longitude", format!("{:.4}", coord.x)),
            ])
            .send()
            .map_err(|error| super::ConnectionError::FailedToEstablish {
                connection: url.to_owned(),
                message: error.to_string(),
            })?;

        match response.status() {
            reqwest::StatusCode::OK => {
                let elevation: ElevationResponse =
                    response
                        .json()
                        .map_err(|error| super::ConnectionError::Parsing {
                            message: format!("error parsing elevation response; {error}"),
                        })?;
                elevation
                    .elevation
                    .first()
                    .copied()
                    .filter(|height| height.is_finite())
                    .ok_or(super::ConnectionError::Parsing {
                        message: "elevation response is empty".to_string(),
                    })
            }
            status => Err(super::ConnectionError::ApiError {
                message: format!("HTTP error {:}", status.as_u16()),
                url: response.url().to_string(),
            }),
        }
    }

    fn cached(&self, key: &(i64, i64)) -> Option<f64> {
        self.cache
            .lock()
            .ok()
            .and_then(|cache| cache.get(key).copied())
    }
}

impl super::TerrainModel for ElevationQuery {
    fn terrain_height(&self, coord: &geo::Coord) -> f64 {
        if self.is_unavailable() {
            return 0.0;
        }

        let key = cell(coord);
        if let Some(height) = self.cached(&key) {
            return height;
        }

        match self.retrieve_elevation(coord) {
            Ok(height) => {
                if let Ok(mut cache) = self.cache.lock() {
                    cache.insert(key, height);
                }
                height
            }
            Err(error) => {
                if !self
                    .unavailable
                    .swap(true, std::sync::atomic::Ordering::Relaxed)
                {
                    log::warn!(
                        "terrain lookup at ({:.3}, {:.3}) failed, assuming sea level from here on; {:}",
                        coord.x,
                        coord.y,
                        error
                    );
                }
                0.0
            }
        }
    }
}
