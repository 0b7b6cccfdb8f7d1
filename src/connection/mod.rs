pub mod file;
pub mod open_meteo;

lazy_static::lazy_static! {
    pub static ref USER_AGENT: String = format!("dropzone/{:}", env!("CARGO_PKG_VERSION"));
}

/// wind samples as delivered by a weather source, not yet validated
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WindProfile {
    pub samples: Vec<crate::prediction::wind::WindSample>,
    pub model_time: Option<String>,
}

impl WindProfile {
    pub fn into_wind_field(
        self,
    ) -> Result<crate::prediction::wind::WindField, crate::prediction::PredictionError> {
        crate::prediction::wind::WindField::new(self.samples, self.model_time)
    }
}

/// height of the terrain (m AMSL) under a coordinate
///
/// Implementations must not fail; when a lookup is impossible they return a fallback height.
pub trait TerrainModel: Sync {
    fn terrain_height(&self, coord: &geo::Coord) -> f64;
}

impl<F> TerrainModel for F
where
    F: Fn(&geo::Coord) -> f64 + Sync,
{
    fn terrain_height(&self, coord: &geo::Coord) -> f64 {
        self(coord)
    }
}

/// flat terrain at mean sea level
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SeaLevel;

impl TerrainModel for SeaLevel {
    fn terrain_height(&self, _: &geo::Coord) -> f64 {
        0.0
    }
}

#[derive(serde::Deserialize, Debug, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    #[default]
    SeaLevel,
    Constant(f64),
    OpenMeteo(open_meteo::ElevationQuery),
}

impl TerrainModel for Terrain {
    fn terrain_height(&self, coord: &geo::Coord) -> f64 {
        match self {
            Self::SeaLevel => SeaLevel.terrain_height(coord),
            Self::Constant(height) => *height,
            Self::OpenMeteo(query) => query.terrain_height(coord),
        }
    }
}

custom_error::custom_error! {pub ConnectionError
    FailedToEstablish { connection: String, message: String } = "failed to establish connection to {connection}; {message}",
    ApiError { message: String, url: String } = "{message} - {url}",
    Parsing { message: String } = "{message}",
}
