pub mod configuration;
pub mod connection;
pub mod location;
pub mod logging;
pub mod model;
pub mod parse;
pub mod prediction;
pub mod run;
pub mod utilities;

lazy_static::lazy_static! {
    pub static ref DEFAULT_TIME_STEP: chrono::Duration = chrono::Duration::seconds(10);
    pub static ref DATETIME_FORMAT: String = "%Y-%m-%d %H:%M:%S".to_string();
}
