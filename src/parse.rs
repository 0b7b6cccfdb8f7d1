pub fn approx_equal(a: f64, b: f64, decimal_precision: u8) -> bool {
    let p = 10f64.powi(-(decimal_precision as i32));
    (a - b).abs() < p
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Axis {
    Latitude,
    Longitude,
}

/// parse a decimal-degree coordinate, optionally suffixed with a hemisphere
/// (`47.37N`, `8.55 E`, `122.3°W`, `-33.9`)
pub fn parse_coordinate(value: &str, axis: Axis) -> Result<f64, ParseError> {
    lazy_static::lazy_static! {
        static ref PATTERN: regex::Regex = regex::Regex::new(
            r"^\s*(?P<degrees>[+-]?\d+(?:\.\d*)?)\s*°?\s*(?P<hemisphere>[NnSsEeWw])?\s*$"
        )
        .expect("valid coordinate pattern");
    }

    let captures = match PATTERN.captures(value) {
        Some(captures) => captures,
        None => {
            return Err(ParseError::InvalidCoordinate {
                value: value.to_string(),
                message: "expected decimal degrees with an optional hemisphere".to_string(),
            });
        }
    };

    let degrees = captures["degrees"]
        .parse::<f64>()
        .map_err(|error| ParseError::InvalidCoordinate {
            value: value.to_string(),
            message: error.to_string(),
        })?;

    let sign = match captures.name("hemisphere") {
        Some(hemisphere) => {
            if degrees < 0.0 {
                return Err(ParseError::InvalidCoordinate {
                    value: value.to_string(),
                    message: "negative degrees cannot carry a hemisphere".to_string(),
                });
            }
            match (axis, hemisphere.as_str().to_ascii_uppercase().as_str()) {
                (Axis::Latitude, "N") | (Axis::Longitude, "E") => 1.0,
                (Axis::Latitude, "S") | (Axis::Longitude, "W") => -1.0,
                (axis, hemisphere) => {
                    return Err(ParseError::InvalidCoordinate {
                        value: value.to_string(),
                        message: format!("hemisphere {hemisphere} does not apply to {axis:?}"),
                    });
                }
            }
        }
        None => 1.0,
    };

    Ok(sign * degrees)
}

/// a coordinate in a configuration file, either a number or a hemisphere string
#[derive(serde::Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum CoordinateValue {
    Number(f64),
    Text(String),
}

impl CoordinateValue {
    pub fn to_degrees(&self, axis: Axis) -> Result<f64, ParseError> {
        match self {
            Self::Number(degrees) => Ok(*degrees),
            Self::Text(value) => parse_coordinate(value, axis),
        }
    }
}

custom_error::custom_error! {pub ParseError
    InvalidCoordinate { value: String, message: String } = "invalid coordinate {value:?}; {message}",
    InvalidLocation { message: String } = "{message}",
}

pub mod optional_utc_datetime_string {
    use chrono::TimeZone;
    use serde::Deserialize;

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn deserialize<'de, D>(
        deserializer: D,
    ) -> Result<Option<chrono::DateTime<chrono::Utc>>, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value: Option<String> = Option::deserialize(deserializer)?;
        if let Some(value) = value {
            return Ok(Some(match chrono::DateTime::parse_from_rfc3339(&value) {
                Ok(datetime) => datetime.with_timezone(&chrono::Utc),
                Err(_) => {
                    let naive = chrono::NaiveDateTime::parse_from_str(&value, FORMAT)
                        .map_err(serde::de::Error::custom)?;
                    chrono::Utc.from_utc_datetime(&naive)
                }
            }));
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approx_equal() {
        assert!(approx_equal(47.370001, 47.37, 4));
        assert!(!approx_equal(47.38, 47.37, 4));
    }

    #[test]
    fn test_parse_coordinate() {
        assert_eq!(parse_coordinate("47.37N", Axis::Latitude).unwrap(), 47.37);
        assert_eq!(parse_coordinate("47.37 s", Axis::Latitude).unwrap(), -47.37);
        assert_eq!(parse_coordinate("8.55E", Axis::Longitude).unwrap(), 8.55);
        assert_eq!(parse_coordinate("122.3°W", Axis::Longitude).unwrap(), -122.3);
        assert_eq!(parse_coordinate("-33.9", Axis::Latitude).unwrap(), -33.9);
        assert_eq!(parse_coordinate(" 12 ", Axis::Longitude).unwrap(), 12.0);
    }

    #[test]
    fn test_invalid_coordinates() {
        assert!(parse_coordinate("47.37E", Axis::Latitude).is_err());
        assert!(parse_coordinate("8.55N", Axis::Longitude).is_err());
        assert!(parse_coordinate("-47.37N", Axis::Latitude).is_err());
        assert!(parse_coordinate("north", Axis::Latitude).is_err());
        assert!(parse_coordinate("", Axis::Latitude).is_err());
    }

    #[test]
    fn test_coordinate_values() {
        let values: Vec<CoordinateValue> = serde_yaml::from_str("[8.55, '47.37N', 6000]").unwrap();

        assert_eq!(values[0].to_degrees(Axis::Longitude).unwrap(), 8.55);
        assert_eq!(values[1].to_degrees(Axis::Latitude).unwrap(), 47.37);
        assert_eq!(values[2], CoordinateValue::Number(6000.0));
    }

    #[test]
    fn test_datetime_string() {
        #[derive(serde::Deserialize)]
        struct Query {
            #[serde(default)]
            #[serde(with = "optional_utc_datetime_string")]
            time: Option<chrono::DateTime<chrono::Utc>>,
        }

        let query: Query = serde_yaml::from_str("time: 2023-05-19 12:00:00").unwrap();
        assert_eq!(
            query.time.unwrap(),
            chrono::DateTime::parse_from_rfc3339("2023-05-19T12:00:00Z").unwrap()
        );

        let query: Query = serde_yaml::from_str("time: 2023-05-19T14:00:00+02:00").unwrap();
        assert_eq!(
            query.time.unwrap(),
            chrono::DateTime::parse_from_rfc3339("2023-05-19T12:00:00Z").unwrap()
        );

        let query: Query = serde_yaml::from_str("{}").unwrap();
        assert!(query.time.is_none());
    }
}
