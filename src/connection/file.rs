use std::io::prelude::BufRead;

/// wind profile text file, one `altitude speed direction` sample per line
///
/// Values are separated by whitespace or commas; blank lines and `#` comments are skipped.
/// The path may also be a URL.
#[derive(serde::Deserialize, Debug, PartialEq, Clone)]
pub struct WindProfileFile {
    pub path: std::path::PathBuf,
}

impl WindProfileFile {
    pub fn new(path: std::path::PathBuf) -> Result<Self, super::ConnectionError> {
        if path.exists() || is_url(&path) {
            Ok(Self { path })
        } else {
            Err(super::ConnectionError::FailedToEstablish {
                connection: path.display().to_string(),
                message: "path does not exist".to_string(),
            })
        }
    }
}

fn is_url(path: &std::path::Path) -> bool {
    match path.to_str() {
        Some(path) => url::Url::parse(path).is_ok(),
        None => false,
    }
}

fn read_lines(path: &std::path::Path) -> Result<Vec<String>, super::ConnectionError> {
    let mut lines: Vec<String> = vec![];

    let failed = |message: String| super::ConnectionError::FailedToEstablish {
        connection: path.display().to_string(),
        message,
    };

    match path.to_str().map(url::Url::parse) {
        Some(Ok(url)) => {
            let response = reqwest::blocking::Client::builder()
                .user_agent(super::USER_AGENT.to_owned())
                .build()
                .and_then(|client| client.get(url).send())
                .map_err(|error| failed(error.to_string()))?;
            if !response.status().is_success() {
                return Err(super::ConnectionError::ApiError {
                    message: format!("HTTP error {:}", response.status().as_u16()),
                    url: response.url().to_string(),
                });
            }
            let text = response.text().map_err(|error| failed(error.to_string()))?;
            for line in text.lines() {
                lines.push(line.to_string());
            }
        }
        _ => {
            let file = std::fs::File::open(path).map_err(|error| failed(error.to_string()))?;
            let reader = std::io::BufReader::new(file);
            for line in reader.lines() {
                lines.push(line.map_err(|error| failed(error.to_string()))?);
            }
        }
    }

    Ok(lines)
}

fn parse_sample(line: &str) -> Option<Result<crate::prediction::wind::WindSample, String>> {
    let content = match line.split_once('#') {
        Some((content, _)) => content,
        None => line,
    }
    .trim();
    if content.is_empty() {
        return None;
    }

    let values: Vec<&str> = content
        .split(|character: char| character == ',' || character.is_whitespace())
        .filter(|value| !value.is_empty())
        .collect();
    if values.len() != 3 {
        return Some(Err(format!(
            "expected 3 values (altitude, speed, direction), found {:}",
            values.len()
        )));
    }

    let mut numbers = [0.0; 3];
    for (index, value) in values.iter().enumerate() {
        numbers[index] = match value.parse::<f64>() {
            Ok(number) => number,
            Err(error) => return Some(Err(format!("{value:?} is not a number; {error}"))),
        };
    }

    Some(Ok(crate::prediction::wind::WindSample::new(
        numbers[0], numbers[1], numbers[2],
    )))
}

impl WindProfileFile {
    pub fn read_wind_profile(&self) -> Result<super::WindProfile, super::ConnectionError> {
        let lines = read_lines(&self.path)?;

        let mut samples = vec![];
        for (index, line) in lines.iter().enumerate() {
            match parse_sample(line) {
                Some(Ok(sample)) => samples.push(sample),
                Some(Err(message)) => {
                    return Err(super::ConnectionError::Parsing {
                        message: format!("{:}:{:} - {message}", self.path.display(), index + 1),
                    });
                }
                None => continue,
            }
        }

        log::debug!(
            "read {:} wind samples from {:}",
            samples.len(),
            self.path.display()
        );
        Ok(super::WindProfile {
            samples,
            model_time: None,
        })
    }
}
