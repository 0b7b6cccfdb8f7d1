use geo::GeodesicDistance;

/// temporally ordered descent states; first is the release, last is the landing
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DescentTrack {
    pub locations: Vec<crate::location::DescentLocation>,
}

impl DescentTrack {
    pub fn new(locations: Vec<crate::location::DescentLocation>) -> Self {
        Self { locations }
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn first(&self) -> Option<&crate::location::DescentLocation> {
        self.locations.first()
    }

    pub fn last(&self) -> Option<&crate::location::DescentLocation> {
        self.locations.last()
    }

    /// seconds between consecutive states
    pub fn intervals(&self) -> Vec<f64> {
        self.locations
            .windows(2)
            .map(|pair| pair[1].elapsed - pair[0].elapsed)
            .collect()
    }

    /// altitude lost between consecutive states (positive while descending)
    pub fn descents(&self) -> Vec<f64> {
        self.locations
            .windows(2)
            .map(|pair| pair[0].altitude - pair[1].altitude)
            .collect()
    }

    pub fn descent_rates(&self) -> Vec<f64> {
        self.descents()
            .iter()
            .zip(self.intervals())
            .map(|(descent, interval)| descent / interval)
            .collect()
    }

    /// geodesic distance (m) between consecutive states
    pub fn overground_distances(&self) -> Vec<f64> {
        self.locations
            .windows(2)
            .map(|pair| pair[0].point().geodesic_distance(&pair[1].point()))
            .collect()
    }

    pub fn ground_speeds(&self) -> Vec<f64> {
        self.overground_distances()
            .iter()
            .zip(self.intervals())
            .map(|(distance, interval)| distance / interval)
            .collect()
    }

    /// geodesic distance (m) from the first state to the last
    pub fn drift(&self) -> f64 {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => first.point().geodesic_distance(&last.point()),
            _ => 0.0,
        }
    }

    /// line string of the whole track plus release and landing points
    pub fn to_geojson(&self, name: &str) -> geojson::FeatureCollection {
        let mut features = vec![];

        let line: Vec<Vec<f64>> = self
            .locations
            .iter()
            .map(|location| vec![location.coord.x, location.coord.y, location.altitude])
            .collect();
        let mut properties = geojson::JsonObject::new();
        properties.insert("name".to_string(), serde_json::Value::from(name));
        properties.insert("drift".to_string(), serde_json::Value::from(self.drift()));
        features.push(geojson::Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::LineString(line))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        });

        for (label, location) in [("release", self.first()), ("landing", self.last())] {
            if let Some(location) = location {
                let mut properties = geojson::JsonObject::new();
                properties.insert(
                    "name".to_string(),
                    serde_json::Value::from(format!("{name} {label}")),
                );
                properties.insert(
                    "altitude".to_string(),
                    serde_json::Value::from(location.altitude),
                );
                properties.insert(
                    "elapsed".to_string(),
                    serde_json::Value::from(location.elapsed),
                );
                features.push(geojson::Feature {
                    bbox: None,
                    geometry: Some(geojson::Geometry::new(geojson::Value::Point(vec![
                        location.coord.x,
                        location.coord.y,
                    ]))),
                    id: None,
                    properties: Some(properties),
                    foreign_members: None,
                });
            }
        }

        geojson::FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track() -> DescentTrack {
        let mut locations = vec![];
        for index in 0..4 {
            locations.push(crate::location::DescentLocation {
                coord: geo::coord! { x: 8.55 + index as f64 * 0.001, y: 47.37 },
                altitude: 1000.0 - index as f64 * 45.0,
                elapsed: index as f64 * 10.0,
            });
        }
        DescentTrack::new(locations)
    }

    #[test]
    fn test_rates() {
        let track = track();

        assert_eq!(track.intervals(), vec![10.0, 10.0, 10.0]);
        assert_eq!(track.descents(), vec![45.0, 45.0, 45.0]);
        for rate in track.descent_rates() {
            approx::assert_relative_eq!(rate, 4.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_distances() {
        let track = track();

        let distances = track.overground_distances();
        assert_eq!(distances.len(), 3);
        // 0.001 degrees of longitude at 47.37 degrees latitude is roughly 75 m
        for distance in &distances {
            assert!((*distance - 75.5).abs() < 1.0);
        }
        for speed in track.ground_speeds() {
            assert!((speed - 7.55).abs() < 0.1);
        }

        approx::assert_relative_eq!(
            track.drift(),
            distances.iter().sum::<f64>(),
            max_relative = 1e-6
        );
    }

    #[test]
    fn test_empty() {
        let track = DescentTrack::default();

        assert!(track.is_empty());
        assert!(track.intervals().is_empty());
        assert_eq!(track.drift(), 0.0);
        assert_eq!(track.to_geojson("empty").features.len(), 1);
    }

    #[test]
    fn test_geojson() {
        let track = track();
        let contents = geojson::GeoJson::from(track.to_geojson("test")).to_string();

        let parsed = contents.parse::<geojson::GeoJson>().unwrap();
        if let geojson::GeoJson::FeatureCollection(collection) = parsed {
            assert_eq!(collection.features.len(), 3);

            let line = collection.features[0].geometry.as_ref().unwrap();
            if let geojson::Value::LineString(positions) = &line.value {
                assert_eq!(positions.len(), 4);
                approx::assert_relative_eq!(positions[3][0], 8.553, epsilon = 1e-9);
                assert_eq!(positions[3][2], 865.0);
            } else {
                panic!("expected a line string");
            }

            let landing = collection.features[2].properties.as_ref().unwrap();
            assert_eq!(
                landing.get("name").unwrap(),
                &serde_json::Value::from("test landing")
            );
            assert_eq!(
                landing.get("elapsed").unwrap(),
                &serde_json::Value::from(30.0)
            );
        } else {
            panic!("expected a feature collection");
        }
    }
}
