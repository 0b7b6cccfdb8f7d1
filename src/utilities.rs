pub fn duration_string(duration: chrono::Duration) -> String {
    let mut parts = vec![];

    let hours = duration.num_hours().abs();
    let minutes = duration.num_minutes().abs() % 60;
    let seconds = duration.num_seconds().abs() % 60;

    if hours > 0 {
        parts.push(format!("{:}h", hours));
    }

    if minutes > 0 {
        parts.push(format!("{:}m", minutes));
    }

    if seconds > 0 || parts.is_empty() {
        parts.push(format!("{:}s", seconds));
    }

    parts.join(" ")
}

pub fn distance_string(meters: f64) -> String {
    if meters.abs() >= 1000.0 {
        format!("{:.2} km", meters / 1000.0)
    } else {
        format!("{:.0} m", meters)
    }
}

/// `47.37000°N, 8.55000°E`
pub fn coord_string(coord: &geo::Coord) -> String {
    format!(
        "{:.5}°{:}, {:.5}°{:}",
        coord.y.abs(),
        if coord.y < 0.0 { "S" } else { "N" },
        coord.x.abs(),
        if coord.x < 0.0 { "W" } else { "E" },
    )
}
