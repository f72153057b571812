use crate::error::{ClientError, ClientResult};

/// Parse a zone coordinate string of the form "x1,y1 x2,y2 ..." into vertex
/// pairs. The polygon is implicitly closed; a trailing repeat of the first
/// vertex is tolerated and dropped.
pub fn parse_coords(coords: &str) -> ClientResult<Vec<(i64, i64)>> {
    let mut vertices = Vec::new();
    for token in coords.split_whitespace() {
        let (x, y) = token
            .split_once(',')
            .ok_or_else(|| ClientError::parse("zone coordinates", format!("bad vertex {token:?}")))?;
        let x = x
            .trim()
            .parse::<i64>()
            .map_err(|err| ClientError::parse("zone coordinates", format!("{token:?}: {err}")))?;
        let y = y
            .trim()
            .parse::<i64>()
            .map_err(|err| ClientError::parse("zone coordinates", format!("{token:?}: {err}")))?;
        vertices.push((x, y));
    }
    if vertices.len() > 3 && vertices.first() == vertices.last() {
        vertices.pop();
    }
    if vertices.len() < 3 {
        return Err(ClientError::parse(
            "zone coordinates",
            format!("need at least 3 vertices, got {}", vertices.len()),
        ));
    }
    Ok(vertices)
}

/// Twice the signed shoelace sum. Positive means the vertex order is
/// counter-clockwise in mathematical orientation.
fn shoelace_sum(vertices: &[(i64, i64)]) -> i64 {
    let mut sum = 0i64;
    for (i, &(x0, y0)) in vertices.iter().enumerate() {
        let (x1, y1) = vertices[(i + 1) % vertices.len()];
        sum += x0 * y1 - x1 * y0;
    }
    sum
}

/// Unsigned polygon area, rounded to the nearest integer pixel count.
/// Degenerate (collinear) input yields 0 rather than an error.
pub fn area(vertices: &[(i64, i64)]) -> u64 {
    (shoelace_sum(vertices).unsigned_abs() + 1) / 2
}

/// Area plus the vertex list normalized to clockwise winding for display.
pub fn canonicalize(vertices: &[(i64, i64)]) -> (u64, Vec<(i64, i64)>) {
    let sum = shoelace_sum(vertices);
    let mut ordered = vertices.to_vec();
    if sum > 0 {
        ordered.reverse();
    }
    ((sum.unsigned_abs() + 1) / 2, ordered)
}

pub fn format_coords(vertices: &[(i64, i64)]) -> String {
    vertices
        .iter()
        .map(|(x, y)| format!("{x},{y}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_measures_a_square() {
        let vertices = parse_coords("0,0 100,0 100,100 0,100").unwrap();
        assert_eq!(area(&vertices), 10_000);
    }

    #[test]
    fn area_is_invariant_under_rotation_and_reversal() {
        let base = vec![(0, 0), (40, 10), (50, 60), (10, 50)];
        let expected = area(&base);
        for shift in 0..base.len() {
            let mut rotated = base.clone();
            rotated.rotate_left(shift);
            assert_eq!(area(&rotated), expected, "rotation by {shift}");
            rotated.reverse();
            assert_eq!(area(&rotated), expected, "reversed rotation by {shift}");
        }
    }

    #[test]
    fn counter_clockwise_input_is_reversed() {
        // Counter-clockwise in mathematical orientation (positive shoelace).
        let ccw = vec![(0, 0), (10, 0), (10, 10), (0, 10)];
        let (area, ordered) = canonicalize(&ccw);
        assert_eq!(area, 100);
        assert_eq!(ordered, vec![(0, 10), (10, 10), (10, 0), (0, 0)]);

        let (area, unchanged) = canonicalize(&ordered);
        assert_eq!(area, 100);
        assert_eq!(unchanged, ordered);
    }

    #[test]
    fn collinear_points_yield_zero_area() {
        let line = vec![(0, 0), (5, 5), (10, 10)];
        assert_eq!(area(&line), 0);
    }

    #[test]
    fn closed_input_drops_the_repeated_vertex() {
        let vertices = parse_coords("0,0 10,0 10,10 0,10 0,0").unwrap();
        assert_eq!(vertices.len(), 4);
        assert_eq!(area(&vertices), 100);
    }

    #[test]
    fn rejects_malformed_and_too_short_input() {
        assert!(parse_coords("0,0 10").is_err());
        assert!(parse_coords("0,0 10,0").is_err());
        assert!(parse_coords("a,b c,d e,f").is_err());
    }
}
