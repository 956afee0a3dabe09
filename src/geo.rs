use crate::types::Coordinates;

/// Axis-aligned rectangle spanning a set of coordinates, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLngBounds {
    pub north: f64,
    pub south: f64,
    pub west: f64,
    pub east: f64,
}

/// Extremes over independent scans; on ties the first point seen wins.
/// No antimeridian handling, same as the widget this replaces.
pub fn bounding_box(points: &[Coordinates]) -> Option<LatLngBounds> {
    let first = points.first()?;
    let mut bounds = LatLngBounds {
        north: first.lat,
        south: first.lat,
        west: first.lng,
        east: first.lng,
    };
    for p in &points[1..] {
        if p.lat > bounds.north {
            bounds.north = p.lat;
        }
        if p.lat < bounds.south {
            bounds.south = p.lat;
        }
        if p.lng < bounds.west {
            bounds.west = p.lng;
        }
        if p.lng > bounds.east {
            bounds.east = p.lng;
        }
    }
    Some(bounds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(lat: f64, lng: f64) -> Coordinates {
        Coordinates { lat, lng }
    }

    #[test]
    fn empty_input_has_no_bounds() {
        assert_eq!(bounding_box(&[]), None);
    }

    #[test]
    fn single_point_collapses_to_itself() {
        let b = bounding_box(&[c(10.0, 20.0)]).unwrap();
        assert_eq!(
            b,
            LatLngBounds {
                north: 10.0,
                south: 10.0,
                west: 20.0,
                east: 20.0,
            }
        );
    }

    #[test]
    fn spans_the_extreme_coordinates() {
        let b = bounding_box(&[c(10.0, 10.0), c(20.0, -5.0), c(0.0, 15.0)]).unwrap();
        assert_eq!(b.south, 0.0);
        assert_eq!(b.north, 20.0);
        assert_eq!(b.west, -5.0);
        assert_eq!(b.east, 15.0);
    }
}
