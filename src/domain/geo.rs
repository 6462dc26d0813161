// Map geometry primitives
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lon: f64,
}

impl LatLng {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Build a point only when both components are usable map coordinates.
    /// Zero is treated as missing.
    pub fn from_parts(lat: Option<f64>, lon: Option<f64>) -> Option<Self> {
        let (lat, lon) = (lat?, lon?);
        let usable = lat.is_finite()
            && lon.is_finite()
            && lat != 0.0
            && lon != 0.0
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon);
        usable.then(|| Self::new(lat, lon))
    }
}

/// Axis-aligned lat/lon bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl Bounds {
    pub fn from_point(point: LatLng) -> Self {
        Self {
            south_west: point,
            north_east: point,
        }
    }

    pub fn extend(&mut self, point: LatLng) {
        self.south_west.lat = self.south_west.lat.min(point.lat);
        self.south_west.lon = self.south_west.lon.min(point.lon);
        self.north_east.lat = self.north_east.lat.max(point.lat);
        self.north_east.lon = self.north_east.lon.max(point.lon);
    }

    /// Bounding box of a coordinate sequence; `None` when empty.
    pub fn enclosing(points: &[LatLng]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bounds = Self::from_point(*first);
        for point in rest {
            bounds.extend(*point);
        }
        Some(bounds)
    }
}

/// What the map should currently show
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Viewport {
    Center { center: LatLng, zoom: u8 },
    FitBounds { bounds: Bounds, padding: [u32; 2] },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts_rejects_unusable_coordinates() {
        assert!(LatLng::from_parts(Some(0.34), Some(32.58)).is_some());
        assert!(LatLng::from_parts(None, Some(32.58)).is_none());
        assert!(LatLng::from_parts(Some(0.0), Some(32.58)).is_none());
        assert!(LatLng::from_parts(Some(91.0), Some(32.58)).is_none());
        assert!(LatLng::from_parts(Some(0.34), Some(f64::NAN)).is_none());
    }

    #[test]
    fn test_enclosing_bounds() {
        let points = vec![
            LatLng::new(0.30, 32.60),
            LatLng::new(0.35, 32.55),
            LatLng::new(0.32, 32.58),
        ];
        let bounds = Bounds::enclosing(&points).unwrap();
        assert_eq!(bounds.south_west, LatLng::new(0.30, 32.55));
        assert_eq!(bounds.north_east, LatLng::new(0.35, 32.60));
        assert!(Bounds::enclosing(&[]).is_none());
    }
}
