//! Geocoding over sorted-set scores.
//!
//! A geo index is an ordinary sorted set whose scores are 52-bit
//! interleaved encodings of (longitude, latitude). Nearby points share
//! geocode prefixes, so score order preserves spatial locality; distance
//! queries decode the scores back to cell-midpoint coordinates.

use crate::error::{EngineError, EngineResult};

/// Earth's radius in meters (spherical model).
const EARTH_RADIUS_M: f64 = 6372797.560856;

pub const LON_MIN: f64 = -180.0;
pub const LON_MAX: f64 = 180.0;
/// Latitude is clamped short of the poles, where the encoding degenerates.
pub const LAT_MIN: f64 = -85.05112878;
pub const LAT_MAX: f64 = 85.05112878;

/// Bits per coordinate (26 + 26 = 52-bit geocode, exact in an f64).
const GEO_STEP: u32 = 26;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceUnit {
    Meters,
    Kilometers,
    Miles,
    Feet,
}

impl DistanceUnit {
    pub fn parse(s: &str) -> EngineResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "m" => Ok(DistanceUnit::Meters),
            "km" => Ok(DistanceUnit::Kilometers),
            "mi" => Ok(DistanceUnit::Miles),
            "ft" => Ok(DistanceUnit::Feet),
            _ => Err(EngineError::InvalidUnit(s.to_string())),
        }
    }

    pub fn meters_per_unit(self) -> f64 {
        match self {
            DistanceUnit::Meters => 1.0,
            DistanceUnit::Kilometers => 1000.0,
            DistanceUnit::Miles => 1609.34,
            DistanceUnit::Feet => 0.3048,
        }
    }

    pub fn from_meters(self, meters: f64) -> f64 {
        meters / self.meters_per_unit()
    }

    pub fn to_meters(self, value: f64) -> f64 {
        value * self.meters_per_unit()
    }
}

/// Encode a coordinate pair into a 52-bit geocode.
pub fn encode(longitude: f64, latitude: f64) -> EngineResult<u64> {
    if !(LON_MIN..=LON_MAX).contains(&longitude) || !(LAT_MIN..=LAT_MAX).contains(&latitude) {
        return Err(EngineError::InvalidCoordinates);
    }

    let cells = (1u64 << GEO_STEP) as f64;
    let lon_off = (longitude - LON_MIN) / (LON_MAX - LON_MIN);
    let lat_off = (latitude - LAT_MIN) / (LAT_MAX - LAT_MIN);
    let lon_bits = ((lon_off * cells) as u64).min((1 << GEO_STEP) - 1);
    let lat_bits = ((lat_off * cells) as u64).min((1 << GEO_STEP) - 1);

    Ok(interleave(lon_bits, lat_bits))
}

/// Decode a geocode back to the (longitude, latitude) midpoint of its cell.
pub fn decode(code: u64) -> (f64, f64) {
    let (lon_bits, lat_bits) = deinterleave(code);
    let cells = (1u64 << GEO_STEP) as f64;
    let lon = LON_MIN + (lon_bits as f64 + 0.5) / cells * (LON_MAX - LON_MIN);
    let lat = LAT_MIN + (lat_bits as f64 + 0.5) / cells * (LAT_MAX - LAT_MIN);
    (lon, lat)
}

/// Interleave two 26-bit values: longitude in even bits, latitude in odd.
fn interleave(x: u64, y: u64) -> u64 {
    let mut out = 0u64;
    for i in 0..GEO_STEP {
        out |= ((x >> i) & 1) << (2 * i);
        out |= ((y >> i) & 1) << (2 * i + 1);
    }
    out
}

fn deinterleave(code: u64) -> (u64, u64) {
    let mut x = 0u64;
    let mut y = 0u64;
    for i in 0..GEO_STEP {
        x |= ((code >> (2 * i)) & 1) << i;
        y |= ((code >> (2 * i + 1)) & 1) << i;
    }
    (x, y)
}

/// Great-circle distance between two points, in meters.
pub fn haversine_distance(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let a =
        (dlat / 2.0).sin().powi(2) + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_stays_within_one_cell() {
        let (lon, lat) = (106.822702, -6.177590);
        let code = encode(lon, lat).unwrap();
        let (dlon, dlat) = decode(code);
        // Cell sizes: 360/2^26 deg of longitude, 170.1/2^26 of latitude.
        assert!((dlon - lon).abs() < 360.0 / (1u64 << 26) as f64);
        assert!((dlat - lat).abs() < 170.2 / (1u64 << 26) as f64);
    }

    #[test]
    fn geocode_fits_f64_exactly() {
        let code = encode(179.9999, 85.0).unwrap();
        assert!(code < 1 << 52);
        assert_eq!(code as f64 as u64, code);
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        assert_eq!(
            encode(181.0, 0.0).unwrap_err(),
            EngineError::InvalidCoordinates
        );
        assert_eq!(
            encode(0.0, 89.0).unwrap_err(),
            EngineError::InvalidCoordinates
        );
    }

    #[test]
    fn haversine_matches_known_distance() {
        // Two storefronts in central Jakarta, ~354 m apart.
        let d = haversine_distance(106.822702, -6.177590, 106.820889, -6.174964);
        assert!((d - 354.3).abs() < 1.0, "got {d}");
    }

    #[test]
    fn score_order_groups_nearby_points() {
        let a = encode(106.822702, -6.177590).unwrap();
        let b = encode(106.820889, -6.174964).unwrap();
        let far = encode(-73.9857, 40.7484).unwrap();
        assert!(a.abs_diff(b) < a.abs_diff(far));
    }

    #[test]
    fn unit_conversions() {
        assert_eq!(DistanceUnit::parse("KM").unwrap(), DistanceUnit::Kilometers);
        assert!((DistanceUnit::Kilometers.from_meters(1500.0) - 1.5).abs() < 1e-9);
        assert!((DistanceUnit::Feet.to_meters(1.0) - 0.3048).abs() < 1e-9);
        assert!(DistanceUnit::parse("furlong").is_err());
    }
}
