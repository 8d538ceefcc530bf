//! Route geometries and the encoded polyline format.
//!
//! Backends hand geometries over either as coordinate lists or as encoded
//! polyline strings (5 decimal digits, delta + zigzag encoded, 5-bit chunks
//! offset by 63 with 0x20 as continuation bit). Both forms end up as a
//! [`Polyline`] of (lon, lat) coordinates.

use serde::{Deserialize, Serialize};

use crate::error::GeometryError;
use crate::model::Coordinate;

/// Scale between degrees and the integers stored in an encoded polyline.
const PRECISION_FACTOR: f64 = 1e5;

const CHUNK_OFFSET: u8 = 63;
const CONTINUATION_BIT: i64 = 0x20;
const CHUNK_MASK: i64 = 0x1f;

/// Largest chunk shift a 5-digit degree value can need (32-bit values).
const MAX_SHIFT: u32 = 30;

const MAX_LON: f64 = 180.0;
const MAX_LAT: f64 = 90.0;

/// A route geometry as an ordered list of (lon, lat) coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polyline {
    points: Vec<Coordinate>,
}

impl Polyline {
    pub fn new(points: Vec<Coordinate>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Coordinate> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Checks the geometry can describe a route (a start and an end).
    pub fn ensure_route(&self) -> Result<(), GeometryError> {
        if self.points.len() < 2 {
            return Err(GeometryError::TooFewPoints {
                found: self.points.len(),
            });
        }
        Ok(())
    }
}

/// Axis order of the value pairs inside an encoded string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisOrder {
    /// Google / OSRM / openrouteservice convention.
    LatLon,
    LonLat,
}

impl AxisOrder {
    fn coordinate(self, first: f64, second: f64) -> Coordinate {
        match self {
            AxisOrder::LatLon => Coordinate::new(second, first),
            AxisOrder::LonLat => Coordinate::new(first, second),
        }
    }

    fn split(self, coord: Coordinate) -> (f64, f64) {
        match self {
            AxisOrder::LatLon => (coord.lat, coord.lon),
            AxisOrder::LonLat => (coord.lon, coord.lat),
        }
    }
}

/// A geometry in whichever form the backend delivered it.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Coordinates(Vec<Coordinate>),
    Encoded { polyline: String, order: AxisOrder },
}

impl Geometry {
    pub fn encoded(polyline: impl Into<String>, order: AxisOrder) -> Self {
        Geometry::Encoded {
            polyline: polyline.into(),
            order,
        }
    }

    /// Normalizes to a coordinate sequence, decoding if needed.
    pub fn into_polyline(self) -> Result<Polyline, GeometryError> {
        match self {
            Geometry::Coordinates(points) => Ok(Polyline::new(points)),
            Geometry::Encoded { polyline, order } => decode(&polyline, order),
        }
    }
}

/// Decodes an encoded polyline string.
///
/// A string that stops inside a value, or after a lone first axis value, is
/// rejected instead of being truncated to the points read so far. Points
/// must stay within ±180° longitude and ±90° latitude.
pub fn decode(encoded: &str, order: AxisOrder) -> Result<Polyline, GeometryError> {
    let bytes = encoded.as_bytes();
    let mut points = Vec::new();
    let mut index = 0;
    let (mut first, mut second) = (0i64, 0i64);

    while index < bytes.len() {
        let pair_offset = index;
        let (first_delta, next) = read_value(bytes, index)?;
        if next >= bytes.len() {
            return Err(GeometryError::UnpairedCoordinate {
                offset: pair_offset,
            });
        }
        let (second_delta, next) = read_value(bytes, next)?;
        index = next;

        let out_of_range = GeometryError::ValueOutOfRange {
            offset: pair_offset,
        };
        first = first.checked_add(first_delta).ok_or(out_of_range.clone())?;
        second = second.checked_add(second_delta).ok_or(out_of_range.clone())?;

        let point = order.coordinate(
            first as f64 / PRECISION_FACTOR,
            second as f64 / PRECISION_FACTOR,
        );
        if point.lon.abs() > MAX_LON || point.lat.abs() > MAX_LAT {
            return Err(out_of_range);
        }
        points.push(point);
    }

    Ok(Polyline::new(points))
}

/// Encodes a polyline at 5-digit precision.
pub fn encode(polyline: &Polyline, order: AxisOrder) -> String {
    let mut out = String::new();
    let (mut prev_first, mut prev_second) = (0i64, 0i64);

    for &point in polyline.points() {
        let (first, second) = order.split(point);
        let first = (first * PRECISION_FACTOR).round() as i64;
        let second = (second * PRECISION_FACTOR).round() as i64;
        push_value(first - prev_first, &mut out);
        push_value(second - prev_second, &mut out);
        prev_first = first;
        prev_second = second;
    }

    out
}

fn read_value(bytes: &[u8], mut index: usize) -> Result<(i64, usize), GeometryError> {
    let mut result = 0i64;
    let mut shift = 0u32;

    loop {
        let Some(&byte) = bytes.get(index) else {
            return Err(GeometryError::TruncatedValue { offset: index });
        };
        if !(CHUNK_OFFSET..=126).contains(&byte) {
            return Err(GeometryError::InvalidCharacter {
                offset: index,
                character: byte as char,
            });
        }
        if shift > MAX_SHIFT {
            return Err(GeometryError::ValueOutOfRange { offset: index });
        }
        let chunk = i64::from(byte - CHUNK_OFFSET);
        result |= (chunk & CHUNK_MASK) << shift;
        shift += 5;
        index += 1;
        if chunk & CONTINUATION_BIT == 0 {
            break;
        }
    }

    let value = if result & 1 != 0 {
        !(result >> 1)
    } else {
        result >> 1
    };
    Ok((value, index))
}

fn push_value(value: i64, out: &mut String) {
    let mut rest = if value < 0 { !(value << 1) } else { value << 1 };
    while rest >= CONTINUATION_BIT {
        out.push(char::from(((CONTINUATION_BIT | (rest & CHUNK_MASK)) as u8) + CHUNK_OFFSET));
        rest >>= 5;
    }
    out.push(char::from((rest as u8) + CHUNK_OFFSET));
}
