use alloc::vec::Vec;

use serde_json::Value;

use super::error::LoadError;
use crate::datastructures::Waypoint;

pub const WAYPOINTS: &str = "waypoints";

/// Decoded but not yet validated route entries, in document order
#[derive(Debug)]
pub struct Route(Vec<Value>);

/// Expects `{"waypoints": [[latitude, longitude], ...]}`
pub fn decode(text: &str) -> Result<Route, LoadError> {
    let document: Value = serde_json::from_str(text).map_err(|_| LoadError::DecodeError)?;
    let mut object = match document {
        Value::Object(object) => object,
        _ => return Err(LoadError::DecodeError),
    };
    match object.remove(WAYPOINTS) {
        Some(Value::Array(entries)) => Ok(Route(entries)),
        _ => Err(LoadError::DecodeError),
    }
}

fn point(entry: &Value) -> Result<Waypoint, LoadError> {
    let pair = entry.as_array().ok_or(LoadError::MalformedWaypoint)?;
    match pair.as_slice() {
        [latitude, longitude] => match (latitude.as_f64(), longitude.as_f64()) {
            (Some(latitude), Some(longitude)) => Ok(Waypoint::new(latitude, longitude)),
            _ => Err(LoadError::MalformedWaypoint),
        },
        _ => Err(LoadError::MalformedWaypoint),
    }
}

impl Route {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Result<Waypoint, LoadError>> {
        self.0.get(index).map(point)
    }

    pub fn points(&self) -> impl Iterator<Item = Result<Waypoint, LoadError>> + '_ {
        self.0.iter().map(point)
    }
}

mod test {
    #[test]
    fn test_decode_route() {
        use super::decode;
        use crate::datastructures::Waypoint;

        let route = decode(r#"{"waypoints": [[1.0, 2.0], [3, -4.5]]}"#).unwrap();
        assert_eq!(route.len(), 2);
        assert_eq!(route.get(1), Some(Ok(Waypoint::new(3.0, -4.5))));
        let points: alloc::vec::Vec<_> = route.points().collect();
        assert_eq!(points, [Ok(Waypoint::new(1.0, 2.0)), Ok(Waypoint::new(3.0, -4.5))]);
    }

    #[test]
    fn test_decode_error() {
        use super::decode;
        use crate::navigation::LoadError;

        assert_eq!(decode("waypoints: []").unwrap_err(), LoadError::DecodeError);
        assert_eq!(decode("[[1.0, 2.0]]").unwrap_err(), LoadError::DecodeError);
        assert_eq!(decode(r#"{"points": []}"#).unwrap_err(), LoadError::DecodeError);
        assert_eq!(decode(r#"{"waypoints": 1}"#).unwrap_err(), LoadError::DecodeError);
        assert!(decode(r#"{"waypoints": [], "name": "home"}"#).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_waypoint() {
        use super::decode;
        use crate::navigation::LoadError;

        let text = r#"{"waypoints": [[1.0], [1.0, 2.0, 3.0], [1.0, "N"], {"lat": 1.0}]}"#;
        let route = decode(text).unwrap();
        assert!(route.points().all(|p| p == Err(LoadError::MalformedWaypoint)));
    }
}
