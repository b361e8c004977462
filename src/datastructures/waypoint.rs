/// Geographic target point in signed degrees, north and east positive.
/// Range is not checked.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl Waypoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl From<(f64, f64)> for Waypoint {
    fn from(tuple: (f64, f64)) -> Self {
        Self::new(tuple.0, tuple.1)
    }
}

impl From<[f64; 2]> for Waypoint {
    fn from(pair: [f64; 2]) -> Self {
        Self::new(pair[0], pair[1])
    }
}

impl core::fmt::Display for Waypoint {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

mod test {
    #[test]
    fn test_waypoint_display() {
        use super::Waypoint;

        assert_eq!("1.5, -4.25", alloc::format!("{}", Waypoint::new(1.5, -4.25)));
        assert_eq!(Waypoint::new(3.0, 4.0), Waypoint::from([3.0, 4.0]));
    }

    #[test]
    fn test_serialize_waypoint() {
        use serde_json::json;

        use super::Waypoint;

        let expected = json!({"latitude": 40.5, "longitude": -116.25});
        assert_eq!(expected, serde_json::to_value(&Waypoint::from((40.5, -116.25))).unwrap());
    }
}
