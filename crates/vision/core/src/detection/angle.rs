use crate::state::Point;

/// Returns true if `point` lies inside the facing cone of an observer at `origin`.
///
/// The cone spans `angle` degrees centred on `rotation + 90` (rotation 0 faces
/// down the y axis). Points within `close_range` of the origin are always
/// inside.
pub fn test_angle(origin: Point, rotation: f64, angle: f64, close_range: f64, point: Point) -> bool {
    if angle >= 360.0 || origin.distance_to(point) <= close_range {
        return true;
    }

    let min = (rotation + 90.0 - angle / 2.0).rem_euclid(360.0);
    let max = min + angle;
    let bearing = origin.bearing_to(point);

    (min..=max).contains(&bearing) || (min..=max).contains(&(bearing + 360.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: Point = Point::ORIGIN;

    #[test]
    fn facing_down_sees_points_below() {
        assert!(test_angle(ORIGIN, 0.0, 90.0, 0.0, Point::new(0.0, 10.0)));
        assert!(test_angle(ORIGIN, 0.0, 90.0, 0.0, Point::new(5.0, 10.0)));
        assert!(!test_angle(ORIGIN, 0.0, 90.0, 0.0, Point::new(0.0, -10.0)));
        assert!(!test_angle(ORIGIN, 0.0, 90.0, 0.0, Point::new(10.0, 0.0)));
    }

    #[test]
    fn cone_wraps_around_zero_degrees() {
        // Facing +x: the cone covers bearings 315..=405, i.e. across 0.
        assert!(test_angle(ORIGIN, 270.0, 90.0, 0.0, Point::new(10.0, -5.0)));
        assert!(test_angle(ORIGIN, 270.0, 90.0, 0.0, Point::new(10.0, 5.0)));
        assert!(!test_angle(ORIGIN, 270.0, 90.0, 0.0, Point::new(-10.0, 0.0)));
    }

    #[test]
    fn close_range_and_full_circle_bypass_the_cone() {
        let behind = Point::new(0.0, -3.0);
        assert!(test_angle(ORIGIN, 0.0, 90.0, 5.0, behind));
        assert!(test_angle(ORIGIN, 0.0, 360.0, 0.0, behind));
    }
}
