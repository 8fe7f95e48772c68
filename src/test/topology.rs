use crate::device::topology::{detects, in_radio_range};
use crate::device::{DeviceId, DeviceRegistry, DistanceMetric, Position};

fn pair(dist: f64, ra: f64, rb: f64) -> (DeviceRegistry, DeviceId, DeviceId) {
    let mut reg = DeviceRegistry::default();
    let a = {
        let d = reg.add("a", Position::new(0.0, 0.0));
        d.radio_radius = ra;
        d.id()
    };
    let b = {
        let d = reg.add("b", Position::new(dist, 0.0));
        d.radio_radius = rb;
        d.id()
    };
    (reg, a, b)
}

fn range(reg: &DeviceRegistry, a: DeviceId, b: DeviceId) -> bool {
    in_radio_range(
        reg.get(a).expect("a"),
        reg.get(b).expect("b"),
        reg.metric(),
    )
}

#[test]
fn equal_radii_range_is_symmetric() {
    for dist in [0.0, 10.0, 99.9, 100.0, 100.1, 250.0] {
        let (reg, a, b) = pair(dist, 100.0, 100.0);
        assert_eq!(range(&reg, a, b), range(&reg, b, a), "dist={dist}");
    }
}

#[test]
fn range_uses_larger_radius_and_strict_comparison() {
    let (reg, a, b) = pair(100.0, 150.0, 10.0);
    assert!(range(&reg, a, b));
    assert!(range(&reg, b, a));

    // 距离恰好等于半径时不可达
    let (reg, a, b) = pair(100.0, 100.0, 50.0);
    assert!(!range(&reg, a, b));
}

#[test]
fn range_requires_radio_on_both_sides() {
    let (mut reg, a, b) = pair(10.0, 100.0, 100.0);
    reg.get_mut(b).expect("b").with_radio = false;
    assert!(!range(&reg, a, b));
    assert!(!range(&reg, b, a));
}

#[test]
fn non_finite_position_means_no_interaction() {
    let (mut reg, a, b) = pair(10.0, 100.0, 100.0);
    reg.get_mut(b).expect("b").position = Position::new(f64::NAN, 0.0);
    assert!(!range(&reg, a, b));

    let (da, db) = (reg.get(a).expect("a"), reg.get(b).expect("b"));
    assert!(!detects(da, db, DistanceMetric::Planar));
}

fn sensor(reg: &mut DeviceRegistry, x: f64, radio: bool, mobile: bool) -> DeviceId {
    let d = reg.add("s", Position::new(x, 0.0));
    d.capture_radius = 10.0;
    d.with_sensor = true;
    d.with_radio = radio;
    d.mobile = mobile;
    d.id()
}

#[test]
fn detection_uses_sum_of_capture_radii() {
    let mut reg = DeviceRegistry::default();
    let a = sensor(&mut reg, 0.0, true, false);
    let near = sensor(&mut reg, 19.0, true, false);
    let far = sensor(&mut reg, 40.0, true, false);
    let m = reg.metric();

    let da = reg.get(a).expect("a");
    assert!(detects(da, reg.get(near).expect("near"), m));
    assert!(!detects(da, reg.get(far).expect("far"), m));
}

#[test]
fn detection_requires_sensing_on_both_devices() {
    let mut reg = DeviceRegistry::default();
    let a = sensor(&mut reg, 0.0, true, false);
    let b = sensor(&mut reg, 5.0, true, false);
    reg.get_mut(b).expect("b").with_sensor = false;
    let m = reg.metric();
    assert!(!detects(reg.get(a).expect("a"), reg.get(b).expect("b"), m));
    assert!(!detects(reg.get(b).expect("b"), reg.get(a).expect("a"), m));
}

#[test]
fn stationary_silent_device_cannot_detect_another_stationary_silent_device() {
    let mut reg = DeviceRegistry::default();
    let silent_a = sensor(&mut reg, 0.0, false, false);
    let silent_b = sensor(&mut reg, 5.0, false, false);
    let radio = sensor(&mut reg, 2.0, true, false);
    let mobile = sensor(&mut reg, 3.0, false, true);
    let m = reg.metric();
    let get = |id| reg.get(id).expect("device");

    assert!(!detects(get(silent_a), get(silent_b), m));
    assert!(detects(get(radio), get(silent_b), m));
    assert!(detects(get(mobile), get(silent_b), m));
    // 目标带无线电时，静止无线电静默的设备仍可作为探测方
    assert!(detects(get(silent_a), get(radio), m));
}

#[test]
fn haversine_distance_matches_known_value() {
    // 赤道上经度差 1 度 ≈ 111.195 km
    let a = Position::new(0.0, 0.0);
    let b = Position::new(1.0, 0.0);
    let d = a.distance(&b, DistanceMetric::Haversine);
    assert!((d - 111_194.93).abs() < 1.0, "d={d}");

    assert_eq!(a.distance(&a, DistanceMetric::Haversine), 0.0);
    assert_eq!(
        Position::new(0.0, 0.0).distance(&Position::new(3.0, 4.0), DistanceMetric::Planar),
        5.0
    );
}
