use super::SharedBuf;
use crate::device::{DeviceRegistry, Position};
use crate::sim::{Direction, Event, EventLog, SimError, SimTime};
use std::path::Path;
use std::time::Duration;

#[test]
fn event_log_writes_header_records_and_footer() {
    let buf = SharedBuf::default();
    let mut log = EventLog::new(Box::new(buf.clone()));

    let mut reg = DeviceRegistry::default();
    let id = reg.add("S7", Position::default()).id();
    let dev = reg.get(id).expect("device");
    let ev = Event::new(id, SimTime::from_millis(3), "hello").with_epsilon(0.5);

    log.header("demo").expect("header");
    log.record(Duration::from_nanos(42), dev, Direction::Send, &ev)
        .expect("send");
    log.record(Duration::from_nanos(43), dev, Direction::Receive, &ev)
        .expect("receive");
    log.footer(Duration::from_nanos(99)).expect("footer");

    let lines = buf.lines();
    assert_eq!(lines[0], format!("wsn-sim v. {}", env!("CARGO_PKG_VERSION")));
    assert_eq!(lines[1], "Simulation name : demo");
    assert_eq!(lines[2], "Events list [");
    assert_eq!(lines[3], "42 0 S7 send hello, date : 3000000 + eps 0.5");
    assert_eq!(lines[4], "43 0 S7 receive hello, date : 3000000 + eps 0.5");
    assert_eq!(
        &lines[5..],
        &["]", "", "Duration :", "Logic : 99 ns", "End simulation"]
    );
}

#[test]
fn event_log_create_reports_io_error() {
    let err = EventLog::create(Path::new("/nonexistent-dir/for/sure/log.txt"))
        .err()
        .expect("should fail");
    assert!(matches!(err, SimError::Log(_)));
}
