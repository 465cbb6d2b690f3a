//! Integration tests for the line console driving a control surface.

use std::io::Cursor;

use blinkctl::adapters::console;
use blinkctl::app::controller::BlinkState;

use super::mock_hw::Rig;

fn run(rig: &Rig, script: &str) -> String {
    let mut out = Vec::new();
    console::serve(&rig.surface(), Cursor::new(script.as_bytes()), &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn reads_and_writes_round_the_loop() {
    let rig = Rig::new();
    let out = run(&rig, "\non\n250\ncat\n");

    assert_eq!(out, "500 milliseconds\nok\nok\n250 milliseconds\n");
    assert_eq!(rig.controller.state(), BlinkState::Running);
}

#[test]
fn rejected_write_prints_reason() {
    let rig = Rig::new();
    let out = run(&rig, "off\n");

    assert!(out.starts_with("error: invalid command"), "{out:?}");
    assert_eq!(rig.controller.state(), BlinkState::Stopped);
}

#[test]
fn exit_stops_reading() {
    let rig = Rig::new();
    let out = run(&rig, "on\nexit\noff\n");

    assert_eq!(out, "ok\n");
    assert_eq!(rig.controller.state(), BlinkState::Running);
}

#[test]
fn crlf_lines_are_accepted() {
    let rig = Rig::new();
    let out = run(&rig, "on\r\n\r\n");
    assert_eq!(out, "ok\n500 milliseconds\n");
}
