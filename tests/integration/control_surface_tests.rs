//! Integration tests for the text control surface: writes decode against the
//! current state, reads render the interval.

use blinkctl::app::commands::BlinkCommand;
use blinkctl::app::controller::BlinkState;
use blinkctl::app::events::BlinkEvent;
use blinkctl::app::interval::{Interval, Ticks};
use blinkctl::error::{CommandError, Error};
use embedded_hal::digital::PinState;

use super::mock_hw::Rig;

fn rejected(e: CommandError) -> Result<BlinkCommand, Error> {
    Err(Error::InvalidCommand(e))
}

// ── Reads ─────────────────────────────────────────────────────

#[test]
fn read_renders_default_interval() {
    let rig = Rig::new();
    assert_eq!(rig.surface().render_status().as_str(), "500 milliseconds\n");
}

#[test]
fn read_reflects_truncated_write() {
    let rig = Rig::new();
    let surface = rig.surface();

    surface.handle_command("255").unwrap();
    assert_eq!(surface.render_status().as_str(), "250 milliseconds\n");

    surface.handle_command("1000").unwrap();
    assert_eq!(surface.render_status().as_str(), "1000 milliseconds\n");
}

// ── Writes ────────────────────────────────────────────────────

#[test]
fn full_session_on_retime_off() {
    let rig = Rig::new();
    let surface = rig.surface();

    assert_eq!(surface.handle_command("on\n"), Ok(BlinkCommand::Start));
    assert_eq!(rig.scheduler.next_delay(), Some(Ticks(50)));

    assert_eq!(
        surface.handle_command("100"),
        Ok(BlinkCommand::SetInterval(Interval::from_millis(100).unwrap()))
    );
    rig.scheduler.fire_next();
    assert_eq!(rig.pins.last_write(), Some(PinState::High));
    assert_eq!(rig.scheduler.next_delay(), Some(Ticks(10)));

    assert_eq!(surface.handle_command("off"), Ok(BlinkCommand::Stop));
    rig.scheduler.fire_next();
    assert_eq!(rig.pins.last_write(), Some(PinState::Low));
    assert_eq!(rig.scheduler.pending(), 0);
    assert_eq!(rig.controller.state(), BlinkState::Stopped);
}

#[test]
fn on_while_running_is_rejected_without_effect() {
    let rig = Rig::new();
    let surface = rig.surface();
    surface.handle_command("on").unwrap();

    assert_eq!(surface.handle_command("on"), rejected(CommandError::NotANumber));
    assert_eq!(rig.controller.state(), BlinkState::Running);
    assert_eq!(rig.scheduler.pending(), 1);
}

#[test]
fn off_while_stopped_is_rejected_without_effect() {
    let rig = Rig::new();
    let surface = rig.surface();

    assert_eq!(surface.handle_command("off"), rejected(CommandError::NotANumber));
    assert_eq!(rig.controller.state(), BlinkState::Stopped);
    assert_eq!(rig.pins.writes(), vec![PinState::Low]);
}

#[test]
fn malformed_writes_are_rejected() {
    let rig = Rig::new();
    let surface = rig.surface();

    assert_eq!(surface.handle_command(""), rejected(CommandError::Empty));
    assert_eq!(surface.handle_command("\n"), rejected(CommandError::Empty));
    assert_eq!(surface.handle_command("blink"), rejected(CommandError::NotANumber));
    assert_eq!(surface.handle_command("2.5"), rejected(CommandError::NotANumber));
    assert_eq!(surface.handle_command("49"), rejected(CommandError::OutOfRange(49)));
    assert_eq!(
        surface.handle_command("1001"),
        rejected(CommandError::OutOfRange(1001))
    );
    assert_eq!(surface.handle_command("-5"), rejected(CommandError::OutOfRange(-5)));

    assert_eq!(surface.render_status().as_str(), "500 milliseconds\n");
    assert_eq!(rig.controller.state(), BlinkState::Stopped);
}

#[test]
fn rejections_are_reported_to_the_sink() {
    let rig = Rig::new();
    let surface = rig.surface();
    let _ = surface.handle_command("off");
    let _ = surface.handle_command("9999");

    assert_eq!(
        rig.sink.events(),
        vec![
            BlinkEvent::CommandRejected(CommandError::NotANumber),
            BlinkEvent::CommandRejected(CommandError::OutOfRange(9999)),
        ]
    );
}

#[test]
fn interval_write_is_accepted_in_either_state() {
    let rig = Rig::new();
    let surface = rig.surface();

    surface.handle_command("300").unwrap();
    surface.handle_command("on").unwrap();
    surface.handle_command("700").unwrap();

    assert_eq!(surface.render_status().as_str(), "700 milliseconds\n");
    assert_eq!(
        rig.sink.count(|e| matches!(e, BlinkEvent::IntervalChanged { .. })),
        2
    );
}

#[test]
fn clones_share_one_controller() {
    let rig = Rig::new();
    let a = rig.surface();
    let b = a.clone();

    a.handle_command("on").unwrap();
    assert_eq!(b.handle_command("off"), Ok(BlinkCommand::Stop));
}
