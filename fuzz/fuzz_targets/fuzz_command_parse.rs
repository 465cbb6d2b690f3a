//! Fuzz target: `BlinkCommand::parse`
//!
//! Decodes arbitrary UTF-8 payloads in both blink states and asserts that
//! the decoder never panics and never yields an interval outside
//! [50, 1000] ms.
//!
//! cargo fuzz run fuzz_command_parse

#![no_main]

use blinkctl::app::commands::BlinkCommand;
use blinkctl::app::controller::BlinkState;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };

    for state in [BlinkState::Stopped, BlinkState::Running] {
        if let Ok(BlinkCommand::SetInterval(interval)) = BlinkCommand::parse(text, state) {
            let ms = interval.as_millis();
            assert!((50..=1000).contains(&ms), "interval {ms} ms out of range");
            assert_eq!(ms % 10, 0, "interval not on the tick grid");
        }
    }
});
