//! Line console for the control surface.
//!
//! Each input line is one access to the text endpoint:
//!
//! | Line             | Access                                  |
//! |------------------|-----------------------------------------|
//! | empty or `cat`   | read, prints `"<N> milliseconds"`       |
//! | `exit`           | leave the console (shutdown follows)    |
//! | anything else    | write, prints `ok` or `error: <reason>` |

use std::io::{self, BufRead, Write};

use embedded_hal::digital::OutputPin;

use crate::app::control::ControlSurface;
use crate::app::ports::{EventSink, TaskScheduler};

/// What one console line asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleRequest<'a> {
    Read,
    Write(&'a str),
    Exit,
}

impl<'a> ConsoleRequest<'a> {
    pub fn parse(line: &'a str) -> Self {
        match line.trim_end_matches('\r') {
            "" | "cat" => Self::Read,
            "exit" => Self::Exit,
            payload => Self::Write(payload),
        }
    }
}

/// Serve lines from `input` until EOF or `exit`.
pub fn serve<P, S, E>(
    surface: &ControlSurface<P, S, E>,
    input: impl BufRead,
    mut output: impl Write,
) -> io::Result<()>
where
    P: OutputPin + Send + 'static,
    S: TaskScheduler + 'static,
    E: EventSink + 'static,
{
    for line in input.lines() {
        let line = line?;
        match ConsoleRequest::parse(&line) {
            ConsoleRequest::Read => output.write_all(surface.render_status().as_bytes())?,
            ConsoleRequest::Exit => break,
            ConsoleRequest::Write(payload) => match surface.handle_command(payload) {
                Ok(_) => writeln!(output, "ok")?,
                Err(e) => writeln!(output, "error: {}", e)?,
            },
        }
        output.flush()?;
    }
    Ok(())
}
