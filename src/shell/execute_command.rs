//! Spawning external commands with redirection and per-child signal setup.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::process::CommandExt;
use std::process::{Child, Command, Stdio};

use failure::{Fail, ResultExt};
use nix::sys::signal::{self, SigHandler, Signal};

use crate::core::command::ParsedCommand;
use crate::errors::{Error, ErrorKind, Result};

/// Mode bits for files created by output redirection.
const OUTFILE_MODE: u32 = 0o644;

#[derive(Debug)]
enum Input {
    Inherit,
    File(File),
    Null,
}

#[derive(Debug)]
enum Output {
    Inherit,
    File(File),
    Null,
}

impl Input {
    /// Background commands without an explicit redirection read from the
    /// null device so they never contend for the terminal.
    fn new(redirect: Option<&str>, background: bool) -> Result<Input> {
        match redirect {
            Some(filename) => {
                let file = File::open(filename)
                    .with_context(|_| ErrorKind::InputRedirection(filename.to_string()))?;
                Ok(Input::File(file))
            }
            None if background => Ok(Input::Null),
            None => Ok(Input::Inherit),
        }
    }
}

impl Output {
    /// The target is created if missing and truncated otherwise;
    /// backgrounded output is discarded unless redirected explicitly.
    fn new(redirect: Option<&str>, background: bool) -> Result<Output> {
        match redirect {
            Some(filename) => {
                let file = OpenOptions::new()
                    .write(true)
                    .create(true)
                    .truncate(true)
                    .mode(OUTFILE_MODE)
                    .open(filename)
                    .with_context(|_| ErrorKind::OutputRedirection(filename.to_string()))?;
                Ok(Output::File(file))
            }
            None if background => Ok(Output::Null),
            None => Ok(Output::Inherit),
        }
    }
}

impl From<Input> for Stdio {
    fn from(input: Input) -> Self {
        match input {
            Input::Inherit => Stdio::inherit(),
            Input::File(file) => file.into(),
            Input::Null => Stdio::null(),
        }
    }
}

impl From<Output> for Stdio {
    fn from(output: Output) -> Self {
        match output {
            Output::Inherit => Stdio::inherit(),
            Output::File(file) => file.into(),
            Output::Null => Stdio::null(),
        }
    }
}

/// Spawns the external command described by `command`.
///
/// Foreground children get the default SIGINT disposition back; background
/// children keep the interpreter's ignore disposition across exec. A
/// redirection target that cannot be opened, or a program that cannot be
/// executed, fails here before any child exists; the caller reports it and
/// the interpreter carries on.
pub fn spawn_process(command: &ParsedCommand) -> Result<Child> {
    let stdin = Input::new(command.infile.as_deref(), command.background)?;
    let stdout = Output::new(command.outfile.as_deref(), command.background)?;

    let (program, args) = command
        .argv
        .split_first()
        .expect("parser rejects empty argument vectors");

    let mut child_command = Command::new(program);
    child_command.args(args);
    child_command.stdin(Stdio::from(stdin));
    child_command.stdout(Stdio::from(stdout));

    if !command.background {
        child_command.before_exec(|| {
            // Runs post-fork in the child: restore the default interrupt
            // disposition so Ctrl-C reaches foreground children.
            unsafe {
                signal::signal(Signal::SIGINT, SigHandler::SigDfl)
                    .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
            }
            Ok(())
        });
    }

    debug!("spawning '{}'", command.input);
    child_command.spawn().map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            Error::command_not_found(program)
        } else {
            e.context(ErrorKind::Io).into()
        }
    })
}
