//! Error module. See the [failure](https://crates.io/crates/failure) crate for details.

use std::fmt;
use std::result;

use failure::{Backtrace, Context, Fail};

pub type Result<T> = result::Result<T, Error>;

#[derive(Debug)]
pub struct Error {
    ctx: Context<ErrorKind>,
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.ctx.get_context()
    }

    pub(crate) fn missing_redirection_target(operator: &str) -> Error {
        Error::from(ErrorKind::MissingRedirectionTarget(operator.to_string()))
    }

    pub(crate) fn input_too_long(limit: usize) -> Error {
        Error::from(ErrorKind::InputTooLong(limit))
    }

    pub(crate) fn too_many_arguments(limit: usize) -> Error {
        Error::from(ErrorKind::TooManyArguments(limit))
    }

    pub(crate) fn builtin_command<T: AsRef<str>>(message: T, code: i32) -> Error {
        Error::from(ErrorKind::BuiltinCommand {
            message: message.as_ref().to_string(),
            code,
        })
    }

    pub(crate) fn command_not_found<T: AsRef<str>>(command: T) -> Error {
        Error::from(ErrorKind::CommandNotFound(command.as_ref().to_string()))
    }

    pub(crate) fn job_table_full(capacity: usize) -> Error {
        Error::from(ErrorKind::JobTableFull(capacity))
    }
}

impl Fail for Error {
    fn cause(&self) -> Option<&dyn Fail> {
        self.ctx.cause()
    }

    fn backtrace(&self) -> Option<&Backtrace> {
        self.ctx.backtrace()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.ctx.fmt(f)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// A redirection operator was the last token on the line.
    MissingRedirectionTarget(String),
    /// The line exceeded the input ceiling, before or after expansion.
    InputTooLong(usize),
    /// The line exceeded the argument-vector ceiling.
    TooManyArguments(usize),
    BuiltinCommand { message: String, code: i32 },
    CommandNotFound(String),
    /// An input redirection path could not be opened for reading.
    InputRedirection(String),
    /// An output redirection path could not be created or truncated.
    OutputRedirection(String),
    JobTableFull(usize),
    Io,
    Nix,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ErrorKind::MissingRedirectionTarget(ref operator) => {
                write!(f, "syntax error: '{}' requires a file name", operator)
            }
            ErrorKind::InputTooLong(limit) => {
                write!(f, "input line exceeds {} bytes", limit)
            }
            ErrorKind::TooManyArguments(limit) => {
                write!(f, "too many arguments (limit {})", limit)
            }
            ErrorKind::BuiltinCommand { ref message, .. } => write!(f, "{}", message),
            ErrorKind::CommandNotFound(ref command) => {
                write!(f, "{}: command not found", command)
            }
            ErrorKind::InputRedirection(ref filename) => {
                write!(f, "cannot open input file: {}", filename)
            }
            ErrorKind::OutputRedirection(ref filename) => {
                write!(f, "cannot create output file: {}", filename)
            }
            ErrorKind::JobTableFull(capacity) => {
                write!(f, "background job table is full ({} jobs)", capacity)
            }
            ErrorKind::Io => write!(f, "I/O error occurred"),
            ErrorKind::Nix => write!(f, "Nix error occurred"),
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error::from(Context::new(kind))
    }
}

impl From<Context<ErrorKind>> for Error {
    fn from(ctx: Context<ErrorKind>) -> Error {
        Error { ctx }
    }
}
