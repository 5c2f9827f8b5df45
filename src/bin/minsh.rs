#[macro_use]
extern crate log;

use std::path::PathBuf;
use std::process;

use docopt::Docopt;
use minsh::errors::{Error, Result};
use minsh::{Shell, ShellConfig};
use nix::unistd::Pid;
use serde_derive::Deserialize;

const LOG_FILE_NAME: &str = ".minsh_log";

const USAGE: &str = "
minsh.

Usage:
    minsh [options]
    minsh [options] -c <command>
    minsh (-h | --help)
    minsh --version

Options:
    -h --help       Show this screen.
    --version       Show version.
    -c              If the -c option is present, then the command is read from the first
                        non-option argument command_string.
    --log=<path>    File to write log to, defaults to ~/.minsh_log
";

/// Docopts input arguments.
#[derive(Debug, Deserialize)]
struct Args {
    arg_command: Option<String>,
    flag_version: bool,
    flag_c: bool,
    flag_log: Option<String>,
}

fn main() {
    let args: Args = Docopt::new(USAGE)
        .and_then(|d| d.deserialize())
        .unwrap_or_else(|e| e.exit());

    init_logger(&args.flag_log);
    debug!("{:?}", args);

    if args.flag_version {
        println!("minsh version {}", env!("CARGO_PKG_VERSION"));
    } else if args.flag_c {
        execute_command_string(&args);
    } else {
        execute_from_stdin();
    }
}

fn init_logger(path: &Option<String>) {
    let log_path = path
        .clone()
        .map(PathBuf::from)
        .unwrap_or_else(default_log_path);

    let pid = Pid::this();
    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}: {}",
                pid,
                record.level(),
                record.target(),
                message
            ))
        })
        .level(log::LevelFilter::Trace)
        .chain(fern::log_file(log_path).unwrap())
        .apply()
        .unwrap();
}

fn default_log_path() -> PathBuf {
    dirs::home_dir().unwrap().join(LOG_FILE_NAME)
}

fn execute_command_string(args: &Args) -> ! {
    let mut shell = create_shell(ShellConfig::noninteractive());
    let command = args
        .arg_command
        .as_ref()
        .expect("docopt guarantees <command> when -c is given");
    let result = shell.execute_command_string(command);
    shell.request_exit();
    exit(result)
}

fn execute_from_stdin() -> ! {
    let mut shell = create_shell(ShellConfig::interactive());
    let result = shell.execute_from_stdin();
    exit(result)
}

fn create_shell(config: ShellConfig) -> Shell {
    Shell::new(config).unwrap_or_else(|e| display_error_and_exit(&e))
}

fn display_error_and_exit(error: &Error) -> ! {
    error!("failed to create shell: {}", error);
    eprintln!("minsh: {}", error);
    process::exit(1);
}

fn exit(result: Result<()>) -> ! {
    if let Err(e) = result {
        // A failing process-creation primitive leaves nothing to isolate.
        error!("fatal: {}", e);
        eprintln!("minsh: {}", e);
        process::exit(1);
    }
    process::exit(0);
}
