//! Minsh - Shell Module
//!
//! The Shell owns the interpreter state: the background-job table, the
//! outcome of the last foreground command, and the running flag. It drives
//! the read-expand-parse-dispatch loop.

use std::io::{self, BufRead, Write};

use nix::unistd::{self, Pid};

use crate::core::command::{ParsedCommand, MAX_LINE_LEN};
use crate::core::expansion;
use crate::errors::{Error, ErrorKind, Result};
use crate::shell::builtins;
use crate::shell::execute_command::spawn_process;
use crate::shell::job_control::{self, ChildOutcome, JobTable};
use crate::shell::signals;

/// Marker printed before each line read.
pub(crate) const PROMPT: &str = ": ";

/// Minsh Shell
#[derive(Debug)]
pub struct Shell {
    job_table: JobTable,
    /// Outcome of the last foreground command executed.
    last_foreground_status: ChildOutcome,
    /// Cleared by the `exit` builtin (or end of input) to end the main loop.
    running: bool,
}

impl Shell {
    /// Constructs a new Shell to track background jobs and dispatch
    /// commands.
    pub fn new(config: ShellConfig) -> Result<Shell> {
        if config.handle_signals {
            signals::install()?;
        }

        info!("minsh started up");
        Ok(Shell {
            job_table: JobTable::with_capacity(config.background_job_capacity),
            last_foreground_status: ChildOutcome::default(),
            running: true,
        })
    }

    /// Runs commands from stdin until `exit` or end of input.
    pub fn execute_from_stdin(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let mut input = String::new();
        while self.running {
            // Report and forget any background jobs that finished since
            // the previous iteration.
            self.notify_finished_jobs();

            print!("{}", PROMPT);
            let flush_result = io::stdout().flush();
            log_if_err!(flush_result, "failed to flush prompt");

            input.clear();
            match stdin.lock().read_line(&mut input) {
                Ok(0) => {
                    // End of input behaves like `exit`.
                    self.request_exit();
                    continue;
                }
                Ok(_) => {}
                Err(e) => {
                    error!("failed to read line: {}", e);
                    continue;
                }
            }

            if input.len() > MAX_LINE_LEN {
                eprintln!("minsh: {}", Error::input_too_long(MAX_LINE_LEN));
                continue;
            }
            // Comments and blank lines never reach the parser.
            if input.starts_with('#') || input.trim().is_empty() {
                continue;
            }

            self.execute_command_string(&input)?;
        }
        Ok(())
    }

    /// Expands, parses, and dispatches one line of input.
    ///
    /// Expansion and parse failures reject the line with a diagnostic and
    /// return `Ok`; the caller moves on to the next prompt. Only failures
    /// of the process-creation machinery itself propagate as errors.
    pub fn execute_command_string(&mut self, input: &str) -> Result<()> {
        let parsed = expansion::expand_pid_marker(input, unistd::getpid())
            .and_then(|line| ParsedCommand::parse(&line, signals::foreground_only()));
        let command = match parsed {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(()),
            Err(e) => {
                eprintln!("minsh: {}", e);
                return Ok(());
            }
        };

        self.dispatch(&command)
    }

    /// Routes a parsed command to a builtin handler or to the process
    /// launcher.
    fn dispatch(&mut self, command: &ParsedCommand) -> Result<()> {
        let program = command.program();
        if builtins::is_builtin(program) {
            let (exit_status, result) =
                builtins::run(self, program, command.args(), &mut io::stdout());
            debug!("builtin '{}' finished with status {}", program, exit_status);
            if let Err(e) = result {
                // Builtin failures are reported; the interpreter carries on.
                eprintln!("minsh: {}", e);
            }
            Ok(())
        } else {
            self.execute_external(command)
        }
    }

    fn execute_external(&mut self, command: &ParsedCommand) -> Result<()> {
        let child = match spawn_process(command) {
            Ok(child) => child,
            Err(e) => match *e.kind() {
                ErrorKind::CommandNotFound(_)
                | ErrorKind::InputRedirection(_)
                | ErrorKind::OutputRedirection(_) => {
                    // The command never came to life; record the failure
                    // the way a child exiting with 1 would.
                    eprintln!("minsh: {}", e);
                    if !command.background {
                        self.last_foreground_status = ChildOutcome::Exited(1);
                    }
                    return Ok(());
                }
                _ => return Err(e),
            },
        };

        let pid = Pid::from_raw(child.id() as i32);
        if command.background {
            self.run_in_background(pid, command)
        } else {
            self.run_in_foreground(pid)
        }
    }

    fn run_in_foreground(&mut self, pid: Pid) -> Result<()> {
        let outcome = job_control::reap_blocking(pid)?;
        if let ChildOutcome::Signaled(_) = outcome {
            println!("{}", outcome);
        }
        self.last_foreground_status = outcome;
        Ok(())
    }

    fn run_in_background(&mut self, pid: Pid, command: &ParsedCommand) -> Result<()> {
        match self.job_table.register(pid, &command.input) {
            Ok(()) => {
                println!("Background pid is {}", pid);
                Ok(())
            }
            Err(e) => {
                // A full table rejects the request; the command runs in
                // the foreground instead and is reaped normally.
                eprintln!("minsh: {}; running in foreground", e);
                self.run_in_foreground(pid)
            }
        }
    }

    /// Reports and forgets the background jobs that terminated since the
    /// last sweep.
    fn notify_finished_jobs(&mut self) {
        match self.job_table.sweep() {
            Ok(finished) => {
                for (pid, outcome) in finished {
                    match outcome {
                        ChildOutcome::Exited(code) => {
                            println!("Background pid {} is finished. Exit value {}", pid, code)
                        }
                        ChildOutcome::Signaled(signo) => println!(
                            "Background pid {} is finished. Terminated by signal {}",
                            pid, signo
                        ),
                    }
                }
            }
            Err(e) => error!("failed to sweep background jobs: {}", e),
        }
    }

    /// Ends the main loop: finished jobs are reported one last time, every
    /// remaining background job is forcibly terminated, and the table is
    /// left empty.
    pub fn request_exit(&mut self) {
        self.notify_finished_jobs();
        self.job_table.terminate_all();
        self.running = false;
        info!("minsh shut down");
    }

    /// Outcome of the last foreground command, `exit value: 0` before any
    /// has run.
    pub fn last_foreground_status(&self) -> ChildOutcome {
        self.last_foreground_status
    }

    /// Returns `true` if the shell has background jobs.
    pub fn has_background_jobs(&self) -> bool {
        self.job_table.has_jobs()
    }

    /// Returns `false` once `exit` has run.
    pub fn is_running(&self) -> bool {
        self.running
    }
}

/// Policy object to control a Shell's behavior
#[derive(Clone, Copy, Debug)]
pub struct ShellConfig {
    /// Determines if the interpreter's SIGINT/SIGTSTP dispositions are
    /// installed process-wide.
    pub(crate) handle_signals: bool,
    /// Upper bound on simultaneously registered background jobs.
    pub(crate) background_job_capacity: usize,
}

impl ShellConfig {
    /// Creates an interactive shell: SIGINT ignored and SIGTSTP toggling
    /// foreground-only mode for the whole process.
    pub fn interactive() -> ShellConfig {
        ShellConfig {
            handle_signals: true,
            background_job_capacity: job_control::DEFAULT_JOB_CAPACITY,
        }
    }

    /// Creates a noninteractive shell (one-shot `-c` commands, tests): the
    /// process-wide signal dispositions are left untouched.
    pub fn noninteractive() -> ShellConfig {
        ShellConfig {
            handle_signals: false,
            ..ShellConfig::interactive()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::test_support;

    fn test_shell() -> Shell {
        let config = ShellConfig {
            background_job_capacity: 2,
            ..ShellConfig::noninteractive()
        };
        Shell::new(config).unwrap()
    }

    #[test]
    fn test_status_starts_at_zero() {
        let shell = test_shell();
        assert_eq!(shell.last_foreground_status(), ChildOutcome::Exited(0));
        assert!(shell.is_running());
        assert!(!shell.has_background_jobs());
    }

    #[test]
    fn test_foreground_command_updates_status() {
        let _guard = test_support::child_process_lock();
        let mut shell = test_shell();
        shell.execute_command_string("false").unwrap();
        assert_eq!(shell.last_foreground_status(), ChildOutcome::Exited(1));

        shell.execute_command_string("true").unwrap();
        assert_eq!(shell.last_foreground_status(), ChildOutcome::Exited(0));
    }

    #[test]
    fn test_unknown_command_records_failure() {
        let mut shell = test_shell();
        shell
            .execute_command_string("definitely-not-a-command-1234")
            .unwrap();
        assert_eq!(shell.last_foreground_status(), ChildOutcome::Exited(1));
    }

    #[test]
    fn test_rejected_line_leaves_state_unchanged() {
        let mut shell = test_shell();
        shell.execute_command_string("cat <").unwrap();
        assert_eq!(shell.last_foreground_status(), ChildOutcome::Exited(0));
        assert!(shell.is_running());
    }

    #[test]
    fn test_exit_terminates_background_jobs() {
        let _guard = test_support::child_process_lock();
        let mut shell = test_shell();
        shell.execute_command_string("sleep 30 &").unwrap();
        shell.execute_command_string("sleep 31 &").unwrap();
        assert!(shell.has_background_jobs());

        shell.execute_command_string("exit").unwrap();
        assert!(!shell.has_background_jobs());
        assert!(!shell.is_running());
    }
}
