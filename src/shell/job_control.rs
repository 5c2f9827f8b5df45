//! Background-job bookkeeping and child reaping.

use std::fmt;

use failure::{Fail, ResultExt};
use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::sys::wait::{self, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

use crate::errors::{Error, ErrorKind, Result};

/// Upper bound on simultaneously registered background jobs.
pub const DEFAULT_JOB_CAPACITY: usize = 256;

/// Termination outcome of a reaped child.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ChildOutcome {
    /// Normal exit with the given code.
    Exited(i32),
    /// Terminated by the given signal number.
    Signaled(i32),
}

impl ChildOutcome {
    fn from_wait_status(status: &WaitStatus) -> Option<ChildOutcome> {
        match *status {
            WaitStatus::Exited(_, code) => Some(ChildOutcome::Exited(code)),
            WaitStatus::Signaled(_, sig, _) => Some(ChildOutcome::Signaled(sig as i32)),
            _ => None,
        }
    }
}

impl Default for ChildOutcome {
    /// The outcome reported before any foreground command has run.
    fn default() -> Self {
        ChildOutcome::Exited(0)
    }
}

impl fmt::Display for ChildOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ChildOutcome::Exited(code) => write!(f, "exit value: {}", code),
            ChildOutcome::Signaled(signo) => write!(f, "terminated by signal: {}", signo),
        }
    }
}

/// A background child, tracked from spawn until reap.
struct Job {
    pid: Pid,
    command: String,
}

/// An ordered, capacity-bounded set of in-flight background jobs.
pub struct JobTable {
    jobs: Vec<Job>,
    capacity: usize,
}

impl JobTable {
    pub fn new() -> JobTable {
        JobTable::with_capacity(DEFAULT_JOB_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> JobTable {
        JobTable {
            jobs: Vec::new(),
            capacity,
        }
    }

    pub fn has_jobs(&self) -> bool {
        !self.jobs.is_empty()
    }

    /// The registered pids, oldest first.
    pub fn pids(&self) -> Vec<Pid> {
        self.jobs.iter().map(|job| job.pid).collect()
    }

    /// Registers a just-spawned background child.
    pub fn register(&mut self, pid: Pid, command: &str) -> Result<()> {
        if self.jobs.len() == self.capacity {
            return Err(Error::job_table_full(self.capacity));
        }
        self.jobs.push(Job {
            pid,
            command: command.to_string(),
        });
        Ok(())
    }

    /// Reaps every terminated child without blocking.
    ///
    /// One call drains everything that finished since the last sweep:
    /// each terminated pid found in the table is removed (the remaining
    /// entries keep their order) and reported with its outcome. Children
    /// that were never registered are still reaped but not reported.
    pub fn sweep(&mut self) -> Result<Vec<(Pid, ChildOutcome)>> {
        let mut finished = Vec::new();
        loop {
            match wait::waitpid(Pid::from_raw(-1), Some(WaitPidFlag::WNOHANG)) {
                Ok(WaitStatus::StillAlive) | Err(nix::Error::Sys(Errno::ECHILD)) => break,
                Ok(status) => {
                    let pid = status.pid().expect("wait status carries a pid");
                    if let Some(outcome) = ChildOutcome::from_wait_status(&status) {
                        if self.unregister(pid) {
                            finished.push((pid, outcome));
                        }
                    }
                }
                Err(e) => return Err(e.context(ErrorKind::Nix).into()),
            }
        }
        Ok(finished)
    }

    /// Forcibly terminates and reaps every registered job, emptying the
    /// table.
    pub fn terminate_all(&mut self) {
        for job in self.jobs.drain(..) {
            debug!("killing background job {}", job.pid);
            let kill_result = signal::kill(job.pid, Signal::SIGKILL);
            log_if_err!(kill_result, "failed to kill background job ({})", job.pid);
            if kill_result.is_ok() {
                let wait_result = wait::waitpid(job.pid, None);
                log_if_err!(wait_result, "failed to reap background job ({})", job.pid);
            }
        }
    }

    /// Removes `pid`, preserving the order of the remaining jobs.
    fn unregister(&mut self, pid: Pid) -> bool {
        match self.jobs.iter().position(|job| job.pid == pid) {
            Some(index) => {
                self.jobs.remove(index);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for JobTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{} jobs", self.jobs.len())?;
        for job in &self.jobs {
            writeln!(f, "pid: {}\tcommand: {}", job.pid, job.command)?;
        }
        Ok(())
    }
}

/// Waits for one specific child, blocking until it terminates.
pub fn reap_blocking(pid: Pid) -> Result<ChildOutcome> {
    loop {
        let status = wait::waitpid(pid, None).context(ErrorKind::Nix)?;
        if let Some(outcome) = ChildOutcome::from_wait_status(&status) {
            return Ok(outcome);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::process::Command;
    use std::thread;
    use std::time::Duration;

    use crate::test_support;

    #[test]
    fn test_outcome_display() {
        assert_eq!(ChildOutcome::default().to_string(), "exit value: 0");
        assert_eq!(ChildOutcome::Exited(2).to_string(), "exit value: 2");
        assert_eq!(
            ChildOutcome::Signaled(15).to_string(),
            "terminated by signal: 15"
        );
    }

    #[test]
    fn test_unregister_preserves_order() {
        let mut table = JobTable::new();
        for pid in &[10, 20, 30] {
            table.register(Pid::from_raw(*pid), "sleep 30 &").unwrap();
        }

        assert!(table.unregister(Pid::from_raw(20)));
        assert_eq!(table.pids(), vec![Pid::from_raw(10), Pid::from_raw(30)]);
        assert!(!table.unregister(Pid::from_raw(20)));
    }

    #[test]
    fn test_register_fails_when_full() {
        let mut table = JobTable::with_capacity(2);
        table.register(Pid::from_raw(10), "sleep 30 &").unwrap();
        table.register(Pid::from_raw(20), "sleep 30 &").unwrap();

        let err = table.register(Pid::from_raw(30), "sleep 30 &").unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::JobTableFull(2));
        assert_eq!(table.pids(), vec![Pid::from_raw(10), Pid::from_raw(20)]);
    }

    #[test]
    fn test_sweep_with_nothing_terminated_is_a_noop() {
        let _guard = test_support::child_process_lock();
        let mut table = JobTable::new();
        assert!(table.sweep().unwrap().is_empty());
        assert!(table.sweep().unwrap().is_empty());
        assert!(!table.has_jobs());
    }

    #[test]
    fn test_sweep_reports_registered_children() {
        let _guard = test_support::child_process_lock();
        let mut table = JobTable::new();
        let child = Command::new("sh").arg("-c").arg("exit 7").spawn().unwrap();
        let pid = Pid::from_raw(child.id() as i32);
        table.register(pid, "sh -c 'exit 7' &").unwrap();

        let mut finished = Vec::new();
        for _ in 0..100 {
            finished = table.sweep().unwrap();
            if !finished.is_empty() {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }

        assert_eq!(finished, vec![(pid, ChildOutcome::Exited(7))]);
        assert!(!table.has_jobs());
        // A second sweep has nothing left to report.
        assert!(table.sweep().unwrap().is_empty());
    }

    #[test]
    fn test_reap_blocking_normal_exit() {
        let _guard = test_support::child_process_lock();
        let child = Command::new("false").spawn().unwrap();
        let outcome = reap_blocking(Pid::from_raw(child.id() as i32)).unwrap();
        assert_eq!(outcome, ChildOutcome::Exited(1));
    }

    #[test]
    fn test_reap_blocking_signal_termination() {
        let _guard = test_support::child_process_lock();
        let child = Command::new("sleep").arg("30").spawn().unwrap();
        let pid = Pid::from_raw(child.id() as i32);
        signal::kill(pid, Signal::SIGKILL).unwrap();
        assert_eq!(
            reap_blocking(pid).unwrap(),
            ChildOutcome::Signaled(libc::SIGKILL)
        );
    }

    #[test]
    fn test_terminate_all_clears_the_table() {
        let _guard = test_support::child_process_lock();
        let mut table = JobTable::new();
        for _ in 0..2 {
            let child = Command::new("sleep").arg("30").spawn().unwrap();
            table
                .register(Pid::from_raw(child.id() as i32), "sleep 30 &")
                .unwrap();
        }

        table.terminate_all();
        assert!(!table.has_jobs());
    }
}
