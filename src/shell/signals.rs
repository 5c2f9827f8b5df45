//! Signal dispositions and the foreground-only mode flag.
//!
//! The interpreter ignores SIGINT; SIGTSTP toggles foreground-only mode.
//! The toggle handler runs in async-signal context and is limited to an
//! atomic flag update and raw `write(2)` calls: no allocation, no locks,
//! no buffered output, no logging.

use std::sync::atomic::{AtomicBool, Ordering};

use failure::ResultExt;
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};
use nix::unistd;

use crate::errors::{ErrorKind, Result};
use crate::shell::shell::PROMPT;

static FOREGROUND_ONLY: AtomicBool = AtomicBool::new(false);

const ENTER_NOTICE: &[u8] = b"\nEntering foreground-only mode (& is now ignored)\n";
const EXIT_NOTICE: &[u8] = b"\nExiting foreground-only mode\n";

/// Installs the interpreter's dispositions: SIGINT ignored, SIGTSTP
/// toggles foreground-only mode. Both block all catchable signals while
/// handling; `SA_RESTART` keeps the blocking line read alive across the
/// toggle.
pub fn install() -> Result<()> {
    let ignore = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::all());
    let toggle = SigAction::new(
        SigHandler::Handler(handle_sigtstp),
        SaFlags::SA_RESTART,
        SigSet::all(),
    );
    unsafe {
        signal::sigaction(Signal::SIGINT, &ignore).context(ErrorKind::Nix)?;
        signal::sigaction(Signal::SIGTSTP, &toggle).context(ErrorKind::Nix)?;
    }
    Ok(())
}

/// Returns `true` while background requests are ignored.
pub fn foreground_only() -> bool {
    FOREGROUND_ONLY.load(Ordering::SeqCst)
}

extern "C" fn handle_sigtstp(_signal: libc::c_int) {
    let entering = !FOREGROUND_ONLY.fetch_xor(true, Ordering::SeqCst);
    let notice = if entering { ENTER_NOTICE } else { EXIT_NOTICE };
    // The interrupted read restarts, so the prompt needs re-displaying.
    let _ = unistd::write(libc::STDOUT_FILENO, notice);
    let _ = unistd::write(libc::STDOUT_FILENO, PROMPT.as_bytes());
}
