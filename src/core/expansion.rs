//! Expansion of the shell's self-reference marker.

use nix::unistd::Pid;

use crate::core::command::MAX_LINE_LEN;
use crate::errors::{Error, Result};

/// The literal marker replaced by the shell's own process id.
pub const PID_MARKER: &str = "$$";

/// Replaces every occurrence of [`PID_MARKER`] in `input` with the decimal
/// form of `pid`.
pub fn expand_pid_marker(input: &str, pid: Pid) -> Result<String> {
    expand_marker(input, PID_MARKER, &pid.to_string())
}

/// Replaces every non-overlapping occurrence of `marker`, scanning left to
/// right. A marker match always wins over copying a literal character, so
/// `$$$` expands the first two characters and keeps the third.
///
/// Fails with `InputTooLong` if the result would exceed the input-line
/// ceiling.
fn expand_marker(input: &str, marker: &str, replacement: &str) -> Result<String> {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(offset) = rest.find(marker) {
        result.push_str(&rest[..offset]);
        result.push_str(replacement);
        rest = &rest[offset + marker.len()..];
    }
    result.push_str(rest);

    if result.len() > MAX_LINE_LEN {
        return Err(Error::input_too_long(MAX_LINE_LEN));
    }
    Ok(result)
}
