use crate::shell::builtins::{self, prelude::*, BuiltinCommand};

pub struct Status;

impl BuiltinCommand for Status {
    const NAME: &'static str = builtins::STATUS_NAME;

    const HELP: &'static str = "\
status: status
    Report how the last foreground command ended: its exit value, or the
    signal that terminated it. Reports exit value 0 before any foreground
    command has run.";

    fn run<T: AsRef<str>>(shell: &mut Shell, _args: &[T], stdout: &mut dyn Write) -> Result<()> {
        writeln!(stdout, "{}", shell.last_foreground_status()).context(ErrorKind::Io)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::ShellConfig;

    #[test]
    fn test_status_before_any_foreground_command() {
        let mut shell = Shell::new(ShellConfig::noninteractive()).unwrap();
        let mut output = Vec::new();
        Status::run(&mut shell, &[] as &[&str], &mut output).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "exit value: 0\n");
    }
}
