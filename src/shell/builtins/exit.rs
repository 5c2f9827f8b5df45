use crate::shell::builtins::{self, prelude::*, BuiltinCommand};

pub struct Exit;

impl BuiltinCommand for Exit {
    const NAME: &'static str = builtins::EXIT_NAME;

    const HELP: &'static str = "\
exit: exit
    Exit the shell after forcibly terminating every outstanding background
    job. Arguments are ignored.";

    fn run<T: AsRef<str>>(shell: &mut Shell, _args: &[T], _stdout: &mut dyn Write) -> Result<()> {
        shell.request_exit();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::ShellConfig;

    #[test]
    fn test_exit_stops_the_shell_and_ignores_arguments() {
        let mut shell = Shell::new(ShellConfig::noninteractive()).unwrap();
        let mut output = Vec::new();
        Exit::run(&mut shell, &["ignored", "as", "well"], &mut output).unwrap();
        assert!(!shell.is_running());
        assert!(output.is_empty());
    }
}
