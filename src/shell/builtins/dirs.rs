use std::env;
use std::path::PathBuf;

use dirs;

use crate::shell::builtins::{self, prelude::*, BuiltinCommand};

pub struct Cd;

impl BuiltinCommand for Cd {
    const NAME: &'static str = builtins::CD_NAME;

    const HELP: &'static str = "\
cd: cd [dir]
    Change the current directory to DIR. With no DIR, change to the home
    directory. Extra arguments are ignored.";

    fn run<T: AsRef<str>>(_shell: &mut Shell, args: &[T], _stdout: &mut dyn Write) -> Result<()> {
        let dir = match args.first() {
            Some(arg) => PathBuf::from(arg.as_ref()),
            None => {
                dirs::home_dir().ok_or_else(|| Error::builtin_command("cd: HOME not set", 1))?
            }
        };
        env::set_current_dir(&dir)
            .map_err(|e| Error::builtin_command(format!("cd: {}: {}", dir.display(), e), 1))?;
        Ok(())
    }
}
