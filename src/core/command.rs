//! Minsh command-line parser.
//!
//! One line of input yields at most one [`ParsedCommand`]: an argument
//! vector plus optional redirection targets and a background request.
//! Tokens are separated by whitespace; `<` and `>` consume the following
//! token as a file name, and `&` requests background execution when it is
//! the final token of the line.

use crate::errors::{Error, Result};

/// Maximum accepted length of one input line, in bytes.
pub const MAX_LINE_LEN: usize = 2048;

/// Maximum number of argument-vector slots per command, counting the
/// exec-style terminator slot.
pub const MAX_ARGS: usize = 512;

/// Represents all information associated with one input line.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedCommand {
    /// Original command line, used for messages.
    pub input: String,
    /// The program name followed by its arguments. Never empty and never
    /// contains a redirection operator, a redirection target, or a
    /// trailing background marker.
    pub argv: Vec<String>,
    /// The name of the input file, if one is specified.
    pub infile: Option<String>,
    /// The file to write stdout to, if one is specified.
    pub outfile: Option<String>,
    /// Run the command in the background, defaults to false.
    pub background: bool,
}

impl ParsedCommand {
    /// Parses an (already expanded) input line.
    ///
    /// Returns `Ok(None)` when the line holds nothing runnable. A trailing
    /// `&` requests background execution; the request is silently dropped
    /// while `foreground_only` is set. An `&` anywhere else is an ordinary
    /// argument.
    ///
    /// # Examples
    ///
    /// ```
    /// use minsh::core::command::ParsedCommand;
    ///
    /// let command = ParsedCommand::parse("ls -la > out.txt", false).unwrap().unwrap();
    /// assert_eq!(command.argv, vec!["ls", "-la"]);
    /// assert_eq!(command.outfile, Some("out.txt".to_string()));
    /// assert!(command.infile.is_none());
    /// assert!(!command.background);
    /// ```
    pub fn parse(input: &str, foreground_only: bool) -> Result<Option<ParsedCommand>> {
        let input_trimmed = input.trim();
        let tokens: Vec<_> = input_trimmed.split_whitespace().collect();
        if tokens.is_empty() {
            return Ok(None);
        }
        if tokens.len() >= MAX_ARGS {
            return Err(Error::too_many_arguments(MAX_ARGS));
        }

        let mut builder = ParsedCommandBuilder::new(input_trimmed);
        let mut index = 0;
        while index < tokens.len() {
            match tokens[index] {
                "<" => {
                    let target = tokens
                        .get(index + 1)
                        .ok_or_else(|| Error::missing_redirection_target("<"))?;
                    builder.infile(target);
                    index += 2;
                }
                ">" => {
                    let target = tokens
                        .get(index + 1)
                        .ok_or_else(|| Error::missing_redirection_target(">"))?;
                    builder.outfile(target);
                    index += 2;
                }
                "&" if index + 1 == tokens.len() => {
                    builder.background(!foreground_only);
                    index += 1;
                }
                arg => {
                    builder.arg(arg);
                    index += 1;
                }
            }
        }

        let command = builder.build();
        if command.argv.is_empty() {
            // Control tokens only, e.g. a lone `&`.
            return Ok(None);
        }
        Ok(Some(command))
    }

    /// The program to execute or builtin name.
    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    /// The arguments following the program name.
    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }
}

/// Builds ParsedCommands.
#[derive(Debug)]
pub struct ParsedCommandBuilder {
    input: String,
    argv: Vec<String>,
    infile: Option<String>,
    outfile: Option<String>,
    background: bool,
}

impl ParsedCommandBuilder {
    /// Construct a new `ParsedCommandBuilder` with the following default
    /// configuration:
    ///
    /// * No input/output redirection
    /// * Runs in foreground
    /// * No arguments
    ///
    /// Builder methods are provided to change these defaults.
    pub fn new(input: &str) -> ParsedCommandBuilder {
        ParsedCommandBuilder {
            input: String::from(input),
            argv: Vec::new(),
            infile: None,
            outfile: None,
            background: false,
        }
    }

    /// Add an argument.
    pub fn arg(&mut self, arg: &str) -> &mut ParsedCommandBuilder {
        self.argv.push(String::from(arg));
        self
    }

    /// Add arguments.
    pub fn args(&mut self, args: &[&str]) -> &mut ParsedCommandBuilder {
        self.argv.extend(args.iter().map(|x| (*x).to_owned()));
        self
    }

    /// Add input redirection from the specified filename.
    pub fn infile(&mut self, filename: &str) -> &mut ParsedCommandBuilder {
        self.infile = Some(String::from(filename));
        self
    }

    /// Add output redirection to the specified filename.
    pub fn outfile(&mut self, filename: &str) -> &mut ParsedCommandBuilder {
        self.outfile = Some(String::from(filename));
        self
    }

    /// Configure the command to run in the background.
    pub fn background(&mut self, background: bool) -> &mut ParsedCommandBuilder {
        self.background = background;
        self
    }

    /// Build the final command.
    pub fn build(self) -> ParsedCommand {
        ParsedCommand {
            input: self.input,
            argv: self.argv,
            infile: self.infile,
            outfile: self.outfile,
            background: self.background,
        }
    }
}
