use {
    crate::{
        config::NavConfig,
        console::{ConsoleReader, ConsoleWriter},
        constants::{
            BACK_COMMANDS, CONFIRM_OPTIONS, DEFAULT_PROMPT, ESCAPE_COMMANDS, HELP_COMMANDS,
            INPUT_INVALID_MESSAGE, INPUT_NULL_MESSAGE, QUIT_SHORTCUT,
        },
        error::{NavError, NavResult},
    },
    log::debug,
    regex::Regex,
    std::io::{BufRead, Write},
};

/// Control words that win over any menu option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservedCommand {
    Escape,
    Back,
    Help,
}

/// The reserved vocabulary, stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedCommands {
    escape: Vec<String>,
    back: Vec<String>,
    help: Vec<String>,
}

impl Default for ReservedCommands {
    fn default() -> Self {
        Self {
            escape: owned(&ESCAPE_COMMANDS),
            back: owned(&BACK_COMMANDS),
            help: owned(&HELP_COMMANDS),
        }
    }
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl ReservedCommands {
    /// Adds or removes `q` as an escape word.
    pub fn with_quit_shortcut(mut self, enabled: bool) -> Self {
        self.escape.retain(|w| w != QUIT_SHORTCUT);
        if enabled {
            self.escape.push(QUIT_SHORTCUT.to_string());
        }
        self
    }

    pub fn escape(&self) -> &[String] {
        &self.escape
    }

    pub fn back(&self) -> &[String] {
        &self.back
    }

    pub fn help(&self) -> &[String] {
        &self.help
    }

    /// Case-insensitive match of a single token.
    pub fn lookup(&self, token: &str) -> Option<ReservedCommand> {
        let token = token.to_lowercase();
        let contains = |words: &[String]| words.iter().any(|w| *w == token);
        if contains(self.escape.as_slice()) {
            Some(ReservedCommand::Escape)
        } else if contains(self.back.as_slice()) {
            Some(ReservedCommand::Back)
        } else if contains(self.help.as_slice()) {
            Some(ReservedCommand::Help)
        } else {
            None
        }
    }
}

/// A line split into its command token and the whitespace-separated tokens after it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedInput {
    pub command: String,
    pub args: Vec<String>,
}

pub fn parse_input(line: &str) -> ParsedInput {
    let mut tokens = line.split_whitespace().map(str::to_string);
    let command = tokens.next().unwrap_or_default();
    ParsedInput {
        command,
        args: tokens.collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Reserved {
        command: ReservedCommand,
        input: ParsedInput,
    },
    /// `option` is the matched entry of the option list, not the token as typed.
    Selected {
        option: String,
        input: ParsedInput,
    },
    /// The whole line matched the command pattern of the active menu.
    Command { input: ParsedInput },
    /// The input source has no more lines.
    EndOfInput,
}

/// Compiles `pattern` so that it only matches complete lines.
pub fn whole_line(pattern: &str) -> NavResult<Regex> {
    Ok(Regex::new(&format!("^(?:{pattern})$"))?)
}

/// Turns raw console lines into a menu selection or a reserved command, re-prompting until
/// the input means something.
pub struct InputResolver<R> {
    reader: ConsoleReader<R>,
    reserved: ReservedCommands,
    prompt: String,
}

impl<R: BufRead> InputResolver<R> {
    pub fn new(input: R) -> Self {
        Self {
            reader: ConsoleReader::new(input),
            reserved: ReservedCommands::default(),
            prompt: DEFAULT_PROMPT.to_string(),
        }
    }

    pub fn from_config(input: R, config: &NavConfig) -> Self {
        Self::new(input)
            .with_reserved(ReservedCommands::default().with_quit_shortcut(config.quit_shortcut))
            .with_prompt(&config.prompt)
    }

    pub fn with_reserved(mut self, reserved: ReservedCommands) -> Self {
        self.reserved = reserved;
        self
    }

    pub fn with_prompt(mut self, prompt: &str) -> Self {
        self.prompt = prompt.to_string();
        self
    }

    pub fn reserved(&self) -> &ReservedCommands {
        &self.reserved
    }

    /// Classifies one line against `options` without reading anything.
    ///
    /// Reserved words are checked first. A number `k` picks the `k`-th option (1-based);
    /// anything else is compared case-insensitively with the option names. An option that is
    /// itself a reserved word resolves to that reserved command. `None` means the line
    /// matched nothing.
    pub fn classify(&self, line: &str, options: &[String]) -> Option<Resolution> {
        let input = parse_input(line);
        if let Some(command) = self.reserved.lookup(&input.command) {
            return Some(Resolution::Reserved { command, input });
        }

        let by_index = input
            .command
            .parse::<i64>()
            .ok()
            .and_then(|k| usize::try_from(k).ok())
            .filter(|k| (1..=options.len()).contains(k))
            .map(|k| &options[k - 1]);
        let command = input.command.to_lowercase();
        let option = by_index
            .or_else(|| options.iter().find(|o| o.to_lowercase() == command))?
            .clone();

        if let Some(command) = self.reserved.lookup(&option) {
            return Some(Resolution::Reserved { command, input });
        }
        Some(Resolution::Selected { option, input })
    }

    /// Prompts and reads until a line resolves. An exhausted source yields
    /// [`Resolution::EndOfInput`] instead of blocking.
    pub fn resolve<W: Write>(
        &mut self,
        out: &mut ConsoleWriter<W>,
        options: &[String],
    ) -> NavResult<Resolution> {
        if !self.reader.is_open() {
            return Err(NavError::ReaderClosed);
        }

        loop {
            out.write(&self.prompt)?;
            let Some(line) = self.reader.read_line()? else {
                out.write_line(INPUT_NULL_MESSAGE)?;
                return Ok(Resolution::EndOfInput);
            };

            match self.classify(&line, options) {
                Some(resolution) => {
                    debug!("resolved {line:?} to {resolution:?}");
                    return Ok(resolution);
                }
                None => {
                    debug!("rejected input {line:?}");
                    out.write_line(INPUT_INVALID_MESSAGE)?;
                }
            }
        }
    }

    /// Prompts and reads a line for a command menu.
    ///
    /// A line matching `pattern` is returned as [`Resolution::Command`] before anything else is
    /// looked at. Otherwise reserved words apply, then option names; numbers never select an
    /// option here. An exhausted source counts as an escape. Build `pattern` with
    /// [`whole_line`] when it must cover the entire line.
    pub fn resolve_command<W: Write>(
        &mut self,
        out: &mut ConsoleWriter<W>,
        options: &[String],
        pattern: &Regex,
    ) -> NavResult<Resolution> {
        if !self.reader.is_open() {
            return Err(NavError::ReaderClosed);
        }

        loop {
            out.write(&self.prompt)?;
            let Some(line) = self.reader.read_line()? else {
                out.write_line(INPUT_NULL_MESSAGE)?;
                return Ok(Resolution::Reserved {
                    command: ReservedCommand::Escape,
                    input: ParsedInput::default(),
                });
            };

            let input = parse_input(&line);
            if pattern.is_match(line.trim()) {
                debug!("command {line:?} matched {pattern}");
                return Ok(Resolution::Command { input });
            }

            if let Some(command) = self.reserved.lookup(&input.command) {
                return Ok(Resolution::Reserved { command, input });
            }
            let name = input.command.to_lowercase();
            if let Some(option) = options.iter().find(|o| o.to_lowercase() == name) {
                return Ok(Resolution::Selected {
                    option: option.clone(),
                    input,
                });
            }

            debug!("rejected command {line:?}");
            out.write_line(INPUT_INVALID_MESSAGE)?;
        }
    }

    /// Asks a yes/no question. Only `y`/`yes` count as yes; a reserved word counts as no.
    /// Returns `None` when the source ran out before an answer was given.
    pub fn confirm<W: Write>(
        &mut self,
        out: &mut ConsoleWriter<W>,
        question: &str,
    ) -> NavResult<Option<bool>> {
        out.write_line(question)?;
        let options = owned(&CONFIRM_OPTIONS);
        let answer = match self.resolve(out, &options)? {
            Resolution::Selected { option, .. } => Some(option == "y" || option == "yes"),
            Resolution::Reserved { .. } | Resolution::Command { .. } => Some(false),
            Resolution::EndOfInput => None,
        };
        Ok(answer)
    }

    pub fn is_open(&self) -> bool {
        self.reader.is_open()
    }

    /// Closes the input source. Later reads fail with [`NavError::ReaderClosed`].
    pub fn close(&mut self) {
        self.reader.close();
    }
}
