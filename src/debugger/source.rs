use std::io::{self, BufRead, IsTerminal, Write};

/// Where debugger commands come from.
#[allow(private_interfaces)]
#[derive(Debug)]
pub enum Source {
    Argument(Argument),
    Stdin(Stdin),
    Terminal(Terminal),
}

pub trait SourceRead {
    /// `None` indicates EOF.
    /// Returned string slice MAY include leading or trailing whitespace.
    ///
    /// `prompt` is shown only by sources attached to a user.
    fn read(&mut self, prompt: &str) -> Option<&str>;
}

/// Command-line argument, commands separated by `;` or newlines.
#[derive(Debug)]
struct Argument {
    buffer: String,
    /// Byte index.
    cursor: usize,
}

/// Stdin which is not attached to a terminal, i.e. piped.
#[derive(Debug)]
struct Stdin {
    stdin: io::Stdin,
    buffer: String,
}

/// Interactive terminal.
#[derive(Debug)]
struct Terminal {
    term: console::Term,
    buffer: String,
}

impl From<Option<String>> for Source {
    fn from(argument: Option<String>) -> Self {
        if let Some(argument) = argument {
            return Source::Argument(Argument::from(argument));
        }
        let stdin = io::stdin();
        if stdin.is_terminal() {
            return Source::Terminal(Terminal::new());
        }
        Source::Stdin(Stdin::from(stdin))
    }
}

impl SourceRead for Source {
    fn read(&mut self, prompt: &str) -> Option<&str> {
        match self {
            Self::Argument(argument) => argument.read(prompt),
            Self::Stdin(stdin) => stdin.read(prompt),
            Self::Terminal(terminal) => terminal.read(prompt),
        }
    }
}

impl From<String> for Argument {
    fn from(source: String) -> Self {
        Self {
            buffer: source,
            cursor: 0,
        }
    }
}

impl SourceRead for Argument {
    fn read(&mut self, _prompt: &str) -> Option<&str> {
        // EOF
        if self.cursor >= self.buffer.len() {
            return None;
        }

        // Take characters until delimiter
        let start = self.cursor;
        let mut chars = self.buffer[self.cursor..].chars();
        while let Some(ch) = chars.next().filter(|ch| *ch != '\n' && *ch != ';') {
            self.cursor += ch.len_utf8();
        }

        let end = self.cursor;
        self.cursor += 1; // sizeof('\n' or ';')

        self.buffer.get(start..end)
    }
}

impl From<io::Stdin> for Stdin {
    fn from(stdin: io::Stdin) -> Self {
        Self {
            stdin,
            buffer: String::new(),
        }
    }
}

impl SourceRead for Stdin {
    fn read(&mut self, prompt: &str) -> Option<&str> {
        let mut stdout = io::stdout();
        // A closed stdout must not stop commands from being read
        let _ = write!(stdout, "{}", prompt).and_then(|_| stdout.flush());

        self.buffer.clear();
        match self.stdin.lock().read_line(&mut self.buffer) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(&self.buffer),
        }
    }
}

impl Terminal {
    fn new() -> Self {
        Self {
            term: console::Term::stdout(),
            buffer: String::new(),
        }
    }
}

impl SourceRead for Terminal {
    fn read(&mut self, prompt: &str) -> Option<&str> {
        self.term.write_str(prompt).ok()?;
        // Ctrl-D or a closed terminal ends the session
        self.buffer = self.term.read_line().ok()?;
        Some(&self.buffer)
    }
}
