use std::fmt;

/// Execution state of the machine.
///
/// The plain runtime only ever uses `Running` and `Finished`; `Stepping` is the
/// debugger's 'pause before every instruction' mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum State {
    /// Pause before each instruction and wait for a command.
    #[default]
    Stepping,
    /// Execute until halt or a breakpoint.
    Running,
    /// Terminal.
    Finished,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stepping => write!(f, "stepping"),
            Self::Running => write!(f, "running"),
            Self::Finished => write!(f, "finished"),
        }
    }
}
