use std::fmt;

use super::error::{ArgumentError, CommandError, ValueError};
use crate::isa::RAM_LEN;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Show the instruction at the current address, without executing it.
    Disassemble,
    Memory,
    /// Execute exactly one instruction.
    Step,
    /// Execute until halt or a breakpoint.
    Run,
    Quit,
    /// `None` means the current address.
    BreakAdd { address: Option<usize> },
    /// `None` means the current address.
    BreakRemove { address: Option<usize> },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CommandName {
    Disassemble,
    Memory,
    Step,
    Run,
    Quit,
    BreakAdd,
    BreakRemove,
}

/// First letter of every command, sorted. Shown in the prompt.
pub const COMMAND_KEYS: &str = "bcdmnqrs";

impl CommandName {
    fn from_name(name: &str) -> Option<Self> {
        let name = match name {
            "d" | "dis" => Self::Disassemble,
            "m" | "memory" => Self::Memory,
            "s" | "step" | "n" | "next" => Self::Step,
            "r" | "run" => Self::Run,
            "q" | "quit" => Self::Quit,
            "b" | "break" => Self::BreakAdd,
            "c" | "clear" => Self::BreakRemove,
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disassemble => write!(f, "dis"),
            Self::Memory => write!(f, "memory"),
            Self::Step => write!(f, "step"),
            Self::Run => write!(f, "run"),
            Self::Quit => write!(f, "quit"),
            Self::BreakAdd => write!(f, "break"),
            Self::BreakRemove => write!(f, "clear"),
        }
    }
}

impl TryFrom<&str> for Command {
    type Error = CommandError;

    /// Assumes line is non-empty.
    fn try_from(line: &str) -> Result<Self, Self::Error> {
        let mut iter = line.split_whitespace();
        let name = iter.next().unwrap_or_default();
        let args: Vec<&str> = iter.collect();

        let command_name =
            CommandName::from_name(name).ok_or_else(|| CommandError::InvalidCommand {
                command_name: name.to_string(),
            })?;
        Command::parse_arguments(command_name, &args).map_err(|error| {
            CommandError::InvalidArgument {
                command_name,
                error,
            }
        })
    }
}

impl Command {
    fn parse_arguments(name: CommandName, args: &[&str]) -> Result<Self, ArgumentError> {
        let mut expected_args = 0;

        let command = match name {
            CommandName::Disassemble => Self::Disassemble,
            CommandName::Memory => Self::Memory,
            CommandName::Step => Self::Step,
            CommandName::Run => Self::Run,
            CommandName::Quit => Self::Quit,
            CommandName::BreakAdd => {
                expected_args = 1;
                let address = optional_address(args.first())?;
                Self::BreakAdd { address }
            }
            CommandName::BreakRemove => {
                expected_args = 1;
                let address = optional_address(args.first())?;
                Self::BreakRemove { address }
            }
        };

        if args.len() > expected_args {
            return Err(ArgumentError::TooManyArguments {
                expected_count: expected_args as u8,
                actual_count: args.len().min(u8::MAX as usize) as u8,
            });
        }
        Ok(command)
    }
}

fn optional_address(arg: Option<&&str>) -> Result<Option<usize>, ArgumentError> {
    let Some(arg) = arg else {
        return Ok(None);
    };
    parse_address(arg)
        .map(Some)
        .map_err(|error| ArgumentError::InvalidValue {
            argument_name: "address",
            error,
        })
}

/// Decimal, or hex with a `0x` prefix.
fn parse_address(arg: &str) -> Result<usize, ValueError> {
    let address = match arg.strip_prefix("0x") {
        Some(hex) => usize::from_str_radix(hex, 16),
        None => arg.parse::<usize>(),
    }
    .map_err(|_| ValueError::MalformedInteger {})?;

    if address >= RAM_LEN {
        return Err(ValueError::AddressOutOfRange { address });
    }
    Ok(address)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases() {
        let cases = [
            ("d", Command::Disassemble),
            ("dis", Command::Disassemble),
            ("m", Command::Memory),
            ("memory", Command::Memory),
            ("s", Command::Step),
            ("step", Command::Step),
            ("n", Command::Step),
            ("next", Command::Step),
            ("r", Command::Run),
            ("run", Command::Run),
            ("q", Command::Quit),
            ("quit", Command::Quit),
            ("b", Command::BreakAdd { address: None }),
            ("clear", Command::BreakRemove { address: None }),
        ];
        for (line, expected) in cases {
            assert_eq!(Command::try_from(line), Ok(expected), "`{line}`");
        }
    }

    #[test]
    fn prompt_keys_match_commands() {
        for key in COMMAND_KEYS.chars() {
            assert!(CommandName::from_name(&key.to_string()).is_some());
        }
    }

    #[test]
    fn break_addresses() {
        assert_eq!(
            Command::try_from("b 1"),
            Ok(Command::BreakAdd { address: Some(1) })
        );
        assert_eq!(
            Command::try_from("break 0x1f"),
            Ok(Command::BreakAdd {
                address: Some(0x1f)
            })
        );
        assert_eq!(
            Command::try_from("c   12 "),
            Ok(Command::BreakRemove { address: Some(12) })
        );
    }

    #[test]
    fn unknown_command() {
        assert_eq!(
            Command::try_from("jump 3"),
            Err(CommandError::InvalidCommand {
                command_name: "jump".to_string()
            })
        );
        assert_eq!(
            Command::try_from("jump 3").unwrap_err().to_string(),
            "Unknown command 'jump'"
        );
    }

    #[test]
    fn bad_arguments() {
        assert_eq!(
            Command::try_from("s 2"),
            Err(CommandError::InvalidArgument {
                command_name: CommandName::Step,
                error: ArgumentError::TooManyArguments {
                    expected_count: 0,
                    actual_count: 1,
                },
            })
        );
        assert_eq!(
            Command::try_from("b 1 2"),
            Err(CommandError::InvalidArgument {
                command_name: CommandName::BreakAdd,
                error: ArgumentError::TooManyArguments {
                    expected_count: 1,
                    actual_count: 2,
                },
            })
        );
        assert_eq!(
            Command::try_from("b x"),
            Err(CommandError::InvalidArgument {
                command_name: CommandName::BreakAdd,
                error: ArgumentError::InvalidValue {
                    argument_name: "address",
                    error: ValueError::MalformedInteger {},
                },
            })
        );
        assert_eq!(
            Command::try_from("c 256"),
            Err(CommandError::InvalidArgument {
                command_name: CommandName::BreakRemove,
                error: ArgumentError::InvalidValue {
                    argument_name: "address",
                    error: ValueError::AddressOutOfRange { address: 256 },
                },
            })
        );
    }
}
