use std::{error::Error, fmt};

use super::command::CommandName;
use crate::isa::RAM_LEN;

/// Error parsing a command.
#[derive(Debug, PartialEq)]
pub enum CommandError {
    InvalidCommand {
        command_name: String,
    },
    InvalidArgument {
        command_name: CommandName,
        error: ArgumentError,
    },
}

/// Error parsing command arguments.
#[derive(Debug, PartialEq)]
pub enum ArgumentError {
    TooManyArguments {
        expected_count: u8,
        actual_count: u8,
    },
    InvalidValue {
        argument_name: &'static str,
        error: ValueError,
    },
}

/// Error parsing an argument value.
#[derive(Debug, PartialEq)]
pub enum ValueError {
    MalformedInteger {},
    AddressOutOfRange { address: usize },
}

/// Error setting or clearing a breakpoint.
#[derive(Debug, PartialEq)]
pub enum BreakpointError {
    AddressOutOfRange { address: usize },
}

impl Error for CommandError {}
impl Error for ArgumentError {}
impl Error for ValueError {}
impl Error for BreakpointError {}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCommand { command_name } => {
                write!(f, "Unknown command '{}'", command_name)
            }
            Self::InvalidArgument {
                command_name,
                error,
            } => {
                write!(f, "In command `{}`: {}", command_name, error)
            }
        }
    }
}

impl fmt::Display for ArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentError::TooManyArguments {
                expected_count,
                actual_count,
            } => {
                write!(
                    f,
                    "Too many arguments (expected {}, found {})",
                    expected_count, actual_count
                )
            }
            ArgumentError::InvalidValue {
                argument_name,
                error,
            } => {
                write!(f, "For argument `{}`: {}", argument_name, error)
            }
        }
    }
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueError::MalformedInteger {} => {
                write!(f, "Malformed integer")
            }
            ValueError::AddressOutOfRange { address } => {
                write!(
                    f,
                    "Address {:06x} out of range 0..{:06x}",
                    address, RAM_LEN
                )
            }
        }
    }
}

impl fmt::Display for BreakpointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddressOutOfRange { address } => {
                write!(
                    f,
                    "No breakpoint possible at {:06x}, out of range 0..{:06x}",
                    address, RAM_LEN
                )
            }
        }
    }
}
