use std::{error::Error, fmt};

use miette::Diagnostic;

use crate::isa::{Word, NUM_REG, OP_WIDTH, RAM_LEN};

// Assembler errors

/// Error assembling source text. Aborts the whole assembly run.
#[derive(Debug, PartialEq)]
pub struct AsmError {
    /// 1-based line number in the original source.
    pub line: usize,
    /// Offending line, trimmed.
    pub text: String,
    pub kind: AsmErrorKind,
}

#[derive(Debug, PartialEq)]
pub enum AsmErrorKind {
    DuplicateLabel {
        label: String,
    },
    UnknownOpcode {
        mnemonic: String,
    },
    ReservedOpcode {
        mnemonic: String,
    },
    WrongOperandCount {
        mnemonic: String,
        expected: usize,
        found: usize,
    },
    /// Token does not look like a register at all.
    MalformedRegister {
        token: String,
    },
    /// Register index is out of range.
    InvalidRegister {
        token: String,
    },
    UnknownLabel {
        label: String,
    },
    InvalidValue {
        token: String,
    },
    MalformedAllocation,
    OutOfMemory {
        label: String,
        base: usize,
        count: usize,
    },
}

impl AsmError {
    pub(crate) fn new(line: usize, text: &str, kind: AsmErrorKind) -> Self {
        Self {
            line,
            text: text.to_string(),
            kind,
        }
    }
}

impl Error for AsmError {}

impl fmt::Display for AsmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (line {}: `{}`)", self.kind, self.line, self.text)
    }
}

impl fmt::Display for AsmErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateLabel { label } => write!(f, "Duplicate label `{}`", label),
            Self::UnknownOpcode { mnemonic } => write!(f, "Unknown operation `{}`", mnemonic),
            Self::ReservedOpcode { mnemonic } => {
                write!(f, "Operation `{}` is reserved for the debugger", mnemonic)
            }
            Self::WrongOperandCount {
                mnemonic,
                expected,
                found,
            } => write!(
                f,
                "Wrong number of operands for `{}` (expected {}, found {})",
                mnemonic, expected, found
            ),
            Self::MalformedRegister { token } => write!(f, "Malformed register `{}`", token),
            Self::InvalidRegister { token } => write!(f, "Illegal register `{}`", token),
            Self::UnknownLabel { label } => write!(f, "Unknown label `{}`", label),
            Self::InvalidValue { token } => write!(f, "Invalid value `{}`", token),
            Self::MalformedAllocation => write!(f, "Invalid allocation directive"),
            Self::OutOfMemory { label, base, count } => write!(
                f,
                "Allocation `{}` requires too much memory ({} words at 0x{:x})",
                label, count, base
            ),
        }
    }
}

impl Diagnostic for AsmError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self.kind {
            AsmErrorKind::DuplicateLabel { .. } => "asm::duplicate_label",
            AsmErrorKind::UnknownOpcode { .. } => "asm::unknown_opcode",
            AsmErrorKind::ReservedOpcode { .. } => "asm::reserved_opcode",
            AsmErrorKind::WrongOperandCount { .. } => "asm::operand_count",
            AsmErrorKind::MalformedRegister { .. } => "asm::malformed_register",
            AsmErrorKind::InvalidRegister { .. } => "asm::invalid_register",
            AsmErrorKind::UnknownLabel { .. } => "asm::unknown_label",
            AsmErrorKind::InvalidValue { .. } => "asm::invalid_value",
            AsmErrorKind::MalformedAllocation => "asm::malformed_allocation",
            AsmErrorKind::OutOfMemory { .. } => "asm::out_of_memory",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match &self.kind {
            AsmErrorKind::DuplicateLabel { .. } => {
                "labels are only allowed once per file, in code and data alike".to_string()
            }
            AsmErrorKind::UnknownOpcode { .. } | AsmErrorKind::ReservedOpcode { .. } => {
                "check the list of available operations".to_string()
            }
            AsmErrorKind::WrongOperandCount { .. } => {
                "check the operands for this instruction".to_string()
            }
            AsmErrorKind::MalformedRegister { .. } | AsmErrorKind::InvalidRegister { .. } => {
                format!("registers are written R0 to R{}", NUM_REG - 1)
            }
            AsmErrorKind::UnknownLabel { .. } => {
                "labels are defined as `name:` or in the `.data` section".to_string()
            }
            AsmErrorKind::InvalidValue { .. } => {
                "values are decimal integers from 0 to 255, or `@label`".to_string()
            }
            AsmErrorKind::MalformedAllocation => {
                "data directives are written `name: count`".to_string()
            }
            AsmErrorKind::OutOfMemory { .. } => {
                format!("code and data must fit in {} words", RAM_LEN)
            }
        };
        Some(Box::new(help))
    }
}

// Runtime errors

/// Error loading or running a program.
#[derive(Debug, PartialEq)]
pub enum VmError {
    ProgramTooLong { len: usize },
    /// Line of an encoded program is not a hex word.
    MalformedWord { line: usize, text: String },
    /// The running program hit an illegal condition at `addr`.
    Fault { addr: usize, fault: Fault },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Fault {
    IpOutOfBounds { ip: usize },
    InvalidRegister { index: u8 },
    InvalidAddress { addr: Word },
    UnknownOpcode { code: u8 },
    /// Breakpoint sentinel executed with no debugger to restore the original word.
    UnexpectedBreakpoint,
}

impl Error for VmError {}

impl fmt::Display for VmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProgramTooLong { len } => write!(
                f,
                "Program is too long for memory ({} words, capacity {})",
                len, RAM_LEN
            ),
            Self::MalformedWord { line, text } => {
                write!(f, "Malformed instruction word `{}` on line {}", text, line)
            }
            Self::Fault { addr, fault } => {
                write!(f, "{} at {:0width$x}", fault, addr, width = OP_WIDTH)
            }
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IpOutOfBounds { ip } => write!(
                f,
                "Program counter {:06x} out of range 0..{:06x}",
                ip, RAM_LEN
            ),
            Self::InvalidRegister { index } => write!(f, "Invalid register {:06x}", index),
            Self::InvalidAddress { addr } => write!(f, "Invalid address {:06x}", addr),
            Self::UnknownOpcode { code } => write!(f, "Unknown op {:06x}", code),
            Self::UnexpectedBreakpoint => write!(f, "Breakpoint outside of debugger"),
        }
    }
}

impl Diagnostic for VmError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self {
            Self::ProgramTooLong { .. } => "vm::program_too_long",
            Self::MalformedWord { .. } => "vm::malformed_word",
            Self::Fault { fault, .. } => match fault {
                Fault::IpOutOfBounds { .. } => "vm::ip_out_of_bounds",
                Fault::InvalidRegister { .. } => "vm::invalid_register",
                Fault::InvalidAddress { .. } => "vm::invalid_address",
                Fault::UnknownOpcode { .. } => "vm::unknown_opcode",
                Fault::UnexpectedBreakpoint => "vm::unexpected_breakpoint",
            },
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match self {
            Self::ProgramTooLong { .. } => "split the program or shrink its data section",
            Self::MalformedWord { .. } => "encoded programs hold one hex word per line",
            Self::Fault { fault, .. } => match fault {
                Fault::IpOutOfBounds { .. } => "the program may be missing a `hlt`",
                Fault::UnknownOpcode { .. } => "the program may have jumped into its data",
                _ => return None,
            },
        };
        Some(Box::new(help))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asm_error_names_line() {
        let error = AsmError::new(
            3,
            "ldc R9 1",
            AsmErrorKind::InvalidRegister {
                token: "R9".to_string(),
            },
        );
        assert_eq!(error.to_string(), "Illegal register `R9` (line 3: `ldc R9 1`)");
        assert_eq!(
            error.code().map(|code| code.to_string()),
            Some("asm::invalid_register".to_string())
        );
    }

    #[test]
    fn fault_names_address() {
        let error = VmError::Fault {
            addr: 0x12,
            fault: Fault::InvalidAddress { addr: 0x100 },
        };
        assert_eq!(error.to_string(), "Invalid address 000100 at 000012");
    }
}
