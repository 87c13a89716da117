mod asm;
mod breakpoint;
mod command;
mod error;
mod source;

use std::io::Write;

pub use self::asm::disassemble;
pub use self::breakpoint::Breakpoints;
pub use self::command::Command;
pub use self::error::{ArgumentError, BreakpointError, CommandError, ValueError};
pub use self::source::{Source, SourceRead};
use self::command::COMMAND_KEYS;
use crate::error::{Fault, VmError};
use crate::isa::{Instruction, Opcode, Word, BREAKPOINT, OP_WIDTH};
use crate::runtime::Vm;
use crate::state::State;

/// Leave this as a struct, in case more options are added in the future. Plus it is more explicit.
#[derive(Debug, Default)]
pub struct DebuggerOptions {
    /// Commands to run instead of reading standard input.
    pub command: Option<String>,
}

/// Runs a [`Vm`], pausing between instructions to take commands.
///
/// Breakpoints are set by overwriting the instruction in memory with the
/// breakpoint sentinel, so the fetch loop needs no per-address lookup. The
/// debugger owns both the machine and the table of overwritten words, and is the
/// only place memory is patched.
pub struct Debugger<W: Write> {
    vm: Vm<W>,
    breakpoints: Breakpoints,
    command_source: Source,
}

impl<W: Write> Debugger<W> {
    /// `vm` should already hold the program.
    pub fn new(opts: DebuggerOptions, vm: Vm<W>) -> Self {
        Self {
            vm,
            breakpoints: Breakpoints::default(),
            command_source: Source::from(opts.command),
        }
    }

    pub fn vm(&self) -> &Vm<W> {
        &self.vm
    }

    pub fn breakpoints(&self) -> &Breakpoints {
        &self.breakpoints
    }

    pub fn state(&self) -> State {
        self.vm.state()
    }

    /// Run the program, starting in [`State::Stepping`], until it halts or the
    /// user quits.
    pub fn run(&mut self) -> Result<(), VmError> {
        self.vm.set_state(State::Stepping);
        while self.vm.state() != State::Finished {
            let addr = self.vm.ip();
            let mut instr = self.vm.peek()?;

            if instr.opcode() == Some(Opcode::Brk) {
                // No saved word means the sentinel was part of the loaded program
                let original = self.breakpoints.get(addr).ok_or(VmError::Fault {
                    addr,
                    fault: Fault::UnexpectedBreakpoint,
                })?;
                instr = Instruction::decode(original);
                self.vm.set_state(State::Stepping);
                self.interact(addr);
            } else if self.vm.state() == State::Stepping {
                self.interact(addr);
            }

            if self.vm.state() == State::Finished {
                break;
            }
            self.vm.advance();
            self.execute(instr)?;
        }
        Ok(())
    }

    /// Execute `instr` as if no breakpoint were set.
    ///
    /// A patched word the instruction loads or stores is put back for the
    /// duration of the instruction, then saved again under the sentinel.
    fn execute(&mut self, instr: Instruction) -> Result<(), VmError> {
        let patched = self
            .vm
            .data_address(instr)
            .and_then(|addr| Some((addr, self.breakpoints.get(addr)?)));
        let Some((addr, original)) = patched else {
            return self.vm.execute(instr);
        };

        self.vm.replace_word(addr, original);
        let result = self.vm.execute(instr);
        if let Some(word) = self.vm.replace_word(addr, BREAKPOINT) {
            self.breakpoints.insert(addr, word);
        }
        result
    }

    /// Take commands until one resumes execution.
    fn interact(&mut self, addr: usize) {
        let prompt = format!("{:06x} [{}]> ", addr, COMMAND_KEYS);
        while self.vm.state() == State::Stepping {
            // Convert EOF to `quit` command
            let command = self.next_command(&prompt).unwrap_or(Command::Quit);

            match command {
                Command::Disassemble => {
                    let word = self.original_word(addr);
                    match word.and_then(disassemble) {
                        Some(text) => self.vm.write_line(format_args!("{}", text)),
                        None => {
                            let op = Instruction::decode(word.unwrap_or_default()).op;
                            self.vm.write_line(format_args!(
                                "Unknown op code {} at {:0width$x}",
                                op,
                                addr,
                                width = OP_WIDTH
                            ))
                        }
                    }
                }
                Command::Memory => self.show(),
                Command::Step => break,
                Command::Run => self.vm.set_state(State::Running),
                Command::Quit => self.vm.set_state(State::Finished),
                Command::BreakAdd { address } => {
                    if let Err(error) = self.set_breakpoint(address.unwrap_or(addr)) {
                        self.vm.write_line(format_args!("{}", error));
                    }
                }
                Command::BreakRemove { address } => {
                    if let Err(error) = self.clear_breakpoint(address.unwrap_or(addr)) {
                        self.vm.write_line(format_args!("{}", error));
                    }
                }
            }
        }
    }

    /// Returns `None` on EOF.
    fn next_command(&mut self, prompt: &str) -> Option<Command> {
        // Loop until valid command or EOF
        loop {
            let line = self.command_source.read(prompt)?.trim();
            // Necessary, since `Command::try_from` assumes non-empty line
            if line.is_empty() {
                continue;
            }

            match Command::try_from(line) {
                Ok(command) => return Some(command),
                Err(error) => self.vm.write_line(format_args!("{}", error)),
            }
        }
    }

    /// Show the machine, then every breakpoint with the instruction it replaced.
    pub fn show(&mut self) {
        self.vm.show();
        if self.breakpoints.is_empty() {
            return;
        }
        self.vm.write_line(format_args!("{}", "-".repeat(OP_WIDTH)));
        let lines: Vec<String> = self
            .breakpoints
            .iter()
            .map(|(addr, word)| {
                let text = disassemble(word)
                    .unwrap_or_else(|| format!("{:0width$x}", word, width = OP_WIDTH));
                format!("{:0width$x}: {}", addr, text, width = OP_WIDTH)
            })
            .collect();
        for line in lines {
            self.vm.write_line(format_args!("{}", line));
        }
    }

    /// Patch the breakpoint sentinel over the word at `addr`.
    ///
    /// Returns whether a new breakpoint was set; setting one twice is a no-op.
    pub fn set_breakpoint(&mut self, addr: usize) -> Result<bool, BreakpointError> {
        let word = self.checked_word(addr)?;
        // Already set, or a sentinel loaded with the program
        if self.breakpoints.contains(addr) || word == BREAKPOINT {
            return Ok(false);
        }
        self.breakpoints.insert(addr, word);
        self.vm.replace_word(addr, BREAKPOINT);
        Ok(true)
    }

    /// Restore the original word at `addr`.
    ///
    /// Returns whether a breakpoint was cleared; clearing where none is set is a
    /// no-op.
    pub fn clear_breakpoint(&mut self, addr: usize) -> Result<bool, BreakpointError> {
        let word = self.checked_word(addr)?;
        if word != BREAKPOINT {
            return Ok(false);
        }
        let Some(original) = self.breakpoints.remove(addr) else {
            // Sentinel was loaded as part of the program
            return Ok(false);
        };
        self.vm.replace_word(addr, original);
        Ok(true)
    }

    /// Word at `addr` as the program sees it, ignoring breakpoints.
    fn original_word(&self, addr: usize) -> Option<Word> {
        self.breakpoints.get(addr).or_else(|| self.vm.word(addr))
    }

    fn checked_word(&self, addr: usize) -> Result<Word, BreakpointError> {
        self.vm
            .word(addr)
            .ok_or(BreakpointError::AddressOutOfRange { address: addr })
    }
}
