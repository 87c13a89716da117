use std::{fmt, io::Write};

use crate::{
    error::{Fault, VmError},
    isa::{Instruction, Opcode, Word, NUM_REG, OP_WIDTH, RAM_LEN},
    state::State,
};

/// Words per row when showing memory.
const COLUMNS: usize = 4;

type Handler<W> = fn(&mut Vm<W>, u8, u8) -> Result<(), Fault>;

/// Complete machine state: memory, registers and instruction pointer.
///
/// Output of the running program (`prr`, `prm`) and of [`Vm::show`] goes to
/// `writer`.
pub struct Vm<W: Write> {
    /// Program is loaded at address 0, rest is zero-filled.
    ram: [Word; RAM_LEN],
    /// Address of the next instruction to fetch
    ip: usize,
    reg: [Word; NUM_REG],
    state: State,
    writer: W,
}

impl<W: Write> Vm<W> {
    pub fn new(writer: W) -> Self {
        Self {
            ram: [0; RAM_LEN],
            ip: 0,
            reg: [0; NUM_REG],
            state: State::Running,
            writer,
        }
    }

    /// Copy the program into memory and clear everything else.
    pub fn initialize(&mut self, program: &[Word]) -> Result<(), VmError> {
        if program.len() > RAM_LEN {
            return Err(VmError::ProgramTooLong { len: program.len() });
        }
        self.ram = [0; RAM_LEN];
        self.ram[..program.len()].copy_from_slice(program);
        self.ip = 0;
        self.reg = [0; NUM_REG];
        self.state = State::Running;
        Ok(())
    }

    /// Execute instructions one by one until the program halts.
    pub fn run(&mut self) -> Result<(), VmError> {
        self.state = State::Running;
        while self.state != State::Finished {
            let (_, instr) = self.fetch()?;
            self.execute(instr)?;
        }
        Ok(())
    }

    /// Decode the next instruction and advance past it.
    ///
    /// Returns the address the instruction was fetched from.
    pub fn fetch(&mut self) -> Result<(usize, Instruction), VmError> {
        let instr = self.peek()?;
        let addr = self.ip;
        self.ip += 1;
        Ok((addr, instr))
    }

    /// Decode the next instruction without advancing.
    pub fn peek(&self) -> Result<Instruction, VmError> {
        let word = self.word(self.ip).ok_or(VmError::Fault {
            addr: self.ip,
            fault: Fault::IpOutOfBounds { ip: self.ip },
        })?;
        Ok(Instruction::decode(word))
    }

    /// Execute a single instruction, which is assumed to have been fetched from
    /// the address before the instruction pointer.
    pub fn execute(&mut self, instr: Instruction) -> Result<(), VmError> {
        let addr = self.ip.saturating_sub(1);
        let fault = |fault| VmError::Fault { addr, fault };

        let opcode = instr
            .opcode()
            .ok_or_else(|| fault(Fault::UnknownOpcode { code: instr.op }))?;

        let handler: Handler<W> = match opcode {
            Opcode::Hlt => Self::hlt,
            Opcode::Ldc => Self::ldc,
            Opcode::Ldr => Self::ldr,
            Opcode::Cpy => Self::cpy,
            Opcode::Str => Self::str,
            Opcode::Add => Self::add,
            Opcode::Sub => Self::sub,
            Opcode::Beq => Self::beq,
            Opcode::Bne => Self::bne,
            Opcode::Prr => Self::prr,
            Opcode::Prm => Self::prm,
            Opcode::Brk => Self::brk,
        };
        handler(self, instr.arg0, instr.arg1).map_err(fault)
    }

    /// Show the instruction pointer, registers and the used part of memory.
    pub fn show(&mut self) {
        let ip = self.ip;
        self.write_line(format_args!("IP{}= {:06x}", " ".repeat(6), ip));
        for (i, value) in self.reg.into_iter().enumerate() {
            self.write_line(format_args!("R{:06x} = {:06x}", i, value));
        }

        // Rows up to and including the highest nonzero word
        let Some(top) = self.ram.iter().rposition(|word| *word != 0) else {
            return;
        };
        for base in (0..=top).step_by(COLUMNS) {
            let mut row = format!("{:06x}: ", base);
            for word in &self.ram[base..(base + COLUMNS).min(RAM_LEN)] {
                row.push_str(&format!("  {:0width$x}", word, width = OP_WIDTH));
            }
            self.write_line(format_args!("{}", row));
        }
    }

    pub fn ip(&self) -> usize {
        self.ip
    }

    pub(crate) fn advance(&mut self) {
        self.ip += 1;
    }

    pub fn reg(&self, index: usize) -> Word {
        self.reg[index]
    }

    pub fn registers(&self) -> &[Word; NUM_REG] {
        &self.reg
    }

    pub fn ram(&self) -> &[Word; RAM_LEN] {
        &self.ram
    }

    /// `None` if `addr` is out of memory.
    pub fn word(&self, addr: usize) -> Option<Word> {
        self.ram.get(addr).copied()
    }

    /// Overwrite a word in place, returning the previous word.
    ///
    /// Only the debugger patches memory from outside the fetch loop.
    pub(crate) fn replace_word(&mut self, addr: usize, word: Word) -> Option<Word> {
        self.ram
            .get_mut(addr)
            .map(|slot| std::mem::replace(slot, word))
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: State) {
        self.state = state;
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Memory address `instr` would load from or store to, if any and in range.
    pub(crate) fn data_address(&self, instr: Instruction) -> Option<usize> {
        let pointer = match instr.opcode()? {
            Opcode::Ldr | Opcode::Str => instr.arg1,
            Opcode::Prm => instr.arg0,
            Opcode::Hlt
            | Opcode::Ldc
            | Opcode::Cpy
            | Opcode::Add
            | Opcode::Sub
            | Opcode::Beq
            | Opcode::Bne
            | Opcode::Prr
            | Opcode::Brk => return None,
        };
        let value = *self.reg.get(pointer as usize)?;
        Self::check_addr(value).ok()
    }

    pub(crate) fn write_line(&mut self, args: fmt::Arguments) {
        writeln!(self.writer, "{}", args).expect("write to output should not fail");
    }

    fn check_reg(index: u8) -> Result<usize, Fault> {
        if (index as usize) < NUM_REG {
            Ok(index as usize)
        } else {
            Err(Fault::InvalidRegister { index })
        }
    }

    fn check_addr(addr: Word) -> Result<usize, Fault> {
        if (addr as usize) < RAM_LEN {
            Ok(addr as usize)
        } else {
            Err(Fault::InvalidAddress { addr })
        }
    }

    fn hlt(&mut self, _arg0: u8, _arg1: u8) -> Result<(), Fault> {
        self.state = State::Finished;
        Ok(())
    }

    fn ldc(&mut self, arg0: u8, arg1: u8) -> Result<(), Fault> {
        let dest = Self::check_reg(arg0)?;
        self.reg[dest] = arg1 as Word;
        Ok(())
    }

    fn ldr(&mut self, arg0: u8, arg1: u8) -> Result<(), Fault> {
        let dest = Self::check_reg(arg0)?;
        let src = Self::check_reg(arg1)?;
        let addr = Self::check_addr(self.reg[src])?;
        self.reg[dest] = self.ram[addr];
        Ok(())
    }

    fn cpy(&mut self, arg0: u8, arg1: u8) -> Result<(), Fault> {
        let dest = Self::check_reg(arg0)?;
        let src = Self::check_reg(arg1)?;
        self.reg[dest] = self.reg[src];
        Ok(())
    }

    fn str(&mut self, arg0: u8, arg1: u8) -> Result<(), Fault> {
        let src = Self::check_reg(arg0)?;
        let dest = Self::check_reg(arg1)?;
        let addr = Self::check_addr(self.reg[dest])?;
        self.ram[addr] = self.reg[src];
        Ok(())
    }

    fn add(&mut self, arg0: u8, arg1: u8) -> Result<(), Fault> {
        let dest = Self::check_reg(arg0)?;
        let src = Self::check_reg(arg1)?;
        self.reg[dest] = self.reg[dest].wrapping_add(self.reg[src]);
        Ok(())
    }

    fn sub(&mut self, arg0: u8, arg1: u8) -> Result<(), Fault> {
        let dest = Self::check_reg(arg0)?;
        let src = Self::check_reg(arg1)?;
        self.reg[dest] = self.reg[dest].wrapping_sub(self.reg[src]);
        Ok(())
    }

    fn beq(&mut self, arg0: u8, arg1: u8) -> Result<(), Fault> {
        let cond = Self::check_reg(arg0)?;
        let target = Self::check_addr(arg1 as Word)?;
        if self.reg[cond] == 0 {
            self.ip = target;
        }
        Ok(())
    }

    fn bne(&mut self, arg0: u8, arg1: u8) -> Result<(), Fault> {
        let cond = Self::check_reg(arg0)?;
        let target = Self::check_addr(arg1 as Word)?;
        if self.reg[cond] != 0 {
            self.ip = target;
        }
        Ok(())
    }

    fn prr(&mut self, arg0: u8, _arg1: u8) -> Result<(), Fault> {
        let src = Self::check_reg(arg0)?;
        let value = self.reg[src];
        self.write_line(format_args!("{:0width$x}", value, width = OP_WIDTH));
        Ok(())
    }

    fn prm(&mut self, arg0: u8, _arg1: u8) -> Result<(), Fault> {
        let src = Self::check_reg(arg0)?;
        let addr = Self::check_addr(self.reg[src])?;
        let value = self.ram[addr];
        self.write_line(format_args!("{:0width$x}", value, width = OP_WIDTH));
        Ok(())
    }

    fn brk(&mut self, _arg0: u8, _arg1: u8) -> Result<(), Fault> {
        Err(Fault::UnexpectedBreakpoint)
    }
}
