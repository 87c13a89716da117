//! Instruction set of the machine: opcodes, operand formats and the layout of an
//! encoded instruction word.
//!
//! Every instruction is a single word packed low to high as `opcode | arg0 | arg1`,
//! each field [`OP_SHIFT`] bits wide. The opcode table below is the only place
//! opcodes are defined; the assembler, the runtime and the disassembler all look
//! opcodes up through it.

use std::fmt;

/// Machine word. Instructions only ever occupy the low 24 bits.
pub type Word = u32;

/// Number of general purpose registers.
pub const NUM_REG: usize = 4;
/// Number of words of RAM.
pub const RAM_LEN: usize = 256;
/// Width of a single instruction field, in bits.
pub const OP_SHIFT: u32 = 8;
/// Selects a single instruction field.
pub const OP_MASK: Word = 0xFF;
/// Width of an encoded instruction when written as hex text.
pub const OP_WIDTH: usize = 6;

/// First character of a register operand, as in `R2`.
pub const REGISTER_PREFIX: char = 'R';
/// First character of a label reference operand, as in `@loop`.
pub const LABEL_PREFIX: char = '@';

/// Shape of the operands an opcode takes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Format {
    /// No operands.
    None,
    /// One register.
    Reg,
    /// Two registers.
    RegReg,
    /// One register, then an immediate value or label address.
    RegValue,
}

impl Format {
    pub fn operand_count(self) -> usize {
        match self {
            Format::None => 0,
            Format::Reg => 1,
            Format::RegReg | Format::RegValue => 2,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Opcode {
    /// Halt the program.
    Hlt = 0x01,
    /// `ldc r v`: load the immediate `v` into `r`.
    Ldc = 0x02,
    /// `ldr r1 r2`: load the word at the address held in `r2` into `r1`.
    Ldr = 0x03,
    /// `cpy r1 r2`: copy `r2` into `r1`.
    Cpy = 0x04,
    /// `str r1 r2`: store `r1` at the address held in `r2`.
    Str = 0x05,
    /// `add r1 r2`: `r1 += r2`.
    Add = 0x06,
    /// `sub r1 r2`: `r1 -= r2`.
    Sub = 0x07,
    /// `beq r a`: jump to `a` if `r` is zero.
    Beq = 0x08,
    /// `bne r a`: jump to `a` if `r` is not zero.
    Bne = 0x09,
    /// Print a register.
    Prr = 0x0A,
    /// Print the word at the address held in a register.
    Prm = 0x0B,
    /// Breakpoint sentinel. Only ever written into memory by the debugger.
    Brk = 0x0C,
}

/// `(opcode, mnemonic, format)`, in ascending opcode order.
const OPCODES: [(Opcode, &str, Format); 12] = [
    (Opcode::Hlt, "hlt", Format::None),
    (Opcode::Ldc, "ldc", Format::RegValue),
    (Opcode::Ldr, "ldr", Format::RegReg),
    (Opcode::Cpy, "cpy", Format::RegReg),
    (Opcode::Str, "str", Format::RegReg),
    (Opcode::Add, "add", Format::RegReg),
    (Opcode::Sub, "sub", Format::RegReg),
    (Opcode::Beq, "beq", Format::RegValue),
    (Opcode::Bne, "bne", Format::RegValue),
    (Opcode::Prr, "prr", Format::Reg),
    (Opcode::Prm, "prm", Format::Reg),
    (Opcode::Brk, "brk", Format::None),
];

impl Opcode {
    pub fn from_mnemonic(mnemonic: &str) -> Option<Self> {
        OPCODES
            .iter()
            .find(|(_, name, _)| *name == mnemonic)
            .map(|(opcode, _, _)| *opcode)
    }

    pub fn iter() -> impl Iterator<Item = Opcode> {
        OPCODES.iter().map(|(opcode, _, _)| *opcode)
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn mnemonic(self) -> &'static str {
        self.entry().1
    }

    pub fn format(self) -> Format {
        self.entry().2
    }

    /// Reserved opcodes cannot be written in assembly source.
    pub fn is_reserved(self) -> bool {
        self == Opcode::Brk
    }

    fn entry(self) -> &'static (Opcode, &'static str, Format) {
        // Codes are dense and start at 1
        &OPCODES[self as usize - 1]
    }
}

impl TryFrom<u8> for Opcode {
    type Error = ();
    fn try_from(code: u8) -> Result<Self, Self::Error> {
        OPCODES
            .iter()
            .find(|(opcode, _, _)| opcode.code() == code)
            .map(|(opcode, _, _)| *opcode)
            .ok_or(())
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

/// The word the debugger writes over an instruction to trap on it.
pub const BREAKPOINT: Word = Opcode::Brk as Word;

/// Raw fields of one instruction word.
///
/// The opcode is kept as a raw byte, since memory may hold words that do not
/// decode to any known opcode.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Instruction {
    pub op: u8,
    pub arg0: u8,
    pub arg1: u8,
}

impl Instruction {
    pub fn new(op: u8, arg0: u8, arg1: u8) -> Self {
        Self { op, arg0, arg1 }
    }

    pub fn encode(self) -> Word {
        let mut word = self.arg1 as Word;
        word = (word << OP_SHIFT) | self.arg0 as Word;
        (word << OP_SHIFT) | self.op as Word
    }

    /// Bits above the three fields are ignored.
    pub fn decode(word: Word) -> Self {
        let op = (word & OP_MASK) as u8;
        let word = word >> OP_SHIFT;
        let arg0 = (word & OP_MASK) as u8;
        let word = word >> OP_SHIFT;
        let arg1 = (word & OP_MASK) as u8;
        Self { op, arg0, arg1 }
    }

    pub fn opcode(self) -> Option<Opcode> {
        Opcode::try_from(self.op).ok()
    }
}

/// Render a word the way encoded programs store it.
pub fn word_to_hex(word: Word) -> String {
    format!("{:0width$x}", word, width = OP_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_in_code_order() {
        for (i, opcode) in Opcode::iter().enumerate() {
            assert_eq!(opcode.code() as usize, i + 1, "{opcode} is out of order");
            assert_eq!(Opcode::try_from(opcode.code()), Ok(opcode));
            assert_eq!(Opcode::from_mnemonic(opcode.mnemonic()), Some(opcode));
        }
    }

    #[test]
    fn codes_are_unique_and_nonzero() {
        let mut seen = Vec::new();
        for opcode in Opcode::iter() {
            assert_ne!(opcode.code(), 0);
            assert!(!seen.contains(&opcode.code()));
            seen.push(opcode.code());
        }
    }

    #[test]
    fn unknown_lookups() {
        assert_eq!(Opcode::from_mnemonic("nop"), None);
        assert_eq!(Opcode::from_mnemonic("HLT"), None);
        assert_eq!(Opcode::try_from(0x00), Err(()));
        assert_eq!(Opcode::try_from(0xFF), Err(()));
    }

    #[test]
    fn field_layout() {
        let instr = Instruction::new(Opcode::Ldc.code(), 0, 65);
        assert_eq!(instr.encode(), 0x410002);
        assert_eq!(word_to_hex(instr.encode()), "410002");
        assert_eq!(Instruction::decode(0x030201), Instruction::new(1, 2, 3));
    }

    #[test]
    fn decode_inverts_encode() {
        let samples = [0u8, 1, 2, 3, 0x7F, 0x80, 0xFE, 0xFF];
        for opcode in Opcode::iter() {
            for &arg0 in &samples {
                for &arg1 in &samples {
                    let instr = Instruction::new(opcode.code(), arg0, arg1);
                    assert_eq!(Instruction::decode(instr.encode()), instr);
                }
            }
        }
    }

    #[test]
    fn breakpoint_word_decodes_to_brk() {
        let instr = Instruction::decode(BREAKPOINT);
        assert_eq!(instr.opcode(), Some(Opcode::Brk));
        assert_eq!((instr.arg0, instr.arg1), (0, 0));
    }

    #[test]
    fn operand_counts() {
        assert_eq!(Opcode::Hlt.format().operand_count(), 0);
        assert_eq!(Opcode::Prr.format().operand_count(), 1);
        assert_eq!(Opcode::Add.format().operand_count(), 2);
        assert_eq!(Opcode::Beq.format().operand_count(), 2);
    }
}
