use crate::isa::{Instruction, Word};

/// Render a word as `mnemonic | arg0 | arg1`.
///
/// Returns `None` if the word does not hold a known opcode, e.g. for data.
pub fn disassemble(word: Word) -> Option<String> {
    let instr = Instruction::decode(word);
    let opcode = instr.opcode()?;
    Some(format!("{} | {} | {}", opcode, instr.arg0, instr.arg1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::{Opcode, BREAKPOINT};

    #[test]
    fn known_opcodes() {
        assert_eq!(disassemble(0x000001).as_deref(), Some("hlt | 0 | 0"));
        assert_eq!(disassemble(0x410002).as_deref(), Some("ldc | 0 | 65"));
        let word = Instruction::new(Opcode::Cpy.code(), 3, 1).encode();
        assert_eq!(disassemble(word).as_deref(), Some("cpy | 3 | 1"));
        assert_eq!(disassemble(BREAKPOINT).as_deref(), Some("brk | 0 | 0"));
    }

    #[test]
    fn unknown_opcode() {
        assert_eq!(disassemble(0), None);
        assert_eq!(disassemble(0x0000FF), None);
    }
}
