use crate::{
    error::{AsmError, AsmErrorKind},
    isa::{
        word_to_hex, Format, Instruction, Opcode, Word, LABEL_PREFIX, NUM_REG, RAM_LEN,
        REGISTER_PREFIX,
    },
    FxMap,
};

/// Line separating code from data allocation directives.
pub const DIVIDER: &str = ".data";

const COMMENT_PREFIX: char = '#';
const LABEL_SUFFIX: char = ':';

/// Two-pass assembler. Labels are found first, so they may be referenced before
/// they are defined.
#[derive(Debug, Default)]
pub struct Assembler {
    /// Label name -> address. Code and data labels share this table.
    labels: FxMap<String, usize>,
}

/// Non-blank, non-comment source line.
#[derive(Clone, Copy, Debug)]
struct Line<'a> {
    /// 1-based
    number: usize,
    /// Trimmed
    text: &'a str,
}

impl<'a> Line<'a> {
    fn error(&self, kind: AsmErrorKind) -> AsmError {
        AsmError::new(self.number, self.text, kind)
    }

    fn label(&self) -> Option<&'a str> {
        self.text.strip_suffix(LABEL_SUFFIX)
    }
}

impl Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Labels resolved by the last call to [`Assembler::assemble`].
    pub fn labels(&self) -> &FxMap<String, usize> {
        &self.labels
    }

    pub fn assemble<I, S>(&mut self, lines: I) -> Result<Vec<Word>, AsmError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.labels.clear();

        let owned: Vec<S> = lines.into_iter().collect();
        let lines = clean_lines(&owned);
        let (to_compile, to_allocate) = split_allocations(&lines);

        self.find_labels(to_compile)?;
        let instructions: Vec<Line> = to_compile
            .iter()
            .filter(|line| line.label().is_none())
            .copied()
            .collect();
        self.add_allocations(instructions.len(), to_allocate)?;

        instructions
            .iter()
            .map(|line| self.compile(line))
            .collect()
    }

    fn find_labels(&mut self, lines: &[Line]) -> Result<(), AsmError> {
        let mut address = 0;
        for line in lines {
            match line.label() {
                Some(label) => {
                    if self.labels.contains_key(label) {
                        return Err(line.error(AsmErrorKind::DuplicateLabel {
                            label: label.to_string(),
                        }));
                    }
                    self.labels.insert(label.to_string(), address);
                }
                None => address += 1,
            }
        }
        Ok(())
    }

    fn add_allocations(&mut self, mut base: usize, lines: &[Line]) -> Result<(), AsmError> {
        for line in lines {
            let fields: Vec<&str> = line.text.split(LABEL_SUFFIX).map(str::trim).collect();
            let &[label, count] = fields.as_slice() else {
                return Err(line.error(AsmErrorKind::MalformedAllocation));
            };
            if label.is_empty() {
                return Err(line.error(AsmErrorKind::MalformedAllocation));
            }
            let Ok(count) = count.parse::<usize>() else {
                return Err(line.error(AsmErrorKind::MalformedAllocation));
            };

            if self.labels.contains_key(label) {
                return Err(line.error(AsmErrorKind::DuplicateLabel {
                    label: label.to_string(),
                }));
            }
            if base.checked_add(count).map_or(true, |end| end > RAM_LEN) {
                return Err(line.error(AsmErrorKind::OutOfMemory {
                    label: label.to_string(),
                    base,
                    count,
                }));
            }

            self.labels.insert(label.to_string(), base);
            base += count;
        }
        Ok(())
    }

    fn compile(&self, line: &Line) -> Result<Word, AsmError> {
        let mut tokens = line.text.split_whitespace();
        // Cleaned lines are never empty
        let mnemonic = tokens.next().unwrap_or_default();
        let args: Vec<&str> = tokens.collect();

        let opcode = Opcode::from_mnemonic(mnemonic).ok_or_else(|| {
            line.error(AsmErrorKind::UnknownOpcode {
                mnemonic: mnemonic.to_string(),
            })
        })?;
        if opcode.is_reserved() {
            return Err(line.error(AsmErrorKind::ReservedOpcode {
                mnemonic: mnemonic.to_string(),
            }));
        }

        let format = opcode.format();
        if args.len() != format.operand_count() {
            return Err(line.error(AsmErrorKind::WrongOperandCount {
                mnemonic: mnemonic.to_string(),
                expected: format.operand_count(),
                found: args.len(),
            }));
        }

        let (arg0, arg1) = match format {
            Format::None => (0, 0),
            Format::Reg => (register(line, args[0])?, 0),
            Format::RegReg => (register(line, args[0])?, register(line, args[1])?),
            Format::RegValue => (register(line, args[0])?, self.value(line, args[1])?),
        };

        Ok(Instruction::new(opcode.code(), arg0, arg1).encode())
    }

    fn value(&self, line: &Line, token: &str) -> Result<u8, AsmError> {
        let invalid = || {
            line.error(AsmErrorKind::InvalidValue {
                token: token.to_string(),
            })
        };

        let Some(label) = token.strip_prefix(LABEL_PREFIX) else {
            return token.parse::<u8>().map_err(|_| invalid());
        };
        let address = self.labels.get(label).ok_or_else(|| {
            line.error(AsmErrorKind::UnknownLabel {
                label: label.to_string(),
            })
        })?;
        u8::try_from(*address).map_err(|_| invalid())
    }
}

fn register(line: &Line, token: &str) -> Result<u8, AsmError> {
    let index = token
        .strip_prefix(REGISTER_PREFIX)
        .filter(|digits| !digits.is_empty() && digits.chars().all(|ch| ch.is_ascii_digit()))
        .and_then(|digits| digits.parse::<usize>().ok())
        .ok_or_else(|| {
            line.error(AsmErrorKind::MalformedRegister {
                token: token.to_string(),
            })
        })?;
    if index >= NUM_REG {
        return Err(line.error(AsmErrorKind::InvalidRegister {
            token: token.to_string(),
        }));
    }
    Ok(index as u8)
}

fn clean_lines<S: AsRef<str>>(lines: &[S]) -> Vec<Line> {
    lines
        .iter()
        .enumerate()
        .map(|(i, text)| Line {
            number: i + 1,
            text: text.as_ref().trim(),
        })
        .filter(|line| !line.text.is_empty())
        .filter(|line| !line.text.starts_with(COMMENT_PREFIX))
        .collect()
}

fn split_allocations<'l, 'a>(lines: &'l [Line<'a>]) -> (&'l [Line<'a>], &'l [Line<'a>]) {
    match lines.iter().position(|line| line.text == DIVIDER) {
        Some(split) => (&lines[..split], &lines[split + 1..]),
        None => (lines, &[]),
    }
}

/// Assemble a whole source text.
pub fn assemble(src: &str) -> Result<Vec<Word>, AsmError> {
    Assembler::new().assemble(src.lines())
}

/// Render an assembled program in the encoded program format, one word per line.
pub fn to_text(program: &[Word]) -> Vec<String> {
    program.iter().map(|word| word_to_hex(*word)).collect()
}
