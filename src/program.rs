use crate::{error::VmError, isa::Word};

/// Parse an encoded program: one hex word per line, blank lines ignored.
pub fn from_text(src: &str) -> Result<Vec<Word>, VmError> {
    src.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .map(|(number, line)| {
            Word::from_str_radix(line, 16).map_err(|_| VmError::MalformedWord {
                line: number,
                text: line.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_words() {
        let program = from_text("370002\n\n  410002  \n000001\n").unwrap();
        assert_eq!(program, vec![0x370002, 0x410002, 0x000001]);
    }

    #[test]
    fn empty_program() {
        assert_eq!(from_text("").unwrap(), Vec::<Word>::new());
    }

    #[test]
    fn rejects_non_hex() {
        assert_eq!(
            from_text("000001\nhlt\n"),
            Err(VmError::MalformedWord {
                line: 2,
                text: "hlt".to_string()
            })
        );
    }
}
