use crate::inject::{InjectError, helpers::parse_u64, types::RegisterEntry};

/// Longest command line accepted; anything past it is ignored.
pub const MAX_COMMAND_LEN: usize = 63;

/// One-shot register command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegCommand {
    /// `r <reg> <count>`
    Read { register: u64, count: u64 },
    /// `w <reg> <val>`
    Write { register: u64, value: u64 },
}

impl RegCommand {
    /// Parses `r <reg> <count>` or `w <reg> <val>`.
    ///
    /// Both numbers are always parsed before the keyword is checked, so every
    /// malformed line yields [`InjectError::InvalidInput`] and nothing else.
    pub fn parse(line: &str) -> Result<Self, InjectError> {
        let [keyword, register, operand] = tokens::<3>(line)?;
        let register = parse_u64(register)?;
        let operand = parse_u64(operand)?;

        match keyword {
            "r" => Ok(RegCommand::Read {
                register,
                count: operand,
            }),
            "w" => Ok(RegCommand::Write {
                register,
                value: operand,
            }),
            _ => Err(InjectError::InvalidInput),
        }
    }
}

impl RegisterEntry {
    /// Parses a `<reg> <val>` list line.
    pub fn parse(line: &str) -> Result<Self, InjectError> {
        let [register, value] = tokens::<2>(line)?;
        Ok(RegisterEntry::new(parse_u64(register)?, parse_u64(value)?))
    }
}

/// Cuts `line` to at most [`MAX_COMMAND_LEN`] bytes on a char boundary.
pub fn truncate_command(line: &str) -> &str {
    if line.len() <= MAX_COMMAND_LEN {
        return line;
    }
    let mut end = MAX_COMMAND_LEN;
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    &line[..end]
}

/// Splits a truncated line into exactly `T` whitespace-separated tokens.
fn tokens<const T: usize>(line: &str) -> Result<[&str; T], InjectError> {
    let mut out = [""; T];
    let mut found = 0;
    for token in truncate_command(line).split_ascii_whitespace() {
        *out.get_mut(found).ok_or(InjectError::InvalidInput)? = token;
        found += 1;
    }
    if found != T {
        return Err(InjectError::InvalidInput);
    }
    Ok(out)
}
