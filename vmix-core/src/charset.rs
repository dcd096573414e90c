use crate::consts::FIELD_MASK;

/* Code of the blank character */
pub const SPACE: u8 = 0;

/* Reserved code meaning "no character". Never produced by a valid byte */
pub const NULLCHAR: u8 = 63;

/* Byte emitted for codes that have no character assigned */
pub const UNASSIGNED: u8 = b'?';

///
/// MIX character table indexed by code. Delta, Sigma and Pi have no ASCII
/// counterpart and are written as `~`, `[` and `]`.
///
const CHAR_TABLE: [u8; 56] = [
    b' ', b'A', b'B', b'C', b'D', b'E', b'F', b'G', b'H', b'I',
    b'~', b'J', b'K', b'L', b'M', b'N', b'O', b'P', b'Q', b'R',
    b'[', b']', b'S', b'T', b'U', b'V', b'W', b'X', b'Y', b'Z',
    b'0', b'1', b'2', b'3', b'4', b'5', b'6', b'7', b'8', b'9',
    b'.', b',', b'(', b')', b'+', b'-', b'*', b'/', b'=', b'$',
    b'<', b'>', b'@', b';', b':', b'\'',
];

///
/// # Description
///
/// Converts an external byte into its 6-bit MIX code. Lowercase letters are
/// folded into their uppercase code.
///
/// # Return Value
///
///  - MIX code of the character, or `NULLCHAR` if the byte has no code.
///
pub fn to_val(c: u8) -> u8 {
    let c = c.to_ascii_uppercase();
    match CHAR_TABLE.iter().position(|x| *x == c) {
        Some(idx) => idx as u8,
        None => NULLCHAR,
    }
}

///
/// # Description
///
/// Converts a 6-bit MIX code into its external byte. Only the low 6 bits of
/// `code` are looked at.
///
/// # Return Value
///
///  - Character for the code, or `UNASSIGNED` for codes 56 through 63.
///
pub fn to_char(code: u8) -> u8 {
    let idx = (code as u32 & FIELD_MASK) as usize;
    match CHAR_TABLE.get(idx) {
        Some(c) => *c,
        None => UNASSIGNED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_code_round_trips() {
        for code in 0..CHAR_TABLE.len() as u8 {
            assert_eq!(code, to_val(to_char(code)));
        }
    }

    #[test]
    fn known_codes() {
        assert_eq!(SPACE, to_val(b' '));
        assert_eq!(1, to_val(b'A'));
        assert_eq!(1, to_val(b'a'));
        assert_eq!(30, to_val(b'0'));
        assert_eq!(55, to_val(b'\''));
        assert_eq!(b'Z', to_char(29));
    }

    #[test]
    fn unmapped_bytes_are_nullchar() {
        assert_eq!(NULLCHAR, to_val(b'\n'));
        assert_eq!(NULLCHAR, to_val(0));
        assert_eq!(NULLCHAR, to_val(UNASSIGNED));
        assert_eq!(UNASSIGNED, to_char(NULLCHAR));
        assert_eq!(UNASSIGNED, to_char(56));
    }
}
