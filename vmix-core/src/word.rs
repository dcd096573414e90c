use crate::consts::{FIELDS_PER_WORD, FIELD_BITS, FIELD_MASK, WORD_MASK};

use log::warn;

const SIGN_BIT: u32 = 1 << 31;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Positive,
    Negative,
}

impl Default for Sign {
    fn default() -> Self {
        Sign::Positive
    }
}

///
/// ## Word
///
/// A MIX machine word. The magnitude holds five 6-bit character fields
/// (30 bits); the sign is kept apart from it, as on the real machine.
///
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Word {
    sign: Sign,
    data: u32,
}

impl Word {
    pub fn new(sign: Sign, data: u32) -> Word {
        if data & !WORD_MASK != 0 {
            warn!("Word magnitude {:o} exceeds 30 bits. Truncating", data);
        }
        Word {
            sign: sign,
            data: data & WORD_MASK,
        }
    }

    pub fn positive(data: u32) -> Word {
        Word::new(Sign::Positive, data)
    }

    ///
    /// Builds a positive word out of five character fields, where `fields[0]`
    /// is the most significant field. Each field is masked to 6 bits.
    ///
    pub fn from_fields(fields: [u8; FIELDS_PER_WORD]) -> Word {
        let mut data = 0;
        for f in fields.iter() {
            data = (data << FIELD_BITS) | (*f as u32 & FIELD_MASK);
        }
        Word::positive(data)
    }

    pub fn sign(&self) -> Sign {
        self.sign
    }

    pub fn data(&self) -> u32 {
        self.data
    }

    ///
    /// Returns the 6-bit field at `idx`, counted from the most significant
    /// field (0) to the least significant field (4). Indexes past the last
    /// field read as 0.
    ///
    pub fn field(&self, idx: usize) -> u8 {
        match (FIELDS_PER_WORD - 1).checked_sub(idx) {
            Some(pos) => ((self.data >> (pos as u32 * FIELD_BITS)) & FIELD_MASK) as u8,
            None => 0,
        }
    }

    pub fn fields(&self) -> [u8; FIELDS_PER_WORD] {
        let mut res = [0; FIELDS_PER_WORD];
        for (idx, f) in res.iter_mut().enumerate() {
            *f = self.field(idx);
        }
        res
    }

    ///
    /// Storage form used by media backing files. Bit 31 carries the sign and
    /// bits 0-29 the magnitude.
    ///
    pub fn to_bits(&self) -> u32 {
        match self.sign {
            Sign::Negative => SIGN_BIT | self.data,
            Sign::Positive => self.data,
        }
    }

    pub fn from_bits(bits: u32) -> Word {
        let sign = if bits & SIGN_BIT != 0 {
            Sign::Negative
        } else {
            Sign::Positive
        };
        Word {
            sign: sign,
            data: bits & WORD_MASK,
        }
    }
}

// ============================================================================
// Module Tests
// ============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_positive_zero() {
        let w = Word::default();
        assert_eq!(Sign::Positive, w.sign());
        assert_eq!(0, w.data());
    }

    #[test]
    fn magnitude_is_truncated() {
        let w = Word::new(Sign::Negative, 0xFFFF_FFFF);
        assert_eq!(WORD_MASK, w.data());
        assert_eq!(Sign::Negative, w.sign());
    }

    #[test]
    fn fields_are_most_significant_first() {
        let w = Word::from_fields([1, 2, 3, 4, 5]);
        assert_eq!(0o0102030405, w.data());
        assert_eq!([1, 2, 3, 4, 5], w.fields());
        assert_eq!(1, w.field(0));
        assert_eq!(5, w.field(4));
    }

    #[test]
    fn field_past_the_end_is_zero() {
        let w = Word::new(Sign::Negative, WORD_MASK);
        assert_eq!(0o77, w.field(4));
        assert_eq!(0, w.field(5));
        assert_eq!(0, w.field(usize::MAX));
    }

    #[test]
    fn storage_form_keeps_sign() {
        let w = Word::new(Sign::Negative, 0o1234);
        assert_eq!(0x8000_0000 | 0o1234, w.to_bits());
        assert_eq!(w, Word::from_bits(w.to_bits()));
        assert_eq!(Word::positive(7), Word::from_bits(7));
    }
}
