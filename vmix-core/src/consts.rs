/* Number of bits in a single character field of a word */
pub const FIELD_BITS: u32 = 6;

/* Number of character fields packed into a word */
pub const FIELDS_PER_WORD: usize = 5;

/* Mask of a single character field */
pub const FIELD_MASK: u32 = 0o77;

/* Mask of the magnitude portion of a word (5 fields) */
pub const WORD_MASK: u32 = 0o7777777777;

/* Number of words within MIX main memory */
pub const MEMORY_NUM_WORDS: usize = 4000;

pub mod geometry {
    // (block size in words, number of blocks)
    pub const TAPE: (usize, usize) = (100, 2000);
    pub const DISK: (usize, usize) = (100, 4000);
    pub const CARD_READER: (usize, usize) = (16, 1);
    pub const CARD_WRITER: (usize, usize) = (16, 1);
    pub const LINE_PRINTER: (usize, usize) = (24, 1);
    pub const TYPEWRITER: (usize, usize) = (14, 1);
    pub const PAPER_TAPE: (usize, usize) = (14, 1000);
}

///
/// Milliseconds spent per word of a transfer. A device remains busy for
/// `block_size * latency` milliseconds after a transfer is issued.
///
pub mod latency {
    pub const MEDIA_READ: u64 = 100;
    pub const MEDIA_WRITE: u64 = 150;
    pub const CARD_READ: u64 = 150;
    pub const CARD_WRITE: u64 = 250;
    pub const PRINT: u64 = 100;
    pub const TYPEWRITER_READ: u64 = 100;
    pub const PAPER_TAPE: u64 = 200;
}

pub mod unit {
    pub const TAPE_FIRST: usize = 0;
    pub const TAPE_LAST: usize = 7;
    pub const DISK_FIRST: usize = 8;
    pub const DISK_LAST: usize = 15;
    pub const CARD_READER: usize = 16;
    pub const CARD_PUNCH: usize = 17;
    pub const LINE_PRINTER: usize = 18;
    pub const TYPEWRITER: usize = 19;
    pub const PAPER_TAPE: usize = 20;

    pub const UNIT_COUNT: usize = 21;
}
