use crate::error::LoadError;
use std::io;

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// CHIP-8 addresses are 12 bits wide; everything is taken modulo 4096
pub const ADDR_MASK: u16 = 0x0fff;

/// Represents the memory map. Every address is masked to 12 bits, so reads and
/// writes that run off the top of memory wrap round to 0x000.
pub trait MemoryMap {
    /// read one byte
    fn read_byte(&self, addr: u16) -> u8;

    /// write one byte
    fn write_byte(&mut self, addr: u16, value: u8);

    /// get a big-endian two-byte word (opcode fetch)
    fn get_word(&self, addr: u16) -> u16 {
        ((self.read_byte(addr) as u16) << 8) | (self.read_byte(addr.wrapping_add(1)) as u16)
    }

    /// write a chunk of bytes, wrapping at the top of memory
    fn write(&mut self, data: &[u8], addr: u16) {
        for (offset, b) in data.iter().enumerate() {
            self.write_byte(addr.wrapping_add(offset as u16), *b);
        }
    }

    /// read `len` bytes into a fresh buffer, wrapping at the top of memory
    fn read(&self, addr: u16, len: usize) -> Vec<u8> {
        (0..len)
            .map(|offset| self.read_byte(addr.wrapping_add(offset as u16)))
            .collect()
    }
}

/// Defines the CHIP-8 standard memory map (4K configuration):
///   0x0000-0x01ff  interpreter (font glyphs live at 0x0050-0x009f)
///   0x0200-0x0fff  program
///
/// the font is written once on creation and programs should not touch it
pub struct Chip8MemoryMap {
    bytes: Box<[u8]>,
    pub program_addr: u16,
    pub font_addr: u16,
}

impl MemoryMap for Chip8MemoryMap {
    fn read_byte(&self, addr: u16) -> u8 {
        self.bytes[(addr & ADDR_MASK) as usize]
    }
    fn write_byte(&mut self, addr: u16, value: u8) {
        self.bytes[(addr & ADDR_MASK) as usize] = value;
    }
}

/// how much RAM we have
pub const CHIP8_RAM_SIZE_BYTES: usize = 4096;

/// where the program is loaded
pub const CHIP8_PROGRAM_ADDR: u16 = 0x0200;

/// largest program image that fits above the reserved area
pub const CHIP8_MAX_PROGRAM_BYTES: usize = CHIP8_RAM_SIZE_BYTES - CHIP8_PROGRAM_ADDR as usize;

/// where the hex digit glyphs live, and how many bytes each one takes
pub const CHIP8_FONT_ADDR: u16 = 0x050;
pub const CHIP8_FONT_GLYPH_BYTES: u16 = 5;

impl Chip8MemoryMap {
    /// initialises CHIP-8 memory: zeroed, with the hex font baked in
    pub fn new() -> Self {
        let mut mm = Chip8MemoryMap {
            bytes: vec![0u8; CHIP8_RAM_SIZE_BYTES].into_boxed_slice(),
            program_addr: CHIP8_PROGRAM_ADDR,
            font_addr: CHIP8_FONT_ADDR,
        };
        mm.write(&CHIP8_FONT, CHIP8_FONT_ADDR);
        mm
    }

    /// load a CHIP-8 program at 0x200. images that don't fit are rejected
    /// before anything is written
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), LoadError> {
        if program.len() > CHIP8_MAX_PROGRAM_BYTES {
            return Err(LoadError::TooLarge {
                len: program.len(),
                max: CHIP8_MAX_PROGRAM_BYTES,
            });
        }
        self.write(program, self.program_addr);
        Ok(())
    }

    /// load a program of unknown length from a reader
    pub fn load_program_from(&mut self, reader: &mut impl io::Read) -> Result<(), LoadError> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        self.load_program(&buf)
    }

    /// address of the glyph for hex digit `digit` (only the low nibble counts)
    pub fn glyph_addr(&self, digit: u8) -> u16 {
        self.font_addr + CHIP8_FONT_GLYPH_BYTES * (digit & 0x0f) as u16
    }
}

impl Default for Chip8MemoryMap {
    fn default() -> Self {
        Self::new()
    }
}

const CHIP8_FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
