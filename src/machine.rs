/// # machine
///
/// Everything the instructions read and write: memory, V0-VF, I, the program
/// counter, the call stack, both timers, the framebuffer and the keypad latch.
/// There is no behaviour here beyond bounds and masking; the interpreter is the
/// only thing that drives it.
use crate::error::{Fault, LoadError};
use crate::memory::{Chip8MemoryMap, MemoryMap};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::io;

pub const REGISTER_COUNT: usize = 16;
/// VF doubles as the carry/borrow/collision flag
pub const FLAG_REGISTER: usize = 0xf;
pub const STACK_DEPTH: usize = 16;
pub const KEY_COUNT: usize = 16;
pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

/// 64x32 monochrome display, row-major, `true` is lit
#[derive(Clone, PartialEq, Eq)]
pub struct Framebuffer {
    pixels: Box<[bool]>,
}

impl Framebuffer {
    pub fn new() -> Self {
        Framebuffer {
            pixels: vec![false; DISPLAY_WIDTH * DISPLAY_HEIGHT].into_boxed_slice(),
        }
    }

    pub fn width(&self) -> usize {
        DISPLAY_WIDTH
    }

    pub fn height(&self) -> usize {
        DISPLAY_HEIGHT
    }

    /// coordinates wrap at the screen edges
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.pixels[Self::index(x, y)]
    }

    /// all pixels, row-major
    pub fn pixels(&self) -> &[bool] {
        &self.pixels
    }

    pub fn clear(&mut self) {
        self.pixels.iter_mut().for_each(|p| *p = false);
    }

    /// XOR one pixel on; returns true if it was lit before (i.e. it just went off)
    pub fn flip(&mut self, x: usize, y: usize) -> bool {
        let i = Self::index(x, y);
        let was_lit = self.pixels[i];
        self.pixels[i] = !was_lit;
        was_lit
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|p| !*p)
    }

    fn index(x: usize, y: usize) -> usize {
        (y % DISPLAY_HEIGHT) * DISPLAY_WIDTH + (x % DISPLAY_WIDTH)
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// one line per row, `#` for lit
impl fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.pixels.chunks(DISPLAY_WIDTH) {
            let line: String = row.iter().map(|p| if *p { '#' } else { '.' }).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Complete state of one CHIP-8 machine
pub struct Machine {
    pub memory: Chip8MemoryMap,
    pub v: [u8; REGISTER_COUNT],
    pub i: u16,
    pub pc: u16,
    stack: [u16; STACK_DEPTH],
    sp: usize,
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub display: Framebuffer,
    pub keys: [bool; KEY_COUNT],
    rng: StdRng,
}

impl Machine {
    /// fresh machine with the random source seeded from the OS
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// fresh machine with a reproducible random source
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        let memory = Chip8MemoryMap::new();
        let pc = memory.program_addr;
        Machine {
            memory,
            v: [0; REGISTER_COUNT],
            i: 0,
            pc,
            stack: [0; STACK_DEPTH],
            sp: 0,
            delay_timer: 0,
            sound_timer: 0,
            display: Framebuffer::new(),
            keys: [false; KEY_COUNT],
            rng,
        }
    }

    pub fn load_program(&mut self, program: &[u8]) -> Result<(), LoadError> {
        self.memory.load_program(program)
    }

    pub fn load_program_from(&mut self, reader: &mut impl io::Read) -> Result<(), LoadError> {
        self.memory.load_program_from(reader)
    }

    /// the word at the program counter
    pub fn fetch(&self) -> u16 {
        self.memory.get_word(self.pc)
    }

    /// push a return address; `addr` is only used to report an overflow
    pub fn push(&mut self, ret: u16, addr: u16) -> Result<(), Fault> {
        if self.sp == STACK_DEPTH {
            return Err(Fault::StackOverflow { addr });
        }
        self.stack[self.sp] = ret;
        self.sp += 1;
        Ok(())
    }

    pub fn pop(&mut self, addr: u16) -> Result<u16, Fault> {
        if self.sp == 0 {
            return Err(Fault::StackUnderflow { addr });
        }
        self.sp -= 1;
        Ok(self.stack[self.sp])
    }

    pub fn stack_pointer(&self) -> usize {
        self.sp
    }

    /// live frames, oldest first
    pub fn stack(&self) -> &[u16] {
        &self.stack[..self.sp]
    }

    /// value of register `x`
    pub fn vx(&self, x: u8) -> u8 {
        self.v[(x & 0xf) as usize]
    }

    pub fn set_flag(&mut self, set: bool) {
        self.v[FLAG_REGISTER] = set as u8;
    }

    pub fn random_byte(&mut self) -> u8 {
        self.rng.gen()
    }

    /// one 60Hz timer tick: both timers count down to zero and stop
    pub fn tick(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let m = Machine::with_seed(1);
        assert_eq!(m.pc, 0x200);
        assert_eq!(m.i, 0);
        assert_eq!(m.v, [0; 16]);
        assert_eq!(m.stack_pointer(), 0);
        assert_eq!(m.delay_timer, 0);
        assert_eq!(m.sound_timer, 0);
        assert!(m.display.is_blank());
        assert_eq!(m.keys, [false; 16]);
        assert_eq!(m.memory.read_byte(0x50), 0xF0);
    }

    #[test]
    fn test_fetch_big_endian() -> Result<(), LoadError> {
        let mut m = Machine::with_seed(1);
        m.load_program(&[0x12, 0x34])?;
        assert_eq!(m.fetch(), 0x1234);
        Ok(())
    }

    #[test]
    fn test_stack_push_pop() -> Result<(), Fault> {
        let mut m = Machine::with_seed(1);
        m.push(0x202, 0x200)?;
        m.push(0x302, 0x300)?;
        assert_eq!(m.stack(), &[0x202, 0x302]);
        assert_eq!(m.pop(0x400)?, 0x302);
        assert_eq!(m.pop(0x304)?, 0x202);
        assert_eq!(m.stack_pointer(), 0);
        Ok(())
    }

    #[test]
    fn test_stack_overflow_on_17th_push() {
        let mut m = Machine::with_seed(1);
        for n in 0..16 {
            assert!(m.push(0x200 + n, 0x200).is_ok());
        }
        assert_eq!(
            m.push(0x300, 0x2fe),
            Err(Fault::StackOverflow { addr: 0x2fe })
        );
        assert_eq!(m.stack_pointer(), 16);
        assert_eq!(m.stack()[15], 0x20f);
    }

    #[test]
    fn test_stack_underflow() {
        let mut m = Machine::with_seed(1);
        assert_eq!(m.pop(0x210), Err(Fault::StackUnderflow { addr: 0x210 }));
    }

    #[test]
    fn test_tick_floors_at_zero() {
        let mut m = Machine::with_seed(1);
        m.delay_timer = 2;
        m.sound_timer = 1;
        m.tick();
        assert_eq!((m.delay_timer, m.sound_timer), (1, 0));
        m.tick();
        m.tick();
        assert_eq!((m.delay_timer, m.sound_timer), (0, 0));
    }

    #[test]
    fn test_seeded_random_is_reproducible() {
        let mut a = Machine::with_seed(42);
        let mut b = Machine::with_seed(42);
        let xs: Vec<u8> = (0..32).map(|_| a.random_byte()).collect();
        let ys: Vec<u8> = (0..32).map(|_| b.random_byte()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_framebuffer_flip_reports_collision() {
        let mut fb = Framebuffer::new();
        assert!(!fb.flip(3, 4));
        assert!(fb.pixel(3, 4));
        assert!(fb.flip(3, 4));
        assert!(!fb.pixel(3, 4));
    }

    #[test]
    fn test_framebuffer_wraps() {
        let mut fb = Framebuffer::new();
        fb.flip(64, 32);
        assert!(fb.pixel(0, 0));
        assert!(fb.pixels()[0]);
        fb.flip(63, 31);
        assert!(fb.pixels()[64 * 32 - 1]);
        fb.clear();
        assert!(fb.is_blank());
    }
}
