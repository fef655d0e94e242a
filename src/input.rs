use crate::machine::KEY_COUNT;
use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal;
use log::warn;
use std::collections::HashMap;
use std::io;
use std::time::Duration;

/// map of keys on the left-hand side of a qwerty keyboard to the COSMAC VIP
/// hex keypad:
///
/// ```text
///   1 2 3 4        1 2 3 C
///   q w e r   =>   4 5 6 D
///   a s d f        7 8 9 E
///   z x c v        A 0 B F
/// ```
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('z', 0x0a),
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

/// terminals report key presses (and auto-repeat) but not releases, so a press
/// is held down for this many polls
const KEY_HOLD_POLLS: u8 = 6;

/// reads keypresses
pub trait Input {
    /// current state of the 16 keys. called once per frame
    fn poll_keys(&mut self) -> Result<[bool; KEY_COUNT], io::Error>;

    /// has the user asked to stop
    fn quit_requested(&self) -> bool;
}

/// Input read from the terminal with crossterm, in raw mode
pub struct TermInput {
    held: [u8; KEY_COUNT],
    keymap: HashMap<char, u8>,
    quit: bool,
}

impl TermInput {
    pub fn new() -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(TermInput {
            held: [0; KEY_COUNT],
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            quit: false,
        })
    }

    fn press(&mut self, key: char) {
        match self.keymap.get(&key.to_ascii_lowercase()) {
            Some(mapped_key) => self.held[*mapped_key as usize] = KEY_HOLD_POLLS,
            None => warn!("can't map {:?} to a COSMAC key", key),
        }
    }

    fn handle(&mut self, evt: KeyEvent) {
        match evt.code {
            KeyCode::Esc => self.quit = true,
            KeyCode::Char('c') if evt.modifiers.contains(KeyModifiers::CONTROL) => {
                self.quit = true
            }
            KeyCode::Char(key) => self.press(key),
            other => warn!("unknown key event {:?}", other),
        }
    }

    fn read_terminal(&mut self) -> Result<(), io::Error> {
        // age what's already down before taking new presses
        self.held.iter_mut().for_each(|h| *h = h.saturating_sub(1));
        while poll(Duration::from_millis(0))? {
            if let Event::Key(evt) = read()? {
                self.handle(evt);
            }
        }
        Ok(())
    }
}

impl Drop for TermInput {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl Input for TermInput {
    fn poll_keys(&mut self) -> Result<[bool; KEY_COUNT], io::Error> {
        self.read_terminal()?;
        Ok(self.held.map(|h| h > 0))
    }

    fn quit_requested(&self) -> bool {
        self.quit
    }
}

/// dummy Input implementation for testing: plays back one keypad state per
/// poll. the first poll past the end reports all keys up, and only after that
/// does it ask to quit, so `n` states give `n + 1` frames
pub struct DummyInput {
    frames: Vec<[bool; KEY_COUNT]>,
    polls: usize,
}

impl DummyInput {
    pub fn new(frames: &[[bool; KEY_COUNT]]) -> Self {
        DummyInput {
            frames: Vec::from(frames),
            polls: 0,
        }
    }

    /// one frame with `keys` held down
    pub fn pressing(keys: &[u8]) -> Self {
        let mut state = [false; KEY_COUNT];
        keys.iter().for_each(|k| state[(*k & 0xf) as usize] = true);
        Self::new(&[state])
    }
}

impl Input for DummyInput {
    fn poll_keys(&mut self) -> Result<[bool; KEY_COUNT], io::Error> {
        let state = self
            .frames
            .get(self.polls)
            .copied()
            .unwrap_or([false; KEY_COUNT]);
        self.polls += 1;
        Ok(state)
    }

    fn quit_requested(&self) -> bool {
        self.polls > self.frames.len()
    }
}
