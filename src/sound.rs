use beep::beep;
use std::error::Error;

/// Makes the chip-8 tone. The environment only reports edges: `beep` when the
/// sound timer goes nonzero and `stop` when it runs out.
pub trait Sound {
    fn beep(&mut self) -> Result<(), Box<dyn Error>>;
    fn stop(&mut self) -> Result<(), Box<dyn Error>>;
}

const SIMPLEBEEP_PITCH: u16 = 2093; // C7

/// PC-speaker beep via the `beep` crate
pub struct SimpleBeep;

impl SimpleBeep {
    pub fn new() -> Self {
        SimpleBeep
    }
}

impl Default for SimpleBeep {
    fn default() -> Self {
        Self::new()
    }
}

impl Sound for SimpleBeep {
    fn beep(&mut self) -> Result<(), Box<dyn Error>> {
        beep(SIMPLEBEEP_PITCH)?;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Box<dyn Error>> {
        beep(0)?;
        Ok(())
    }
}

/// no sound at all; also counts the edges it was given, for tests
#[derive(Default)]
pub struct Mute {
    pub beeps: usize,
    pub stops: usize,
}

impl Mute {
    pub fn new() -> Self {
        Mute::default()
    }
}

impl Sound for Mute {
    fn beep(&mut self) -> Result<(), Box<dyn Error>> {
        self.beeps += 1;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Box<dyn Error>> {
        self.stops += 1;
        Ok(())
    }
}

/// Turns the level of the sound timer into beep/stop edges
pub struct Tone {
    sounding: bool,
}

impl Tone {
    pub fn new() -> Self {
        Tone { sounding: false }
    }

    /// tell `sound` about a change, if there was one
    pub fn update(&mut self, sound: &mut dyn Sound, sounding: bool) -> Result<(), Box<dyn Error>> {
        match (self.sounding, sounding) {
            (false, true) => sound.beep()?,
            (true, false) => sound.stop()?,
            _ => return Ok(()),
        }
        self.sounding = sounding;
        Ok(())
    }
}

impl Default for Tone {
    fn default() -> Self {
        Self::new()
    }
}
