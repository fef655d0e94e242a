/// # environment
///
/// Sets everything up and runs the main loop. The interpreter has no idea
/// about wall-clock time; this is where instruction cycles, 60Hz timer ticks,
/// input and drawing get interleaved:
///
/// ```text
///   every frame:
///     keys <- input;  step() x cycles_per_frame;  tick();  draw;  beep/stop
///     sleep until the next frame is due
/// ```
///
/// Instructions therefore run in a burst at the start of each frame and then
/// the loop sleeps; not quite authentic, but the timers are.
use crate::display::Display;
use crate::error::Error;
use crate::input::Input;
use crate::interpreter::Chip8Interpreter;
use crate::sound::{Sound, Tone};
use log::{debug, info};
use spin_sleep::LoopHelper;

/// knobs for the main loop
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// instructions executed per frame; 12 at 60Hz is ~720 instructions/s
    pub cycles_per_frame: u32,
    /// frames (and so timer ticks) per second
    pub frame_rate: f64,
    /// stop after this many frames; None runs until quit
    pub max_frames: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cycles_per_frame: 12,
            frame_rate: 60.0,
            max_frames: None,
        }
    }
}

/// why the main loop returned normally
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Quit,
    FrameLimit,
}

pub struct Environment<'a> {
    interpreter: Chip8Interpreter,
    display: &'a mut dyn Display,
    input: &'a mut dyn Input,
    sound: &'a mut dyn Sound,
    tone: Tone,
    config: Config,
    frames: u64,
}

impl<'a> Environment<'a> {
    pub fn new(
        interpreter: Chip8Interpreter,
        display: &'a mut dyn Display,
        input: &'a mut dyn Input,
        sound: &'a mut dyn Sound,
        config: Config,
    ) -> Self {
        Environment {
            interpreter,
            display,
            input,
            sound,
            tone: Tone::new(),
            config,
            frames: 0,
        }
    }

    pub fn interpreter(&self) -> &Chip8Interpreter {
        &self.interpreter
    }

    /// frames run so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// one frame, without any pacing
    pub fn frame(&mut self) -> Result<(), Error> {
        let keys = self.input.poll_keys()?;
        self.interpreter.set_keys(keys);
        for _ in 0..self.config.cycles_per_frame {
            self.interpreter.step()?;
        }
        self.interpreter.tick();
        self.display.draw(self.interpreter.framebuffer())?;
        self.tone
            .update(self.sound, self.interpreter.is_sounding())
            .map_err(|e| Error::Sound(e.to_string()))?;
        self.frames += 1;
        Ok(())
    }

    /// run frames at `frame_rate` until the input asks to quit, the frame
    /// limit is hit, or the interpreter faults
    pub fn main_loop(&mut self) -> Result<Exit, Error> {
        info!(
            "running at {} instructions per frame, {} frames/s",
            self.config.cycles_per_frame, self.config.frame_rate
        );
        let mut pacer = LoopHelper::builder()
            .report_interval_s(5.0)
            .build_with_target_rate(self.config.frame_rate);
        let result = loop {
            pacer.loop_start();
            if Some(self.frames) == self.config.max_frames {
                break Ok(Exit::FrameLimit);
            }
            if self.input.quit_requested() {
                break Ok(Exit::Quit);
            }
            if let Err(e) = self.frame() {
                break Err(e);
            }
            if let Some(fps) = pacer.report_rate() {
                debug!("{:.1} frames/s", fps);
            }
            pacer.loop_sleep();
        };
        // don't leave the speaker on, however the loop ended
        let silenced = self
            .tone
            .update(self.sound, false)
            .map_err(|e| Error::Sound(e.to_string()));
        info!("stopped after {} frames: {:?}", self.frames, result);
        let exit = result?;
        silenced?;
        Ok(exit)
    }
}
