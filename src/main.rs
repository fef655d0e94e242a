use std::env;
use std::error::Error;
use std::fs::File;

use chip8::display::MonoTermDisplay;
use chip8::environment::{Config, Environment};
use chip8::input::TermInput;
use chip8::interpreter::Chip8Interpreter;
use chip8::machine::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use chip8::sound::SimpleBeep;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| "roms/trip8_demo.ch8".to_string());

    // load a program before touching the terminal, so errors stay readable
    let mut interpreter = Chip8Interpreter::new();
    let mut f = File::open(&path)?;
    interpreter.load_program_from(&mut f)?;

    let result = {
        let mut display = MonoTermDisplay::new(DISPLAY_WIDTH, DISPLAY_HEIGHT)?;
        let mut input = TermInput::new()?;
        let mut sound = SimpleBeep::new();
        let mut environment = Environment::new(
            interpreter,
            &mut display,
            &mut input,
            &mut sound,
            Config::default(),
        );
        environment.main_loop()
    };

    // terminal is restored by now
    match result {
        Ok(exit) => {
            log::info!("{}: {:?}", path, exit);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
