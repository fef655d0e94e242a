///
/// ## Design
///
/// * CHIP-8 as documented (Cowgod), not the COSMAC VIP's own interpreter;
///   no SUPER-CHIP
/// * the core is pure state + semantics: no clock, no thread, no I/O
/// * abstract display, input and sound so can plug alternatives; starting with
///   TUI in-console
/// * CHIP-8 instructions run in a burst each frame then sleep, to match
///   timings; so not quite authentic
///
/// Pieces:
///
/// * memory map
///    - 4K, 12-bit addressing; every access wraps
///    - font glyphs at 0x050, program from 0x200
/// * machine state
///    - V0-VF, I, PC, 16-level stack, timers, framebuffer, keypad, rng
/// * instruction set
///    - closed enum of the 34 instructions; decode never falls through
/// * the interpreter itself
///    - pub .step() -> the instruction that ran, or a fault
///    - pub .tick() -- 60Hz timers
///    - keeps a simple state machine: running, waiting on a key (Fx0A),
///      halted on a fault. whilst waiting, .step() re-runs the Fx0A
/// * the environment
///    - owns the interpreter, borrows display/input/sound, runs the main loop
///
/// Model
///
/// Environment
///  |-- display, input, sound, config
///  |-- interpreter
///  |    `-- machine(memory)
///  `-- main loop
///       |-- keys = input.poll_keys(); interpreter.set_keys(keys)
///       |-- for _ in 0..cycles_per_frame { interpreter.step()? }
///       |-- interpreter.tick()
///       |-- display.draw(interpreter.framebuffer())
///       `-- sound on/off; sleep until next frame
pub mod display;
pub mod environment;
pub mod error;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod machine;
pub mod memory;
pub mod sound;

pub use error::{Error, Fault, LoadError};
pub use instruction::Instruction;
pub use interpreter::{Chip8Interpreter, ExecState};
pub use machine::{Framebuffer, Machine};
