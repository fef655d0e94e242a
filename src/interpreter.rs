/// # interpreter
///
/// Fetch/decode/execute over a [`Machine`]. There's no clock in here: the
/// driver calls `step()` for every instruction and `tick()` at 60Hz, at
/// whatever ratio it likes.
///
/// The interpreter is a tiny state machine:
///
/// * `Running` -- the next `step()` fetches and executes
/// * `AwaitingKey` -- parked on an Fx0A; every `step()` re-runs it (PC stays
///   put) until the keypad shows a press
/// * `Halted` -- an instruction faulted; `step()` keeps returning the fault
use crate::error::{Fault, LoadError};
use crate::instruction::{Instruction, Reg};
use crate::machine::{Framebuffer, Machine, KEY_COUNT};
use crate::memory::MemoryMap;
use log::{debug, trace, warn};
use std::io;

/// every instruction is two bytes
const INSTRUCTION_BYTES: u16 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecState {
    Running,
    AwaitingKey { register: Reg },
    Halted(Fault),
}

pub struct Chip8Interpreter {
    machine: Machine,
    state: ExecState,
}

impl Chip8Interpreter {
    pub fn new() -> Self {
        Self::with_machine(Machine::new())
    }

    /// interpreter with a reproducible random source
    pub fn with_seed(seed: u64) -> Self {
        Self::with_machine(Machine::with_seed(seed))
    }

    pub fn with_machine(machine: Machine) -> Self {
        Chip8Interpreter {
            machine,
            state: ExecState::Running,
        }
    }

    /// load a chip8 program at 0x200
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), LoadError> {
        self.machine.load_program(program)?;
        debug!("loaded {} byte program", program.len());
        Ok(())
    }

    /// load a chip8 program from a file or whatever
    pub fn load_program_from(&mut self, reader: &mut impl io::Read) -> Result<(), LoadError> {
        self.machine.load_program_from(reader)?;
        debug!("loaded program from reader");
        Ok(())
    }

    pub fn state(&self) -> ExecState {
        self.state
    }

    pub fn is_awaiting_key(&self) -> bool {
        matches!(self.state, ExecState::AwaitingKey { .. })
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    /// direct access for drivers and tests that need to poke state
    pub fn machine_mut(&mut self) -> &mut Machine {
        &mut self.machine
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.machine.display
    }

    pub fn sound_timer(&self) -> u8 {
        self.machine.sound_timer
    }

    /// should a tone be playing right now
    pub fn is_sounding(&self) -> bool {
        self.machine.sound_timer > 0
    }

    /// replace the whole keypad state
    pub fn set_keys(&mut self, keys: [bool; KEY_COUNT]) {
        self.machine.keys = keys;
    }

    pub fn set_key(&mut self, key: usize, pressed: bool) {
        self.machine.keys[key & 0xf] = pressed;
    }

    /// 60Hz timer tick
    pub fn tick(&mut self) {
        self.machine.tick();
    }

    /// execute one instruction, returning what was executed
    pub fn step(&mut self) -> Result<Instruction, Fault> {
        if let ExecState::Halted(fault) = self.state {
            return Err(fault);
        }
        let addr = self.machine.pc;
        let result =
            Instruction::decode(self.machine.fetch(), addr).and_then(|ins| self.execute(ins, addr));
        match result {
            Ok(instruction) => {
                if instruction.is_control_transfer() {
                    trace!("{:#05x}  {}  -> {:#05x}", addr, instruction, self.machine.pc);
                } else {
                    trace!("{:#05x}  {}", addr, instruction);
                }
                Ok(instruction)
            }
            Err(fault) => {
                warn!("halting: {}", fault);
                self.state = ExecState::Halted(fault);
                Err(fault)
            }
        }
    }

    fn execute(&mut self, instruction: Instruction, addr: u16) -> Result<Instruction, Fault> {
        use Instruction::*;

        let m = &mut self.machine;
        let next = addr.wrapping_add(INSTRUCTION_BYTES);
        let skip = addr.wrapping_add(2 * INSTRUCTION_BYTES);

        m.pc = match instruction {
            Cls => {
                m.display.clear();
                next
            }
            Ret => m.pop(addr)?,
            Jp(nnn) => nnn,
            Call(nnn) => {
                m.push(next, addr)?;
                nnn
            }
            SeImm(x, kk) => {
                if m.vx(x) == kk {
                    skip
                } else {
                    next
                }
            }
            SneImm(x, kk) => {
                if m.vx(x) != kk {
                    skip
                } else {
                    next
                }
            }
            SeReg(x, y) => {
                if m.vx(x) == m.vx(y) {
                    skip
                } else {
                    next
                }
            }
            LdImm(x, kk) => {
                m.v[x as usize] = kk;
                next
            }
            AddImm(x, kk) => {
                m.v[x as usize] = m.vx(x).wrapping_add(kk);
                next
            }
            LdReg(x, y) => {
                m.v[x as usize] = m.vx(y);
                next
            }
            Or(x, y) => {
                let b = m.vx(y);
                m.v[x as usize] |= b;
                next
            }
            And(x, y) => {
                let b = m.vx(y);
                m.v[x as usize] &= b;
                next
            }
            Xor(x, y) => {
                let b = m.vx(y);
                m.v[x as usize] ^= b;
                next
            }
            AddReg(x, y) => {
                let (sum, carry) = m.vx(x).overflowing_add(m.vx(y));
                m.v[x as usize] = sum;
                m.set_flag(carry);
                next
            }
            Sub(x, y) => {
                let (a, b) = (m.vx(x), m.vx(y));
                m.v[x as usize] = a.wrapping_sub(b);
                m.set_flag(a > b);
                next
            }
            Shr(x, _) => {
                let a = m.vx(x);
                m.v[x as usize] = a >> 1;
                m.set_flag(a & 1 == 1);
                next
            }
            Subn(x, y) => {
                let (a, b) = (m.vx(x), m.vx(y));
                m.v[x as usize] = b.wrapping_sub(a);
                m.set_flag(b > a);
                next
            }
            Shl(x, _) => {
                let a = m.vx(x);
                m.v[x as usize] = a << 1;
                m.set_flag(a >> 7 == 1);
                next
            }
            SneReg(x, y) => {
                if m.vx(x) != m.vx(y) {
                    skip
                } else {
                    next
                }
            }
            LdI(nnn) => {
                m.i = nnn;
                next
            }
            JpV0(nnn) => nnn.wrapping_add(m.v[0] as u16),
            Rnd(x, kk) => {
                let r = m.random_byte();
                m.v[x as usize] = r & kk;
                next
            }
            Drw(x, y, n) => {
                let (ox, oy) = (m.vx(x) as usize, m.vx(y) as usize);
                let mut collision = false;
                for row in 0..n as u16 {
                    let sprite = m.memory.read_byte(m.i.wrapping_add(row));
                    for bit in 0..8 {
                        if sprite & (0x80u8 >> bit) != 0 {
                            collision |= m.display.flip(ox + bit, oy + row as usize);
                        }
                    }
                }
                m.set_flag(collision);
                next
            }
            Skp(x) => {
                if m.keys[(m.vx(x) & 0xf) as usize] {
                    skip
                } else {
                    next
                }
            }
            Sknp(x) => {
                if !m.keys[(m.vx(x) & 0xf) as usize] {
                    skip
                } else {
                    next
                }
            }
            LdFromDelay(x) => {
                m.v[x as usize] = m.delay_timer;
                next
            }
            LdKey(x) => match m.keys.iter().position(|pressed| *pressed) {
                Some(key) => {
                    m.keys[key] = false;
                    m.v[x as usize] = key as u8;
                    self.state = ExecState::Running;
                    next
                }
                None => {
                    self.state = ExecState::AwaitingKey { register: x };
                    addr
                }
            },
            LdToDelay(x) => {
                m.delay_timer = m.vx(x);
                next
            }
            LdToSound(x) => {
                m.sound_timer = m.vx(x);
                next
            }
            AddI(x) => {
                m.i = m.i.wrapping_add(m.vx(x) as u16);
                next
            }
            LdGlyph(x) => {
                m.i = m.memory.glyph_addr(m.vx(x));
                next
            }
            LdBcd(x) => {
                let value = m.vx(x);
                let digits = [value / 100, value / 10 % 10, value % 10];
                m.memory.write(&digits, m.i);
                next
            }
            StoreRegs(x) => {
                let regs = m.v;
                m.memory.write(&regs[..=x as usize], m.i);
                next
            }
            LoadRegs(x) => {
                for r in 0..=x as usize {
                    m.v[r] = m.memory.read_byte(m.i.wrapping_add(r as u16));
                }
                next
            }
        };
        Ok(instruction)
    }
}

impl Default for Chip8Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
