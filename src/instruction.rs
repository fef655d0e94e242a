/// # instruction
///
/// Decoding of raw 16-bit opcodes. Opcodes are split into nibbles:
///
/// ```text
///   F X Y N      family, x, y, n
///   F X K K      kk  = low byte
///   F N N N      nnn = low 12 bits
/// ```
///
/// Families 0, 8, E and F pick the operation from the low byte/nibble as well,
/// so decode always matches on the whole word, never the family alone.
use crate::error::Fault;
use std::fmt;

/// register index, 0x0-0xf
pub type Reg = u8;

/// One decoded CHIP-8 instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    Cls,
    /// 00EE
    Ret,
    /// 1nnn
    Jp(u16),
    /// 2nnn
    Call(u16),
    /// 3xkk
    SeImm(Reg, u8),
    /// 4xkk
    SneImm(Reg, u8),
    /// 5xy0
    SeReg(Reg, Reg),
    /// 6xkk
    LdImm(Reg, u8),
    /// 7xkk
    AddImm(Reg, u8),
    /// 8xy0
    LdReg(Reg, Reg),
    /// 8xy1
    Or(Reg, Reg),
    /// 8xy2
    And(Reg, Reg),
    /// 8xy3
    Xor(Reg, Reg),
    /// 8xy4
    AddReg(Reg, Reg),
    /// 8xy5
    Sub(Reg, Reg),
    /// 8xy6 (y is decoded but not used)
    Shr(Reg, Reg),
    /// 8xy7
    Subn(Reg, Reg),
    /// 8xyE (y is decoded but not used)
    Shl(Reg, Reg),
    /// 9xy0
    SneReg(Reg, Reg),
    /// Annn
    LdI(u16),
    /// Bnnn
    JpV0(u16),
    /// Cxkk
    Rnd(Reg, u8),
    /// Dxyn
    Drw(Reg, Reg, u8),
    /// Ex9E
    Skp(Reg),
    /// ExA1
    Sknp(Reg),
    /// Fx07
    LdFromDelay(Reg),
    /// Fx0A
    LdKey(Reg),
    /// Fx15
    LdToDelay(Reg),
    /// Fx18
    LdToSound(Reg),
    /// Fx1E
    AddI(Reg),
    /// Fx29
    LdGlyph(Reg),
    /// Fx33
    LdBcd(Reg),
    /// Fx55
    StoreRegs(Reg),
    /// Fx65
    LoadRegs(Reg),
}

impl Instruction {
    /// decode `opcode`; `addr` is where it was fetched from, for the error
    pub fn decode(opcode: u16, addr: u16) -> Result<Instruction, Fault> {
        use Instruction::*;

        let x = ((opcode >> 8) & 0xf) as Reg;
        let y = ((opcode >> 4) & 0xf) as Reg;
        let n = (opcode & 0xf) as u8;
        let kk = (opcode & 0xff) as u8;
        let nnn = opcode & 0x0fff;

        let instruction = match (opcode >> 12, x, y, n) {
            (0x0, 0x0, 0xe, 0x0) => Cls,
            (0x0, 0x0, 0xe, 0xe) => Ret,
            (0x1, ..) => Jp(nnn),
            (0x2, ..) => Call(nnn),
            (0x3, ..) => SeImm(x, kk),
            (0x4, ..) => SneImm(x, kk),
            (0x5, _, _, 0x0) => SeReg(x, y),
            (0x6, ..) => LdImm(x, kk),
            (0x7, ..) => AddImm(x, kk),
            (0x8, _, _, 0x0) => LdReg(x, y),
            (0x8, _, _, 0x1) => Or(x, y),
            (0x8, _, _, 0x2) => And(x, y),
            (0x8, _, _, 0x3) => Xor(x, y),
            (0x8, _, _, 0x4) => AddReg(x, y),
            (0x8, _, _, 0x5) => Sub(x, y),
            (0x8, _, _, 0x6) => Shr(x, y),
            (0x8, _, _, 0x7) => Subn(x, y),
            (0x8, _, _, 0xe) => Shl(x, y),
            (0x9, _, _, 0x0) => SneReg(x, y),
            (0xa, ..) => LdI(nnn),
            (0xb, ..) => JpV0(nnn),
            (0xc, ..) => Rnd(x, kk),
            (0xd, ..) => Drw(x, y, n),
            (0xe, _, 0x9, 0xe) => Skp(x),
            (0xe, _, 0xa, 0x1) => Sknp(x),
            (0xf, _, 0x0, 0x7) => LdFromDelay(x),
            (0xf, _, 0x0, 0xa) => LdKey(x),
            (0xf, _, 0x1, 0x5) => LdToDelay(x),
            (0xf, _, 0x1, 0x8) => LdToSound(x),
            (0xf, _, 0x1, 0xe) => AddI(x),
            (0xf, _, 0x2, 0x9) => LdGlyph(x),
            (0xf, _, 0x3, 0x3) => LdBcd(x),
            (0xf, _, 0x5, 0x5) => StoreRegs(x),
            (0xf, _, 0x6, 0x5) => LoadRegs(x),
            _ => return Err(Fault::UnknownOpcode { opcode, addr }),
        };
        Ok(instruction)
    }

    /// true for the instructions that set the program counter themselves
    pub fn is_control_transfer(&self) -> bool {
        matches!(
            self,
            Instruction::Jp(_) | Instruction::Call(_) | Instruction::Ret | Instruction::JpV0(_)
        )
    }
}

/// disassembly, in the usual Cowgod mnemonics
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        match *self {
            Cls => write!(f, "CLS"),
            Ret => write!(f, "RET"),
            Jp(nnn) => write!(f, "JP {:#05x}", nnn),
            Call(nnn) => write!(f, "CALL {:#05x}", nnn),
            SeImm(x, kk) => write!(f, "SE V{:X}, {:#04x}", x, kk),
            SneImm(x, kk) => write!(f, "SNE V{:X}, {:#04x}", x, kk),
            SeReg(x, y) => write!(f, "SE V{:X}, V{:X}", x, y),
            LdImm(x, kk) => write!(f, "LD V{:X}, {:#04x}", x, kk),
            AddImm(x, kk) => write!(f, "ADD V{:X}, {:#04x}", x, kk),
            LdReg(x, y) => write!(f, "LD V{:X}, V{:X}", x, y),
            Or(x, y) => write!(f, "OR V{:X}, V{:X}", x, y),
            And(x, y) => write!(f, "AND V{:X}, V{:X}", x, y),
            Xor(x, y) => write!(f, "XOR V{:X}, V{:X}", x, y),
            AddReg(x, y) => write!(f, "ADD V{:X}, V{:X}", x, y),
            Sub(x, y) => write!(f, "SUB V{:X}, V{:X}", x, y),
            Shr(x, _) => write!(f, "SHR V{:X}", x),
            Subn(x, y) => write!(f, "SUBN V{:X}, V{:X}", x, y),
            Shl(x, _) => write!(f, "SHL V{:X}", x),
            SneReg(x, y) => write!(f, "SNE V{:X}, V{:X}", x, y),
            LdI(nnn) => write!(f, "LD I, {:#05x}", nnn),
            JpV0(nnn) => write!(f, "JP V0, {:#05x}", nnn),
            Rnd(x, kk) => write!(f, "RND V{:X}, {:#04x}", x, kk),
            Drw(x, y, n) => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            Skp(x) => write!(f, "SKP V{:X}", x),
            Sknp(x) => write!(f, "SKNP V{:X}", x),
            LdFromDelay(x) => write!(f, "LD V{:X}, DT", x),
            LdKey(x) => write!(f, "LD V{:X}, K", x),
            LdToDelay(x) => write!(f, "LD DT, V{:X}", x),
            LdToSound(x) => write!(f, "LD ST, V{:X}", x),
            AddI(x) => write!(f, "ADD I, V{:X}", x),
            LdGlyph(x) => write!(f, "LD F, V{:X}", x),
            LdBcd(x) => write!(f, "LD B, V{:X}", x),
            StoreRegs(x) => write!(f, "LD [I], V{:X}", x),
            LoadRegs(x) => write!(f, "LD V{:X}, [I]", x),
        }
    }
}
