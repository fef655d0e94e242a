use std::io;
use thiserror::Error;

/// Why a program image could not be loaded. The machine is left untouched.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("program is {len} bytes but only {max} fit above 0x200")]
    TooLarge { len: usize, max: usize },
    #[error("failed to read program: {0}")]
    Io(#[from] io::Error),
}

/// Run-time faults. Any of these halts the interpreter until the driver
/// throws the machine away.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    #[error("unknown opcode {opcode:#06x} at {addr:#05x}")]
    UnknownOpcode { opcode: u16, addr: u16 },
    #[error("call stack overflow at {addr:#05x}")]
    StackOverflow { addr: u16 },
    #[error("return with an empty call stack at {addr:#05x}")]
    StackUnderflow { addr: u16 },
}

impl Fault {
    /// address of the instruction that faulted
    pub fn addr(&self) -> u16 {
        match *self {
            Fault::UnknownOpcode { addr, .. }
            | Fault::StackOverflow { addr }
            | Fault::StackUnderflow { addr } => addr,
        }
    }
}

/// Everything the environment can fail with
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("interpreter halted: {0}")]
    Fault(#[from] Fault),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("sound device: {0}")]
    Sound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_addr() {
        assert_eq!(Fault::StackOverflow { addr: 0x2f0 }.addr(), 0x2f0);
        assert_eq!(
            Fault::UnknownOpcode {
                opcode: 0xffff,
                addr: 0x200
            }
            .addr(),
            0x200
        );
    }

    #[test]
    fn test_fault_message_names_opcode_and_address() {
        let f = Fault::UnknownOpcode {
            opcode: 0x5121,
            addr: 0x20a,
        };
        assert_eq!(f.to_string(), "unknown opcode 0x5121 at 0x20a");
    }

    #[test]
    fn test_load_error_wraps_io() {
        let e: LoadError = io::Error::new(io::ErrorKind::UnexpectedEof, "short").into();
        assert!(matches!(e, LoadError::Io(_)));
    }
}
