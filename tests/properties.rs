use chip8::memory::MemoryMap;
use chip8::{Chip8Interpreter, ExecState, Fault, Instruction};
use proptest::prelude::*;

/// interpreter with `program` at 0x200
fn boot(program: &[u8], seed: u64) -> Chip8Interpreter {
    let mut i = Chip8Interpreter::with_seed(seed);
    i.load_program(program).expect("program fits");
    i
}

/// run one 8xyN instruction with the given operands; x=1, y=2
fn alu(op: u8, vx: u8, vy: u8) -> Result<(u8, u8), Fault> {
    let mut i = boot(&[0x81, 0x20 | op], 0);
    i.machine_mut().v[1] = vx;
    i.machine_mut().v[2] = vy;
    i.step()?;
    let v = i.machine().v;
    Ok((v[1], v[0xf]))
}

proptest! {
    #[test]
    fn add_sets_carry_iff_overflow(vx in any::<u8>(), vy in any::<u8>()) {
        let (result, flag) = alu(0x4, vx, vy)?;
        let sum = vx as u16 + vy as u16;
        prop_assert_eq!(result as u16, sum % 256);
        prop_assert_eq!(flag == 1, sum > 255);
    }

    #[test]
    fn sub_flags_strictly_greater(vx in any::<u8>(), vy in any::<u8>()) {
        let (result, flag) = alu(0x5, vx, vy)?;
        prop_assert_eq!(result, vx.wrapping_sub(vy));
        prop_assert_eq!(flag == 1, vx > vy);

        let (result, flag) = alu(0x7, vx, vy)?;
        prop_assert_eq!(result, vy.wrapping_sub(vx));
        prop_assert_eq!(flag == 1, vy > vx);
    }

    #[test]
    fn shifts_flag_the_bit_shifted_out(vx in any::<u8>(), vy in any::<u8>()) {
        let (result, flag) = alu(0x6, vx, vy)?;
        prop_assert_eq!(result, vx >> 1);
        prop_assert_eq!(flag, vx & 1);

        let (result, flag) = alu(0xe, vx, vy)?;
        prop_assert_eq!(result, vx << 1);
        prop_assert_eq!(flag, (vx >> 7) & 1);
    }

    #[test]
    fn call_then_return_resumes_after_call(target in 0x300u16..0xffe) {
        let mut i = boot(&[0x20 | (target >> 8) as u8, target as u8], 0);
        i.machine_mut().memory.write(&[0x00, 0xee], target);
        let before = i.machine().pc;
        prop_assert_eq!(i.step()?, Instruction::Call(target));
        prop_assert_eq!(i.machine().pc, target);
        prop_assert_eq!(i.step()?, Instruction::Ret);
        prop_assert_eq!(i.machine().pc, before + 2);
    }

    #[test]
    fn save_and_load_all_registers(nnn in 0x300u16..0x1000, regs in any::<[u8; 16]>()) {
        // LD I, nnn; LD [I], VF; LD I, nnn; LD VF, [I]
        let hi = 0xa0 | (nnn >> 8) as u8;
        let lo = nnn as u8;
        let mut i = boot(&[hi, lo, 0xff, 0x55, hi, lo, 0xff, 0x65], 0);
        i.machine_mut().v = regs;
        i.step()?;
        i.step()?;
        prop_assert_eq!(i.machine().memory.read(nnn, 16), regs.to_vec());

        i.machine_mut().v = [0; 16];
        i.step()?;
        i.step()?;
        prop_assert_eq!(i.machine().v, regs);
    }

    #[test]
    fn bcd_digits(value in any::<u8>()) {
        let mut i = boot(&[0xa6, 0x00, 0xf0, 0x33], 0);
        i.machine_mut().v[0] = value;
        i.step()?;
        i.step()?;
        let digits = i.machine().memory.read(0x600, 3);
        prop_assert_eq!(
            digits[0] as u16 * 100 + digits[1] as u16 * 10 + digits[2] as u16,
            value as u16
        );
        prop_assert!(digits.iter().all(|d| *d < 10));
    }

    #[test]
    fn random_with_zero_mask_is_zero(seed in any::<u64>(), x in 0u8..16) {
        let mut i = boot(&[0xc0 | x, 0x00], seed);
        i.machine_mut().v[x as usize] = 0xff;
        i.step()?;
        prop_assert_eq!(i.machine().v[x as usize], 0);
    }

    #[test]
    fn drawing_twice_restores_the_screen(
        sprite in proptest::collection::vec(any::<u8>(), 1..16),
        x in any::<u8>(),
        y in any::<u8>(),
    ) {
        let n = sprite.len() as u8;
        let mut i = boot(&[0xa4, 0x00, 0x00, 0xe0, 0xd0, 0x10 | n, 0xd0, 0x10 | n], 0);
        i.machine_mut().memory.write(&sprite, 0x400);
        i.machine_mut().v[0] = x;
        i.machine_mut().v[1] = y;
        for _ in 0..3 {
            i.step()?;
        }
        // fresh screen: no collision, and exactly the sprite's bits are lit
        prop_assert_eq!(i.machine().v[0xf], 0);
        let lit = i.framebuffer().pixels().iter().filter(|p| **p).count() as u32;
        let bits: u32 = sprite.iter().map(|b| b.count_ones()).sum();
        prop_assert_eq!(lit, bits);

        i.step()?;
        prop_assert!(i.framebuffer().is_blank());
        prop_assert_eq!(i.machine().v[0xf], (bits > 0) as u8);
    }

    #[test]
    fn timers_never_go_below_zero(start in any::<u8>(), ticks in 0usize..600) {
        let mut i = boot(&[], 0);
        i.machine_mut().delay_timer = start;
        i.machine_mut().sound_timer = start;
        for _ in 0..ticks {
            i.tick();
        }
        let expected = (start as usize).saturating_sub(ticks) as u8;
        prop_assert_eq!(i.machine().delay_timer, expected);
        prop_assert_eq!(i.machine().sound_timer, expected);
    }

    #[test]
    fn decode_never_panics(opcode in any::<u16>()) {
        if let Err(fault) = Instruction::decode(opcode, 0x200) {
            prop_assert_eq!(fault, Fault::UnknownOpcode { opcode, addr: 0x200 });
        }
    }
}

#[test]
fn two_instruction_program() -> Result<(), Fault> {
    let mut i = boot(&[0x60, 0x05, 0x70, 0x03], 0);
    i.step()?;
    i.step()?;
    assert_eq!(i.machine().v[0], 8);
    assert_eq!(i.machine().pc, 0x204);
    Ok(())
}

#[test]
fn delay_timer_from_thirty_after_sixty_ticks() {
    let mut i = boot(&[], 0);
    i.machine_mut().delay_timer = 30;
    for _ in 0..60 {
        i.tick();
    }
    assert_eq!(i.machine().delay_timer, 0);
}

#[test]
fn bcd_extremes() -> Result<(), Fault> {
    for (value, digits) in [(255u8, [2, 5, 5]), (0, [0, 0, 0])] {
        let mut i = boot(&[0xa6, 0x00, 0xf0, 0x33], 0);
        i.machine_mut().v[0] = value;
        i.step()?;
        i.step()?;
        assert_eq!(i.machine().memory.read(0x600, 3), digits.to_vec());
    }
    Ok(())
}

#[test]
fn save_registers_wraps_index_to_12_bits() -> Result<(), Fault> {
    // LD I, 0xff8; ADD I, V0 (V0 = 0x10) puts I at 0x1008, outside 12 bits
    let mut i = boot(&[0xaf, 0xf8, 0xf0, 0x1e, 0xff, 0x55], 0);
    let regs: [u8; 16] = core::array::from_fn(|r| 0x10 + r as u8);
    i.machine_mut().v = regs;
    for _ in 0..3 {
        i.step()?;
    }
    assert_eq!(i.machine().i, 0x1008);
    assert_eq!(i.machine().memory.read(0x008, 16), regs.to_vec());
    Ok(())
}

#[test]
fn key_wait_is_explicit_state() -> Result<(), Fault> {
    let mut i = boot(&[0xf7, 0x0a], 0);
    i.step()?;
    assert_eq!(i.state(), ExecState::AwaitingKey { register: 7 });
    i.set_key(0xf, true);
    assert_eq!(i.step()?, Instruction::LdKey(7));
    assert_eq!(i.state(), ExecState::Running);
    assert_eq!(i.machine().v[7], 0xf);
    assert_eq!(i.machine().pc, 0x202);
    Ok(())
}

#[test]
fn oversized_program_is_rejected_without_side_effects() {
    let mut i = Chip8Interpreter::with_seed(0);
    assert!(i.load_program(&vec![0xab; 3585]).is_err());
    assert_eq!(i.machine().memory.read_byte(0x200), 0);
    assert!(i.load_program(&vec![0xab; 3584]).is_ok());
}
