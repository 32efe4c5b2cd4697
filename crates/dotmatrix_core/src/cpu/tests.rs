use super::{Bus, Cpu, Flag, RunState};
use crate::error::CoreError;

/// Flat 64 KiB memory with no routing or gating; every test program is
/// placed at the entry point (0x0100).
struct TestBus {
    mem: [u8; 0x10000],
}

impl TestBus {
    fn new() -> Self {
        Self { mem: [0; 0x10000] }
    }

    fn with_program(program: &[u8]) -> (Cpu, Self) {
        let mut bus = Self::new();
        bus.mem[0x0100..0x0100 + program.len()].copy_from_slice(program);
        (Cpu::default(), bus)
    }
}

impl Bus for TestBus {
    fn read8(&mut self, addr: u16) -> u8 {
        self.mem[addr as usize]
    }

    fn write8(&mut self, addr: u16, value: u8) {
        self.mem[addr as usize] = value;
    }
}

/// Step through one full instruction and return its cost in elementary
/// ticks (4 per consumed quantum).
fn exec_one(cpu: &mut Cpu, bus: &mut TestBus) -> u32 {
    cpu.step(bus).unwrap();
    let mut ticks = 4;
    while cpu.wait_quanta > 0 {
        cpu.step(bus).unwrap();
        ticks += 4;
    }
    ticks
}

// --- Register file ------------------------------------------------------

#[test]
fn register_pairs_split_and_join() {
    let mut cpu = Cpu::default();
    cpu.regs.set_bc(0x1234);
    assert_eq!(cpu.regs.b, 0x12);
    assert_eq!(cpu.regs.c, 0x34);
    assert_eq!(cpu.regs.bc(), 0x1234);
}

#[test]
fn f_low_nibble_is_hardwired_to_zero() {
    let mut cpu = Cpu::default();
    cpu.regs.set_af(0x12FF);
    assert_eq!(cpu.regs.af(), 0x12F0);
}

#[test]
fn boot_state_matches_the_dmg_profile() {
    let cpu = Cpu::default();
    assert_eq!(cpu.regs.af(), 0x01B0);
    assert_eq!(cpu.regs.bc(), 0x0013);
    assert_eq!(cpu.regs.de(), 0x00D8);
    assert_eq!(cpu.regs.hl(), 0x014D);
    assert_eq!(cpu.regs.sp, 0xFFFE);
    assert_eq!(cpu.regs.pc, 0x0100);
    assert!(!cpu.ime);
}

// --- Loads --------------------------------------------------------------

#[test]
fn ld_between_registers() {
    // LD B,A
    let (mut cpu, mut bus) = TestBus::with_program(&[0x47]);
    cpu.regs.a = 0x42;
    assert_eq!(exec_one(&mut cpu, &mut bus), 4);
    assert_eq!(cpu.regs.b, 0x42);
}

#[test]
fn ld_through_hl_costs_extra() {
    // LD (HL),A then LD C,(HL)
    let (mut cpu, mut bus) = TestBus::with_program(&[0x77, 0x4E]);
    cpu.regs.a = 0x99;
    cpu.regs.set_hl(0xC000);
    assert_eq!(exec_one(&mut cpu, &mut bus), 8);
    assert_eq!(bus.mem[0xC000], 0x99);
    assert_eq!(exec_one(&mut cpu, &mut bus), 8);
    assert_eq!(cpu.regs.c, 0x99);
}

#[test]
fn hl_post_increment_and_decrement_forms() {
    // LD (HL+),A ; LD A,(HL-)
    let (mut cpu, mut bus) = TestBus::with_program(&[0x22, 0x3A]);
    cpu.regs.a = 0x11;
    cpu.regs.set_hl(0xC000);
    exec_one(&mut cpu, &mut bus);
    assert_eq!(bus.mem[0xC000], 0x11);
    assert_eq!(cpu.regs.hl(), 0xC001);

    bus.mem[0xC001] = 0x22;
    exec_one(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.a, 0x22);
    assert_eq!(cpu.regs.hl(), 0xC000);
}

#[test]
fn ld_a16_sp_stores_little_endian() {
    // LD (0xC000),SP
    let (mut cpu, mut bus) = TestBus::with_program(&[0x08, 0x00, 0xC0]);
    cpu.regs.sp = 0xABCD;
    assert_eq!(exec_one(&mut cpu, &mut bus), 20);
    assert_eq!(bus.mem[0xC000], 0xCD);
    assert_eq!(bus.mem[0xC001], 0xAB);
}

#[test]
fn high_page_addressing_targets_0xff00() {
    // LDH (0x80),A ; LD A,(C)
    let (mut cpu, mut bus) = TestBus::with_program(&[0xE0, 0x80, 0xF2]);
    cpu.regs.a = 0x5A;
    assert_eq!(exec_one(&mut cpu, &mut bus), 12);
    assert_eq!(bus.mem[0xFF80], 0x5A);

    bus.mem[0xFF90] = 0xA5;
    cpu.regs.c = 0x90;
    assert_eq!(exec_one(&mut cpu, &mut bus), 8);
    assert_eq!(cpu.regs.a, 0xA5);
}

// --- 8-bit arithmetic ---------------------------------------------------

#[test]
fn add_sets_half_carry_at_the_nibble_boundary() {
    // ADD A,0x01
    let (mut cpu, mut bus) = TestBus::with_program(&[0xC6, 0x01]);
    cpu.regs.a = 0x0F;
    exec_one(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.a, 0x10);
    assert!(cpu.get_flag(Flag::H));
    assert!(!cpu.get_flag(Flag::C));
    assert!(!cpu.get_flag(Flag::Z));
    assert!(!cpu.get_flag(Flag::N));
}

#[test]
fn add_a_a_carries_across_the_nibble() {
    // ADD A,A with A=0x0F
    let (mut cpu, mut bus) = TestBus::with_program(&[0x87]);
    cpu.regs.a = 0x0F;
    exec_one(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.a, 0x1E);
    assert!(!cpu.get_flag(Flag::Z));
    assert!(!cpu.get_flag(Flag::N));
    assert!(cpu.get_flag(Flag::H));
    assert!(!cpu.get_flag(Flag::C));
}

#[test]
fn add_a_a_overflow_sets_carry_and_zero() {
    // ADD A,A
    let (mut cpu, mut bus) = TestBus::with_program(&[0x87]);
    cpu.regs.a = 0x80;
    exec_one(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.a, 0x00);
    assert!(cpu.get_flag(Flag::Z));
    assert!(cpu.get_flag(Flag::C));
    assert!(!cpu.get_flag(Flag::H));
}

#[test]
fn adc_chains_the_carry_in() {
    // ADC A,0x00 with C set
    let (mut cpu, mut bus) = TestBus::with_program(&[0xCE, 0x00]);
    cpu.regs.a = 0xFF;
    cpu.set_flag(Flag::C, true);
    exec_one(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.a, 0x00);
    assert!(cpu.get_flag(Flag::Z));
    assert!(cpu.get_flag(Flag::H));
    assert!(cpu.get_flag(Flag::C));
}

#[test]
fn sbc_borrows_through_the_carry() {
    // SBC A,0x00 with C set
    let (mut cpu, mut bus) = TestBus::with_program(&[0xDE, 0x00]);
    cpu.regs.a = 0x00;
    cpu.set_flag(Flag::C, true);
    exec_one(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.a, 0xFF);
    assert!(cpu.get_flag(Flag::N));
    assert!(cpu.get_flag(Flag::H));
    assert!(cpu.get_flag(Flag::C));
}

#[test]
fn cp_sets_flags_without_touching_a() {
    // CP 0x2F
    let (mut cpu, mut bus) = TestBus::with_program(&[0xFE, 0x2F]);
    cpu.regs.a = 0x3C;
    exec_one(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.a, 0x3C);
    assert!(!cpu.get_flag(Flag::Z));
    assert!(cpu.get_flag(Flag::N));
    assert!(cpu.get_flag(Flag::H));
    assert!(!cpu.get_flag(Flag::C));
}

#[test]
fn bitwise_ops_fix_h_and_clear_carry() {
    // AND 0x0F ; XOR A
    let (mut cpu, mut bus) = TestBus::with_program(&[0xE6, 0x0F, 0xAF]);
    cpu.regs.a = 0xF0;
    cpu.set_flag(Flag::C, true);
    exec_one(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.a, 0x00);
    assert!(cpu.get_flag(Flag::Z));
    assert!(cpu.get_flag(Flag::H));
    assert!(!cpu.get_flag(Flag::C));

    exec_one(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.a, 0x00);
    assert!(cpu.get_flag(Flag::Z));
    assert!(!cpu.get_flag(Flag::H));
}

#[test]
fn inc_and_dec_preserve_carry() {
    // INC A ; DEC B
    let (mut cpu, mut bus) = TestBus::with_program(&[0x3C, 0x05]);
    cpu.regs.a = 0xFF;
    cpu.regs.b = 0x10;
    cpu.set_flag(Flag::C, true);

    exec_one(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.a, 0x00);
    assert!(cpu.get_flag(Flag::Z));
    assert!(cpu.get_flag(Flag::H));
    assert!(cpu.get_flag(Flag::C));

    exec_one(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.b, 0x0F);
    assert!(cpu.get_flag(Flag::N));
    assert!(cpu.get_flag(Flag::H));
    assert!(cpu.get_flag(Flag::C));
}

#[test]
fn inc_hl_indirect_costs_twelve_ticks() {
    // INC (HL)
    let (mut cpu, mut bus) = TestBus::with_program(&[0x34]);
    cpu.regs.set_hl(0xC000);
    bus.mem[0xC000] = 0x41;
    assert_eq!(exec_one(&mut cpu, &mut bus), 12);
    assert_eq!(bus.mem[0xC000], 0x42);
}

#[test]
fn daa_corrects_every_two_digit_bcd_sum() {
    let bcd = |n: u8| (n / 10) << 4 | (n % 10);

    for x in 0u8..100 {
        for y in 0u8..100 {
            // ADD A,B ; DAA
            let (mut cpu, mut bus) = TestBus::with_program(&[0x80, 0x27]);
            cpu.regs.a = bcd(x);
            cpu.regs.b = bcd(y);
            exec_one(&mut cpu, &mut bus);
            exec_one(&mut cpu, &mut bus);

            let sum = u16::from(x) + u16::from(y);
            assert_eq!(
                cpu.regs.a,
                bcd((sum % 100) as u8),
                "DAA failed for {x} + {y}"
            );
            assert_eq!(cpu.get_flag(Flag::C), sum > 99, "carry wrong for {x} + {y}");
            assert!(!cpu.get_flag(Flag::H));
        }
    }
}

#[test]
fn daa_after_subtraction_keeps_n() {
    // SUB 0x05 ; DAA  (0x20 - 0x05 in BCD is 15)
    let (mut cpu, mut bus) = TestBus::with_program(&[0xD6, 0x05, 0x27]);
    cpu.regs.a = 0x20;
    exec_one(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.a, 0x1B);
    exec_one(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.a, 0x15);
    assert!(cpu.get_flag(Flag::N));
}

// --- 16-bit arithmetic --------------------------------------------------

#[test]
fn add_hl_updates_h_and_c_but_not_z() {
    // ADD HL,BC
    let (mut cpu, mut bus) = TestBus::with_program(&[0x09]);
    cpu.regs.set_hl(0x0FFF);
    cpu.regs.set_bc(0x0001);
    cpu.set_flag(Flag::Z, true);
    assert_eq!(exec_one(&mut cpu, &mut bus), 8);
    assert_eq!(cpu.regs.hl(), 0x1000);
    assert!(cpu.get_flag(Flag::H));
    assert!(!cpu.get_flag(Flag::C));
    assert!(cpu.get_flag(Flag::Z));
    assert!(!cpu.get_flag(Flag::N));
}

#[test]
fn add_sp_takes_flags_from_the_low_byte() {
    // ADD SP,0x01
    let (mut cpu, mut bus) = TestBus::with_program(&[0xE8, 0x01]);
    cpu.regs.sp = 0x00FF;
    cpu.set_flag(Flag::Z, true);
    assert_eq!(exec_one(&mut cpu, &mut bus), 16);
    assert_eq!(cpu.regs.sp, 0x0100);
    assert!(!cpu.get_flag(Flag::Z));
    assert!(cpu.get_flag(Flag::H));
    assert!(cpu.get_flag(Flag::C));
}

#[test]
fn ld_hl_sp_with_negative_offset() {
    // LD HL,SP-1
    let (mut cpu, mut bus) = TestBus::with_program(&[0xF8, 0xFF]);
    cpu.regs.sp = 0x0100;
    assert_eq!(exec_one(&mut cpu, &mut bus), 12);
    assert_eq!(cpu.regs.hl(), 0x00FF);
    assert_eq!(cpu.regs.sp, 0x0100);
    assert!(!cpu.get_flag(Flag::H));
    assert!(!cpu.get_flag(Flag::C));
}

#[test]
fn inc16_leaves_flags_alone() {
    // INC BC with every flag set
    let (mut cpu, mut bus) = TestBus::with_program(&[0x03]);
    cpu.regs.set_bc(0xFFFF);
    cpu.regs.f = 0xF0;
    exec_one(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.bc(), 0x0000);
    assert_eq!(cpu.regs.f, 0xF0);
}

// --- Rotates and CB-prefixed operations ---------------------------------

#[test]
fn accumulator_rotates_never_set_z() {
    // RLCA with A=0
    let (mut cpu, mut bus) = TestBus::with_program(&[0x07]);
    cpu.regs.a = 0x00;
    cpu.regs.f = 0xF0;
    assert_eq!(exec_one(&mut cpu, &mut bus), 4);
    assert_eq!(cpu.regs.a, 0x00);
    assert!(!cpu.get_flag(Flag::Z));
    assert!(!cpu.get_flag(Flag::C));
}

#[test]
fn rra_shifts_the_carry_in_from_the_top() {
    // RRA with A=0x01, C clear
    let (mut cpu, mut bus) = TestBus::with_program(&[0x1F]);
    cpu.regs.a = 0x01;
    cpu.regs.f = 0;
    exec_one(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.a, 0x00);
    assert!(cpu.get_flag(Flag::C));
    assert!(!cpu.get_flag(Flag::Z));
}

#[test]
fn cb_rotates_set_z_from_the_result() {
    // RLC B with B=0
    let (mut cpu, mut bus) = TestBus::with_program(&[0xCB, 0x00]);
    cpu.regs.b = 0x00;
    cpu.regs.f = 0;
    assert_eq!(exec_one(&mut cpu, &mut bus), 8);
    assert!(cpu.get_flag(Flag::Z));
}

#[test]
fn swap_exchanges_nibbles() {
    // SWAP A
    let (mut cpu, mut bus) = TestBus::with_program(&[0xCB, 0x37]);
    cpu.regs.a = 0xF0;
    exec_one(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.a, 0x0F);
    assert!(!cpu.get_flag(Flag::Z));
    assert!(!cpu.get_flag(Flag::C));
}

#[test]
fn sra_keeps_the_sign_bit() {
    // SRA A with A=0x81
    let (mut cpu, mut bus) = TestBus::with_program(&[0xCB, 0x2F]);
    cpu.regs.a = 0x81;
    exec_one(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.a, 0xC0);
    assert!(cpu.get_flag(Flag::C));
}

#[test]
fn bit_preserves_carry_and_costs_less_on_hl() {
    // BIT 7,H then BIT 0,(HL)
    let (mut cpu, mut bus) = TestBus::with_program(&[0xCB, 0x7C, 0xCB, 0x46]);
    cpu.regs.h = 0x80;
    cpu.set_flag(Flag::C, true);
    assert_eq!(exec_one(&mut cpu, &mut bus), 8);
    assert!(!cpu.get_flag(Flag::Z));
    assert!(cpu.get_flag(Flag::H));
    assert!(cpu.get_flag(Flag::C));

    cpu.regs.set_hl(0xC000);
    bus.mem[0xC000] = 0x00;
    assert_eq!(exec_one(&mut cpu, &mut bus), 12);
    assert!(cpu.get_flag(Flag::Z));
}

#[test]
fn res_and_set_on_memory_cost_sixteen() {
    // SET 3,(HL) then RES 3,(HL)
    let (mut cpu, mut bus) = TestBus::with_program(&[0xCB, 0xDE, 0xCB, 0x9E]);
    cpu.regs.set_hl(0xC000);
    assert_eq!(exec_one(&mut cpu, &mut bus), 16);
    assert_eq!(bus.mem[0xC000], 0x08);
    assert_eq!(exec_one(&mut cpu, &mut bus), 16);
    assert_eq!(bus.mem[0xC000], 0x00);
}

// --- Control flow -------------------------------------------------------

#[test]
fn jr_charges_more_when_taken() {
    // JR +2 then (after landing) JR NZ with Z set
    let (mut cpu, mut bus) = TestBus::with_program(&[0x18, 0x02, 0x00, 0x00, 0x20, 0x10]);
    assert_eq!(exec_one(&mut cpu, &mut bus), 12);
    assert_eq!(cpu.regs.pc, 0x0104);

    cpu.set_flag(Flag::Z, true);
    assert_eq!(exec_one(&mut cpu, &mut bus), 8);
    assert_eq!(cpu.regs.pc, 0x0106);
}

#[test]
fn jr_taken_at_the_top_of_the_rom_window() {
    // JR +0x10 with the operand byte at 0x7FFE: the target lands past
    // 0x8000 without any signed-arithmetic trap.
    let (mut cpu, mut bus) = TestBus::with_program(&[]);
    bus.mem[0x7FFD] = 0x18;
    bus.mem[0x7FFE] = 0x10;
    cpu.regs.pc = 0x7FFD;
    assert_eq!(exec_one(&mut cpu, &mut bus), 12);
    assert_eq!(cpu.regs.pc, 0x800F);
}

#[test]
fn jr_wraps_the_program_counter() {
    // JR +2 fetched at 0xFFFD wraps past the end of the address space.
    let (mut cpu, mut bus) = TestBus::with_program(&[]);
    bus.mem[0xFFFD] = 0x18;
    bus.mem[0xFFFE] = 0x02;
    cpu.regs.pc = 0xFFFD;
    exec_one(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.pc, 0x0001);
}

#[test]
fn jr_with_negative_offset_loops_back() {
    // JR -2 is a self-loop
    let (mut cpu, mut bus) = TestBus::with_program(&[0x18, 0xFE]);
    exec_one(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.pc, 0x0100);
}

#[test]
fn call_pushes_the_return_address() {
    // CALL 0x1234 ; RET at the target
    let (mut cpu, mut bus) = TestBus::with_program(&[0xCD, 0x34, 0x12]);
    bus.mem[0x1234] = 0xC9;

    assert_eq!(exec_one(&mut cpu, &mut bus), 24);
    assert_eq!(cpu.regs.pc, 0x1234);
    assert_eq!(cpu.regs.sp, 0xFFFC);
    assert_eq!(bus.mem[0xFFFC], 0x03);
    assert_eq!(bus.mem[0xFFFD], 0x01);

    assert_eq!(exec_one(&mut cpu, &mut bus), 16);
    assert_eq!(cpu.regs.pc, 0x0103);
    assert_eq!(cpu.regs.sp, 0xFFFE);
}

#[test]
fn conditional_call_not_taken_skips_the_push() {
    // CALL NZ,0x1234 with Z set
    let (mut cpu, mut bus) = TestBus::with_program(&[0xC4, 0x34, 0x12]);
    cpu.set_flag(Flag::Z, true);
    assert_eq!(exec_one(&mut cpu, &mut bus), 12);
    assert_eq!(cpu.regs.pc, 0x0103);
    assert_eq!(cpu.regs.sp, 0xFFFE);
}

#[test]
fn ret_cc_costs_differ_from_plain_ret() {
    // RET Z taken
    let (mut cpu, mut bus) = TestBus::with_program(&[0xC8]);
    cpu.regs.sp = 0xFFFC;
    bus.mem[0xFFFC] = 0x00;
    bus.mem[0xFFFD] = 0x20;
    cpu.set_flag(Flag::Z, true);
    assert_eq!(exec_one(&mut cpu, &mut bus), 20);
    assert_eq!(cpu.regs.pc, 0x2000);
}

#[test]
fn jp_hl_is_a_single_quantum() {
    let (mut cpu, mut bus) = TestBus::with_program(&[0xE9]);
    cpu.regs.set_hl(0x4000);
    assert_eq!(exec_one(&mut cpu, &mut bus), 4);
    assert_eq!(cpu.regs.pc, 0x4000);
}

#[test]
fn rst_jumps_to_its_fixed_target() {
    // RST 0x28
    let (mut cpu, mut bus) = TestBus::with_program(&[0xEF]);
    assert_eq!(exec_one(&mut cpu, &mut bus), 16);
    assert_eq!(cpu.regs.pc, 0x0028);
    assert_eq!(cpu.regs.sp, 0xFFFC);
}

#[test]
fn push_pop_roundtrip_costs_28_ticks() {
    // PUSH BC ; POP DE
    let (mut cpu, mut bus) = TestBus::with_program(&[0xC5, 0xD1]);
    cpu.regs.set_bc(0xBEEF);
    let ticks = exec_one(&mut cpu, &mut bus) + exec_one(&mut cpu, &mut bus);
    assert_eq!(ticks, 28);
    assert_eq!(cpu.regs.de(), 0xBEEF);
    assert_eq!(cpu.regs.sp, 0xFFFE);
}

#[test]
fn pop_af_masks_the_flag_low_nibble() {
    // PUSH BC ; POP AF
    let (mut cpu, mut bus) = TestBus::with_program(&[0xC5, 0xF1]);
    cpu.regs.set_bc(0x12FF);
    exec_one(&mut cpu, &mut bus);
    exec_one(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.af(), 0x12F0);
}

// --- Interrupt machinery ------------------------------------------------

#[test]
fn ei_takes_effect_after_the_following_instruction() {
    // EI ; NOP
    let (mut cpu, mut bus) = TestBus::with_program(&[0xFB, 0x00]);
    exec_one(&mut cpu, &mut bus);
    assert!(!cpu.ime);
    exec_one(&mut cpu, &mut bus);
    assert!(cpu.ime);
}

#[test]
fn instruction_after_ei_runs_before_dispatch() {
    // EI ; NOP with an interrupt already pending
    let (mut cpu, mut bus) = TestBus::with_program(&[0xFB, 0x00]);
    bus.mem[0xFFFF] = 0x01;
    bus.mem[0xFF0F] = 0x01;

    exec_one(&mut cpu, &mut bus);
    exec_one(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.pc, 0x0102);

    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.regs.pc, 0x0040);
    // The pushed return address points past the NOP.
    assert_eq!(bus.mem[0xFFFC], 0x02);
    assert_eq!(bus.mem[0xFFFD], 0x01);
}

#[test]
fn di_cancels_a_pending_enable() {
    // EI ; DI ; NOP
    let (mut cpu, mut bus) = TestBus::with_program(&[0xFB, 0xF3, 0x00]);
    exec_one(&mut cpu, &mut bus);
    exec_one(&mut cpu, &mut bus);
    exec_one(&mut cpu, &mut bus);
    assert!(!cpu.ime);
}

#[test]
fn reti_enables_interrupts_immediately() {
    let (mut cpu, mut bus) = TestBus::with_program(&[0xD9]);
    cpu.regs.sp = 0xFFFC;
    bus.mem[0xFFFC] = 0x00;
    bus.mem[0xFFFD] = 0x03;
    assert_eq!(exec_one(&mut cpu, &mut bus), 16);
    assert_eq!(cpu.regs.pc, 0x0300);
    assert!(cpu.ime);
}

#[test]
fn interrupt_dispatch_costs_20_ticks() {
    let (mut cpu, mut bus) = TestBus::with_program(&[]);
    cpu.ime = true;
    bus.mem[0xFFFF] = 0x04;
    bus.mem[0xFF0F] = 0x04;

    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.regs.pc, 0x0050);
    assert_eq!(cpu.regs.sp, 0xFFFC);
    assert!(!cpu.ime);
    assert_eq!(bus.mem[0xFF0F], 0x00);
    // 20-tick cost: the dispatching quantum plus four wait quanta.
    assert_eq!(cpu.wait_quanta, 4);
}

#[test]
fn each_source_dispatches_to_its_own_vector() {
    use crate::interrupts::Interrupt;

    for source in [
        Interrupt::VBlank,
        Interrupt::LcdStat,
        Interrupt::Timer,
        Interrupt::Serial,
        Interrupt::Joypad,
    ] {
        let (mut cpu, mut bus) = TestBus::with_program(&[]);
        cpu.ime = true;
        bus.mem[0xFFFF] = source.mask();
        bus.mem[0xFF0F] = source.mask();

        cpu.step(&mut bus).unwrap();
        assert_eq!(cpu.regs.pc, source.vector(), "wrong vector for {source:?}");
        assert_eq!(bus.mem[0xFF0F], 0x00);
    }
}

#[test]
fn halt_idles_until_a_source_becomes_pending() {
    let (mut cpu, mut bus) = TestBus::with_program(&[0x76]);
    bus.mem[0xFFFF] = 0x01;

    exec_one(&mut cpu, &mut bus);
    assert_eq!(cpu.run_state(), RunState::Halted);
    assert_eq!(cpu.regs.pc, 0x0101);

    for _ in 0..50 {
        cpu.step(&mut bus).unwrap();
    }
    assert!(cpu.is_halted());
    assert_eq!(cpu.regs.pc, 0x0101);

    // Wake without service: IME is clear, so no vector is entered, the
    // request bit survives and PC is untouched by the waking quantum.
    bus.mem[0xFF0F] = 0x01;
    cpu.step(&mut bus).unwrap();
    assert!(!cpu.is_halted());
    assert_eq!(cpu.regs.pc, 0x0101);
    assert_eq!(bus.mem[0xFF0F], 0x01);

    // Execution resumes at the instruction after HALT.
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.regs.pc, 0x0102);
}

#[test]
fn stop_consumes_its_padding_byte_and_idles() {
    // STOP 0x00 ; NOP
    let (mut cpu, mut bus) = TestBus::with_program(&[0x10, 0x00, 0x00]);
    exec_one(&mut cpu, &mut bus);
    assert!(cpu.is_halted());
    assert_eq!(cpu.regs.pc, 0x0102);
}

// --- Faults -------------------------------------------------------------

#[test]
fn illegal_opcode_reports_its_fetch_address() {
    let (mut cpu, mut bus) = TestBus::with_program(&[0x00, 0xD3]);
    exec_one(&mut cpu, &mut bus);
    let err = cpu.step(&mut bus).unwrap_err();
    assert_eq!(
        err,
        CoreError::IllegalOpcode {
            pc: 0x0101,
            opcode: 0xD3
        }
    );
}
