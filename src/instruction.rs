//! The instruction table: per-opcode argument shape and executor, built once
//! and shared by every processor.
//!
//! Grounded on the teacher's `processor/logic.rs::tick`, which reads operand
//! registers up front and dispatches on opcode with small per-case helper
//! calls (`write_i`, `mul`, `div`, `set_if`, `load`). Here each opcode gets
//! its own named executor function instead of one big match arm, since the
//! table itself (not a single dispatch function) is the public surface.

use crate::argument::{Argument, ArgumentType};
use crate::constants::RETURN_ADDRESS_REGISTER;
use crate::exception::ExceptionKind;
use crate::opcode::Opcode;
use crate::processor::Processor;
use num_traits::ToPrimitive;

/// Result of dispatching one instruction.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum Outcome {
    Continue,
    Jumped(usize),
    Halted,
    Trapped(ExceptionKind),
}

type Executor = fn(&mut Processor, &[Argument; 3]) -> Outcome;

/// One row of the instruction table.
#[derive(Clone, Copy)]
pub struct InstructionInfo {
    opcode: Opcode,
    mnemonic: &'static str,
    argument_types: [ArgumentType; 3],
    required_argument_count: usize,
    executor: Executor,
}

impl InstructionInfo {
    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn mnemonic(&self) -> &'static str {
        self.mnemonic
    }

    pub fn argument_types(&self) -> [ArgumentType; 3] {
        self.argument_types
    }

    pub fn required_argument_count(&self) -> usize {
        self.required_argument_count
    }

    pub fn execute(&self, proc: &mut Processor, args: &[Argument; 3]) -> Outcome {
        (self.executor)(proc, args)
    }
}

fn row(opcode: Opcode, executor: Executor) -> InstructionInfo {
    InstructionInfo {
        opcode,
        mnemonic: opcode.name(),
        argument_types: opcode.argument_types(),
        required_argument_count: opcode.required_argument_count(),
        executor,
    }
}

/// Builds the instruction table: one row per opcode, including the `None`
/// sentinel, ordered by declaration (and therefore by numeric id).
pub fn generate_instruction_table() -> Vec<InstructionInfo> {
    vec![
        row(Opcode::ADD, exec_add),
        row(Opcode::ADDI, exec_addi),
        row(Opcode::SUB, exec_sub),
        row(Opcode::SUBI, exec_subi),
        row(Opcode::MULT, exec_mult),
        row(Opcode::MULTI, exec_multi),
        row(Opcode::DIV, exec_div),
        row(Opcode::DIVI, exec_divi),
        row(Opcode::ADDU, exec_addu),
        row(Opcode::ADDUI, exec_addui),
        row(Opcode::SUBU, exec_subu),
        row(Opcode::SUBUI, exec_subui),
        row(Opcode::MULTU, exec_multu),
        row(Opcode::MULTUI, exec_multui),
        row(Opcode::DIVU, exec_divu),
        row(Opcode::DIVUI, exec_divui),
        row(Opcode::AND, exec_and),
        row(Opcode::ANDI, exec_andi),
        row(Opcode::OR, exec_or),
        row(Opcode::ORI, exec_ori),
        row(Opcode::XOR, exec_xor),
        row(Opcode::XORI, exec_xori),
        row(Opcode::SLL, exec_sll),
        row(Opcode::SLLI, exec_slli),
        row(Opcode::SRL, exec_srl),
        row(Opcode::SRLI, exec_srli),
        row(Opcode::SLA, exec_sla),
        row(Opcode::SLAI, exec_slai),
        row(Opcode::SRA, exec_sra),
        row(Opcode::SRAI, exec_srai),
        row(Opcode::SLT, exec_slt),
        row(Opcode::SLTI, exec_slti),
        row(Opcode::SGT, exec_sgt),
        row(Opcode::SGTI, exec_sgti),
        row(Opcode::SLE, exec_sle),
        row(Opcode::SLEI, exec_slei),
        row(Opcode::SGE, exec_sge),
        row(Opcode::SGEI, exec_sgei),
        row(Opcode::SEQ, exec_seq),
        row(Opcode::SEQI, exec_seqi),
        row(Opcode::SNE, exec_sne),
        row(Opcode::SNEI, exec_snei),
        row(Opcode::SLTU, exec_sltu),
        row(Opcode::SLTUI, exec_sltui),
        row(Opcode::SGTU, exec_sgtu),
        row(Opcode::SGTUI, exec_sgtui),
        row(Opcode::SLEU, exec_sleu),
        row(Opcode::SLEUI, exec_sleui),
        row(Opcode::SGEU, exec_sgeu),
        row(Opcode::SGEUI, exec_sgeui),
        row(Opcode::SEQU, exec_sequ),
        row(Opcode::SEQUI, exec_sequi),
        row(Opcode::SNEU, exec_sneu),
        row(Opcode::SNEUI, exec_sneui),
        row(Opcode::LB, exec_lb),
        row(Opcode::LBU, exec_lbu),
        row(Opcode::LH, exec_lh),
        row(Opcode::LHU, exec_lhu),
        row(Opcode::LW, exec_lw),
        row(Opcode::SB, exec_sb),
        row(Opcode::SH, exec_sh),
        row(Opcode::SW, exec_sw),
        row(Opcode::LF, exec_lf),
        row(Opcode::LD, exec_ld),
        row(Opcode::SF, exec_sf),
        row(Opcode::SD, exec_sd),
        row(Opcode::ADDF, exec_addf),
        row(Opcode::SUBF, exec_subf),
        row(Opcode::MULTF, exec_multf),
        row(Opcode::DIVF, exec_divf),
        row(Opcode::ADDD, exec_addd),
        row(Opcode::SUBD, exec_subd),
        row(Opcode::MULTD, exec_multd),
        row(Opcode::DIVD, exec_divd),
        row(Opcode::LTF, exec_ltf),
        row(Opcode::GTF, exec_gtf),
        row(Opcode::LEF, exec_lef),
        row(Opcode::GEF, exec_gef),
        row(Opcode::EQF, exec_eqf),
        row(Opcode::NEF, exec_nef),
        row(Opcode::LTD, exec_ltd),
        row(Opcode::GTD, exec_gtd),
        row(Opcode::LED, exec_led),
        row(Opcode::GED, exec_ged),
        row(Opcode::EQD, exec_eqd),
        row(Opcode::NED, exec_ned),
        row(Opcode::MOVI2S, exec_movi2s),
        row(Opcode::MOVS2I, exec_movs2i),
        row(Opcode::MOVF, exec_movf),
        row(Opcode::MOVD, exec_movd),
        row(Opcode::MOVFP2I, exec_movfp2i),
        row(Opcode::MOVI2FP, exec_movi2fp),
        row(Opcode::MOVI2DF, exec_movi2df),
        row(Opcode::CVTF2D, exec_cvtf2d),
        row(Opcode::CVTF2I, exec_cvtf2i),
        row(Opcode::CVTD2F, exec_cvtd2f),
        row(Opcode::CVTD2I, exec_cvtd2i),
        row(Opcode::CVTI2F, exec_cvti2f),
        row(Opcode::CVTI2D, exec_cvti2d),
        row(Opcode::BEQZ, exec_beqz),
        row(Opcode::BNEZ, exec_bnez),
        row(Opcode::BFPT, exec_bfpt),
        row(Opcode::BFPF, exec_bfpf),
        row(Opcode::J, exec_j),
        row(Opcode::JR, exec_jr),
        row(Opcode::JAL, exec_jal),
        row(Opcode::JALR, exec_jalr),
        row(Opcode::TRAP, exec_trap),
        row(Opcode::HALT, exec_halt),
        row(Opcode::NOP, exec_nop),
        row(Opcode::None, exec_none),
    ]
}

/// Looks up the table row for `opcode`, matching by numeric id rather than
/// `Opcode` equality so the table could later be stored sorted/indexed by id
/// without changing callers.
///
/// Panics if `opcode` is not present in `table`, which can only happen for a
/// table not produced by `generate_instruction_table`.
pub fn look_up_instruction_info(table: &[InstructionInfo], opcode: Opcode) -> &InstructionInfo {
    let id = opcode.to_u32().expect("Opcode always has a numeric id.");
    table
        .iter()
        .find(|info| info.opcode.to_u32().expect("Opcode always has a numeric id.") == id)
        .expect("Instruction table must have a row for every opcode.")
}

fn int_arg(args: &[Argument; 3], slot: usize) -> u8 {
    args[slot].as_int_register().expect("argument slot type mismatch")
}

fn float_arg(args: &[Argument; 3], slot: usize) -> u8 {
    args[slot].as_float_register().expect("argument slot type mismatch")
}

fn imm_signed(args: &[Argument; 3], slot: usize) -> i32 {
    args[slot].as_immediate_integer().expect("argument slot type mismatch") as i32
}

fn imm_unsigned(args: &[Argument; 3], slot: usize) -> u32 {
    args[slot].as_immediate_unsigned().expect("argument slot type mismatch") as u32
}

fn effective_address(proc: &Processor, args: &[Argument; 3], slot: usize) -> u32 {
    let (base, displacement) = args[slot]
        .as_address_displacement()
        .expect("argument slot type mismatch");
    proc.int_register_get_unsigned(base)
        .wrapping_add(displacement as i32 as u32)
}

fn classify_signed(wide: i64) -> (i32, Option<ExceptionKind>) {
    if wide > i32::MAX as i64 {
        (wide as i32, Some(ExceptionKind::Overflow))
    } else if wide < i32::MIN as i64 {
        (wide as i32, Some(ExceptionKind::Underflow))
    } else {
        (wide as i32, None)
    }
}

fn classify_unsigned(wide: u64) -> (u32, Option<ExceptionKind>) {
    if wide > u32::MAX as u64 {
        (wide as u32, Some(ExceptionKind::Overflow))
    } else {
        (wide as u32, None)
    }
}

fn outcome_of(exception: Option<ExceptionKind>) -> Outcome {
    match exception {
        Some(e) => Outcome::Trapped(e),
        None => Outcome::Continue,
    }
}

fn signed_binary_reg(proc: &mut Processor, args: &[Argument; 3], op: fn(i32, i32) -> (i32, Option<ExceptionKind>)) -> Outcome {
    let (rd, rs1, rs2) = (int_arg(args, 0), int_arg(args, 1), int_arg(args, 2));
    let (result, exc) = op(proc.int_register_get_signed(rs1), proc.int_register_get_signed(rs2));
    proc.int_register_set_signed(rd, result);
    outcome_of(exc)
}

fn signed_binary_imm(proc: &mut Processor, args: &[Argument; 3], op: fn(i32, i32) -> (i32, Option<ExceptionKind>)) -> Outcome {
    let (rd, rs1) = (int_arg(args, 0), int_arg(args, 1));
    let (result, exc) = op(proc.int_register_get_signed(rs1), imm_signed(args, 2));
    proc.int_register_set_signed(rd, result);
    outcome_of(exc)
}

fn unsigned_binary_reg(proc: &mut Processor, args: &[Argument; 3], op: fn(u32, u32) -> (u32, Option<ExceptionKind>)) -> Outcome {
    let (rd, rs1, rs2) = (int_arg(args, 0), int_arg(args, 1), int_arg(args, 2));
    let (result, exc) = op(proc.int_register_get_unsigned(rs1), proc.int_register_get_unsigned(rs2));
    proc.int_register_set_unsigned(rd, result);
    outcome_of(exc)
}

fn unsigned_binary_imm(proc: &mut Processor, args: &[Argument; 3], op: fn(u32, u32) -> (u32, Option<ExceptionKind>)) -> Outcome {
    let (rd, rs1) = (int_arg(args, 0), int_arg(args, 1));
    let (result, exc) = op(proc.int_register_get_unsigned(rs1), imm_unsigned(args, 2));
    proc.int_register_set_unsigned(rd, result);
    outcome_of(exc)
}

fn exec_add(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    signed_binary_reg(p, a, |x, y| classify_signed(x as i64 + y as i64))
}
fn exec_addi(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    signed_binary_imm(p, a, |x, y| classify_signed(x as i64 + y as i64))
}
fn exec_sub(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    signed_binary_reg(p, a, |x, y| classify_signed(x as i64 - y as i64))
}
fn exec_subi(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    signed_binary_imm(p, a, |x, y| classify_signed(x as i64 - y as i64))
}
fn exec_mult(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    signed_binary_reg(p, a, |x, y| classify_signed(x as i64 * y as i64))
}
fn exec_multi(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    signed_binary_imm(p, a, |x, y| classify_signed(x as i64 * y as i64))
}
fn exec_addu(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    unsigned_binary_reg(p, a, |x, y| classify_unsigned(x as u64 + y as u64))
}
fn exec_addui(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    unsigned_binary_imm(p, a, |x, y| classify_unsigned(x as u64 + y as u64))
}
fn exec_subu(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    unsigned_binary_reg(p, a, |x, y| {
        let wide = x as i64 - y as i64;
        if wide < 0 { (wide as u32, Some(ExceptionKind::Underflow)) } else { (wide as u32, None) }
    })
}
fn exec_subui(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    unsigned_binary_imm(p, a, |x, y| {
        let wide = x as i64 - y as i64;
        if wide < 0 { (wide as u32, Some(ExceptionKind::Underflow)) } else { (wide as u32, None) }
    })
}
fn exec_multu(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    unsigned_binary_reg(p, a, |x, y| classify_unsigned(x as u64 * y as u64))
}
fn exec_multui(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    unsigned_binary_imm(p, a, |x, y| classify_unsigned(x as u64 * y as u64))
}

fn exec_div(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    let (rd, rs1, rs2) = (int_arg(a, 0), int_arg(a, 1), int_arg(a, 2));
    signed_div(p, rd, p.int_register_get_signed(rs1), p.int_register_get_signed(rs2))
}
fn exec_divi(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    let (rd, rs1) = (int_arg(a, 0), int_arg(a, 1));
    signed_div(p, rd, p.int_register_get_signed(rs1), imm_signed(a, 2))
}
fn signed_div(proc: &mut Processor, rd: u8, dividend: i32, divisor: i32) -> Outcome {
    if divisor == 0 {
        return Outcome::Trapped(ExceptionKind::DivideByZero);
    }
    if dividend == i32::MIN && divisor == -1 {
        proc.int_register_set_signed(rd, i32::MIN);
        return Outcome::Trapped(ExceptionKind::Overflow);
    }
    proc.int_register_set_signed(rd, dividend / divisor);
    Outcome::Continue
}
fn exec_divu(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    let (rd, rs1, rs2) = (int_arg(a, 0), int_arg(a, 1), int_arg(a, 2));
    unsigned_div(p, rd, p.int_register_get_unsigned(rs1), p.int_register_get_unsigned(rs2))
}
fn exec_divui(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    let (rd, rs1) = (int_arg(a, 0), int_arg(a, 1));
    unsigned_div(p, rd, p.int_register_get_unsigned(rs1), imm_unsigned(a, 2))
}
fn unsigned_div(proc: &mut Processor, rd: u8, dividend: u32, divisor: u32) -> Outcome {
    if divisor == 0 {
        return Outcome::Trapped(ExceptionKind::DivideByZero);
    }
    proc.int_register_set_unsigned(rd, dividend / divisor);
    Outcome::Continue
}

fn bitwise_reg(proc: &mut Processor, args: &[Argument; 3], op: fn(u32, u32) -> u32) -> Outcome {
    let (rd, rs1, rs2) = (int_arg(args, 0), int_arg(args, 1), int_arg(args, 2));
    let result = op(proc.int_register_get_unsigned(rs1), proc.int_register_get_unsigned(rs2));
    proc.int_register_set_unsigned(rd, result);
    Outcome::Continue
}
fn bitwise_imm(proc: &mut Processor, args: &[Argument; 3], op: fn(u32, u32) -> u32) -> Outcome {
    let (rd, rs1) = (int_arg(args, 0), int_arg(args, 1));
    let result = op(proc.int_register_get_unsigned(rs1), imm_unsigned(args, 2));
    proc.int_register_set_unsigned(rd, result);
    Outcome::Continue
}
fn exec_and(p: &mut Processor, a: &[Argument; 3]) -> Outcome { bitwise_reg(p, a, |x, y| x & y) }
fn exec_andi(p: &mut Processor, a: &[Argument; 3]) -> Outcome { bitwise_imm(p, a, |x, y| x & y) }
fn exec_or(p: &mut Processor, a: &[Argument; 3]) -> Outcome { bitwise_reg(p, a, |x, y| x | y) }
fn exec_ori(p: &mut Processor, a: &[Argument; 3]) -> Outcome { bitwise_imm(p, a, |x, y| x | y) }
fn exec_xor(p: &mut Processor, a: &[Argument; 3]) -> Outcome { bitwise_reg(p, a, |x, y| x ^ y) }
fn exec_xori(p: &mut Processor, a: &[Argument; 3]) -> Outcome { bitwise_imm(p, a, |x, y| x ^ y) }

fn shift_reg(proc: &mut Processor, args: &[Argument; 3], op: fn(u32, u32) -> u32) -> Outcome {
    let (rd, rs1, rs2) = (int_arg(args, 0), int_arg(args, 1), int_arg(args, 2));
    let count = proc.int_register_get_unsigned(rs2);
    if count > 31 {
        return Outcome::Trapped(ExceptionKind::BadShift);
    }
    proc.int_register_set_unsigned(rd, op(proc.int_register_get_unsigned(rs1), count));
    Outcome::Continue
}
fn shift_imm(proc: &mut Processor, args: &[Argument; 3], op: fn(u32, u32) -> u32) -> Outcome {
    let (rd, rs1) = (int_arg(args, 0), int_arg(args, 1));
    let count = imm_unsigned(args, 2);
    if count > 31 {
        return Outcome::Trapped(ExceptionKind::BadShift);
    }
    proc.int_register_set_unsigned(rd, op(proc.int_register_get_unsigned(rs1), count));
    Outcome::Continue
}
fn shl(v: u32, c: u32) -> u32 { v << c }
fn shr_logical(v: u32, c: u32) -> u32 { v >> c }
fn shr_arithmetic(v: u32, c: u32) -> u32 { ((v as i32) >> c) as u32 }
fn exec_sll(p: &mut Processor, a: &[Argument; 3]) -> Outcome { shift_reg(p, a, shl) }
fn exec_slli(p: &mut Processor, a: &[Argument; 3]) -> Outcome { shift_imm(p, a, shl) }
fn exec_srl(p: &mut Processor, a: &[Argument; 3]) -> Outcome { shift_reg(p, a, shr_logical) }
fn exec_srli(p: &mut Processor, a: &[Argument; 3]) -> Outcome { shift_imm(p, a, shr_logical) }
// Arithmetic shift left is bit-identical to logical shift left in two's complement.
fn exec_sla(p: &mut Processor, a: &[Argument; 3]) -> Outcome { shift_reg(p, a, shl) }
fn exec_slai(p: &mut Processor, a: &[Argument; 3]) -> Outcome { shift_imm(p, a, shl) }
fn exec_sra(p: &mut Processor, a: &[Argument; 3]) -> Outcome { shift_reg(p, a, shr_arithmetic) }
fn exec_srai(p: &mut Processor, a: &[Argument; 3]) -> Outcome { shift_imm(p, a, shr_arithmetic) }

fn cmp_reg(proc: &mut Processor, args: &[Argument; 3], cmp: fn(i32, i32) -> bool) -> Outcome {
    let (rd, rs1, rs2) = (int_arg(args, 0), int_arg(args, 1), int_arg(args, 2));
    let value = cmp(proc.int_register_get_signed(rs1), proc.int_register_get_signed(rs2));
    proc.int_register_set_unsigned(rd, value as u32);
    Outcome::Continue
}
fn cmp_imm(proc: &mut Processor, args: &[Argument; 3], cmp: fn(i32, i32) -> bool) -> Outcome {
    let (rd, rs1) = (int_arg(args, 0), int_arg(args, 1));
    let value = cmp(proc.int_register_get_signed(rs1), imm_signed(args, 2));
    proc.int_register_set_unsigned(rd, value as u32);
    Outcome::Continue
}
fn cmp_reg_u(proc: &mut Processor, args: &[Argument; 3], cmp: fn(u32, u32) -> bool) -> Outcome {
    let (rd, rs1, rs2) = (int_arg(args, 0), int_arg(args, 1), int_arg(args, 2));
    let value = cmp(proc.int_register_get_unsigned(rs1), proc.int_register_get_unsigned(rs2));
    proc.int_register_set_unsigned(rd, value as u32);
    Outcome::Continue
}
fn cmp_imm_u(proc: &mut Processor, args: &[Argument; 3], cmp: fn(u32, u32) -> bool) -> Outcome {
    let (rd, rs1) = (int_arg(args, 0), int_arg(args, 1));
    let value = cmp(proc.int_register_get_unsigned(rs1), imm_unsigned(args, 2));
    proc.int_register_set_unsigned(rd, value as u32);
    Outcome::Continue
}
fn exec_slt(p: &mut Processor, a: &[Argument; 3]) -> Outcome { cmp_reg(p, a, |x, y| x < y) }
fn exec_slti(p: &mut Processor, a: &[Argument; 3]) -> Outcome { cmp_imm(p, a, |x, y| x < y) }
fn exec_sgt(p: &mut Processor, a: &[Argument; 3]) -> Outcome { cmp_reg(p, a, |x, y| x > y) }
fn exec_sgti(p: &mut Processor, a: &[Argument; 3]) -> Outcome { cmp_imm(p, a, |x, y| x > y) }
fn exec_sle(p: &mut Processor, a: &[Argument; 3]) -> Outcome { cmp_reg(p, a, |x, y| x <= y) }
fn exec_slei(p: &mut Processor, a: &[Argument; 3]) -> Outcome { cmp_imm(p, a, |x, y| x <= y) }
fn exec_sge(p: &mut Processor, a: &[Argument; 3]) -> Outcome { cmp_reg(p, a, |x, y| x >= y) }
fn exec_sgei(p: &mut Processor, a: &[Argument; 3]) -> Outcome { cmp_imm(p, a, |x, y| x >= y) }
fn exec_seq(p: &mut Processor, a: &[Argument; 3]) -> Outcome { cmp_reg(p, a, |x, y| x == y) }
fn exec_seqi(p: &mut Processor, a: &[Argument; 3]) -> Outcome { cmp_imm(p, a, |x, y| x == y) }
fn exec_sne(p: &mut Processor, a: &[Argument; 3]) -> Outcome { cmp_reg(p, a, |x, y| x != y) }
fn exec_snei(p: &mut Processor, a: &[Argument; 3]) -> Outcome { cmp_imm(p, a, |x, y| x != y) }
fn exec_sltu(p: &mut Processor, a: &[Argument; 3]) -> Outcome { cmp_reg_u(p, a, |x, y| x < y) }
fn exec_sltui(p: &mut Processor, a: &[Argument; 3]) -> Outcome { cmp_imm_u(p, a, |x, y| x < y) }
fn exec_sgtu(p: &mut Processor, a: &[Argument; 3]) -> Outcome { cmp_reg_u(p, a, |x, y| x > y) }
fn exec_sgtui(p: &mut Processor, a: &[Argument; 3]) -> Outcome { cmp_imm_u(p, a, |x, y| x > y) }
fn exec_sleu(p: &mut Processor, a: &[Argument; 3]) -> Outcome { cmp_reg_u(p, a, |x, y| x <= y) }
fn exec_sleui(p: &mut Processor, a: &[Argument; 3]) -> Outcome { cmp_imm_u(p, a, |x, y| x <= y) }
fn exec_sgeu(p: &mut Processor, a: &[Argument; 3]) -> Outcome { cmp_reg_u(p, a, |x, y| x >= y) }
fn exec_sgeui(p: &mut Processor, a: &[Argument; 3]) -> Outcome { cmp_imm_u(p, a, |x, y| x >= y) }
fn exec_sequ(p: &mut Processor, a: &[Argument; 3]) -> Outcome { cmp_reg_u(p, a, |x, y| x == y) }
fn exec_sequi(p: &mut Processor, a: &[Argument; 3]) -> Outcome { cmp_imm_u(p, a, |x, y| x == y) }
fn exec_sneu(p: &mut Processor, a: &[Argument; 3]) -> Outcome { cmp_reg_u(p, a, |x, y| x != y) }
fn exec_sneui(p: &mut Processor, a: &[Argument; 3]) -> Outcome { cmp_imm_u(p, a, |x, y| x != y) }

fn exec_lb(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    let rd = int_arg(a, 0);
    let addr = effective_address(p, a, 1);
    match p.get_memory().read_byte(addr) {
        Ok(byte) => { p.int_register_set_signed(rd, (byte as i8) as i32); Outcome::Continue }
        Err(()) => Outcome::Trapped(ExceptionKind::AddressOutOfBounds),
    }
}
fn exec_lbu(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    let rd = int_arg(a, 0);
    let addr = effective_address(p, a, 1);
    match p.get_memory().read_byte(addr) {
        Ok(byte) => { p.int_register_set_unsigned(rd, byte as u32); Outcome::Continue }
        Err(()) => Outcome::Trapped(ExceptionKind::AddressOutOfBounds),
    }
}
fn exec_lh(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    let rd = int_arg(a, 0);
    let addr = effective_address(p, a, 1);
    match p.get_memory().read_half(addr) {
        Ok(half) => { p.int_register_set_signed(rd, (half as i16) as i32); Outcome::Continue }
        Err(()) => Outcome::Trapped(ExceptionKind::AddressOutOfBounds),
    }
}
fn exec_lhu(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    let rd = int_arg(a, 0);
    let addr = effective_address(p, a, 1);
    match p.get_memory().read_half(addr) {
        Ok(half) => { p.int_register_set_unsigned(rd, half as u32); Outcome::Continue }
        Err(()) => Outcome::Trapped(ExceptionKind::AddressOutOfBounds),
    }
}
fn exec_lw(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    let rd = int_arg(a, 0);
    let addr = effective_address(p, a, 1);
    match p.get_memory().read_word(addr) {
        Ok(word) => { p.int_register_set_unsigned(rd, word); Outcome::Continue }
        Err(()) => Outcome::Trapped(ExceptionKind::AddressOutOfBounds),
    }
}
fn exec_sb(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    let addr = effective_address(p, a, 0);
    let value = p.int_register_get_unsigned(int_arg(a, 1)) as u8;
    match p.memory_mut().write_byte(addr, value) {
        Ok(()) => Outcome::Continue,
        Err(()) => Outcome::Trapped(ExceptionKind::AddressOutOfBounds),
    }
}
fn exec_sh(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    let addr = effective_address(p, a, 0);
    let value = p.int_register_get_unsigned(int_arg(a, 1)) as u16;
    match p.memory_mut().write_half(addr, value) {
        Ok(()) => Outcome::Continue,
        Err(()) => Outcome::Trapped(ExceptionKind::AddressOutOfBounds),
    }
}
fn exec_sw(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    let addr = effective_address(p, a, 0);
    let value = p.int_register_get_unsigned(int_arg(a, 1));
    match p.memory_mut().write_word(addr, value) {
        Ok(()) => Outcome::Continue,
        Err(()) => Outcome::Trapped(ExceptionKind::AddressOutOfBounds),
    }
}
fn exec_lf(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    let fd = float_arg(a, 0);
    let addr = effective_address(p, a, 1);
    match p.get_memory().read_float(addr) {
        Ok(value) => { p.float_register_set_float(fd, value); Outcome::Continue }
        Err(()) => Outcome::Trapped(ExceptionKind::AddressOutOfBounds),
    }
}
fn exec_sf(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    let addr = effective_address(p, a, 0);
    let value = p.float_register_get_float(float_arg(a, 1));
    match p.memory_mut().write_float(addr, value) {
        Ok(()) => Outcome::Continue,
        Err(()) => Outcome::Trapped(ExceptionKind::AddressOutOfBounds),
    }
}
fn exec_ld(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    let fd = float_arg(a, 0);
    let addr = effective_address(p, a, 1);
    match p.get_memory().read_double(addr) {
        Ok(value) => match p.float_register_set_double(fd, value) {
            Ok(()) => Outcome::Continue,
            Err(_) => Outcome::Trapped(ExceptionKind::MisalignedRegisterAccess),
        },
        Err(()) => Outcome::Trapped(ExceptionKind::AddressOutOfBounds),
    }
}
fn exec_sd(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    let addr = effective_address(p, a, 0);
    let value = match p.float_register_get_double(float_arg(a, 1)) {
        Ok(v) => v,
        Err(_) => return Outcome::Trapped(ExceptionKind::MisalignedRegisterAccess),
    };
    match p.memory_mut().write_double(addr, value) {
        Ok(()) => Outcome::Continue,
        Err(()) => Outcome::Trapped(ExceptionKind::AddressOutOfBounds),
    }
}

fn float_binary(proc: &mut Processor, args: &[Argument; 3], op: fn(f32, f32) -> f32) -> Outcome {
    let (fd, fs1, fs2) = (float_arg(args, 0), float_arg(args, 1), float_arg(args, 2));
    let result = op(proc.float_register_get_float(fs1), proc.float_register_get_float(fs2));
    proc.float_register_set_float(fd, result);
    Outcome::Continue
}
fn exec_addf(p: &mut Processor, a: &[Argument; 3]) -> Outcome { float_binary(p, a, |x, y| x + y) }
fn exec_subf(p: &mut Processor, a: &[Argument; 3]) -> Outcome { float_binary(p, a, |x, y| x - y) }
fn exec_multf(p: &mut Processor, a: &[Argument; 3]) -> Outcome { float_binary(p, a, |x, y| x * y) }
fn exec_divf(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    let (fd, fs1, fs2) = (float_arg(a, 0), float_arg(a, 1), float_arg(a, 2));
    let divisor = p.float_register_get_float(fs2);
    if divisor == 0.0 {
        return Outcome::Trapped(ExceptionKind::DivideByZero);
    }
    p.float_register_set_float(fd, p.float_register_get_float(fs1) / divisor);
    Outcome::Continue
}

fn double_operand(proc: &Processor, args: &[Argument; 3], slot: usize) -> Result<f64, Outcome> {
    proc.float_register_get_double(float_arg(args, slot))
        .map_err(|_| Outcome::Trapped(ExceptionKind::MisalignedRegisterAccess))
}
fn store_double(proc: &mut Processor, fd: u8, value: f64) -> Outcome {
    match proc.float_register_set_double(fd, value) {
        Ok(()) => Outcome::Continue,
        Err(_) => Outcome::Trapped(ExceptionKind::MisalignedRegisterAccess),
    }
}
fn double_binary(proc: &mut Processor, args: &[Argument; 3], op: fn(f64, f64) -> f64) -> Outcome {
    let fd = float_arg(args, 0);
    let a = match double_operand(proc, args, 1) { Ok(v) => v, Err(e) => return e };
    let b = match double_operand(proc, args, 2) { Ok(v) => v, Err(e) => return e };
    store_double(proc, fd, op(a, b))
}
fn exec_addd(p: &mut Processor, a: &[Argument; 3]) -> Outcome { double_binary(p, a, |x, y| x + y) }
fn exec_subd(p: &mut Processor, a: &[Argument; 3]) -> Outcome { double_binary(p, a, |x, y| x - y) }
fn exec_multd(p: &mut Processor, a: &[Argument; 3]) -> Outcome { double_binary(p, a, |x, y| x * y) }
fn exec_divd(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    let fd = float_arg(a, 0);
    let x = match double_operand(p, a, 1) { Ok(v) => v, Err(e) => return e };
    let y = match double_operand(p, a, 2) { Ok(v) => v, Err(e) => return e };
    if y == 0.0 {
        return Outcome::Trapped(ExceptionKind::DivideByZero);
    }
    store_double(p, fd, x / y)
}

fn float_cmp(proc: &mut Processor, args: &[Argument; 3], cmp: fn(f32, f32) -> bool) -> Outcome {
    let (fs1, fs2) = (float_arg(args, 0), float_arg(args, 1));
    let value = cmp(proc.float_register_get_float(fs1), proc.float_register_get_float(fs2));
    proc.set_fpsr(value);
    Outcome::Continue
}
fn exec_ltf(p: &mut Processor, a: &[Argument; 3]) -> Outcome { float_cmp(p, a, |x, y| x < y) }
fn exec_gtf(p: &mut Processor, a: &[Argument; 3]) -> Outcome { float_cmp(p, a, |x, y| x > y) }
fn exec_lef(p: &mut Processor, a: &[Argument; 3]) -> Outcome { float_cmp(p, a, |x, y| x <= y) }
fn exec_gef(p: &mut Processor, a: &[Argument; 3]) -> Outcome { float_cmp(p, a, |x, y| x >= y) }
fn exec_eqf(p: &mut Processor, a: &[Argument; 3]) -> Outcome { float_cmp(p, a, |x, y| x == y) }
fn exec_nef(p: &mut Processor, a: &[Argument; 3]) -> Outcome { float_cmp(p, a, |x, y| x != y) }

fn double_cmp(proc: &mut Processor, args: &[Argument; 3], cmp: fn(f64, f64) -> bool) -> Outcome {
    let x = match double_operand(proc, args, 0) { Ok(v) => v, Err(e) => return e };
    let y = match double_operand(proc, args, 1) { Ok(v) => v, Err(e) => return e };
    proc.set_fpsr(cmp(x, y));
    Outcome::Continue
}
fn exec_ltd(p: &mut Processor, a: &[Argument; 3]) -> Outcome { double_cmp(p, a, |x, y| x < y) }
fn exec_gtd(p: &mut Processor, a: &[Argument; 3]) -> Outcome { double_cmp(p, a, |x, y| x > y) }
fn exec_led(p: &mut Processor, a: &[Argument; 3]) -> Outcome { double_cmp(p, a, |x, y| x <= y) }
fn exec_ged(p: &mut Processor, a: &[Argument; 3]) -> Outcome { double_cmp(p, a, |x, y| x >= y) }
fn exec_eqd(p: &mut Processor, a: &[Argument; 3]) -> Outcome { double_cmp(p, a, |x, y| x == y) }
fn exec_ned(p: &mut Processor, a: &[Argument; 3]) -> Outcome { double_cmp(p, a, |x, y| x != y) }

fn exec_movi2s(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    let value = p.int_register_get_signed(int_arg(a, 0));
    p.set_fpsr(value != 0);
    Outcome::Continue
}
fn exec_movs2i(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    let rd = int_arg(a, 0);
    p.int_register_set_unsigned(rd, p.get_fpsr() as u32);
    Outcome::Continue
}
fn exec_movf(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    let (fd, fs) = (float_arg(a, 0), float_arg(a, 1));
    let value = p.float_register_get_float(fs);
    p.float_register_set_float(fd, value);
    Outcome::Continue
}
fn exec_movd(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    let fd = float_arg(a, 0);
    let value = match double_operand(p, a, 1) { Ok(v) => v, Err(e) => return e };
    store_double(p, fd, value)
}
fn exec_movfp2i(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    let rd = int_arg(a, 0);
    let bits = p.float_register_get_int_bits(float_arg(a, 1));
    p.int_register_set_unsigned(rd, bits);
    Outcome::Continue
}
fn exec_movi2fp(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    let fd = float_arg(a, 0);
    let bits = p.int_register_get_unsigned(int_arg(a, 1));
    p.float_register_set_int_bits(fd, bits);
    Outcome::Continue
}
/// Reinterprets the int register's 32 bits as the low half of a double, with
/// the high half cleared. Distinct from `CVTI2D`, which converts the int
/// register's numeric value.
fn exec_movi2df(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    let fd = float_arg(a, 0);
    let low = p.int_register_get_unsigned(int_arg(a, 1));
    store_double(p, fd, f64::from_bits(low as u64))
}
fn exec_cvtf2d(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    let fd = float_arg(a, 0);
    let value = p.float_register_get_float(float_arg(a, 1)) as f64;
    store_double(p, fd, value)
}
fn exec_cvtf2i(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    let rd = int_arg(a, 0);
    let value = p.float_register_get_float(float_arg(a, 1)) as i32;
    p.int_register_set_signed(rd, value);
    Outcome::Continue
}
fn exec_cvtd2f(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    let fd = float_arg(a, 0);
    let value = match double_operand(p, a, 1) { Ok(v) => v, Err(e) => return e };
    p.float_register_set_float(fd, value as f32);
    Outcome::Continue
}
fn exec_cvtd2i(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    let rd = int_arg(a, 0);
    let value = match double_operand(p, a, 1) { Ok(v) => v, Err(e) => return e };
    p.int_register_set_signed(rd, value as i32);
    Outcome::Continue
}
fn exec_cvti2f(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    let fd = float_arg(a, 0);
    let value = p.int_register_get_signed(int_arg(a, 1)) as f32;
    p.float_register_set_float(fd, value);
    Outcome::Continue
}
fn exec_cvti2d(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    let fd = float_arg(a, 0);
    let value = p.int_register_get_signed(int_arg(a, 1)) as f64;
    store_double(p, fd, value)
}

fn resolve_jump(proc: &Processor, args: &[Argument; 3], slot: usize) -> Outcome {
    let name = args[slot].as_label().expect("argument slot type mismatch");
    match proc.resolve_label(name) {
        Some(index) => Outcome::Jumped(index),
        None => Outcome::Trapped(ExceptionKind::UnknownLabel),
    }
}
fn exec_beqz(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    if p.int_register_get_signed(int_arg(a, 0)) == 0 { resolve_jump(p, a, 1) } else { Outcome::Continue }
}
fn exec_bnez(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    if p.int_register_get_signed(int_arg(a, 0)) != 0 { resolve_jump(p, a, 1) } else { Outcome::Continue }
}
fn exec_bfpt(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    if p.get_fpsr() { resolve_jump(p, a, 0) } else { Outcome::Continue }
}
fn exec_bfpf(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    if !p.get_fpsr() { resolve_jump(p, a, 0) } else { Outcome::Continue }
}
fn exec_j(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    resolve_jump(p, a, 0)
}
fn exec_jal(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    match resolve_jump(p, a, 0) {
        Outcome::Jumped(index) => {
            p.int_register_set_unsigned(RETURN_ADDRESS_REGISTER, (p.pc() + 1) as u32);
            Outcome::Jumped(index)
        }
        other => other,
    }
}
fn jump_to_register(proc: &Processor, rs: u8) -> Outcome {
    let target = proc.int_register_get_signed(rs);
    if target < 0 || target as usize >= proc.program_len() {
        Outcome::Trapped(ExceptionKind::AddressOutOfBounds)
    } else {
        Outcome::Jumped(target as usize)
    }
}
fn exec_jr(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    jump_to_register(p, int_arg(a, 0))
}
fn exec_jalr(p: &mut Processor, a: &[Argument; 3]) -> Outcome {
    match jump_to_register(p, int_arg(a, 0)) {
        Outcome::Jumped(index) => {
            p.int_register_set_unsigned(RETURN_ADDRESS_REGISTER, (p.pc() + 1) as u32);
            Outcome::Jumped(index)
        }
        other => other,
    }
}

fn exec_trap(_p: &mut Processor, _a: &[Argument; 3]) -> Outcome { Outcome::Halted }
fn exec_halt(_p: &mut Processor, _a: &[Argument; 3]) -> Outcome { Outcome::Halted }
fn exec_nop(_p: &mut Processor, _a: &[Argument; 3]) -> Outcome { Outcome::Halted }
fn exec_none(_p: &mut Processor, _a: &[Argument; 3]) -> Outcome { Outcome::Halted }

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn table_has_a_row_per_opcode_at_its_numeric_index() {
        let table = generate_instruction_table();
        let info = look_up_instruction_info(&table, Opcode::ADD);
        assert_eq!(info.mnemonic(), "ADD");
        assert_eq!(info.required_argument_count(), 3);
    }

    #[test]
    fn classify_signed_detects_overflow_and_underflow() {
        assert_eq!(classify_signed(i32::MAX as i64 + 1), (i32::MIN, Some(ExceptionKind::Overflow)));
        assert_eq!(classify_signed(i32::MIN as i64 - 1), (i32::MAX, Some(ExceptionKind::Underflow)));
        assert_eq!(classify_signed(5), (5, None));
    }
}
