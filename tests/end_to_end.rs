//! Assembles real source text with `dlx-asm` and runs it on a `dlx::Processor`,
//! exercising the pipeline end to end rather than hand-building `ParsedProgram`s.

use dlx::{ExceptionKind, Processor};

fn run(source: &str, memory_size: u32) -> Processor {
    let program = dlx_asm::parse(source);
    assert!(program.is_valid(), "unexpected diagnostics: {:?}", program.diagnostics());
    let mut processor = Processor::new(memory_size);
    processor.load_program(&program);
    processor.execute_current_program();
    processor
}

#[test]
fn counting_loop_sums_into_a_register() {
    let source = "\
        ADDI R1, R0, #0\n\
        ADDI R2, R0, #5\n\
    loop:\n\
        ADD R1, R1, R2\n\
        SUBI R2, R2, #1\n\
        BNEZ R2, loop\n\
        HALT\n\
    ";
    let processor = run(source, 256);
    assert!(processor.is_halted());
    assert_eq!(processor.get_last_raised_exception(), ExceptionKind::None);
    assert_eq!(processor.int_register_get_signed(1), 5 + 4 + 3 + 2 + 1);
}

#[test]
fn signed_multiply_overflow_traps() {
    let source = "\
        ADDI R1, R0, #1\n\
        SLLI R1, R1, #16\n\
        MULT R2, R1, R1\n\
    ";
    let processor = run(source, 64);
    assert!(processor.is_halted());
    assert_eq!(processor.get_last_raised_exception(), ExceptionKind::Overflow);
}

#[test]
fn divide_by_zero_traps() {
    let source = "\
        ADDI R1, R0, #10\n\
        ADDI R2, R0, #0\n\
        DIV R3, R1, R2\n\
    ";
    let processor = run(source, 64);
    assert!(processor.is_halted());
    assert_eq!(processor.get_last_raised_exception(), ExceptionKind::DivideByZero);
}

#[test]
fn load_store_round_trips_through_memory() {
    let source = "\
        ADDI R1, R0, #1234\n\
        SW 0(R0), R1\n\
        LW R2, 0(R0)\n\
        HALT\n\
    ";
    let processor = run(source, 64);
    assert!(processor.is_halted());
    assert_eq!(processor.get_last_raised_exception(), ExceptionKind::None);
    assert_eq!(processor.int_register_get_signed(2), 1234);
}

#[test]
fn misaligned_double_register_traps() {
    let source = "\
        ADDI R1, R0, #0\n\
        MOVI2DF F1, R1\n\
        ADDD F2, F1, F1\n\
    ";
    let processor = run(source, 64);
    assert!(processor.is_halted());
    assert_eq!(processor.get_last_raised_exception(), ExceptionKind::MisalignedRegisterAccess);
}

#[test]
fn unknown_label_traps() {
    let source = "J nowhere\n";
    let processor = run(source, 64);
    assert!(processor.is_halted());
    assert_eq!(processor.get_last_raised_exception(), ExceptionKind::UnknownLabel);
}

#[test]
fn source_with_errors_never_reaches_the_processor() {
    let program = dlx_asm::parse("This has errors\n");
    assert!(!program.is_valid());
    assert!(!program.diagnostics().is_empty());
}

#[test]
fn dumps_reflect_executed_state() {
    let processor = run("ADDI R1, R0, #7\nHALT\n", 64);
    assert!(processor.register_dump().contains("R1"));
    assert!(processor.processor_dump().to_lowercase().contains("halt"));
}
