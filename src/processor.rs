//! The processor: register file, memory block, program counter, and the
//! step/run loop that drives the instruction table's executors.

use crate::exception::ExceptionKind;
use crate::instruction::{generate_instruction_table, look_up_instruction_info, InstructionInfo, Outcome};
use crate::memory::{MemoryBlock, Storage};
use crate::program::ParsedProgram;
use crate::register::{FloatRegisterFile, Fpsr, IntRegisterFile, MisalignedDoubleRegister};

/// Owns every piece of machine state a DLX program can observe or mutate.
///
/// Per the memory ownership model, a `Processor` owns its registers, memory
/// block, and parsed program by value; there is no state shared between
/// processor instances, and no global mutable state — the instruction table
/// is built fresh for each processor rather than published behind a static.
pub struct Processor {
    int_registers: IntRegisterFile,
    float_registers: FloatRegisterFile,
    fpsr: Fpsr,
    memory: MemoryBlock,
    program: ParsedProgram,
    table: Vec<InstructionInfo>,
    pc: usize,
    halted: bool,
    last_exception: ExceptionKind,
    step_budget: u64,
    steps_taken: u64,
}

impl Processor {
    /// Builds a processor with `memory_size` bytes of memory starting at
    /// address 0.
    pub fn new(memory_size: u32) -> Self {
        Self::with_starting_address(0, memory_size)
    }

    /// Builds a processor whose memory block starts at `starting_address`
    /// and spans `memory_size` bytes.
    pub fn with_starting_address(starting_address: u32, memory_size: u32) -> Self {
        Self {
            int_registers: IntRegisterFile::new(),
            float_registers: FloatRegisterFile::new(),
            fpsr: Fpsr::default(),
            memory: MemoryBlock::with_starting_address(starting_address, memory_size),
            program: ParsedProgram::new(),
            table: generate_instruction_table(),
            pc: 0,
            halted: false,
            last_exception: ExceptionKind::None,
            step_budget: crate::constants::UNLIMITED_STEPS,
            steps_taken: 0,
        }
    }

    /// Loads `program`, resetting PC, halted flag, last exception and step
    /// counter. Returns `false` if `program` carries parse diagnostics; it
    /// is still loaded, and subsequent `execute_step` calls are no-ops.
    pub fn load_program(&mut self, program: &ParsedProgram) -> bool {
        self.program = program.clone();
        self.pc = 0;
        self.halted = false;
        self.last_exception = ExceptionKind::None;
        self.steps_taken = 0;
        program.is_valid()
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn get_last_raised_exception(&self) -> ExceptionKind {
        self.last_exception
    }

    pub fn set_max_number_of_steps(&mut self, steps: u64) {
        self.step_budget = steps;
    }

    pub fn steps_taken(&self) -> u64 {
        self.steps_taken
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub(crate) fn program_len(&self) -> usize {
        self.program.instructions().len()
    }

    pub(crate) fn resolve_label(&self, name: &str) -> Option<usize> {
        self.program.resolve_label(name)
    }

    pub fn int_register_get_signed(&self, id: u8) -> i32 {
        self.int_registers.get_signed(id)
    }

    pub fn int_register_get_unsigned(&self, id: u8) -> u32 {
        self.int_registers.get_unsigned(id)
    }

    pub fn int_register_set_signed(&mut self, id: u8, value: i32) {
        self.int_registers.set_signed(id, value);
    }

    pub fn int_register_set_unsigned(&mut self, id: u8, value: u32) {
        self.int_registers.set_unsigned(id, value);
    }

    pub fn float_register_get_float(&self, id: u8) -> f32 {
        self.float_registers.get_float(id)
    }

    pub fn float_register_set_float(&mut self, id: u8, value: f32) {
        self.float_registers.set_float(id, value);
    }

    pub fn float_register_get_double(&self, id: u8) -> Result<f64, MisalignedDoubleRegister> {
        self.float_registers.get_double(id)
    }

    pub fn float_register_set_double(&mut self, id: u8, value: f64) -> Result<(), MisalignedDoubleRegister> {
        self.float_registers.set_double(id, value)
    }

    pub(crate) fn float_register_get_int_bits(&self, id: u8) -> u32 {
        self.float_registers.get_int_bits(id)
    }

    pub(crate) fn float_register_set_int_bits(&mut self, id: u8, value: u32) {
        self.float_registers.set_int_bits(id, value);
    }

    pub fn get_fpsr(&self) -> bool {
        self.fpsr.get()
    }

    pub fn set_fpsr(&mut self, value: bool) {
        self.fpsr.set(value);
    }

    pub fn get_memory(&self) -> &dyn Storage {
        &self.memory
    }

    pub(crate) fn memory_mut(&mut self) -> &mut dyn Storage {
        &mut self.memory
    }

    pub fn clear_memory(&mut self) {
        self.memory.clear();
    }

    pub fn clear_registers(&mut self) {
        self.int_registers.clear();
        self.float_registers.clear();
        self.fpsr = Fpsr::default();
    }

    /// Executes at most one instruction, applying its `Outcome` to `pc`,
    /// `halted` and `last_exception`. A no-op once `halted` is set or `pc`
    /// runs off the end of the program.
    pub fn execute_step(&mut self) {
        if self.halted {
            return;
        }
        if self.pc >= self.program.instructions().len() {
            self.halted = true;
            return;
        }

        let instruction = self.program.instructions()[self.pc].clone();
        let info = *look_up_instruction_info(&self.table, instruction.opcode);
        let outcome = info.execute(self, &instruction.arguments);

        self.steps_taken += 1;

        match outcome {
            Outcome::Continue => self.pc += 1,
            Outcome::Jumped(target) => self.pc = target,
            Outcome::Halted => self.halted = true,
            Outcome::Trapped(exception) => {
                self.last_exception = exception;
                self.halted = true;
            }
        }

        if self.step_budget != crate::constants::UNLIMITED_STEPS && self.steps_taken >= self.step_budget {
            self.halted = true;
        }
    }

    pub fn execute_current_program(&mut self) {
        while !self.halted {
            self.execute_step();
        }
    }

    pub fn register_dump(&self) -> String {
        let mut out = String::from("Integer registers:\n");
        for id in 0..32u8 {
            out.push_str(&format!(
                "  R{id:<2} = {:#010x} ({})\n",
                self.int_registers.get_unsigned(id),
                self.int_registers.get_signed(id)
            ));
        }
        out.push_str("Float registers:\n");
        for id in 0..32u8 {
            out.push_str(&format!("  F{id:<2} = {}\n", self.float_registers.get_float(id)));
        }
        out.push_str(&format!("FPSR = {}\n", self.fpsr.get()));
        out
    }

    pub fn memory_dump(&self) -> String {
        let data = self.memory.data();
        if data.is_empty() {
            return "Memory block is empty.\n".to_string();
        }
        let mut out = format!("Memory block ({} bytes):\n", data.len());
        for (row_index, row) in data.chunks(16).enumerate() {
            out.push_str(&format!("  {:08x}: ", row_index * 16));
            for byte in row {
                out.push_str(&format!("{byte:02x} "));
            }
            out.push('\n');
        }
        out
    }

    pub fn processor_dump(&self) -> String {
        format!(
            "pc = {}\nhalted = {}\nlast_exception = {:?}\nsteps_taken = {}\nstep_budget = {}\n",
            self.pc, self.halted, self.last_exception, self.steps_taken, self.step_budget
        )
    }

    pub fn current_program_dump(&self) -> String {
        if self.program.instructions().is_empty() {
            return "Program is empty.\n".to_string();
        }
        let mut out = String::new();
        for (index, instruction) in self.program.instructions().iter().enumerate() {
            let info = look_up_instruction_info(&self.table, instruction.opcode);
            let marker = if index == self.pc { "->" } else { "  " };
            out.push_str(&format!(
                "{marker} {index:4} {} {} {} {}\n",
                info.mnemonic(), instruction.arguments[0], instruction.arguments[1], instruction.arguments[2]
            ));
        }
        out
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::argument::Argument;
    use crate::opcode::Opcode;
    use crate::program::ParsedInstruction;

    fn single_instruction_program(opcode: Opcode, arguments: [Argument; 3]) -> ParsedProgram {
        let mut program = ParsedProgram::new();
        program.push_instruction(ParsedInstruction::new(opcode, arguments, 1, 1));
        program
    }

    #[test]
    fn dumps_are_nonempty_even_for_an_empty_program() {
        let proc = Processor::new(64);
        assert!(!proc.register_dump().is_empty());
        assert!(!proc.memory_dump().is_empty());
        assert!(!proc.processor_dump().is_empty());
        assert!(!proc.current_program_dump().is_empty());
    }

    #[test]
    fn signed_overflow_commits_wrapped_value_and_traps() {
        let mut proc = Processor::new(64);
        proc.int_register_set_signed(2, i32::MAX);
        proc.int_register_set_signed(3, 1);
        let program = single_instruction_program(
            Opcode::ADD,
            [Argument::IntRegister(1), Argument::IntRegister(2), Argument::IntRegister(3)],
        );
        proc.load_program(&program);
        proc.execute_current_program();
        assert_eq!(proc.int_register_get_signed(1), i32::MIN);
        assert_eq!(proc.get_last_raised_exception(), ExceptionKind::Overflow);
        assert!(proc.is_halted());
    }

    #[test]
    fn divide_by_zero_traps_without_modifying_pc_forward() {
        let mut proc = Processor::new(64);
        proc.int_register_set_signed(2, 6);
        let program = single_instruction_program(
            Opcode::DIVI,
            [Argument::IntRegister(1), Argument::IntRegister(2), Argument::ImmediateInteger(0)],
        );
        proc.load_program(&program);
        proc.execute_current_program();
        assert_eq!(proc.get_last_raised_exception(), ExceptionKind::DivideByZero);
        assert!(proc.is_halted());
    }

    #[test]
    fn load_store_round_trip() {
        let mut proc = Processor::new(2048);
        proc.int_register_set_signed(1, 21);
        let mut program = ParsedProgram::new();
        program.push_instruction(ParsedInstruction::new(
            Opcode::SW,
            [Argument::AddressDisplacement { base: 0, displacement: 1000 }, Argument::IntRegister(1), Argument::None],
            1,
            1,
        ));
        program.push_instruction(ParsedInstruction::new(
            Opcode::LW,
            [Argument::IntRegister(2), Argument::AddressDisplacement { base: 0, displacement: 1000 }, Argument::None],
            2,
            1,
        ));
        proc.load_program(&program);
        proc.execute_current_program();
        assert_eq!(proc.int_register_get_signed(2), 21);
        assert_eq!(proc.get_last_raised_exception(), ExceptionKind::None);
    }

    #[test]
    fn memory_below_starting_address_is_out_of_bounds() {
        let mut proc = Processor::with_starting_address(1000, 128);
        let program = single_instruction_program(
            Opcode::LW,
            [Argument::IntRegister(1), Argument::AddressDisplacement { base: 0, displacement: 0 }, Argument::None],
        );
        proc.load_program(&program);
        proc.execute_current_program();
        assert_eq!(proc.get_last_raised_exception(), ExceptionKind::AddressOutOfBounds);
        assert!(proc.is_halted());
    }

    #[test]
    fn load_store_round_trip_with_nonzero_starting_address() {
        let mut proc = Processor::with_starting_address(1000, 128);
        proc.int_register_set_signed(1, 21);
        let mut program = ParsedProgram::new();
        program.push_instruction(ParsedInstruction::new(
            Opcode::SW,
            [Argument::AddressDisplacement { base: 0, displacement: 1000 }, Argument::IntRegister(1), Argument::None],
            1,
            1,
        ));
        program.push_instruction(ParsedInstruction::new(
            Opcode::LW,
            [Argument::IntRegister(2), Argument::AddressDisplacement { base: 0, displacement: 1000 }, Argument::None],
            2,
            1,
        ));
        proc.load_program(&program);
        proc.execute_current_program();
        assert_eq!(proc.int_register_get_signed(2), 21);
        assert_eq!(proc.get_last_raised_exception(), ExceptionKind::None);
    }

    #[test]
    fn misaligned_double_register_halts_without_other_side_effects() {
        let mut proc = Processor::new(64);
        let program = single_instruction_program(
            Opcode::ADDD,
            [Argument::FloatRegister(1), Argument::FloatRegister(0), Argument::FloatRegister(0)],
        );
        proc.load_program(&program);
        proc.execute_current_program();
        assert_eq!(proc.get_last_raised_exception(), ExceptionKind::MisalignedRegisterAccess);
        assert!(proc.is_halted());
    }

    #[test]
    fn unknown_label_traps_at_execution_not_load() {
        let mut proc = Processor::new(64);
        let program = single_instruction_program(
            Opcode::J,
            [Argument::Label("missing".to_string()), Argument::None, Argument::None],
        );
        assert!(proc.load_program(&program));
        proc.execute_current_program();
        assert_eq!(proc.get_last_raised_exception(), ExceptionKind::UnknownLabel);
    }

    #[test]
    fn counting_loop_reaches_expected_register_value() {
        let mut program = ParsedProgram::new();
        let slt = program.push_instruction(ParsedInstruction::new(
            Opcode::SLT,
            [Argument::IntRegister(2), Argument::IntRegister(1), Argument::IntRegister(3)],
            1,
            1,
        ));
        program.define_label("loop".to_string(), slt);
        program.push_instruction(ParsedInstruction::new(
            Opcode::BEQZ,
            [Argument::IntRegister(2), Argument::Label("end".to_string()), Argument::None],
            2,
            1,
        ));
        program.push_instruction(ParsedInstruction::new(
            Opcode::ADDI,
            [Argument::IntRegister(1), Argument::IntRegister(1), Argument::ImmediateInteger(1)],
            3,
            1,
        ));
        program.push_instruction(ParsedInstruction::new(
            Opcode::J,
            [Argument::Label("loop".to_string()), Argument::None, Argument::None],
            4,
            1,
        ));
        let halt = program.push_instruction(ParsedInstruction::new(
            Opcode::HALT,
            [Argument::None, Argument::None, Argument::None],
            5,
            1,
        ));
        program.define_label("end".to_string(), halt);

        let mut proc = Processor::new(64);
        proc.int_register_set_signed(1, 0);
        proc.int_register_set_signed(3, 8);
        proc.load_program(&program);
        proc.execute_current_program();

        assert_eq!(proc.int_register_get_signed(1), 8);
        assert!(proc.is_halted());
        assert_eq!(proc.get_last_raised_exception(), ExceptionKind::None);
        assert!(proc.steps_taken() <= 4 * 8 + 2);
    }
}
