//! Sizes and limits shared by the register file, memory block and instruction table.

/// Number of integer registers (`R0..R31`).
pub const INT_REGISTER_COUNT: usize = 32;

/// Number of float registers (`F0..F31`).
pub const FLOAT_REGISTER_COUNT: usize = 32;

/// `R0` is hard-wired to zero; writes are discarded.
pub const ZERO_REGISTER: u8 = 0;

/// `R31` receives the return address written by `JAL`/`JALR`.
pub const RETURN_ADDRESS_REGISTER: u8 = 31;

/// Byte widths of the load/store operand sizes: byte, half-word, word, float, double.
pub const BYTE_BYTES: u32 = 1;
pub const HALF_BYTES: u32 = 2;
pub const WORD_BYTES: u32 = 4;
pub const FLOAT_BYTES: u32 = 4;
pub const DOUBLE_BYTES: u32 = 8;

/// Smallest and largest value representable by a 16-bit signed immediate.
pub const IMMEDIATE_MIN: i32 = i16::MIN as i32;
pub const IMMEDIATE_MAX: i32 = i16::MAX as i32;

/// `0` means "no step budget" in `Processor::set_max_number_of_steps`.
pub const UNLIMITED_STEPS: u64 = 0;
