use crate::argument::ArgumentType;
use num_derive::{FromPrimitive, ToPrimitive};
use util::EnumFromStr;
use util_derive::{EnumFromStr, EnumName};

/// The DLX instruction set.
///
/// A closed enumeration: every mnemonic the lexer/parser can classify has a
/// variant here, plus the `None` sentinel for "no opcode", which is never
/// executable. Ordered roughly by functional group (integer arithmetic,
/// logical, shifts, comparisons, loads/stores, float/double arithmetic and
/// comparisons, moves/conversions, branches, jumps, misc) rather than
/// alphabetically, matching how the instruction table is built.
#[derive(Clone, Copy, PartialEq, Eq, Debug, ToPrimitive, FromPrimitive, EnumFromStr, EnumName)]
pub enum Opcode {
    // Signed integer arithmetic.
    ADD,
    ADDI,
    SUB,
    SUBI,
    MULT,
    MULTI,
    DIV,
    DIVI,
    // Unsigned integer arithmetic.
    ADDU,
    ADDUI,
    SUBU,
    SUBUI,
    MULTU,
    MULTUI,
    DIVU,
    DIVUI,
    // Logical.
    AND,
    ANDI,
    OR,
    ORI,
    XOR,
    XORI,
    // Shifts. Trap `BadShift` when the shift count (register or immediate) is
    // not in `[0, 31]`.
    SLL,
    SLLI,
    SRL,
    SRLI,
    SLA,
    SLAI,
    SRA,
    SRAI,
    // Signed comparisons; set Rd to 1 or 0.
    SLT,
    SLTI,
    SGT,
    SGTI,
    SLE,
    SLEI,
    SGE,
    SGEI,
    SEQ,
    SEQI,
    SNE,
    SNEI,
    // Unsigned comparisons.
    SLTU,
    SLTUI,
    SGTU,
    SGTUI,
    SLEU,
    SLEUI,
    SGEU,
    SGEUI,
    SEQU,
    SEQUI,
    SNEU,
    SNEUI,
    // Integer loads/stores.
    LB,
    LBU,
    LH,
    LHU,
    LW,
    SB,
    SH,
    SW,
    // Float/double loads/stores.
    LF,
    LD,
    SF,
    SD,
    // Float arithmetic.
    ADDF,
    SUBF,
    MULTF,
    DIVF,
    // Double arithmetic.
    ADDD,
    SUBD,
    MULTD,
    DIVD,
    // Float comparisons; set FPSR.
    LTF,
    GTF,
    LEF,
    GEF,
    EQF,
    NEF,
    // Double comparisons; set FPSR.
    LTD,
    GTD,
    LED,
    GED,
    EQD,
    NED,
    // Register-bank moves and conversions.
    MOVI2S,
    MOVS2I,
    MOVF,
    MOVD,
    MOVFP2I,
    MOVI2FP,
    MOVI2DF,
    CVTF2D,
    CVTF2I,
    CVTD2F,
    CVTD2I,
    CVTI2F,
    CVTI2D,
    // Branches.
    BEQZ,
    BNEZ,
    BFPT,
    BFPF,
    // Jumps.
    J,
    JR,
    JAL,
    JALR,
    // Misc.
    TRAP,
    HALT,
    NOP,
    /// "No opcode" sentinel. Never dispatched by the instruction table.
    None,
}

impl Opcode {
    /// The three argument-type slots this opcode declares, in order.
    ///
    /// An unused trailing slot is `ArgumentType::None`; the first `None`
    /// slot marks the required-argument count.
    pub fn argument_types(self) -> [ArgumentType; 3] {
        use ArgumentType::{AddressDisplacement as Addr, FloatRegister as F, IntRegister as I, Label, None as N};

        match self {
            Opcode::ADD | Opcode::SUB | Opcode::MULT | Opcode::DIV
            | Opcode::ADDU | Opcode::SUBU | Opcode::MULTU | Opcode::DIVU
            | Opcode::AND | Opcode::OR | Opcode::XOR
            | Opcode::SLL | Opcode::SRL | Opcode::SLA | Opcode::SRA
            | Opcode::SLT | Opcode::SGT | Opcode::SLE | Opcode::SGE | Opcode::SEQ | Opcode::SNE
            | Opcode::SLTU | Opcode::SGTU | Opcode::SLEU | Opcode::SGEU | Opcode::SEQU | Opcode::SNEU => {
                [I, I, I]
            }
            Opcode::ADDI | Opcode::SUBI | Opcode::MULTI | Opcode::DIVI
            | Opcode::ADDUI | Opcode::SUBUI | Opcode::MULTUI | Opcode::DIVUI
            | Opcode::ANDI | Opcode::ORI | Opcode::XORI
            | Opcode::SLLI | Opcode::SRLI | Opcode::SLAI | Opcode::SRAI
            | Opcode::SLTI | Opcode::SGTI | Opcode::SLEI | Opcode::SGEI | Opcode::SEQI | Opcode::SNEI
            | Opcode::SLTUI | Opcode::SGTUI | Opcode::SLEUI | Opcode::SGEUI | Opcode::SEQUI | Opcode::SNEUI => {
                [I, I, ArgumentType::ImmediateInteger]
            }
            Opcode::MOVI2S | Opcode::MOVS2I => [I, N, N],
            Opcode::MOVFP2I | Opcode::CVTF2I | Opcode::CVTD2I => [I, F, N],
            Opcode::MOVI2FP | Opcode::CVTI2F | Opcode::MOVI2DF | Opcode::CVTI2D => [F, I, N],
            Opcode::LB | Opcode::LBU | Opcode::LH | Opcode::LHU | Opcode::LW => [I, Addr, N],
            Opcode::SB | Opcode::SH | Opcode::SW => [Addr, I, N],
            Opcode::LF | Opcode::LD => [F, Addr, N],
            Opcode::SF | Opcode::SD => [Addr, F, N],
            Opcode::ADDF | Opcode::SUBF | Opcode::MULTF | Opcode::DIVF
            | Opcode::ADDD | Opcode::SUBD | Opcode::MULTD | Opcode::DIVD => [F, F, F],
            Opcode::LTF | Opcode::GTF | Opcode::LEF | Opcode::GEF | Opcode::EQF | Opcode::NEF
            | Opcode::LTD | Opcode::GTD | Opcode::LED | Opcode::GED | Opcode::EQD | Opcode::NED => {
                [F, F, N]
            }
            Opcode::MOVF | Opcode::MOVD | Opcode::CVTF2D | Opcode::CVTD2F => [F, F, N],
            Opcode::BEQZ | Opcode::BNEZ => [I, Label, N],
            Opcode::BFPT | Opcode::BFPF => [Label, N, N],
            Opcode::J | Opcode::JAL => [Label, N, N],
            Opcode::JR | Opcode::JALR => [I, N, N],
            Opcode::TRAP => [ArgumentType::ImmediateInteger, N, N],
            Opcode::HALT | Opcode::NOP | Opcode::None => [N, N, N],
        }
    }

    /// Number of required argument slots: the position of the first `None` slot.
    pub fn required_argument_count(self) -> usize {
        self.argument_types()
            .iter()
            .take_while(|t| **t != ArgumentType::None)
            .count()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use util::EnumFromStr;

    #[test]
    fn register_form_takes_three_registers() {
        assert_eq!(Opcode::ADD.argument_types(), [ArgumentType::IntRegister; 3]);
        assert_eq!(Opcode::ADD.required_argument_count(), 3);
    }

    #[test]
    fn none_sentinel_takes_no_arguments() {
        assert_eq!(Opcode::None.required_argument_count(), 0);
    }

    #[test]
    fn from_str_is_case_sensitive_on_exact_mnemonic() {
        assert_eq!(Opcode::from_str("ADD"), Ok(Opcode::ADD));
        assert!(Opcode::from_str("add").is_err());
    }

    #[test]
    fn name_round_trips_through_enum_name_derive() {
        assert_eq!(Opcode::HALT.name(), "HALT");
    }
}
