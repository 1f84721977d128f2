use util_derive::EnumName;

/// The run-time exceptions a step can raise.
///
/// `None` is the steady state when nothing has trapped. Every other variant
/// halts the processor once raised; the user inspects it via
/// `Processor::get_last_raised_exception`.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Default, EnumName)]
pub enum ExceptionKind {
    #[default]
    None,
    DivideByZero,
    Overflow,
    Underflow,
    Trap,
    Halt,
    UnknownLabel,
    AddressOutOfBounds,
    BadShift,
    MisalignedRegisterAccess,
}
