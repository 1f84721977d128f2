//! Argument slot types and the instruction argument tagged union.

use util_derive::EnumName;

/// The shape an instruction's argument slot accepts.
#[derive(Clone, Copy, Eq, PartialEq, Debug, EnumName)]
pub enum ArgumentType {
    IntRegister,
    FloatRegister,
    ImmediateInteger,
    AddressDisplacement,
    Label,
    /// Sentinel marking an unused slot; also the "any empty slot" terminator
    /// used to compute an opcode's required-argument count.
    None,
}

/// One concrete instruction argument.
///
/// A tagged union: structural equality, no shared representation across
/// variants.
#[derive(Clone, PartialEq, Debug)]
pub enum Argument {
    IntRegister(u8),
    FloatRegister(u8),
    ImmediateInteger(i16),
    AddressDisplacement { base: u8, displacement: i16 },
    Label(String),
    None,
}

impl Argument {
    pub fn argument_type(&self) -> ArgumentType {
        match self {
            Argument::IntRegister(_) => ArgumentType::IntRegister,
            Argument::FloatRegister(_) => ArgumentType::FloatRegister,
            Argument::ImmediateInteger(_) => ArgumentType::ImmediateInteger,
            Argument::AddressDisplacement { .. } => ArgumentType::AddressDisplacement,
            Argument::Label(_) => ArgumentType::Label,
            Argument::None => ArgumentType::None,
        }
    }

    pub fn as_int_register(&self) -> Option<u8> {
        match self {
            Argument::IntRegister(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_float_register(&self) -> Option<u8> {
        match self {
            Argument::FloatRegister(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_immediate_integer(&self) -> Option<i16> {
        match self {
            Argument::ImmediateInteger(value) => Some(*value),
            _ => None,
        }
    }

    /// Unsigned zero-extended view of an immediate integer.
    pub fn as_immediate_unsigned(&self) -> Option<u16> {
        self.as_immediate_integer().map(|v| v as u16)
    }

    pub fn as_address_displacement(&self) -> Option<(u8, i16)> {
        match self {
            Argument::AddressDisplacement { base, displacement } => Some((*base, *displacement)),
            _ => None,
        }
    }

    pub fn as_label(&self) -> Option<&str> {
        match self {
            Argument::Label(name) => Some(name),
            _ => None,
        }
    }
}

impl std::fmt::Display for Argument {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Argument::IntRegister(id) => write!(f, "R{id}"),
            Argument::FloatRegister(id) => write!(f, "F{id}"),
            Argument::ImmediateInteger(value) => write!(f, "#{value}"),
            Argument::AddressDisplacement { base, displacement } => {
                write!(f, "{displacement}(R{base})")
            }
            Argument::Label(name) => write!(f, "{name}"),
            Argument::None => Ok(()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn argument_type_matches_variant() {
        assert_eq!(Argument::IntRegister(1).argument_type(), ArgumentType::IntRegister);
        assert_eq!(Argument::None.argument_type(), ArgumentType::None);
    }

    #[test]
    fn immediate_has_signed_and_unsigned_views() {
        let arg = Argument::ImmediateInteger(-1);
        assert_eq!(arg.as_immediate_integer(), Some(-1));
        assert_eq!(arg.as_immediate_unsigned(), Some(0xFFFF));
    }

    #[test]
    fn displays_address_displacement_in_source_form() {
        let arg = Argument::AddressDisplacement { base: 0, displacement: 1000 };
        assert_eq!(arg.to_string(), "1000(R0)");
    }
}
