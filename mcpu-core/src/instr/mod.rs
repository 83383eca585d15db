pub mod arith;
pub mod cf;
pub mod intrpt;
pub mod ldst;

pub use arith::CpuArith;
pub use cf::CpuControlFlow;
pub use intrpt::CpuInterrupt;
pub use ldst::CpuLoadStore;

/// Coprocessor 0 registers visible to software.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cp0Reg {
    Status,
    Epc,
}

///
/// Symbolic instruction set executed by the CPU. Encoding is not modelled,
/// a program image is a slice of these values. Register operands are indices
/// into the 32 entry register file, memory operands are data word addresses
/// and branch targets are absolute instruction addresses.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inst {
    Nop,
    Li { rt: u8, imm: i32 },
    Addi { rt: u8, rs: u8, imm: i32 },
    Lw { rt: u8, addr: u32 },
    Sw { rt: u8, addr: u32 },
    Bne { rs: u8, rt: u8, target: u32 },
    J { target: u32 },
    Mfc0 { rt: u8, reg: Cp0Reg },
    Mtc0 { rt: u8, reg: Cp0Reg },
    Eret,
}

impl Inst {
    ///
    /// Register written by the instruction, if any. Writes to `r0` are still
    /// reported since the program validation treats them like any other
    /// register write.
    ///
    pub fn dest_reg(&self) -> Option<u8> {
        match *self {
            Inst::Li { rt, .. } | Inst::Addi { rt, .. } | Inst::Lw { rt, .. } => Some(rt),
            Inst::Mfc0 { rt, .. } => Some(rt),
            _ => None,
        }
    }

    pub fn branch_target(&self) -> Option<u32> {
        match *self {
            Inst::Bne { target, .. } | Inst::J { target } => Some(target),
            _ => None,
        }
    }

    pub fn store_addr(&self) -> Option<u32> {
        match *self {
            Inst::Sw { addr, .. } => Some(addr),
            _ => None,
        }
    }

    pub fn cp0_write(&self) -> Option<Cp0Reg> {
        match *self {
            Inst::Mtc0 { reg, .. } => Some(reg),
            _ => None,
        }
    }
}

impl core::fmt::Display for Inst {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match *self {
            Inst::Nop => write!(f, "nop"),
            Inst::Li { rt, imm } => write!(f, "li    r{}, {}", rt, imm),
            Inst::Addi { rt, rs, imm } => write!(f, "addi  r{}, r{}, {}", rt, rs, imm),
            Inst::Lw { rt, addr } => write!(f, "lw    r{}, [{:#05x}]", rt, addr),
            Inst::Sw { rt, addr } => write!(f, "sw    r{}, [{:#05x}]", rt, addr),
            Inst::Bne { rs, rt, target } => write!(f, "bne   r{}, r{}, {:#05x}", rs, rt, target),
            Inst::J { target } => write!(f, "j     {:#05x}", target),
            Inst::Mfc0 { rt, reg } => write!(f, "mfc0  r{}, {:?}", rt, reg),
            Inst::Mtc0 { rt, reg } => write!(f, "mtc0  r{}, {:?}", rt, reg),
            Inst::Eret => write!(f, "eret"),
        }
    }
}

#[cfg(test)]
mod disasm_tests {
    use super::{Cp0Reg, Inst};

    #[test]
    ///
    /// Checks the textual form of the instructions that show up in the
    /// debug traces.
    ///
    fn test_instr_display() {
        let src = [
            (Inst::Nop, "nop"),
            (Inst::Li { rt: 8, imm: 1 }, "li    r8, 1"),
            (Inst::Addi { rt: 9, rs: 9, imm: -1 }, "addi  r9, r9, -1"),
            (Inst::Lw { rt: 26, addr: 0x41 }, "lw    r26, [0x041]"),
            (Inst::Bne { rs: 10, rt: 0, target: 6 }, "bne   r10, r0, 0x006"),
            (Inst::Mtc0 { rt: 8, reg: Cp0Reg::Status }, "mtc0  r8, Status"),
            (Inst::Eret, "eret"),
        ];

        for (inst, expect) in src.iter() {
            assert_eq!(format!("{}", inst), *expect);
        }
    }

    #[test]
    fn test_instr_operands() {
        let lw = Inst::Lw { rt: 26, addr: 0x41 };
        assert_eq!(lw.dest_reg(), Some(26));
        assert_eq!(lw.store_addr(), None);

        let sw = Inst::Sw { rt: 26, addr: 0x41 };
        assert_eq!(sw.dest_reg(), None);
        assert_eq!(sw.store_addr(), Some(0x41));

        assert_eq!(Inst::J { target: 2 }.branch_target(), Some(2));
        assert_eq!(
            Inst::Mtc0 { rt: 8, reg: Cp0Reg::Epc }.cp0_write(),
            Some(Cp0Reg::Epc)
        );
        assert_eq!(Inst::Mfc0 { rt: 8, reg: Cp0Reg::Epc }.cp0_write(), None);
    }
}
