use crate::consts::cycles;
use crate::cpu::Cpu;

pub trait CpuArith {
    fn li(&mut self, rt: u8, imm: i32) -> u16;
    fn addi(&mut self, rt: u8, rs: u8, imm: i32) -> u16;
}

impl<'a> CpuArith for Cpu<'a> {
    fn li(&mut self, rt: u8, imm: i32) -> u16 {
        self.write_reg(rt, imm as u32);
        cycles::ALU
    }

    ///
    /// Adds a sign extended immediate to `rs`. Overflow wraps; the trap on
    /// signed overflow is not modelled.
    ///
    fn addi(&mut self, rt: u8, rs: u8, imm: i32) -> u16 {
        let val = self.read_reg(rs).wrapping_add(imm as u32);
        self.write_reg(rt, val);
        cycles::ALU
    }
}
