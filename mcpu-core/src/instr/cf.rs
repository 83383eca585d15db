use crate::consts::cycles;
use crate::cpu::Cpu;

pub trait CpuControlFlow {
    fn bne(&mut self, rs: u8, rt: u8, target: u32) -> u16;
    fn j(&mut self, target: u32) -> u16;
}

impl<'a> CpuControlFlow for Cpu<'a> {
    fn bne(&mut self, rs: u8, rt: u8, target: u32) -> u16 {
        if self.read_reg(rs) != self.read_reg(rt) {
            self.set_pc(target);
        }
        cycles::BRANCH
    }

    fn j(&mut self, target: u32) -> u16 {
        self.set_pc(target);
        cycles::JUMP
    }
}

#[cfg(test)]
mod cf_tests {
    use crate::consts::cpu::{REG_T0, REG_ZERO};
    use crate::instr::Inst;
    use crate::irq::Held;
    use crate::tests::{init_cpu, COUNT_HANDLER};

    ///
    /// ## BNE delay loop test
    ///
    /// Counts a register down to zero; the loop body runs exactly as many
    /// times as the initial value and then falls through.
    ///
    #[test]
    fn cf_bne_delay_loop() {
        let main = [
            Inst::Li { rt: REG_T0, imm: 5 },
            Inst::Addi { rt: REG_T0, rs: REG_T0, imm: -1 },
            Inst::Bne { rs: REG_T0, rt: REG_ZERO, target: 1 },
            Inst::J { target: 0 },
        ];
        let mut line = Held(false);
        let mut cpu = init_cpu(&main, &COUNT_HANDLER, &mut line);

        cpu.step();
        for i in (0..5).rev() {
            cpu.step();
            assert_eq!(cpu.read_reg(REG_T0), i);
            cpu.step();
            if i == 0 {
                assert_eq!(cpu.pc(), 3);
            } else {
                assert_eq!(cpu.pc(), 1);
            }
        }

        cpu.step();
        assert_eq!(cpu.pc(), 0);
    }
}
