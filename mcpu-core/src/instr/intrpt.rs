use log::warn;

use super::Cp0Reg;
use crate::consts::cycles;
use crate::cpu::{Cpu, CpuEvent};

pub trait CpuInterrupt {
    fn mfc0(&mut self, rt: u8, reg: Cp0Reg) -> u16;
    fn mtc0(&mut self, rt: u8, reg: Cp0Reg) -> u16;
    fn eret(&mut self) -> u16;
}

impl<'a> CpuInterrupt for Cpu<'a> {
    fn mfc0(&mut self, rt: u8, reg: Cp0Reg) -> u16 {
        let val = match reg {
            Cp0Reg::Status => self.status().bits(),
            Cp0Reg::Epc => self.controller().epc().unwrap_or(0),
        };
        self.write_reg(rt, val);
        cycles::COP0
    }

    fn mtc0(&mut self, rt: u8, reg: Cp0Reg) -> u16 {
        let val = self.read_reg(rt);
        match reg {
            Cp0Reg::Status => self.status_mut().write_bits(val),
            // EPC belongs to the exception controller
            Cp0Reg::Epc => warn!("Ignoring software write of EPC ({:#x})", val),
        }
        cycles::COP0
    }

    fn eret(&mut self) -> u16 {
        let (ctl, status) = self.split_ctl();
        if let Some(resume_pc) = ctl.eret(status) {
            self.set_pc(resume_pc);
            let cycle = self.total_cycles;
            self.push_event(CpuEvent::Returned { resume_pc, cycle });
        }
        cycles::ERET
    }
}

#[cfg(test)]
mod interrupt_instr_unittests {
    use super::CpuInterrupt;
    use crate::consts::cpu::{REG_K0, REG_T0, STATUS_EXL, STATUS_IE};
    use crate::consts::memmap;
    use crate::cpu::{CtlState, StepKind};
    use crate::instr::Cp0Reg;
    use crate::irq::Held;
    use crate::tests::{init_cpu, COUNT_HANDLER, ENABLE_AND_COUNT};

    #[test]
    fn intrpt_mtc0_status_sets_only_ie() {
        let mut line = Held(false);
        let mut cpu = init_cpu(&ENABLE_AND_COUNT, &COUNT_HANDLER, &mut line);

        cpu.write_reg(REG_T0, STATUS_IE | STATUS_EXL);
        cpu.mtc0(REG_T0, Cp0Reg::Status);
        assert_eq!(cpu.status().ie(), true);
        assert_eq!(cpu.status().exl(), false);

        cpu.write_reg(REG_T0, 0);
        cpu.mtc0(REG_T0, Cp0Reg::Status);
        assert_eq!(cpu.status().ie(), false);
    }

    #[test]
    fn intrpt_mtc0_epc_ignored() {
        let mut line = Held(true);
        let mut cpu = init_cpu(&ENABLE_AND_COUNT, &COUNT_HANDLER, &mut line);

        // li, mtc0, dispatch
        cpu.step();
        cpu.step();
        cpu.step();
        assert_eq!(cpu.last_step(), StepKind::Dispatch);

        cpu.write_reg(REG_T0, 0x55);
        cpu.mtc0(REG_T0, Cp0Reg::Epc);
        assert_eq!(cpu.controller().epc(), Some(2));

        cpu.mfc0(REG_K0, Cp0Reg::Epc);
        assert_eq!(cpu.read_reg(REG_K0), 2);
        cpu.mfc0(REG_K0, Cp0Reg::Status);
        assert_eq!(cpu.read_reg(REG_K0), STATUS_IE | STATUS_EXL);
    }

    #[test]
    fn intrpt_eret_outside_handler_is_noop() {
        let mut line = Held(false);
        let mut cpu = init_cpu(&ENABLE_AND_COUNT, &COUNT_HANDLER, &mut line);

        cpu.step();
        let pc = cpu.pc();
        cpu.eret();
        assert_eq!(cpu.pc(), pc);
        assert_eq!(cpu.controller().state(), CtlState::Running);
        assert_eq!(cpu.controller().returns(), 0);
    }

    #[test]
    fn intrpt_eret_resumes_saved_pc() {
        let mut line = Held(true);
        let mut cpu = init_cpu(&ENABLE_AND_COUNT, &COUNT_HANDLER, &mut line);

        cpu.step();
        cpu.step();
        cpu.step();
        assert_eq!(cpu.pc(), memmap::DEFAULT_HANDLER_ENTRY);

        cpu.eret();
        assert_eq!(cpu.pc(), 2);
        assert_eq!(cpu.status().exl(), false);
        assert_eq!(cpu.controller().epc(), None);
    }
}
