pub mod exc;
pub mod status;

pub use exc::{CtlState, ExceptionController, IrqPolicy};
pub use status::StatusReg;

use heapless::spsc::Producer;
use log::{debug, error, trace};

use crate::consts::{cycles, memmap, EVENT_QUEUE_LEN, NUM_REGS};
use crate::instr::{CpuArith, CpuControlFlow, CpuInterrupt, CpuLoadStore, Inst};
use crate::irq::IrqLine;
use crate::mem::{MemoryMap, SegmentKind};

///
/// Notification pushed by the CPU whenever control is diverted to the handler
/// or handed back to the main program.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CpuEvent {
    Dispatched { epc: u32, cycle: u64 },
    Returned { resume_pc: u32, cycle: u64 },
}

/// What the last call to `step` did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepKind {
    Main,
    Handler,
    Dispatch,
    Idle,
}

/// Observer view of the two counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Counters {
    pub progress: u32,
    pub handler: u32,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct CpuConfig {
    pub policy: IrqPolicy,
}

pub struct Cpu<'a> {
    mem: MemoryMap<'a>,
    irq: &'a mut dyn IrqLine,
    events: Option<Producer<'a, CpuEvent, EVENT_QUEUE_LEN>>,

    regs: [u32; NUM_REGS],
    pc: u32,
    last_pc: u32,
    status: StatusReg,
    ctl: ExceptionController,

    pub total_cycles: u64,
    pub cycles: u16,
    last_step: StepKind,
    halted: bool,
}

impl<'a> Cpu<'a> {
    pub fn new(
        mm: MemoryMap<'a>,
        handler_entry: Option<u32>,
        irq: &'a mut dyn IrqLine,
        config: CpuConfig,
    ) -> Cpu<'a> {
        let mut cpu = Cpu {
            mem: mm,
            irq,
            events: None,

            regs: [0; NUM_REGS],
            pc: memmap::RESET_VECTOR,
            last_pc: memmap::RESET_VECTOR,
            status: StatusReg::new(),
            ctl: ExceptionController::new(config.policy, handler_entry),

            total_cycles: 0,
            cycles: 0,
            last_step: StepKind::Idle,
            halted: false,
        };

        cpu.reset();
        cpu
    }

    /// Attaches the producer half of an event queue.
    pub fn with_events(mut self, tx: Producer<'a, CpuEvent, EVENT_QUEUE_LEN>) -> Cpu<'a> {
        self.events = Some(tx);
        self
    }

    pub fn reset(&mut self) {
        self.regs = [0; NUM_REGS];
        self.pc = memmap::RESET_VECTOR;
        self.last_pc = memmap::RESET_VECTOR;
        self.status.reset();
        self.ctl.reset();
        self.mem.reset();
        self.total_cycles = 0;
        self.cycles = 0;
        self.last_step = StepKind::Idle;
        self.halted = false;
    }

    pub fn pc(&self) -> u32 {
        self.pc
    }

    /// Address of the instruction executed by the last step.
    pub fn last_pc(&self) -> u32 {
        self.last_pc
    }

    pub fn last_step(&self) -> StepKind {
        self.last_step
    }

    pub fn status(&self) -> StatusReg {
        self.status
    }

    pub fn controller(&self) -> &ExceptionController {
        &self.ctl
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn counters(&self) -> Counters {
        Counters {
            progress: self.mem.read(memmap::PROGRESS_COUNTER),
            handler: self.mem.read(memmap::HANDLER_COUNTER),
        }
    }

    pub fn read_reg(&self, reg: u8) -> u32 {
        match reg {
            0 => 0,
            _ => self.regs[reg as usize % NUM_REGS],
        }
    }

    pub(crate) fn write_reg(&mut self, reg: u8, val: u32) {
        match reg {
            // r0 is hardwired to zero
            0 => {}
            _ => self.regs[reg as usize % NUM_REGS] = val,
        }
    }

    pub fn read(&self, addr: u32) -> u32 {
        self.mem.read(addr)
    }

    pub(crate) fn write(&mut self, addr: u32, val: u32) {
        self.mem.write(addr, val)
    }

    pub(crate) fn set_pc(&mut self, pc: u32) {
        self.pc = pc;
    }

    pub(crate) fn status_mut(&mut self) -> &mut StatusReg {
        &mut self.status
    }

    pub(crate) fn split_ctl(&mut self) -> (&mut ExceptionController, &mut StatusReg) {
        (&mut self.ctl, &mut self.status)
    }

    pub(crate) fn push_event(&mut self, event: CpuEvent) {
        if let Some(tx) = self.events.as_mut() {
            match tx.enqueue(event) {
                Err(x) => {
                    error!("Unable to push {:?} into the event queue", x);
                }
                _ => {}
            }
        }
    }

    fn handle_dispatch(&mut self) {
        let epc = self.pc;
        let (ctl, status) = (&mut self.ctl, &mut self.status);
        match ctl.dispatch(status, epc) {
            Some(entry) => {
                self.pc = entry;
                self.push_event(CpuEvent::Dispatched {
                    epc,
                    cycle: self.total_cycles,
                });
            }
            None => {
                error!("Dispatch requested but not allowed, continuing at {:#05x}", epc);
            }
        }
        self.cycles = cycles::DISPATCH;
        self.last_step = StepKind::Dispatch;
    }

    pub fn execute(&mut self, inst: &Inst) -> u16 {
        match *inst {
            Inst::Nop => cycles::ALU,
            Inst::Li { rt, imm } => self.li(rt, imm),
            Inst::Addi { rt, rs, imm } => self.addi(rt, rs, imm),
            Inst::Lw { rt, addr } => self.lw(rt, addr),
            Inst::Sw { rt, addr } => self.sw(rt, addr),
            Inst::Bne { rs, rt, target } => self.bne(rs, rt, target),
            Inst::J { target } => self.j(target),
            Inst::Mfc0 { rt, reg } => self.mfc0(rt, reg),
            Inst::Mtc0 { rt, reg } => self.mtc0(rt, reg),
            Inst::Eret => self.eret(),
        }
    }

    fn step_programmed(&mut self) {
        let addr = self.pc;
        let (kind, inst) = match self.mem.fetch(addr) {
            Some(x) => x,
            None => {
                error!("Fetch outside of loaded code at {:#05x}. Halting", addr);
                self.halted = true;
                self.cycles = cycles::IDLE;
                self.last_step = StepKind::Idle;
                return;
            }
        };

        self.last_step = match self.ctl.state() {
            CtlState::InHandler => StepKind::Handler,
            _ => StepKind::Main,
        };
        if (kind == SegmentKind::Handler) != (self.last_step == StepKind::Handler) {
            error!(
                "{:?} segment instruction at {:#05x} executed in {:?} context",
                kind, addr, self.last_step
            );
        }

        trace!("{:05x}: {}", addr, inst);
        self.last_pc = addr;
        self.pc = addr.wrapping_add(1);
        self.cycles = self.execute(&inst);
    }

    ///
    /// ## `step` Function
    ///
    /// Advances the CPU by one instruction boundary. The interrupt line is
    /// sampled first; if the controller takes the interrupt the whole step is
    /// the dispatch sequence and no instruction executes. Returns the number
    /// of cycles the step took.
    ///
    pub fn step(&mut self) -> u16 {
        if self.halted {
            self.cycles = cycles::IDLE;
            self.last_step = StepKind::Idle;
            self.total_cycles += self.cycles as u64;
            return self.cycles;
        }

        let line = self.irq.sample(self.total_cycles);
        self.ctl.sample(line);

        if self.ctl.should_dispatch(&self.status) {
            debug!("Handling Interrupt at {:#05x}", self.pc);
            self.handle_dispatch();
        } else {
            self.step_programmed();
        }

        self.total_cycles += self.cycles as u64;
        self.cycles
    }
}
