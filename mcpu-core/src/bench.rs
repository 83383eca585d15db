use heapless::spsc::Consumer;
use log::trace;

use crate::consts::EVENT_QUEUE_LEN;
use crate::cpu::{Counters, Cpu, CpuEvent, CtlState, StepKind};

///
/// Everything an observer can see after one step: what ran, where, the
/// controller and status state and both counters. Reading it has no effect on
/// the CPU.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sample {
    /// Cycle count at the boundary the step started from.
    pub cycle: u64,
    pub step_cycles: u16,
    pub kind: StepKind,
    /// Address of the executed instruction. For a dispatch, the saved EPC.
    pub pc: u32,
    pub state: CtlState,
    pub ie: bool,
    pub exl: bool,
    /// Line level sampled at the boundary.
    pub line: bool,
    pub counters: Counters,
    pub event: Option<CpuEvent>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub steps: u64,
    pub dispatches: u32,
    pub returns: u32,
    pub counters: Counters,
}

///
/// ## `Testbench`
///
/// Drives a CPU one step at a time and turns each step into a `Sample`,
/// draining the CPU event queue when one is attached.
///
pub struct Testbench<'a> {
    cpu: Cpu<'a>,
    events: Option<Consumer<'a, CpuEvent, EVENT_QUEUE_LEN>>,
    steps: u64,
}

impl<'a> Testbench<'a> {
    pub fn new(cpu: Cpu<'a>) -> Testbench<'a> {
        Testbench {
            cpu,
            events: None,
            steps: 0,
        }
    }

    pub fn with_events(mut self, rx: Consumer<'a, CpuEvent, EVENT_QUEUE_LEN>) -> Testbench<'a> {
        self.events = Some(rx);
        self
    }

    pub fn cpu(&self) -> &Cpu<'a> {
        &self.cpu
    }

    pub fn reset(&mut self) {
        self.cpu.reset();
        self.steps = 0;
        if let Some(rx) = self.events.as_mut() {
            while rx.dequeue().is_some() {}
        }
    }

    pub fn step(&mut self) -> Sample {
        let cycle = self.cpu.total_cycles;
        let step_cycles = self.cpu.step();
        self.steps += 1;

        let kind = self.cpu.last_step();
        let pc = match kind {
            StepKind::Main | StepKind::Handler => self.cpu.last_pc(),
            StepKind::Dispatch => self.cpu.controller().epc().unwrap_or(self.cpu.pc()),
            StepKind::Idle => self.cpu.pc(),
        };
        let event = self.events.as_mut().and_then(|rx| rx.dequeue());
        let status = self.cpu.status();

        let sample = Sample {
            cycle,
            step_cycles,
            kind,
            pc,
            state: self.cpu.controller().state(),
            ie: status.ie(),
            exl: status.exl(),
            line: self.cpu.controller().line(),
            counters: self.cpu.counters(),
            event,
        };
        trace!("{:?}", sample);
        sample
    }

    ///
    /// ## `run_cycles` Function
    ///
    /// Steps until at least `budget` more cycles have elapsed, handing every
    /// sample to `on_step`. The run stops early when `on_step` returns false.
    ///
    pub fn run_cycles<F>(&mut self, budget: u64, mut on_step: F) -> RunSummary
    where
        F: FnMut(&Sample) -> bool,
    {
        let end = self.cpu.total_cycles.saturating_add(budget);
        while self.cpu.total_cycles < end {
            let sample = self.step();
            if !on_step(&sample) {
                break;
            }
        }
        self.summary()
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            cycles: self.cpu.total_cycles,
            steps: self.steps,
            dispatches: self.cpu.controller().dispatches(),
            returns: self.cpu.controller().returns(),
            counters: self.cpu.counters(),
        }
    }
}
