#![allow(dead_code)]

use heapless::spsc::Queue;

use mcpu_core::bench::{RunSummary, Sample, Testbench};
use mcpu_core::consts::EVENT_QUEUE_LEN;
use mcpu_core::cpu::{Cpu, CpuConfig, CpuEvent, CtlState, IrqPolicy, StepKind};
use mcpu_core::irq::IrqLine;
use mcpu_core::mem::MemoryMap;
use mcpu_core::monitor::{MonitorReport, PropertyMonitor};
use mcpu_core::Program;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub struct Run {
    pub samples: Vec<Sample>,
    pub report: MonitorReport,
    pub summary: RunSummary,
}

impl Run {
    pub fn main_pcs(&self) -> Vec<u32> {
        self.samples
            .iter()
            .filter(|s| s.kind == StepKind::Main)
            .map(|s| s.pc)
            .collect()
    }

    pub fn progress_trace(&self) -> Vec<u32> {
        self.samples
            .iter()
            .filter(|s| s.kind == StepKind::Main)
            .map(|s| s.counters.progress)
            .collect()
    }

    pub fn dispatch_cycles(&self) -> Vec<u64> {
        self.samples
            .iter()
            .filter(|s| s.kind == StepKind::Dispatch)
            .map(|s| s.cycle)
            .collect()
    }

    pub fn return_cycles(&self) -> Vec<u64> {
        self.samples
            .iter()
            .filter_map(|s| match s.event {
                Some(CpuEvent::Returned { cycle, .. }) => Some(cycle),
                _ => None,
            })
            .collect()
    }

    /// The boundary starting step `idx` could take an interrupt: the step
    /// before it left the controller running with IE set and EXL clear.
    pub fn takeable_at(&self, idx: usize) -> bool {
        match idx.checked_sub(1).map(|prev| &self.samples[prev]) {
            Some(p) => p.state == CtlState::Running && p.ie && !p.exl,
            None => false,
        }
    }

    ///
    /// Counts assertion episodes, maximal runs of boundaries that saw the line
    /// high, with at least one takeable boundary in them.
    ///
    pub fn takeable_episodes(&self) -> u32 {
        let mut episodes = 0;
        let mut counted = false;
        for (idx, s) in self.samples.iter().enumerate() {
            if !s.line {
                counted = false;
                continue;
            }
            if !counted && self.takeable_at(idx) {
                episodes += 1;
                counted = true;
            }
        }
        episodes
    }

    /// Cycles of takeable boundaries that saw the line high but did not
    /// dispatch.
    pub fn untaken_boundaries(&self) -> Vec<u64> {
        self.samples
            .iter()
            .enumerate()
            .filter(|(idx, s)| s.line && self.takeable_at(*idx) && s.kind != StepKind::Dispatch)
            .map(|(_, s)| s.cycle)
            .collect()
    }
}

///
/// Runs `program` from reset for `budget` cycles with the given line and
/// policy, recording every sample and checking it with the property monitor.
///
pub fn run<L: IrqLine>(
    program: &Program<'static>,
    line: &mut L,
    policy: IrqPolicy,
    budget: u64,
) -> Run {
    init_logger();

    let mut queue: Queue<CpuEvent, EVENT_QUEUE_LEN> = Queue::new();
    let (tx, rx) = queue.split();

    let mm = MemoryMap::new(program).expect("built-in image failed validation");
    let cpu = Cpu::new(mm, program.handler_entry, line, CpuConfig { policy }).with_events(tx);
    let mut bench = Testbench::new(cpu).with_events(rx);
    let mut monitor = PropertyMonitor::new();

    let mut samples = Vec::new();
    let summary = bench.run_cycles(budget, |s| {
        monitor.observe(s);
        samples.push(*s);
        true
    });

    Run {
        samples,
        report: monitor.report(),
        summary,
    }
}
