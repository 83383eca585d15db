use log::{debug, error};
use thiserror::Error;

use crate::bench::Sample;
use crate::cpu::{Counters, CpuEvent, CtlState, StepKind};

/// Interrupt protocol violations the monitor can detect from samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("both counters changed in the same step (cycle {cycle})")]
    BothCountersChanged { cycle: u64 },
    #[error("progress counter changed during a {kind:?} step (cycle {cycle})")]
    ProgressOutsideMain { cycle: u64, kind: StepKind },
    #[error("handler counter changed during a {kind:?} step (cycle {cycle})")]
    HandlerOutsideHandler { cycle: u64, kind: StepKind },
    #[error("a counter decreased (cycle {cycle})")]
    CounterDecreased { cycle: u64 },
    #[error("a counter advanced by more than one in a single step (cycle {cycle})")]
    CounterSkipped { cycle: u64 },
    #[error("dispatch with IE={ie} EXL={exl} (cycle {cycle})")]
    DispatchWhileMasked { cycle: u64, ie: bool, exl: bool },
    #[error("dispatch while already in {state:?} (cycle {cycle})")]
    NestedDispatch { cycle: u64, state: CtlState },
    #[error("return to {actual:#05x}, interrupted at {expected:#05x} (cycle {cycle})")]
    ResumeMismatch { cycle: u64, expected: u32, actual: u32 },
    #[error("handler run advanced its counter by {delta} (cycle {cycle})")]
    HandlerRunMiscount { cycle: u64, delta: u32 },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MonitorReport {
    pub samples: u64,
    pub dispatches: u32,
    pub returns: u32,
    pub violations: u32,
    pub first_violation: Option<Violation>,
}

impl MonitorReport {
    pub fn is_clean(&self) -> bool {
        self.violations == 0
    }
}

#[derive(Clone, Copy)]
struct Boundary {
    counters: Counters,
    ie: bool,
    exl: bool,
    state: CtlState,
}

///
/// ## `PropertyMonitor`
///
/// Checks a stream of samples, taken from reset, against the interrupt
/// delivery rules:
///
///  - only main program steps move the progress counter and only handler steps
///    move the handler counter, never both at once, by at most one, never down
///  - a dispatch happens only from RUNNING with IE set and EXL clear
///  - every return resumes at the address saved by the matching dispatch
///  - every handler run moves the handler counter by exactly one
///
pub struct PropertyMonitor {
    prev: Boundary,
    epc: Option<u32>,
    handler_at_dispatch: u32,

    samples: u64,
    dispatches: u32,
    returns: u32,
    violations: u32,
    first_violation: Option<Violation>,
}

impl Default for PropertyMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyMonitor {
    pub fn new() -> PropertyMonitor {
        PropertyMonitor {
            prev: Boundary {
                counters: Counters::default(),
                ie: false,
                exl: false,
                state: CtlState::Running,
            },
            epc: None,
            handler_at_dispatch: 0,
            samples: 0,
            dispatches: 0,
            returns: 0,
            violations: 0,
            first_violation: None,
        }
    }

    fn record(&mut self, v: Violation) {
        error!("Interrupt protocol violation: {}", v);
        self.violations += 1;
        if self.first_violation.is_none() {
            self.first_violation = Some(v);
        }
    }

    fn check_counters(&self, s: &Sample) -> Option<Violation> {
        let cycle = s.cycle;
        let (old, new) = (self.prev.counters, s.counters);

        if new.progress < old.progress || new.handler < old.handler {
            return Some(Violation::CounterDecreased { cycle });
        }

        let progress = new.progress - old.progress;
        let handler = new.handler - old.handler;
        if progress > 0 && handler > 0 {
            return Some(Violation::BothCountersChanged { cycle });
        }
        if progress > 1 || handler > 1 {
            return Some(Violation::CounterSkipped { cycle });
        }
        if progress > 0 && s.kind != StepKind::Main {
            return Some(Violation::ProgressOutsideMain { cycle, kind: s.kind });
        }
        if handler > 0 && s.kind != StepKind::Handler {
            return Some(Violation::HandlerOutsideHandler { cycle, kind: s.kind });
        }
        None
    }

    fn check_dispatch(&mut self, s: &Sample) -> Option<Violation> {
        let cycle = s.cycle;
        self.dispatches += 1;
        self.epc = Some(s.pc);
        self.handler_at_dispatch = s.counters.handler;

        if self.prev.state != CtlState::Running {
            return Some(Violation::NestedDispatch {
                cycle,
                state: self.prev.state,
            });
        }
        if !self.prev.ie || self.prev.exl {
            return Some(Violation::DispatchWhileMasked {
                cycle,
                ie: self.prev.ie,
                exl: self.prev.exl,
            });
        }
        None
    }

    fn check_return(&mut self, s: &Sample, resume_pc: u32) -> Option<Violation> {
        let cycle = s.cycle;
        self.returns += 1;

        let delta = s.counters.handler.wrapping_sub(self.handler_at_dispatch);
        let expected = self.epc.take();
        if expected != Some(resume_pc) {
            return Some(Violation::ResumeMismatch {
                cycle,
                expected: expected.unwrap_or(u32::MAX),
                actual: resume_pc,
            });
        }
        if delta != 1 {
            return Some(Violation::HandlerRunMiscount { cycle, delta });
        }
        None
    }

    ///
    /// ## `observe` Function
    ///
    /// Feeds one sample to the monitor. Returns the violation found in this
    /// sample, if any; all violations are also counted in the report.
    ///
    pub fn observe(&mut self, s: &Sample) -> Option<Violation> {
        self.samples += 1;

        let mut found = self.check_counters(s);
        if s.kind == StepKind::Dispatch {
            found = found.or(self.check_dispatch(s));
        }
        if let Some(CpuEvent::Returned { resume_pc, .. }) = s.event {
            found = found.or(self.check_return(s, resume_pc));
        }

        if let Some(v) = found {
            self.record(v);
        }

        self.prev = Boundary {
            counters: s.counters,
            ie: s.ie,
            exl: s.exl,
            state: s.state,
        };
        found
    }

    pub fn first_violation(&self) -> Option<Violation> {
        self.first_violation
    }

    pub fn report(&self) -> MonitorReport {
        debug!(
            "Monitor: {} samples, {} dispatches, {} returns, {} violations",
            self.samples, self.dispatches, self.returns, self.violations
        );
        MonitorReport {
            samples: self.samples,
            dispatches: self.dispatches,
            returns: self.returns,
            violations: self.violations,
            first_violation: self.first_violation,
        }
    }
}
