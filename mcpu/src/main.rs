extern crate clap;

use crossbeam_channel::{bounded, unbounded};
use ctrlc;
use env_logger;
use log::{error, info};
use thiserror::Error;

use mcpu_core::bench::{RunSummary, Sample, Testbench};
use mcpu_core::cpu::{Cpu, CpuConfig, CpuEvent};
use mcpu_core::mem::MemoryMap;
use mcpu_core::monitor::{MonitorReport, PropertyMonitor, Violation};
use mcpu_core::ProgramError;

mod config;
mod stimulus;

use config::RunConfig;
use stimulus::Stimulus;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid pulse `{0}`, expected START:WIDTH with WIDTH > 0")]
    InvalidPulse(String),
    #[error("invalid value `{value}` for --{arg}")]
    InvalidNumber { arg: &'static str, value: String },
    #[error("invalid policy `{0}`, expected `edge` or `level`")]
    InvalidPolicy(String),
    #[error("at most {0} pulses are supported")]
    TooManyPulses(usize),
    #[error("unknown program")]
    UnknownProgram,
    #[error("program image rejected: {0}")]
    Program(#[from] ProgramError),
    #[error("unable to register signal handler: {0}")]
    Signal(#[from] ctrlc::Error),
    #[error("interrupt protocol violated: {0}")]
    Violation(Violation),
}

fn trace_sample(s: &Sample) {
    println!(
        "{:>10} {:>2} {:<8?} {:05x} {:<10?} ie={} exl={} line={} progress={} handler={}",
        s.cycle,
        s.step_cycles,
        s.kind,
        s.pc,
        s.state,
        s.ie as u8,
        s.exl as u8,
        s.line as u8,
        s.counters.progress,
        s.counters.handler,
    );
}

fn log_event(s: &Sample) {
    match s.event {
        Some(CpuEvent::Dispatched { epc, cycle }) => {
            info!("Interrupt taken at cycle {}, EPC={:05x}", cycle, epc);
        }
        Some(CpuEvent::Returned { resume_pc, cycle }) => {
            info!("Handler returned at cycle {} to {:05x}", cycle, resume_pc);
        }
        None => {}
    }
}

fn print_summary(cfg: &RunConfig, summary: &RunSummary, report: &MonitorReport) {
    println!("program:     {}", cfg.program.name);
    println!("policy:      {:?}", cfg.policy);
    println!("cycles:      {}", summary.cycles);
    println!("steps:       {}", summary.steps);
    println!("progress:    {}", summary.counters.progress);
    println!("handler:     {}", summary.counters.handler);
    println!("dispatches:  {}", summary.dispatches);
    println!("returns:     {}", summary.returns);
    println!("violations:  {}", report.violations);
    if let Some(v) = report.first_violation {
        println!("first:       {}", v);
    }
}

fn run(cfg: &RunConfig) -> Result<(), CliError> {
    // Register for a ctrlc handler which will push a signal to the application.
    // A second Ctrl-C before the loop notices the first one exits right away.
    let (ctrlc_tx, ctrlc_rx) = bounded(1);
    ctrlc::set_handler(move || {
        if ctrlc_tx.is_full() {
            std::process::exit(-1);
        }
        let _res = ctrlc_tx.send(());
    })?;

    let manual = if cfg.interactive {
        let (tx, rx) = unbounded();
        stimulus::spawn_stdin_driver(tx);
        info!("Interactive line: `1` asserts, `0` deasserts, Enter toggles");
        Some(rx)
    } else {
        None
    };
    let mut line = Stimulus::new(&cfg.pulses, manual);
    if !cfg.pulses.is_empty() {
        info!("{} pulses scheduled, last one ends at cycle {}", cfg.pulses.len(), line.end());
    }

    let mm = MemoryMap::new(cfg.program)?;
    let mut q = heapless::spsc::Queue::new();
    let (event_tx, event_rx) = q.split();
    let cpu = Cpu::new(
        mm,
        cfg.program.handler_entry,
        &mut line,
        CpuConfig { policy: cfg.policy },
    )
    .with_events(event_tx);
    let mut bench = Testbench::new(cpu).with_events(event_rx);
    let mut monitor = PropertyMonitor::new();

    let trace = cfg.trace;
    let mut on_step = |s: &Sample| {
        monitor.observe(s);
        log_event(s);
        if trace {
            trace_sample(s);
        }
        ctrlc_rx.is_empty()
    };

    let paced = cfg.cycles.is_none() || cfg.interactive;
    let limit = cfg.cycles.unwrap_or(u64::MAX);

    let mut summary = bench.summary();
    if !paced {
        summary = bench.run_cycles(limit, &mut on_step);
    } else {
        info!("Running {} at {} Hz, Ctrl-C to stop", cfg.program.name, cfg.hz);
        let mut last_timestamp = std::time::Instant::now();
        while ctrlc_rx.is_empty() && summary.cycles < limit {
            let elapsed = last_timestamp.elapsed().as_micros() as u64;
            if elapsed == 0 {
                std::thread::sleep(std::time::Duration::new(0, 5000000));
                continue;
            }

            let expected_cycles = elapsed.saturating_mul(cfg.hz) / 1_000_000;
            if expected_cycles == 0 {
                std::thread::sleep(std::time::Duration::new(0, 1000000));
                continue;
            }
            last_timestamp = std::time::Instant::now();

            let budget = expected_cycles.min(limit - summary.cycles);
            summary = bench.run_cycles(budget, &mut on_step);
        }
    }

    let report = monitor.report();
    print_summary(cfg, &summary, &report);
    match report.first_violation {
        Some(v) => Err(CliError::Violation(v)),
        None => Ok(()),
    }
}

fn main() {
    env_logger::init();

    let cfg = match config::load() {
        Ok(x) => x,
        Err(x) => {
            error!("{}", x);
            eprintln!("mcpu: {}", x);
            std::process::exit(1);
        }
    };

    match run(&cfg) {
        Ok(()) => {}
        Err(x @ CliError::Violation(_)) => {
            error!("{}", x);
            std::process::exit(2);
        }
        Err(x) => {
            error!("{}", x);
            eprintln!("mcpu: {}", x);
            std::process::exit(1);
        }
    }
}
