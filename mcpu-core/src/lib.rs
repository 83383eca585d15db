#![cfg_attr(not(test), no_std)]

pub mod bench;
pub mod consts;
pub mod cpu;
pub mod error;
pub mod instr;
pub mod irq;
pub mod mem;
pub mod monitor;
pub mod program;


pub use cpu::{Counters, Cpu, CpuConfig, CpuEvent, IrqPolicy, StepKind};
pub use error::ProgramError;
pub use program::Program;
