#![no_std]

use mcpu_core::consts::cpu::{REG_K0, REG_K1, REG_T0, REG_T1, REG_T2, REG_ZERO, STATUS_IE};
use mcpu_core::consts::memmap::{DEFAULT_HANDLER_ENTRY, HANDLER_COUNTER, PROGRESS_COUNTER};
use mcpu_core::instr::{Cp0Reg, Inst};
use mcpu_core::Program;

/// Iterations of the delay loop between two progress counter increments.
pub const LOOP_WORK: i32 = 5;

/// Iterations the `DELAYED_ENABLE` image spins before setting IE.
pub const STARTUP_DELAY: i32 = 25;

/// Iterations of the busy loop inside the `SLOW_HANDLER` handler.
pub const SLOW_HANDLER_WORK: i32 = 20;

/// Address of the first instruction of the counting loop in `MAIN_LOOP`.
pub const MAIN_LOOP_START: u32 = 2;

macro_rules! counting_loop {
    ($start:expr) => {
        [
            Inst::Lw { rt: REG_T1, addr: PROGRESS_COUNTER },
            Inst::Addi { rt: REG_T1, rs: REG_T1, imm: 1 },
            Inst::Sw { rt: REG_T1, addr: PROGRESS_COUNTER },
            Inst::Li { rt: REG_T2, imm: LOOP_WORK },
            Inst::Addi { rt: REG_T2, rs: REG_T2, imm: -1 },
            Inst::Bne { rs: REG_T2, rt: REG_ZERO, target: $start + 4 },
            Inst::J { target: $start },
        ]
    };
}

/// Sets Status.IE, then loops forever incrementing the progress counter.
pub static MAIN_LOOP: [Inst; 9] = {
    let body = counting_loop!(MAIN_LOOP_START);
    [
        Inst::Li { rt: REG_T0, imm: STATUS_IE as i32 },
        Inst::Mtc0 { rt: REG_T0, reg: Cp0Reg::Status },
        body[0], body[1], body[2], body[3], body[4], body[5], body[6],
    ]
};

/// Same loop, but IE is never set.
pub static MAIN_LOOP_NO_ENABLE: [Inst; 7] = counting_loop!(0);

/// Spins `STARTUP_DELAY` iterations with interrupts disabled before setting IE.
pub static MAIN_DELAYED_ENABLE: [Inst; 12] = {
    let body = counting_loop!(5);
    [
        Inst::Li { rt: REG_T0, imm: STARTUP_DELAY },
        Inst::Addi { rt: REG_T0, rs: REG_T0, imm: -1 },
        Inst::Bne { rs: REG_T0, rt: REG_ZERO, target: 1 },
        Inst::Li { rt: REG_T0, imm: STATUS_IE as i32 },
        Inst::Mtc0 { rt: REG_T0, reg: Cp0Reg::Status },
        body[0], body[1], body[2], body[3], body[4], body[5], body[6],
    ]
};

/// Increments the handler counter and returns. Only touches k0.
pub static HANDLER: [Inst; 4] = [
    Inst::Lw { rt: REG_K0, addr: HANDLER_COUNTER },
    Inst::Addi { rt: REG_K0, rs: REG_K0, imm: 1 },
    Inst::Sw { rt: REG_K0, addr: HANDLER_COUNTER },
    Inst::Eret,
];

/// Handler that burns `SLOW_HANDLER_WORK` iterations before returning.
pub static SLOW_HANDLER: [Inst; 7] = [
    Inst::Lw { rt: REG_K0, addr: HANDLER_COUNTER },
    Inst::Addi { rt: REG_K0, rs: REG_K0, imm: 1 },
    Inst::Sw { rt: REG_K0, addr: HANDLER_COUNTER },
    Inst::Li { rt: REG_K1, imm: SLOW_HANDLER_WORK },
    Inst::Addi { rt: REG_K1, rs: REG_K1, imm: -1 },
    Inst::Bne { rs: REG_K1, rt: REG_ZERO, target: DEFAULT_HANDLER_ENTRY + 4 },
    Inst::Eret,
];

/// The interrupt test: main loop plus counting handler.
pub static INTERRUPT_TEST: Program<'static> = Program {
    name: "irqtest",
    main: &MAIN_LOOP,
    handler: &HANDLER,
    handler_entry: Some(DEFAULT_HANDLER_ENTRY),
};

pub static DELAYED_ENABLE: Program<'static> = Program {
    name: "delayed",
    main: &MAIN_DELAYED_ENABLE,
    handler: &HANDLER,
    handler_entry: Some(DEFAULT_HANDLER_ENTRY),
};

pub static NO_ENABLE: Program<'static> = Program {
    name: "noenable",
    main: &MAIN_LOOP_NO_ENABLE,
    handler: &HANDLER,
    handler_entry: Some(DEFAULT_HANDLER_ENTRY),
};

pub static NO_HANDLER: Program<'static> = Program {
    name: "nohandler",
    main: &MAIN_LOOP,
    handler: &[],
    handler_entry: None,
};

pub static SLOW: Program<'static> = Program {
    name: "slowhandler",
    main: &MAIN_LOOP,
    handler: &SLOW_HANDLER,
    handler_entry: Some(DEFAULT_HANDLER_ENTRY),
};

pub static ALL: [&Program<'static>; 5] =
    [&INTERRUPT_TEST, &DELAYED_ENABLE, &NO_ENABLE, &NO_HANDLER, &SLOW];

pub fn by_name(name: &str) -> Option<&'static Program<'static>> {
    ALL.iter().copied().find(|p| p.name == name)
}
