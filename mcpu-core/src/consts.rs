
/* Number of general purpose registers */
pub const NUM_REGS: usize = 32;

/* Number of words within the data memory */
pub const DATA_NUM_WORDS: usize = 256;

/* Maximum number of code segments a memory map can hold */
pub const MAX_SEGMENTS: usize = 4;

/* Capacity of the CPU event queue (heapless queues hold N - 1 items) */
pub const EVENT_QUEUE_LEN: usize = 8;

pub mod cpu {
    pub const REG_ZERO: u8 = 0;
    pub const REG_T0: u8 = 8;
    pub const REG_T1: u8 = 9;
    pub const REG_T2: u8 = 10;

    // Kernel registers. The only registers an interrupt handler may touch.
    pub const REG_K0: u8 = 26;
    pub const REG_K1: u8 = 27;

    pub const STATUS_IE: u32 = 1 << 0;
    pub const STATUS_EXL: u32 = 1 << 1;
}

pub mod memmap {
    /// Address the CPU starts fetching from after a reset. The main program
    /// segment is always loaded here.
    pub const RESET_VECTOR: u32 = 0x000;

    /// Handler entry used by the built-in program images.
    pub const DEFAULT_HANDLER_ENTRY: u32 = 0x180;

    pub const PROGRESS_COUNTER: u32 = 0x40;
    pub const HANDLER_COUNTER: u32 = 0x41;
}

///
/// Number of clock cycles each step takes on the multi-cycle datapath. A load
/// goes through all five phases (fetch, decode, execute, memory, writeback),
/// branches and jumps resolve in the execute phase.
///
pub mod cycles {
    pub const ALU: u16 = 4;
    pub const LOAD: u16 = 5;
    pub const STORE: u16 = 4;
    pub const BRANCH: u16 = 3;
    pub const JUMP: u16 = 3;
    pub const COP0: u16 = 4;
    pub const ERET: u16 = 3;
    pub const DISPATCH: u16 = 3;
    pub const IDLE: u16 = 1;
}
