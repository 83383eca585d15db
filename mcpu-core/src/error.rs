use thiserror::Error;

/// Reasons a program image is refused by `Program::validate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProgramError {
    #[error("main program is empty")]
    EmptyMain,
    #[error("main program executes ERET at {pc:#05x}")]
    EretInMain { pc: u32 },
    #[error("main program writes the handler counter at {pc:#05x}")]
    MainWritesHandlerCounter { pc: u32 },
    #[error("handler routine has no ERET")]
    HandlerWithoutEret,
    #[error("handler routine writes COP0 register {reg} at {pc:#05x}")]
    HandlerWritesCp0 { pc: u32, reg: &'static str },
    #[error("handler routine clobbers r{reg} at {pc:#05x}, only k0/k1 may be written")]
    HandlerClobbersRegister { pc: u32, reg: u8 },
    #[error("handler routine writes the progress counter at {pc:#05x}")]
    HandlerWritesProgressCounter { pc: u32 },
    #[error("software write of EPC at {pc:#05x}")]
    EpcWrite { pc: u32 },
    #[error("branch at {pc:#05x} leaves its segment (target {target:#05x})")]
    BranchOutOfSegment { pc: u32, target: u32 },
    #[error("{kind} segment at {base:#05x} falls through past {pc:#05x}")]
    FallsThrough { kind: &'static str, base: u32, pc: u32 },
    #[error("segment at {base:#05x} with {len} instructions exceeds the address space")]
    SegmentOutOfRange { base: u32, len: usize },
    #[error("no free segment slot for code at {base:#05x}")]
    SegmentTableFull { base: u32 },
    #[error("segments overlap at {addr:#05x}")]
    SegmentOverlap { addr: u32 },
    #[error("handler routine is present but no entry address is configured")]
    HandlerWithoutEntry,
}
