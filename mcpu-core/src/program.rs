use core::convert::TryFrom;

use crate::consts::cpu::{REG_K0, REG_K1};
use crate::consts::memmap;
use crate::error::ProgramError;
use crate::instr::{Cp0Reg, Inst};

///
/// ## `Program`
///
/// A loadable image: the main program, loaded at the reset vector, and the
/// interrupt handler routine, loaded at `handler_entry`. Without an entry
/// address the controller never dispatches.
///
#[derive(Clone, Copy, Debug)]
pub struct Program<'a> {
    pub name: &'a str,
    pub main: &'a [Inst],
    pub handler: &'a [Inst],
    pub handler_entry: Option<u32>,
}

fn segment_contains(base: u32, code: &[Inst], addr: u32) -> bool {
    addr >= base && ((addr - base) as usize) < code.len()
}

/// First address past the segment, or an error if it does not fit in `u32`.
fn segment_end(base: u32, code: &[Inst]) -> Result<u32, ProgramError> {
    let len = code.len();
    u32::try_from(len)
        .ok()
        .and_then(|n| base.checked_add(n))
        .ok_or(ProgramError::SegmentOutOfRange { base, len })
}

impl<'a> Program<'a> {
    ///
    /// ## `validate` Function
    ///
    /// Rejects images whose code could break the interrupt protocol once
    /// running: the handler must only touch the kernel registers and its own
    /// counter, must end in ERET and must not write COP0 state; the main
    /// program must not execute ERET, write EPC or write the handler counter.
    /// Control flow may not leave a segment, neither by a branch nor by running
    /// past the last instruction: main has to end in `J`, the handler in `J`
    /// or ERET.
    ///
    pub fn validate(&self) -> Result<(), ProgramError> {
        if self.main.is_empty() {
            return Err(ProgramError::EmptyMain);
        }

        let base = memmap::RESET_VECTOR;
        let main_end = segment_end(base, self.main)?;
        for (offset, inst) in self.main.iter().enumerate() {
            let pc = base + offset as u32;
            match *inst {
                Inst::Eret => return Err(ProgramError::EretInMain { pc }),
                Inst::Mtc0 {
                    reg: Cp0Reg::Epc, ..
                } => return Err(ProgramError::EpcWrite { pc }),
                _ => {}
            }
            if inst.store_addr() == Some(memmap::HANDLER_COUNTER) {
                return Err(ProgramError::MainWritesHandlerCounter { pc });
            }
            if let Some(target) = inst.branch_target() {
                if !segment_contains(base, self.main, target) {
                    return Err(ProgramError::BranchOutOfSegment { pc, target });
                }
            }
        }
        match self.main.last() {
            Some(Inst::J { .. }) => {}
            _ => {
                return Err(ProgramError::FallsThrough {
                    kind: "main",
                    base,
                    pc: main_end - 1,
                })
            }
        }

        let entry = match self.handler_entry {
            Some(entry) => entry,
            None if self.handler.is_empty() => return Ok(()),
            None => return Err(ProgramError::HandlerWithoutEntry),
        };
        let handler_end = segment_end(entry, self.handler)?;

        if !self.handler.iter().any(|inst| *inst == Inst::Eret) {
            return Err(ProgramError::HandlerWithoutEret);
        }

        for (offset, inst) in self.handler.iter().enumerate() {
            let pc = entry + offset as u32;
            if let Some(reg) = inst.cp0_write() {
                let reg = match reg {
                    Cp0Reg::Status => "Status",
                    Cp0Reg::Epc => "Epc",
                };
                return Err(ProgramError::HandlerWritesCp0 { pc, reg });
            }
            if let Some(reg) = inst.dest_reg() {
                if reg != REG_K0 && reg != REG_K1 {
                    return Err(ProgramError::HandlerClobbersRegister { pc, reg });
                }
            }
            if inst.store_addr() == Some(memmap::PROGRESS_COUNTER) {
                return Err(ProgramError::HandlerWritesProgressCounter { pc });
            }
            if let Some(target) = inst.branch_target() {
                if !segment_contains(entry, self.handler, target) {
                    return Err(ProgramError::BranchOutOfSegment { pc, target });
                }
            }
        }
        match self.handler.last() {
            Some(Inst::J { .. }) | Some(Inst::Eret) => {}
            _ => {
                return Err(ProgramError::FallsThrough {
                    kind: "handler",
                    base: entry,
                    pc: handler_end - 1,
                })
            }
        }

        if entry < main_end && base < handler_end {
            return Err(ProgramError::SegmentOverlap {
                addr: entry.max(base),
            });
        }

        Ok(())
    }
}
