use heapless::Vec;
use log::error;

use crate::consts::MAX_SEGMENTS;
use crate::error::ProgramError;
use crate::instr::Inst;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentKind {
    Main,
    Handler,
}

#[derive(Clone, Copy)]
struct Segment<'a> {
    kind: SegmentKind,
    base: u32,
    code: &'a [Inst],
}

impl<'a> Segment<'a> {
    fn fetch(&self, pc: u32) -> Option<Inst> {
        if pc < self.base {
            return None;
        }
        self.code.get((pc - self.base) as usize).copied()
    }
}

///
/// Read-only instruction memory. Holds borrowed code segments at fixed base
/// addresses; addresses that fall outside every segment are unmapped.
///
pub struct TextMem<'a> {
    segments: Vec<Segment<'a>, MAX_SEGMENTS>,
}

impl<'a> TextMem<'a> {
    pub fn new() -> TextMem<'a> {
        TextMem {
            segments: Vec::new(),
        }
    }

    pub fn load(
        &mut self,
        kind: SegmentKind,
        base: u32,
        code: &'a [Inst],
    ) -> Result<(), ProgramError> {
        if code.is_empty() {
            return Ok(());
        }
        match self.segments.push(Segment { kind, base, code }) {
            Err(_) => {
                error!("Unable to load {:?} segment at {:#05x}, no free slots", kind, base);
                Err(ProgramError::SegmentTableFull { base })
            }
            _ => Ok(()),
        }
    }

    pub fn fetch(&self, pc: u32) -> Option<(SegmentKind, Inst)> {
        self.segments
            .iter()
            .find_map(|s| s.fetch(pc).map(|inst| (s.kind, inst)))
    }
}

#[cfg(test)]
mod text_unittests {
    use super::{SegmentKind, TextMem};
    use crate::consts::MAX_SEGMENTS;
    use crate::error::ProgramError;
    use crate::instr::Inst;

    #[test]
    fn test_text_fetch() {
        let main = [Inst::Nop, Inst::J { target: 0 }];
        let handler = [Inst::Eret];

        let mut text = TextMem::new();
        assert_eq!(text.load(SegmentKind::Main, 0, &main), Ok(()));
        assert_eq!(text.load(SegmentKind::Handler, 0x180, &handler), Ok(()));

        assert_eq!(text.fetch(0), Some((SegmentKind::Main, Inst::Nop)));
        assert_eq!(
            text.fetch(1),
            Some((SegmentKind::Main, Inst::J { target: 0 }))
        );
        assert_eq!(text.fetch(2), None);
        assert_eq!(text.fetch(0x17f), None);
        assert_eq!(text.fetch(0x180), Some((SegmentKind::Handler, Inst::Eret)));
        assert_eq!(text.fetch(0x181), None);
    }

    #[test]
    fn test_text_load_full() {
        let code = [Inst::Eret];
        let mut text = TextMem::new();

        // Empty segments take no slot
        assert_eq!(text.load(SegmentKind::Main, 0x10, &[]), Ok(()));
        for i in 0..MAX_SEGMENTS as u32 {
            assert_eq!(text.load(SegmentKind::Handler, i * 0x10, &code), Ok(()));
        }
        assert_eq!(
            text.load(SegmentKind::Handler, 0x200, &code),
            Err(ProgramError::SegmentTableFull { base: 0x200 })
        );
        assert_eq!(text.fetch(0x200), None);
    }
}
