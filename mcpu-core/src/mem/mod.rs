mod ram;
mod text;

pub use text::SegmentKind;

use crate::consts::memmap;
use crate::error::ProgramError;
use crate::program::Program;

pub struct MemoryMap<'a> {
    ram: ram::DataRam,
    text: text::TextMem<'a>,
}

impl<'a> MemoryMap<'a> {
    pub fn new_blank() -> MemoryMap<'a> {
        MemoryMap {
            ram: ram::DataRam::new(),
            text: text::TextMem::new(),
        }
    }

    ///
    /// ## `new` Function
    ///
    /// Builds the memory map for a program image. The image is validated
    /// first; the main program lands at the reset vector and the handler at
    /// its entry address.
    ///
    pub fn new(program: &Program<'a>) -> Result<MemoryMap<'a>, ProgramError> {
        program.validate()?;

        let mut mm = MemoryMap::new_blank();
        mm.text
            .load(SegmentKind::Main, memmap::RESET_VECTOR, program.main)?;
        if let Some(entry) = program.handler_entry {
            mm.text.load(SegmentKind::Handler, entry, program.handler)?;
        }
        Ok(mm)
    }

    pub fn reset(&mut self) {
        self.ram.reset();
    }

    pub fn fetch(&self, pc: u32) -> Option<(SegmentKind, crate::instr::Inst)> {
        self.text.fetch(pc)
    }

    pub fn read(&self, addr: u32) -> u32 {
        self.ram.read(addr)
    }

    pub fn write(&mut self, addr: u32, val: u32) {
        self.ram.write(addr, val)
    }
}
