use log::error;

use crate::consts::DATA_NUM_WORDS;

#[derive(Clone)]
pub struct DataRam {
    words: [u32; DATA_NUM_WORDS],
}

impl DataRam {
    pub const fn new() -> DataRam {
        DataRam {
            words: [0; DATA_NUM_WORDS],
        }
    }

    pub fn reset(&mut self) {
        self.words = [0; DATA_NUM_WORDS];
    }

    pub fn read(&self, addr: u32) -> u32 {
        match self.words.get(addr as usize) {
            Some(val) => *val,
            None => {
                error!("Data read outside of RAM: {:#x}", addr);
                0
            }
        }
    }

    pub fn write(&mut self, addr: u32, val: u32) {
        match self.words.get_mut(addr as usize) {
            Some(word) => *word = val,
            None => {
                error!("Data write outside of RAM: {:#x}", addr);
            }
        }
    }
}
