use crate::consts::cycles;
use crate::cpu::Cpu;

pub trait CpuLoadStore {
    fn lw(&mut self, rt: u8, addr: u32) -> u16;
    fn sw(&mut self, rt: u8, addr: u32) -> u16;
}

impl<'a> CpuLoadStore for Cpu<'a> {
    fn lw(&mut self, rt: u8, addr: u32) -> u16 {
        let val = self.read(addr);
        self.write_reg(rt, val);
        cycles::LOAD
    }

    fn sw(&mut self, rt: u8, addr: u32) -> u16 {
        let val = self.read_reg(rt);
        self.write(addr, val);
        cycles::STORE
    }
}
