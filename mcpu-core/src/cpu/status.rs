use log::{debug, warn};

use crate::consts::cpu::{STATUS_EXL, STATUS_IE};

///
/// ## `StatusReg`
///
/// COP0 Status register model. Only two bits are implemented: IE (interrupt
/// enable) and EXL (exception level). Software can only change IE through a
/// status write; EXL is owned by the exception controller.
///
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatusReg {
    ie: bool,
    exl: bool,
}

impl StatusReg {
    pub const fn new() -> StatusReg {
        StatusReg {
            ie: false,
            exl: false,
        }
    }

    pub fn reset(&mut self) {
        self.ie = false;
        self.exl = false;
    }

    pub fn ie(&self) -> bool {
        self.ie
    }

    pub fn exl(&self) -> bool {
        self.exl
    }

    /// A pending interrupt may only be taken with IE set and EXL clear.
    pub fn is_takeable(&self) -> bool {
        self.ie && !self.exl
    }

    pub fn bits(&self) -> u32 {
        let mut val = 0;
        if self.ie {
            val |= STATUS_IE;
        }
        if self.exl {
            val |= STATUS_EXL;
        }
        val
    }

    ///
    /// ## `write_bits` Function
    ///
    /// Software write path (`mtc0 rt, Status`). The IE bit is taken from the
    /// value, the EXL bit is read-only to software and is ignored.
    ///
    pub(crate) fn write_bits(&mut self, value: u32) {
        if (value & STATUS_EXL) != 0 && !self.exl {
            warn!("Ignoring software write of Status.EXL ({:#x})", value);
        }
        self.ie = (value & STATUS_IE) != 0;
        debug!("Status: IE={:?} EXL={:?}", self.ie, self.exl);
    }

    pub(crate) fn set_exl(&mut self, exl: bool) {
        self.exl = exl;
    }
}
