use log::{debug, trace, warn};

use super::status::StatusReg;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CtlState {
    Running,
    Dispatching,
    InHandler,
    Returning,
}

///
/// How an interrupt line that stays asserted is interpreted.
///
///  - `Edge` - each assertion episode is taken at most once. After a dispatch
///    the line has to be sampled low at a boundary before another dispatch.
///  - `Level` - every boundary where the line is high and the status register
///    allows it dispatches, including the boundary right after a return.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IrqPolicy {
    Edge,
    Level,
}

impl Default for IrqPolicy {
    fn default() -> Self {
        IrqPolicy::Edge
    }
}

///
/// ## `ExceptionController`
///
/// Samples the interrupt line at instruction boundaries and owns the
/// resumption state (EPC) while the handler runs. The only code that sets or
/// clears Status.EXL.
///
pub struct ExceptionController {
    state: CtlState,
    policy: IrqPolicy,
    handler_entry: Option<u32>,
    epc: Option<u32>,

    line: bool,
    armed: bool,

    dispatches: u32,
    returns: u32,
}

impl ExceptionController {
    pub fn new(policy: IrqPolicy, handler_entry: Option<u32>) -> ExceptionController {
        ExceptionController {
            state: CtlState::Running,
            policy,
            handler_entry,
            epc: None,
            line: false,
            armed: true,
            dispatches: 0,
            returns: 0,
        }
    }

    pub fn reset(&mut self) {
        self.state = CtlState::Running;
        self.epc = None;
        self.line = false;
        self.armed = true;
        self.dispatches = 0;
        self.returns = 0;
    }

    pub fn state(&self) -> CtlState {
        self.state
    }

    pub fn policy(&self) -> IrqPolicy {
        self.policy
    }

    pub fn handler_entry(&self) -> Option<u32> {
        self.handler_entry
    }

    pub fn epc(&self) -> Option<u32> {
        self.epc
    }

    pub fn dispatches(&self) -> u32 {
        self.dispatches
    }

    pub fn returns(&self) -> u32 {
        self.returns
    }

    pub fn line(&self) -> bool {
        self.line
    }

    ///
    /// ## `sample` Function
    ///
    /// Latches the interrupt line level seen at the current instruction
    /// boundary. A low level re-arms the edge detector.
    ///
    pub fn sample(&mut self, line: bool) {
        if line != self.line {
            trace!("IRQ line {:?} -> {:?}", self.line, line);
        }
        if !line {
            self.armed = true;
        }
        self.line = line;
    }

    /// Line is asserted and, under the active policy, not already consumed.
    pub fn is_pending(&self) -> bool {
        match self.policy {
            IrqPolicy::Edge => self.line && self.armed,
            IrqPolicy::Level => self.line,
        }
    }

    pub fn should_dispatch(&self, status: &StatusReg) -> bool {
        self.state == CtlState::Running
            && self.handler_entry.is_some()
            && self.is_pending()
            && status.is_takeable()
    }

    ///
    /// ## `dispatch` Function
    ///
    /// Performs RUNNING -> DISPATCHING -> IN_HANDLER in one step: saves the
    /// address of the next main program instruction, raises EXL and returns
    /// the handler entry address to continue from. Returns `None`, with no
    /// state change, if the dispatch conditions do not hold.
    ///
    pub(crate) fn dispatch(&mut self, status: &mut StatusReg, pc: u32) -> Option<u32> {
        if !self.should_dispatch(status) {
            return None;
        }
        let entry = self.handler_entry?;

        self.state = CtlState::Dispatching;
        self.epc = Some(pc);
        status.set_exl(true);
        if self.policy == IrqPolicy::Edge {
            self.armed = false;
        }
        self.dispatches += 1;
        self.state = CtlState::InHandler;

        debug!("Dispatch #{}: EPC={:#05x} -> {:#05x}", self.dispatches, pc, entry);
        Some(entry)
    }

    ///
    /// ## `eret` Function
    ///
    /// Performs IN_HANDLER -> RETURNING -> RUNNING: hands back the saved
    /// resumption address exactly once and clears EXL. An ERET outside of the
    /// handler is ignored.
    ///
    pub(crate) fn eret(&mut self, status: &mut StatusReg) -> Option<u32> {
        if self.state != CtlState::InHandler {
            warn!("ERET outside of handler context ({:?}), ignoring", self.state);
            return None;
        }

        self.state = CtlState::Returning;
        let resume = self.epc.take();
        status.set_exl(false);
        self.returns += 1;
        self.state = CtlState::Running;

        debug!("Return #{}: resume at {:x?}", self.returns, resume);
        resume
    }
}
