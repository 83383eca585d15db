use std::io::BufRead;

use crossbeam_channel::{Receiver, Sender};
use log::{info, warn};

use mcpu_core::irq::{IrqLine, PulseTrain};

use crate::config::MAX_PULSES;

///
/// Interrupt line seen by the CPU: the OR of a scheduled pulse train and a
/// level set by hand from the interactive stdin driver.
///
pub struct Stimulus {
    pulses: PulseTrain<MAX_PULSES>,
    manual: Option<Receiver<bool>>,
    level: bool,
}

impl Stimulus {
    pub fn new(windows: &[(u64, u64)], manual: Option<Receiver<bool>>) -> Stimulus {
        let mut pulses = PulseTrain::new();
        for (start, width) in windows.iter() {
            pulses.push(*start, *width);
        }
        Stimulus {
            pulses,
            manual,
            level: false,
        }
    }

    /// Cycle after which the scheduled pulses no longer assert the line.
    pub fn end(&self) -> u64 {
        self.pulses.end()
    }
}

impl IrqLine for Stimulus {
    fn sample(&mut self, cycle: u64) -> bool {
        if let Some(rx) = self.manual.as_ref() {
            for level in rx.try_iter() {
                if level != self.level {
                    info!("IRQ line set {} at cycle {}", if level { "high" } else { "low" }, cycle);
                }
                self.level = level;
            }
        }
        self.level || self.pulses.is_asserted(cycle)
    }
}

///
/// Spawns the stdin reader for `--interactive`. Each line sets the manual
/// level: `1`/`on` asserts, `0`/`off` deasserts, anything else toggles.
///
pub fn spawn_stdin_driver(tx: Sender<bool>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        let mut level = false;
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(x) => x,
                Err(x) => {
                    warn!("Stopping stdin driver: {:?}", x);
                    break;
                }
            };
            level = match line.trim() {
                "1" | "on" => true,
                "0" | "off" => false,
                _ => !level,
            };
            if tx.send(level).is_err() {
                break;
            }
        }
    });
}
