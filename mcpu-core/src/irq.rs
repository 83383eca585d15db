use heapless::Vec;
use log::error;

///
/// External interrupt line driven by the environment. The CPU samples it once
/// per instruction boundary, passing the number of cycles elapsed since reset.
///
pub trait IrqLine {
    fn sample(&mut self, cycle: u64) -> bool;
}

/// Line held at a fixed level.
#[derive(Clone, Copy, Debug, Default)]
pub struct Held(pub bool);

impl IrqLine for Held {
    fn sample(&mut self, _cycle: u64) -> bool {
        self.0
    }
}

/// Line asserted over the cycle window `[start, start + width)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pulse {
    pub start: u64,
    pub width: u64,
}

impl Pulse {
    pub fn contains(&self, cycle: u64) -> bool {
        cycle >= self.start && cycle - self.start < self.width
    }

    pub fn end(&self) -> u64 {
        self.start.saturating_add(self.width)
    }
}

///
/// ## `PulseTrain`
///
/// Stimulus schedule made of up to `N` pulses. Pulses may be given in any
/// order and may overlap; the line is asserted while any pulse covers the
/// sampled cycle.
///
#[derive(Clone, Debug, Default)]
pub struct PulseTrain<const N: usize> {
    pulses: Vec<Pulse, N>,
}

impl<const N: usize> PulseTrain<N> {
    pub fn new() -> Self {
        Self { pulses: Vec::new() }
    }

    ///
    /// Adds a pulse to the schedule. Returns false if the schedule is full,
    /// in which case the pulse is dropped.
    ///
    pub fn push(&mut self, start: u64, width: u64) -> bool {
        match self.pulses.push(Pulse { start, width }) {
            Err(x) => {
                error!("Unable to add {:?} to the pulse train", x);
                false
            }
            _ => true,
        }
    }

    pub fn pulses(&self) -> &[Pulse] {
        &self.pulses
    }

    pub fn is_asserted(&self, cycle: u64) -> bool {
        self.pulses.iter().any(|p| p.contains(cycle))
    }

    /// Last cycle at which the line is asserted, plus one.
    pub fn end(&self) -> u64 {
        self.pulses.iter().map(|p| p.end()).max().unwrap_or(0)
    }
}

impl<const N: usize> IrqLine for PulseTrain<N> {
    fn sample(&mut self, cycle: u64) -> bool {
        self.is_asserted(cycle)
    }
}

#[cfg(test)]
mod irq_unittests {
    use super::{Held, IrqLine, PulseTrain};

    #[test]
    fn test_held_line() {
        let mut line = Held(true);
        assert_eq!(line.sample(0), true);
        assert_eq!(line.sample(u64::MAX), true);
        assert_eq!(Held::default().sample(10), false);
    }

    #[test]
    fn test_pulse_train_windows() {
        let mut train: PulseTrain<4> = PulseTrain::new();
        assert!(train.push(100, 10));
        assert!(train.push(10, 5));

        let src = [
            (0, false),
            (9, false),
            (10, true),
            (14, true),
            (15, false),
            (99, false),
            (100, true),
            (109, true),
            (110, false),
        ];
        for (cycle, expect) in src.iter() {
            assert_eq!(train.sample(*cycle), *expect, "cycle {}", cycle);
        }
        assert_eq!(train.end(), 110);
    }

    #[test]
    fn test_pulse_train_full() {
        let mut train: PulseTrain<2> = PulseTrain::new();
        assert!(train.push(0, 1));
        assert!(train.push(5, 1));
        assert_eq!(train.push(10, 1), false);
        assert_eq!(train.pulses().len(), 2);
    }
}
