mod common;

use proptest::prelude::*;

use common::run;
use mcpu_core::cpu::IrqPolicy;
use mcpu_core::irq::PulseTrain;
use mcpu_programs::{INTERRUPT_TEST, SLOW};

const BUDGET: u64 = 3000;

fn policy() -> impl Strategy<Value = IrqPolicy> {
    prop_oneof![Just(IrqPolicy::Edge), Just(IrqPolicy::Level)]
}

/// Up to 8 pulses, each placed after a gap from the end of the previous one.
fn stimulus() -> impl Strategy<Value = Vec<(u64, u64)>> {
    prop::collection::vec((0u64..300, 1u64..250), 0..8)
}

fn train(stimulus: &[(u64, u64)]) -> (PulseTrain<8>, usize) {
    let mut train = PulseTrain::new();
    let mut at = 0;
    for (gap, width) in stimulus.iter() {
        at += gap;
        train.push(at, *width);
        at += width;
    }
    (train, stimulus.len())
}

proptest! {
    #[test]
    fn random_pulses_keep_protocol(stimulus in stimulus(), policy in policy()) {
        let (mut line, n) = train(&stimulus);
        let r = run(&INTERRUPT_TEST, &mut line, policy, BUDGET);

        prop_assert!(r.report.is_clean(), "{:?}", r.report);
        prop_assert!(r.summary.dispatches >= r.summary.returns);
        prop_assert!(r.summary.dispatches - r.summary.returns <= 1);
        prop_assert!(r.summary.counters.handler >= r.summary.returns);
        prop_assert!(r.summary.counters.handler <= r.summary.dispatches);
        match policy {
            IrqPolicy::Edge => {
                prop_assert!(r.summary.dispatches as usize <= n);
                prop_assert_eq!(r.summary.dispatches, r.takeable_episodes());
            }
            IrqPolicy::Level => {
                let untaken = r.untaken_boundaries();
                prop_assert!(untaken.is_empty(), "not dispatched at {:?}", untaken);
            }
        }
    }

    #[test]
    fn random_pulses_preserve_main_stream(stimulus in stimulus(), policy in policy()) {
        let mut quiet: PulseTrain<8> = PulseTrain::new();
        let reference = run(&INTERRUPT_TEST, &mut quiet, policy, BUDGET);

        let (mut line, _) = train(&stimulus);
        let r = run(&SLOW, &mut line, policy, BUDGET);
        prop_assert!(r.report.is_clean(), "{:?}", r.report);

        let pcs = r.main_pcs();
        let expect = reference.main_pcs();
        prop_assert!(pcs.len() <= expect.len());
        prop_assert_eq!(&pcs[..], &expect[..pcs.len()]);

        let progress = r.progress_trace();
        prop_assert_eq!(&progress[..], &reference.progress_trace()[..progress.len()]);
    }
}
