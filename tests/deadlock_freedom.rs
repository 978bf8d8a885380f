use proptest::prelude::*;
use sortpool::harness::BatchHarness;
use sortpool::{Config, Record};
use std::time::Duration;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn batch_always_terminates(
        ages in proptest::collection::vec(0..40i32, 0..30),
        workers in 1..6usize,
        capacity in 1..6usize,
    ) {
        let records: Vec<Record> = ages
            .iter()
            .enumerate()
            .map(|(i, &age)| Record::new(format!("r{}", i % 7), age, i as f64))
            .collect();
        let config = Config::default()
            .with_workers(workers)
            .with_queue_capacity(capacity)
            .with_rounds(8);

        let harness = BatchHarness::new(config, Duration::from_secs(20));
        let outcome = harness.run(records.clone());
        prop_assert!(outcome.is_some(), "batch did not terminate");
        let outcome = outcome.unwrap().unwrap();

        prop_assert_eq!(outcome.processed, records.len());
        prop_assert_eq!(outcome.results.len(), ages.iter().filter(|&&a| a >= 18).count());
        prop_assert!(outcome.results.windows(2).all(|w| w[0].name <= w[1].name));
    }
}
