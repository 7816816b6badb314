//! Submission ordering
//!
//! Builds the final work queue from discovered units: stress replication
//! first, then either a shuffle or a lexicographic sort.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::VecDeque;
use tracing::debug;

use crate::config::RunConfig;
use crate::models::UnitId;

/// Orders unit references into a submission queue
#[derive(Clone, Debug)]
pub struct Dispatcher {
    randomize: bool,
    stress_multiplier: usize,
    seed: Option<u64>,
}

impl Dispatcher {
    pub fn new(config: &RunConfig) -> Self {
        Self {
            randomize: config.randomize,
            stress_multiplier: config.stress_multiplier.max(1),
            seed: config.seed,
        }
    }

    /// Build the submission queue
    ///
    /// Every replica is a separate work item. Without randomization the order
    /// is the same on every run over the same catalog.
    pub fn dispatch(&self, units: Vec<UnitId>) -> VecDeque<UnitId> {
        let mut queue: Vec<UnitId> = if self.stress_multiplier > 1 {
            let mut replicated = Vec::with_capacity(units.len() * self.stress_multiplier);
            for _ in 0..self.stress_multiplier {
                replicated.extend(units.iter().cloned());
            }
            replicated
        } else {
            units
        };

        if self.randomize {
            match self.seed {
                Some(seed) => queue.shuffle(&mut StdRng::seed_from_u64(seed)),
                None => queue.shuffle(&mut rand::rng()),
            }
        } else {
            queue.sort();
        }

        debug!(
            "ready to run {} units:\n  {}",
            queue.len(),
            queue
                .iter()
                .map(UnitId::as_str)
                .collect::<Vec<_>>()
                .join("\n  ")
        );

        queue.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn ids(names: &[&str]) -> Vec<UnitId> {
        names.iter().map(|n| UnitId::from(*n)).collect()
    }

    fn config(randomize: bool, stress_multiplier: usize, seed: Option<u64>) -> RunConfig {
        RunConfig {
            randomize,
            stress_multiplier,
            seed,
            ..RunConfig::default()
        }
    }

    #[test]
    fn test_sorted_by_default() {
        let dispatcher = Dispatcher::new(&RunConfig::default());
        let queue = dispatcher.dispatch(ids(&["c", "a.z", "b", "a.b"]));
        let names: Vec<_> = queue.iter().map(UnitId::as_str).collect();
        assert_eq!(names, vec!["a.b", "a.z", "b", "c"]);
    }

    #[test]
    fn test_sort_is_deterministic() {
        let dispatcher = Dispatcher::new(&RunConfig::default());
        let first = dispatcher.dispatch(ids(&["e", "d", "c", "b", "a"]));
        let second = dispatcher.dispatch(ids(&["b", "e", "a", "d", "c"]));
        assert_eq!(first, second);
    }

    #[test]
    fn test_stress_replication() {
        let dispatcher = Dispatcher::new(&config(false, 10, None));
        let queue = dispatcher.dispatch(ids(&["a", "b", "c"]));
        assert_eq!(queue.len(), 30);

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for id in &queue {
            *counts.entry(id.as_str()).or_default() += 1;
        }
        assert!(counts.values().all(|&n| n == 10));
        assert_eq!(queue.front(), Some(&UnitId::from("a")));
        assert_eq!(queue.back(), Some(&UnitId::from("c")));
    }

    #[test]
    fn test_randomize_keeps_every_item() {
        let names: Vec<String> = (0..50).map(|i| format!("unit{i:02}")).collect();
        let units: Vec<UnitId> = names.iter().map(|n| UnitId::from(n.as_str())).collect();

        let dispatcher = Dispatcher::new(&config(true, 2, None));
        let mut queue: Vec<UnitId> = dispatcher.dispatch(units.clone()).into();
        assert_eq!(queue.len(), 100);

        queue.sort();
        let mut expected: Vec<UnitId> = units.iter().chain(units.iter()).cloned().collect();
        expected.sort();
        assert_eq!(queue, expected);
    }

    #[test]
    fn test_seeded_shuffle_is_reproducible() {
        let units: Vec<UnitId> = (0..20).map(|i| UnitId::new(format!("u{i}"))).collect();
        let dispatcher = Dispatcher::new(&config(true, 1, Some(42)));
        let first = dispatcher.dispatch(units.clone());
        let second = dispatcher.dispatch(units);
        assert_eq!(first, second);
    }
}
