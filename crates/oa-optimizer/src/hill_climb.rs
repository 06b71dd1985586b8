//! Subset-sum hill climbing.
//!
//! A candidate is a sub-multiset of a fixed item list. Each iteration looks at
//! every single-item toggle of the candidate and moves to the best one that
//! strictly improves on the best fitness seen so far.

use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use oa_types::{InputError, OaResult};

/// Search parameters for a hill climb.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HillClimbConfig {
    /// Largest subset sum that is still feasible.
    pub target: f64,
    /// Number of iterations to run. There is no early exit.
    pub max_iterations: usize,
}

impl HillClimbConfig {
    pub fn new(target: f64) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn validate(&self) -> OaResult<()> {
        if self.max_iterations == 0 {
            return Err(InputError::NonPositiveIterations.into());
        }
        Ok(())
    }
}

impl Default for HillClimbConfig {
    fn default() -> Self {
        Self {
            target: 0.0,
            max_iterations: 1000,
        }
    }
}

/// Final state of a hill climb.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubsetSolution {
    pub subset: Vec<f64>,
    pub sum: f64,
    /// Fitness of the randomly drawn starting candidate.
    pub initial_fitness: f64,
    /// Best fitness reached; equals the fitness of `subset` unless the climb
    /// never left an infeasible start.
    pub best_fitness: f64,
    /// Whether `sum` is within the target. Serialized fitness values of an
    /// infeasible subset are `null`.
    pub feasible: bool,
    pub iterations: usize,
    /// Iterations that replaced the candidate.
    pub moves: usize,
}

/// Sum of `subset` if it does not exceed `target`, negative infinity otherwise.
pub fn fitness(subset: &[f64], target: f64) -> f64 {
    let total: f64 = subset.iter().sum();
    if total <= target {
        total
    } else {
        f64::NEG_INFINITY
    }
}

/// One neighbor per entry of `items`, in list order: the item is removed from
/// `current` if present, appended otherwise.
///
/// Duplicate items yield duplicate neighbors.
pub fn neighbors<'a>(current: &'a [f64], items: &'a [f64]) -> impl Iterator<Item = Vec<f64>> + 'a {
    items.iter().map(move |&item| toggle(current, item))
}

fn toggle(current: &[f64], item: f64) -> Vec<f64> {
    let mut neighbor = current.to_vec();
    match neighbor.iter().position(|&value| value == item) {
        Some(idx) => {
            neighbor.remove(idx);
        }
        None => neighbor.push(item),
    }
    neighbor
}

/// Hill climber bound to one item list.
#[derive(Debug, Clone)]
pub struct HillClimber<'a> {
    items: &'a [f64],
    config: HillClimbConfig,
}

impl<'a> HillClimber<'a> {
    pub fn new(items: &'a [f64], config: HillClimbConfig) -> OaResult<Self> {
        if items.is_empty() {
            return Err(InputError::EmptyItems.into());
        }
        config.validate()?;
        Ok(Self { items, config })
    }

    /// Begin from a random candidate: a uniform size in `1..=items.len()`,
    /// then a uniform sample of that many distinct positions.
    pub fn start<R: Rng + ?Sized>(&self, rng: &mut R) -> Climb<'a> {
        let size = rng.gen_range(1..=self.items.len());
        let candidate = index::sample(rng, self.items.len(), size)
            .into_iter()
            .map(|idx| self.items[idx])
            .collect();
        self.climb(candidate)
    }

    /// Begin from an explicit candidate, which must be a sub-multiset of the
    /// item list.
    pub fn start_from(&self, candidate: Vec<f64>) -> OaResult<Climb<'a>> {
        let mut pool = self.items.to_vec();
        for &value in &candidate {
            match pool.iter().position(|&item| item == value) {
                Some(idx) => {
                    pool.swap_remove(idx);
                }
                None => return Err(InputError::ForeignCandidate { value }.into()),
            }
        }
        Ok(self.climb(candidate))
    }

    /// Run a full climb from a random start.
    pub fn search<R: Rng + ?Sized>(&self, rng: &mut R) -> SubsetSolution {
        self.start(rng).run(self.config.max_iterations)
    }

    fn climb(&self, candidate: Vec<f64>) -> Climb<'a> {
        let best_fitness = fitness(&candidate, self.config.target);
        info!(
            "Starting hill climb over {} items toward target {} (initial fitness {})",
            self.items.len(),
            self.config.target,
            best_fitness
        );
        Climb {
            items: self.items,
            target: self.config.target,
            current: candidate,
            initial_fitness: best_fitness,
            best_fitness,
            iterations: 0,
            moves: 0,
        }
    }
}

/// An in-progress climb. Owns the current candidate; borrows the item list.
#[derive(Debug, Clone)]
pub struct Climb<'a> {
    items: &'a [f64],
    target: f64,
    current: Vec<f64>,
    initial_fitness: f64,
    best_fitness: f64,
    iterations: usize,
    moves: usize,
}

impl Climb<'_> {
    pub fn current(&self) -> &[f64] {
        &self.current
    }

    /// Best fitness seen so far. Never decreases.
    pub fn best_fitness(&self) -> f64 {
        self.best_fitness
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Perform one iteration. Returns `true` if the candidate was replaced.
    pub fn step(&mut self) -> bool {
        let mut next_move = None;
        for neighbor in neighbors(&self.current, self.items) {
            let score = fitness(&neighbor, self.target);
            if score > self.best_fitness {
                self.best_fitness = score;
                next_move = Some(neighbor);
            }
        }
        self.iterations += 1;

        match next_move {
            Some(neighbor) => {
                debug!(
                    "Iteration {}: moved to {:?} (fitness {})",
                    self.iterations, neighbor, self.best_fitness
                );
                self.current = neighbor;
                self.moves += 1;
                true
            }
            None => false,
        }
    }

    /// Run `iterations` more steps and return the result.
    pub fn run(mut self, iterations: usize) -> SubsetSolution {
        for _ in 0..iterations {
            self.step();
        }
        self.finish()
    }

    pub fn finish(self) -> SubsetSolution {
        let sum: f64 = self.current.iter().sum();
        info!(
            "Hill climb finished: sum {} after {} iterations ({} moves)",
            sum, self.iterations, self.moves
        );
        SubsetSolution {
            subset: self.current,
            sum,
            initial_fitness: self.initial_fitness,
            best_fitness: self.best_fitness,
            feasible: sum <= self.target,
            iterations: self.iterations,
            moves: self.moves,
        }
    }
}

/// Hill climb `items` toward `target` for `max_iterations` iterations.
pub fn search<R: Rng + ?Sized>(
    items: &[f64],
    target: f64,
    max_iterations: usize,
    rng: &mut R,
) -> OaResult<SubsetSolution> {
    let config = HillClimbConfig::new(target).with_max_iterations(max_iterations);
    Ok(HillClimber::new(items, config)?.search(rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use oa_types::OaError;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const ITEMS: [f64; 9] = [3.0, 7.0, 10.0, 2.0, 8.0, 4.0, 1.0, 20.0, -10.0];

    fn is_sub_multiset(candidate: &[f64], items: &[f64]) -> bool {
        let mut pool = items.to_vec();
        candidate.iter().all(|value| match pool.iter().position(|item| item == value) {
            Some(idx) => {
                pool.swap_remove(idx);
                true
            }
            None => false,
        })
    }

    #[test]
    fn fitness_is_sum_when_feasible() {
        assert_eq!(fitness(&[3.0, 7.0], 20.0), 10.0);
        assert_eq!(fitness(&[10.0, 10.0], 20.0), 20.0);
        assert_eq!(fitness(&[], 20.0), 0.0);
    }

    #[test]
    fn fitness_is_negative_infinity_past_target() {
        assert_eq!(fitness(&[20.0, 1.0], 20.0), f64::NEG_INFINITY);
        assert_eq!(fitness(&[1.0], -5.0), f64::NEG_INFINITY);
    }

    #[test]
    fn one_neighbor_per_item() {
        let all: Vec<Vec<f64>> = neighbors(&[3.0, 20.0], &ITEMS).collect();
        assert_eq!(all.len(), ITEMS.len());
        assert_eq!(all[0], vec![20.0]);
        assert_eq!(all[1], vec![3.0, 20.0, 7.0]);
        assert_eq!(all[7], vec![3.0]);
        assert_eq!(all[8], vec![3.0, 20.0, -10.0]);
    }

    #[test]
    fn duplicate_items_remove_one_copy_at_a_time() {
        let items = [5.0, 5.0, 1.0];
        let all: Vec<Vec<f64>> = neighbors(&[5.0, 5.0], &items).collect();
        assert_eq!(all, vec![vec![5.0], vec![5.0], vec![5.0, 5.0, 1.0]]);
    }

    #[test]
    fn empty_items_rejected() {
        let err = HillClimber::new(&[], HillClimbConfig::new(10.0)).unwrap_err();
        assert!(matches!(err, OaError::InvalidInput(InputError::EmptyItems)));

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(search(&[], 10.0, 100, &mut rng).is_err());
    }

    #[test]
    fn zero_iterations_rejected() {
        let config = HillClimbConfig::new(20.0).with_max_iterations(0);
        let err = HillClimber::new(&ITEMS, config).unwrap_err();
        assert!(matches!(
            err,
            OaError::InvalidInput(InputError::NonPositiveIterations)
        ));
    }

    #[test]
    fn start_from_rejects_foreign_values() {
        let climber = HillClimber::new(&ITEMS, HillClimbConfig::new(20.0)).unwrap();
        let err = climber.start_from(vec![99.0]).unwrap_err();
        assert!(matches!(
            err,
            OaError::InvalidInput(InputError::ForeignCandidate { value }) if value == 99.0
        ));
        // 3 appears once in the item list
        assert!(climber.start_from(vec![3.0, 3.0]).is_err());
    }

    #[test]
    fn climb_from_single_item_reaches_target() {
        let climber = HillClimber::new(&ITEMS, HillClimbConfig::new(20.0)).unwrap();
        let mut climb = climber.start_from(vec![3.0]).unwrap();

        assert!(climb.step());
        assert_eq!(climb.current(), &[3.0, 10.0]);
        assert_eq!(climb.best_fitness(), 13.0);

        assert!(climb.step());
        assert_eq!(climb.current(), &[3.0, 10.0, 7.0]);
        assert_eq!(climb.best_fitness(), 20.0);

        let solution = climb.run(998);
        assert_eq!(solution.sum, 20.0);
        assert_eq!(solution.iterations, 1000);
        assert_eq!(solution.moves, 2);
    }

    #[test]
    fn ties_keep_first_improving_neighbor() {
        // Adding 2 and removing -2 both reach 0; the earlier neighbor wins.
        let items = [2.0, -2.0, 5.0];
        let climber = HillClimber::new(&items, HillClimbConfig::new(1.0)).unwrap();
        let mut climb = climber.start_from(vec![-2.0]).unwrap();

        assert!(climb.step());
        assert_eq!(climb.current(), &[-2.0, 2.0]);
        assert_eq!(climb.best_fitness(), 0.0);
    }

    #[test]
    fn no_improvement_keeps_candidate() {
        let items = [1.0, 2.0, 3.0];
        let climber = HillClimber::new(&items, HillClimbConfig::new(3.0)).unwrap();
        let mut climb = climber.start_from(vec![3.0]).unwrap();

        assert!(!climb.step());
        assert_eq!(climb.current(), &[3.0]);
        assert_eq!(climb.iterations(), 1);
    }

    #[test]
    fn infeasible_start_can_stay_infeasible() {
        let climber = HillClimber::new(&ITEMS, HillClimbConfig::new(20.0)).unwrap();
        let solution = climber.start_from(ITEMS.to_vec()).unwrap().run(50);

        // Every single toggle of the full list still overshoots the target.
        assert_eq!(solution.initial_fitness, f64::NEG_INFINITY);
        assert_eq!(solution.best_fitness, f64::NEG_INFINITY);
        assert_eq!(solution.sum, 45.0);
        assert_eq!(solution.moves, 0);
        assert!(!solution.feasible);
    }

    #[test]
    fn best_fitness_never_decreases() {
        let climber = HillClimber::new(&ITEMS, HillClimbConfig::new(20.0)).unwrap();
        for seed in 0..32 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut climb = climber.start(&mut rng);
            let mut previous = climb.best_fitness();
            for _ in 0..25 {
                climb.step();
                assert!(climb.best_fitness() >= previous, "seed {seed}");
                previous = climb.best_fitness();
            }
        }
    }

    #[test]
    fn random_start_is_a_non_empty_sub_multiset() {
        let climber = HillClimber::new(&ITEMS, HillClimbConfig::new(20.0)).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..100 {
            let climb = climber.start(&mut rng);
            assert!(!climb.current().is_empty());
            assert!(climb.current().len() <= ITEMS.len());
            assert!(is_sub_multiset(climb.current(), &ITEMS));
        }
    }

    #[test]
    fn seeded_search_reaches_best_single_item() {
        let best_single = ITEMS
            .iter()
            .copied()
            .filter(|&item| item <= 20.0)
            .fold(f64::NEG_INFINITY, f64::max);

        // Roughly half of all seeds draw a feasible start that climbs to 20;
        // take the first such seed and check that it replays exactly.
        let seed = (0..64)
            .find(|&seed| {
                let solution =
                    search(&ITEMS, 20.0, 1000, &mut ChaCha8Rng::seed_from_u64(seed)).unwrap();
                solution.initial_fitness.is_finite() && solution.sum >= best_single
            })
            .expect("no seed in 0..64 reached the best single item");

        let first = search(&ITEMS, 20.0, 1000, &mut ChaCha8Rng::seed_from_u64(seed)).unwrap();
        let second = search(&ITEMS, 20.0, 1000, &mut ChaCha8Rng::seed_from_u64(seed)).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.iterations, 1000);
        assert!(first.feasible);
        assert!(first.sum <= 20.0, "seed {seed}: {}", first.sum);
        assert!(first.sum >= best_single, "seed {seed}: {}", first.sum);
        assert!(is_sub_multiset(&first.subset, &ITEMS));
    }

    #[test]
    fn feasible_starts_end_within_target() {
        for seed in 0..64 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let solution = search(&ITEMS, 20.0, 1000, &mut rng).unwrap();

            assert!(is_sub_multiset(&solution.subset, &ITEMS), "seed {seed}");
            if solution.initial_fitness.is_finite() {
                assert!(solution.feasible, "seed {seed}");
                assert!(solution.sum <= 20.0, "seed {seed}: {}", solution.sum);
                assert_eq!(solution.sum, solution.best_fitness);
                assert!(solution.best_fitness >= solution.initial_fitness);
            }
        }
    }

    #[test]
    fn config_round_trips_through_json() {
        let config: HillClimbConfig = serde_json::from_str(r#"{"target": 20.0}"#).unwrap();
        assert_eq!(config.target, 20.0);
        assert_eq!(config.max_iterations, 1000);
    }
}
