//! Elitist evolutionary search over glue tables and seed boundaries.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use log::{debug, info};
use rayon::prelude::*;

use crate::compute::Assembly;
use crate::schema::{
    ApproximatorConfig, CandidateSnapshot, ConfigError, EvolutionHistory, GenerationReport,
    Genome, NewBestEvent, RunInfo, RunSummary, TargetPattern,
};

use super::fitness::{Evaluation, FitnessFunction};
use super::genome::GenomeRng;

/// One member of the population: a genome, its grown assembly and its score.
#[derive(Debug, Clone)]
pub struct Organism {
    /// Unique identifier within a run.
    pub id: u64,
    /// Generation created.
    pub generation: usize,
    /// Organism this one was mutated from.
    pub parent: Option<u64>,
    pub genome: Genome,
    /// Per-label redraw probability used when this organism reproduces.
    pub mutation_rate: f64,
    /// Assembly grown from `genome`.
    pub assembly: Assembly,
    /// Score of `assembly` against the target pattern.
    pub evaluation: Evaluation,
}

impl Organism {
    /// Grow and score a genome.
    pub fn grow(
        genome: Genome,
        mutation_rate: f64,
        fitness: &dyn FitnessFunction,
        pattern: &TargetPattern,
    ) -> Self {
        let assembly = Assembly::assemble(&genome.seed, &genome.glue_table);
        let evaluation = fitness.evaluate(&assembly, pattern);
        Self {
            id: 0,
            generation: 0,
            parent: None,
            genome,
            mutation_rate,
            assembly,
            evaluation,
        }
    }

    /// Random organism for `pattern`.
    pub fn random(
        rng: &mut GenomeRng,
        mutation_rate: f64,
        fitness: &dyn FitnessFunction,
        pattern: &TargetPattern,
    ) -> Self {
        let genome = rng.random_genome(pattern.size());
        Self::grow(genome, mutation_rate, fitness, pattern)
    }

    /// Set identity fields.
    pub fn with_lineage(mut self, id: u64, generation: usize, parent: Option<u64>) -> Self {
        self.id = id;
        self.generation = generation;
        self.parent = parent;
        self
    }

    #[inline]
    pub fn score(&self) -> i64 {
        self.evaluation.score
    }

    /// Mutate an independent copy of this organism's genome.
    ///
    /// The child is born in `generation` with identifier `id`; it is scored
    /// once [`Offspring::grow`] runs.
    pub fn mutate(&self, rng: &mut GenomeRng, id: u64, generation: usize) -> Offspring {
        Offspring {
            id,
            generation,
            parent: Some(self.id),
            genome: rng.mutated(&self.genome, self.mutation_rate),
            mutation_rate: self.mutation_rate,
        }
    }

    /// Recompute the assembly and score, e.g. after switching fitness function.
    pub fn rescore(&mut self, fitness: &dyn FitnessFunction, pattern: &TargetPattern) {
        self.assembly = Assembly::assemble(&self.genome.seed, &self.genome.glue_table);
        self.evaluation = fitness.evaluate(&self.assembly, pattern);
    }

    /// Convert to snapshot for serialization.
    pub fn to_snapshot(&self) -> CandidateSnapshot {
        CandidateSnapshot {
            id: self.id,
            generation: self.generation,
            parent: self.parent,
            score: self.evaluation.score,
            perfect_score: self.evaluation.perfect_score,
            mismatches: self.evaluation.mismatches,
            distinct_tiles: self.evaluation.distinct_tiles,
            genome: self.genome.clone(),
            assembly: self.assembly.clone(),
            assignment: self.evaluation.assignment.clone(),
        }
    }
}

/// A genome with its lineage, not yet grown or scored.
#[derive(Debug, Clone)]
pub struct Offspring {
    pub id: u64,
    pub generation: usize,
    pub parent: Option<u64>,
    pub genome: Genome,
    pub mutation_rate: f64,
}

impl Offspring {
    /// Grow and score into a full organism.
    pub fn grow(self, fitness: &dyn FitnessFunction, pattern: &TargetPattern) -> Organism {
        Organism::grow(self.genome, self.mutation_rate, fitness, pattern).with_lineage(
            self.id,
            self.generation,
            self.parent,
        )
    }
}

/// Evolutionary pattern self-assembly approximator.
///
/// The population is kept sorted by descending score (stable, so ties keep
/// their previous order). Each generation keeps the elite prefix untouched
/// and refills the rest with mutated copies of uniformly chosen elites.
pub struct PatsApproximator {
    config: ApproximatorConfig,
    pattern: TargetPattern,
    fitness: Box<dyn FitnessFunction>,
    rng: GenomeRng,
    population: Vec<Organism>,
    history: EvolutionHistory,
    generation: usize,
    best_score: i64,
    elite_count: usize,
    next_id: u64,
    evaluations: u64,
    run_id: String,
}

impl PatsApproximator {
    /// Create an approximator with the fitness function named in the config.
    pub fn new(config: ApproximatorConfig, pattern: TargetPattern) -> Result<Self, ConfigError> {
        let fitness = config.fitness.build();
        Self::with_fitness(config, pattern, fitness)
    }

    /// Create an approximator with a custom fitness function.
    pub fn with_fitness(
        config: ApproximatorConfig,
        pattern: TargetPattern,
        fitness: Box<dyn FitnessFunction>,
    ) -> Result<Self, ConfigError> {
        Self::from_genomes(config, pattern, fitness, Vec::new())
    }

    /// Create an approximator whose initial population starts from `genomes`.
    ///
    /// Missing organisms are generated at random; extra genomes are dropped.
    pub fn from_genomes(
        config: ApproximatorConfig,
        pattern: TargetPattern,
        fitness: Box<dyn FitnessFunction>,
        genomes: Vec<Genome>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        for genome in &genomes {
            genome.validate(pattern.size())?;
        }

        let rng = config
            .random_seed
            .map(GenomeRng::new)
            .unwrap_or_else(GenomeRng::random);
        let seed = rng.seed();
        let elite_count = config.elite_count();

        let mut engine = Self {
            run_id: make_run_id(seed),
            config,
            pattern,
            fitness,
            rng,
            population: Vec::new(),
            history: EvolutionHistory::default(),
            generation: 0,
            best_score: i64::MIN,
            elite_count,
            next_id: 0,
            evaluations: 0,
        };
        engine.initialize(genomes);

        info!(
            "run {} seed {}: population {}, elite {}, fitness {}, perfect score {}",
            engine.run_id,
            seed,
            engine.config.population_size,
            engine.elite_count,
            engine.fitness.name(),
            engine.perfect_score()
        );

        Ok(engine)
    }

    /// Build, evaluate and sort the initial population.
    fn initialize(&mut self, seeded: Vec<Genome>) {
        let size = self.config.population_size;
        let pattern_size = self.pattern.size();

        let mut genomes: Vec<Genome> = seeded.into_iter().take(size).collect();
        while genomes.len() < size {
            genomes.push(self.rng.random_genome(pattern_size));
        }

        let rate = self.config.mutation_rate;
        let pending: Vec<Offspring> = genomes
            .into_iter()
            .map(|genome| Offspring {
                id: self.allocate_id(),
                generation: 0,
                parent: None,
                genome,
                mutation_rate: rate,
            })
            .collect();
        self.population = self.evaluate_all(pending);
        self.sort_population();
        self.best_score = self.population[0].score();
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Grow and score in parallel. Order of the output matches `pending`.
    fn evaluate_all(&mut self, pending: Vec<Offspring>) -> Vec<Organism> {
        let fitness = self.fitness.as_ref();
        let pattern = &self.pattern;

        self.evaluations += pending.len() as u64;
        pending
            .into_par_iter()
            .map(|offspring| offspring.grow(fitness, pattern))
            .collect()
    }

    /// Descending by score. `sort_by` is stable: tied organisms keep their order.
    fn sort_population(&mut self) {
        self.population.sort_by(|a, b| b.score().cmp(&a.score()));
    }

    /// Keep the elite and refill the population with mutated elite copies.
    fn reproduce(&mut self) -> Vec<Organism> {
        let size = self.config.population_size;
        let elites: Vec<Organism> = self.population[..self.elite_count].to_vec();

        let mut pending = Vec::with_capacity(size - elites.len());
        while elites.len() + pending.len() < size {
            let id = self.allocate_id();
            let parent = &elites[self.rng.index(elites.len())];
            pending.push(parent.mutate(&mut self.rng, id, self.generation));
        }

        let mut next = elites;
        next.extend(self.evaluate_all(pending));
        next
    }

    /// Run one generation: reproduce, evaluate, sort, track the best score.
    pub fn run_generation(&mut self) -> GenerationReport {
        self.generation += 1;
        self.population = self.reproduce();
        self.sort_population();

        let leader = &self.population[0];
        let generation_best = leader.score();
        let new_best = if generation_best > self.best_score {
            let event = NewBestEvent {
                generation: self.generation,
                previous_best: self.best_score,
                candidate: leader.to_snapshot(),
            };
            self.best_score = generation_best;
            info!(
                "generation {}: new best {} / {} ({} mismatches, {} tiles)",
                self.generation,
                generation_best,
                leader.evaluation.perfect_score,
                leader.evaluation.mismatches,
                leader.evaluation.distinct_tiles
            );
            Some(event)
        } else {
            None
        };

        let report = GenerationReport {
            generation: self.generation,
            best_score: self.best_score,
            generation_best,
            avg_score: self.average_score(),
            perfect_score: self.perfect_score(),
            best_distinct_tiles: self.population[0].evaluation.distinct_tiles,
            new_best,
        };
        self.history.record(&report);

        debug!(
            "generation {}: best {}, avg {:.2}",
            report.generation, report.generation_best, report.avg_score
        );

        report
    }

    /// Run `generations` generations, reporting after each one.
    ///
    /// The callback also sees the freshly sorted population.
    pub fn run_with_callback<F>(&mut self, generations: usize, mut callback: F) -> RunSummary
    where
        F: FnMut(&GenerationReport, &[Organism]),
    {
        let start_time = Instant::now();
        let interval = self.config.report_interval;

        for _ in 0..generations {
            let report = self.run_generation();
            if interval > 0 && report.generation % interval == 0 {
                info!(
                    "generation {}/{}: best {} / {}, avg {:.2}",
                    report.generation,
                    generations,
                    report.best_score,
                    report.perfect_score,
                    report.avg_score
                );
            }
            callback(&report, &self.population);
        }

        RunSummary {
            run_id: self.run_id.clone(),
            random_seed: self.rng.seed(),
            generations: self.generation,
            total_evaluations: self.evaluations,
            best_score: self.best_score,
            perfect_score: self.perfect_score(),
            elapsed_seconds: start_time.elapsed().as_secs_f64(),
            best: self.best().to_snapshot(),
            history: self.history.clone(),
        }
    }

    /// Run `generations` generations (blocking).
    pub fn run(&mut self, generations: usize) -> RunSummary {
        self.run_with_callback(generations, |_, _| {})
    }

    /// Swap the fitness function, rescoring and resorting the population.
    pub fn set_fitness(&mut self, fitness: Box<dyn FitnessFunction>) {
        self.fitness = fitness;
        let fitness = self.fitness.as_ref();
        let pattern = &self.pattern;
        self.population
            .par_iter_mut()
            .for_each(|organism| organism.rescore(fitness, pattern));
        self.evaluations += self.population.len() as u64;
        self.sort_population();
        self.best_score = self.population[0].score();
    }

    fn average_score(&self) -> f64 {
        self.population.iter().map(|o| o.score() as f64).sum::<f64>()
            / self.population.len() as f64
    }

    /// Population sorted by descending score.
    pub fn population(&self) -> &[Organism] {
        &self.population
    }

    /// Highest-scoring organism of the current population.
    pub fn best(&self) -> &Organism {
        &self.population[0]
    }

    pub fn best_score(&self) -> i64 {
        self.best_score
    }

    pub fn perfect_score(&self) -> i64 {
        self.fitness.perfect_score(&self.pattern)
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn elite_count(&self) -> usize {
        self.elite_count
    }

    pub fn history(&self) -> &EvolutionHistory {
        &self.history
    }

    pub fn pattern(&self) -> &TargetPattern {
        &self.pattern
    }

    pub fn config(&self) -> &ApproximatorConfig {
        &self.config
    }

    pub fn random_seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Identity of this run, for recording once per run.
    pub fn run_info(&self) -> RunInfo {
        RunInfo {
            run_id: self.run_id.clone(),
            random_seed: self.rng.seed(),
            fitness: self.fitness.name().to_string(),
            config: self.config.clone(),
            pattern: self.pattern.clone(),
        }
    }
}

fn make_run_id(seed: u64) -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    format!("{:x}-{:08x}", secs, seed as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::evolution::fitness::{PatternMatchBest, PatternMatchFirst};
    use crate::schema::{FitnessStrategy, GlueOutput, GlueTable, SeedBoundary, max_glue_for};
    use proptest::prelude::*;

    fn checkerboard() -> TargetPattern {
        "b w b w\nw b w b\nb w b w\nw b w b".parse().unwrap()
    }

    fn small_config(population_size: usize, seed: u64) -> ApproximatorConfig {
        ApproximatorConfig {
            population_size,
            mutation_rate: 0.05,
            random_seed: Some(seed),
            ..Default::default()
        }
    }

    #[test]
    fn test_engine_creation() {
        let engine = PatsApproximator::new(small_config(20, 1), checkerboard()).unwrap();

        assert_eq!(engine.population().len(), 20);
        assert_eq!(engine.elite_count(), 2);
        assert_eq!(engine.generation(), 0);
        assert_eq!(engine.perfect_score(), 32);
        assert_eq!(engine.best_score(), engine.population()[0].score());
        assert!(
            engine
                .population()
                .windows(2)
                .all(|w| w[0].score() >= w[1].score())
        );
    }

    #[test]
    fn test_rejects_degenerate_population() {
        let result = PatsApproximator::new(small_config(9, 1), checkerboard());
        assert!(matches!(result, Err(ConfigError::EmptyElite { .. })));
    }

    #[test]
    fn test_rejects_invalid_genome() {
        let genome = GenomeRng::new(1).random_genome(3);
        let result = PatsApproximator::from_genomes(
            small_config(10, 1),
            checkerboard(),
            Box::new(PatternMatchFirst),
            vec![genome],
        );
        assert!(matches!(result, Err(ConfigError::Genome(_))));
    }

    #[test]
    fn test_elites_survive_unchanged() {
        let mut engine = PatsApproximator::new(small_config(30, 5), checkerboard()).unwrap();
        let elites: Vec<Organism> = engine.population()[..engine.elite_count()].to_vec();

        engine.run_generation();

        for elite in &elites {
            let survivor = engine
                .population()
                .iter()
                .find(|o| o.id == elite.id)
                .expect("elite missing from next generation");
            assert_eq!(survivor.genome, elite.genome);
            assert_eq!(survivor.evaluation, elite.evaluation);
            assert_eq!(survivor.generation, elite.generation);
        }
    }

    #[test]
    fn test_children_descend_from_elites() {
        let mut engine = PatsApproximator::new(small_config(20, 9), checkerboard()).unwrap();
        let elite_ids: Vec<u64> = engine.population()[..engine.elite_count()]
            .iter()
            .map(|o| o.id)
            .collect();

        engine.run_generation();

        for organism in engine.population() {
            if elite_ids.contains(&organism.id) {
                continue;
            }
            assert_eq!(organism.generation, 1);
            assert!(elite_ids.contains(&organism.parent.unwrap()));
        }
    }

    #[test]
    fn test_children_born_in_current_generation() {
        let mut engine = PatsApproximator::new(small_config(20, 13), checkerboard()).unwrap();

        for _ in 0..4 {
            let known: Vec<u64> = engine.population().iter().map(|o| o.id).collect();
            engine.run_generation();

            for organism in engine.population() {
                if !known.contains(&organism.id) {
                    assert_eq!(organism.generation, engine.generation());
                    assert!(known.contains(&organism.parent.unwrap()));
                }
            }
        }
    }

    #[test]
    fn test_ties_keep_input_order() {
        let n = 2;
        let mut table = GlueTable::constant(max_glue_for(n), GlueOutput { north: 8, east: 8 });
        table.set(1, 2, (3, 4).into());
        table.set(3, 4, (1, 2).into());
        let optimal = Genome::new(table, SeedBoundary::from_edges(&[2, 4], &[1, 3]).unwrap());

        // Four distinct tiles, no mismatches: score 4.
        let spread = Genome::new(
            GlueTable::constant(max_glue_for(n), GlueOutput { north: 1, east: 1 }),
            SeedBoundary::from_edges(&[6, 6], &[5, 5]).unwrap(),
        );

        let genomes: Vec<Genome> = (0..10)
            .map(|i| if i % 2 == 0 { spread.clone() } else { optimal.clone() })
            .collect();
        let engine = PatsApproximator::from_genomes(
            small_config(10, 6),
            TargetPattern::from_tokens(["b", "w", "w", "b"]).unwrap(),
            Box::new(PatternMatchFirst),
            genomes,
        )
        .unwrap();

        let ids: Vec<u64> = engine.population().iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![1, 3, 5, 7, 9, 0, 2, 4, 6, 8]);
        assert_eq!(engine.population()[0].score(), 6);
        assert_eq!(engine.population()[9].score(), 4);
    }

    #[test]
    fn test_best_score_monotone() {
        let mut engine = PatsApproximator::new(small_config(20, 3), checkerboard()).unwrap();
        let mut last = engine.best_score();

        for _ in 0..15 {
            let report = engine.run_generation();
            assert!(report.best_score >= last);
            assert_eq!(report.new_best.is_some(), report.best_score > last);
            if let Some(event) = &report.new_best {
                assert_eq!(event.previous_best, last);
                assert_eq!(event.score(), report.best_score);
                assert_eq!(event.generation, report.generation);
            }
            last = report.best_score;
        }
        assert_eq!(engine.history().len(), 15);
    }

    #[test]
    fn test_deterministic_with_seed() {
        let mut a = PatsApproximator::new(small_config(20, 77), checkerboard()).unwrap();
        let mut b = PatsApproximator::new(small_config(20, 77), checkerboard()).unwrap();

        let ra = a.run(5);
        let rb = b.run(5);

        assert_eq!(ra.random_seed, 77);
        assert_eq!(ra.history.best_score, rb.history.best_score);
        assert_eq!(ra.history.avg_score, rb.history.avg_score);
        assert_eq!(a.best().genome, b.best().genome);
    }

    #[test]
    fn test_run_summary() {
        let mut engine = PatsApproximator::new(small_config(10, 4), checkerboard()).unwrap();
        let mut seen = 0;
        let summary = engine.run_with_callback(3, |_, _| seen += 1);

        assert_eq!(seen, 3);
        assert_eq!(summary.generations, 3);
        // Initial population plus nine children per generation.
        assert_eq!(summary.total_evaluations, 10 + 3 * 9);
        assert_eq!(summary.best.score, summary.best_score);
        assert_eq!(summary.run_id, engine.run_id());
    }

    #[test]
    fn test_set_fitness_rescores() {
        let mut engine = PatsApproximator::new(small_config(10, 8), checkerboard()).unwrap();
        engine.set_fitness(Box::new(PatternMatchBest));

        for organism in engine.population() {
            let fresh = PatternMatchBest.evaluate(&organism.assembly, engine.pattern());
            assert_eq!(organism.evaluation, fresh);
        }
        assert_eq!(engine.best_score(), engine.population()[0].score());
    }

    #[test]
    fn test_seeded_population_kept() {
        let n = 2;
        let mut table = GlueTable::constant(max_glue_for(n), GlueOutput { north: 8, east: 8 });
        table.set(1, 2, (3, 4).into());
        table.set(3, 4, (1, 2).into());
        let seed = SeedBoundary::from_edges(&[2, 4], &[1, 3]).unwrap();
        let optimal = Genome::new(table, seed);
        let pattern = TargetPattern::from_tokens(["b", "w", "w", "b"]).unwrap();

        let engine = PatsApproximator::from_genomes(
            small_config(10, 2),
            pattern,
            Box::new(PatternMatchFirst),
            vec![optimal.clone()],
        )
        .unwrap();

        assert_eq!(engine.best_score(), 6);
        assert_eq!(engine.best().genome, optimal);
    }

    #[test]
    fn test_run_info() {
        let config = ApproximatorConfig {
            fitness: FitnessStrategy::PatternMatchBest,
            ..small_config(10, 0xdead_beef_0000_0001)
        };
        let engine = PatsApproximator::new(config, checkerboard()).unwrap();
        let info = engine.run_info();

        assert_eq!(info.random_seed, 0xdead_beef_0000_0001);
        assert_eq!(info.fitness, "pattern_match_best");
        assert!(info.run_id.ends_with("-00000001"));
    }

    #[test]
    fn test_mutate_is_independent_and_rescored() {
        let pattern = checkerboard();
        let mut rng = GenomeRng::new(21);
        let parent = Organism::random(&mut rng, 0.2, &PatternMatchFirst, &pattern)
            .with_lineage(4, 2, None);
        let before = parent.clone();

        let child = parent
            .mutate(&mut rng, 17, 5)
            .grow(&PatternMatchFirst, &pattern);

        assert_eq!(parent.genome, before.genome);
        assert_eq!(parent.evaluation, before.evaluation);
        assert_eq!(child.id, 17);
        assert_eq!(child.parent, Some(4));
        assert_eq!(child.generation, 5);
        assert_eq!(child.mutation_rate, 0.2);
        assert_ne!(child.genome, parent.genome);

        let regrown = Assembly::assemble(&child.genome.seed, &child.genome.glue_table);
        assert_eq!(child.assembly, regrown);
        assert_eq!(child.evaluation, PatternMatchFirst.evaluate(&regrown, &pattern));
    }

    #[test]
    fn test_genome_roundtrip_regrows_identically() {
        let pattern = checkerboard();
        let mut rng = GenomeRng::new(99);
        let organism = Organism::random(&mut rng, 0.01, &PatternMatchBest, &pattern);

        let json = serde_json::to_string(&organism.genome).unwrap();
        let genome: Genome = serde_json::from_str(&json).unwrap();
        assert!(genome.validate(pattern.size()).is_ok());

        let restored = Organism::grow(genome, 0.01, &PatternMatchBest, &pattern);
        assert_eq!(restored.assembly, organism.assembly);
        assert_eq!(restored.evaluation, organism.evaluation);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_score_bounds(seed in any::<u64>(), tokens in prop::collection::vec(prop::bool::ANY, 9)) {
            let pattern = TargetPattern::from_tokens(
                tokens.iter().map(|&black| if black { "b" } else { "w" }),
            )
            .unwrap();
            let mut rng = GenomeRng::new(seed);

            for fitness in [
                FitnessStrategy::PatternMatchFirst.build(),
                FitnessStrategy::PatternMatchBest.build(),
            ] {
                let organism = Organism::random(&mut rng, 0.01, fitness.as_ref(), &pattern);
                let eval = &organism.evaluation;
                let cells = pattern.len();

                prop_assert!(eval.distinct_tiles >= 1 && eval.distinct_tiles <= cells);
                prop_assert!(eval.mismatches <= cells - eval.distinct_tiles);
                prop_assert!(eval.score <= eval.perfect_score - pattern.distinct_colors() as i64);
                prop_assert_eq!(
                    eval.score,
                    eval.perfect_score - eval.mismatches as i64 - eval.distinct_tiles as i64
                );
            }
        }
    }
}
