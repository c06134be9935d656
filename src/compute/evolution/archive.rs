//! On-disk run log: run identity, new bests, population snapshots, summary.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::schema::{NewBestEvent, RunInfo, RunSummary};

use super::search::Organism;

/// Writes one run's artifacts under `<output_dir>/<run_id>/`.
#[derive(Debug, Clone)]
pub struct RunRecorder {
    run_dir: PathBuf,
}

impl RunRecorder {
    /// Create the run directory and write `run.json`.
    pub fn new<P: AsRef<Path>>(output_dir: P, info: &RunInfo) -> io::Result<Self> {
        let run_dir = output_dir.as_ref().join(&info.run_id);
        fs::create_dir_all(&run_dir)?;

        let recorder = Self { run_dir };
        recorder.write_json("run.json", info)?;
        Ok(recorder)
    }

    /// Directory this recorder writes into.
    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    /// Write a new best as JSON plus a text rendering of its assembly.
    pub fn record_new_best(&self, event: &NewBestEvent) -> io::Result<PathBuf> {
        let stem = format!("best_gen{}_score{}", event.generation, event.score());
        let path = self.write_json(&format!("{stem}.json"), event)?;

        let candidate = &event.candidate;
        let mut text = format!(
            "generation {}\nscore {} / {}\nmismatches {}\ndistinct tiles {}\n\n{}\n",
            event.generation,
            candidate.score,
            candidate.perfect_score,
            candidate.mismatches,
            candidate.distinct_tiles,
            candidate.assembly
        );
        for entry in &candidate.assignment {
            let t = entry.tile;
            text.push_str(&format!(
                "({}, {}, {}, {}) -> {} x{}\n",
                t.north, t.east, t.south, t.west, entry.color, entry.occurrences
            ));
        }
        fs::write(self.run_dir.join(format!("{stem}.txt")), text)?;

        Ok(path)
    }

    /// Write the ranked population of `generation`.
    pub fn record_population(
        &self,
        generation: usize,
        population: &[Organism],
    ) -> io::Result<PathBuf> {
        let snapshot = PopulationSnapshot {
            generation,
            organisms: population.iter().map(PopulationEntry::from).collect(),
        };
        self.write_json(&format!("population_gen{generation}.json"), &snapshot)
    }

    /// Write `summary.json`.
    pub fn record_summary(&self, summary: &RunSummary) -> io::Result<PathBuf> {
        self.write_json("summary.json", summary)
    }

    fn write_json<T: Serialize>(&self, name: &str, value: &T) -> io::Result<PathBuf> {
        let path = self.run_dir.join(name);
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&path, json)?;
        debug!("wrote {}", path.display());
        Ok(path)
    }
}

/// Ranked population at one generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationSnapshot {
    pub generation: usize,
    /// Best first.
    pub organisms: Vec<PopulationEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationEntry {
    pub id: u64,
    pub generation: usize,
    pub parent: Option<u64>,
    pub score: i64,
    pub mismatches: usize,
    pub distinct_tiles: usize,
}

impl From<&Organism> for PopulationEntry {
    fn from(organism: &Organism) -> Self {
        Self {
            id: organism.id,
            generation: organism.generation,
            parent: organism.parent,
            score: organism.evaluation.score,
            mismatches: organism.evaluation.mismatches,
            distinct_tiles: organism.evaluation.distinct_tiles,
        }
    }
}

/// Load a new-best record written by [`RunRecorder::record_new_best`].
///
/// The stored genome must fit the stored assembly, so it can be regrown.
pub fn load_best<P: AsRef<Path>>(path: P) -> io::Result<NewBestEvent> {
    let content = fs::read_to_string(path)?;
    let event: NewBestEvent = serde_json::from_str(&content)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    let candidate = &event.candidate;
    candidate
        .genome
        .validate(candidate.assembly.pattern_size())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::Assembly;
    use crate::compute::evolution::fitness::FitnessFunction;
    use crate::compute::evolution::genome::GenomeRng;
    use crate::compute::evolution::search::PatsApproximator;
    use crate::schema::{ApproximatorConfig, FitnessStrategy, TargetPattern};
    use tempfile::TempDir;

    fn engine() -> PatsApproximator {
        let config = ApproximatorConfig {
            population_size: 10,
            random_seed: Some(12),
            ..Default::default()
        };
        let pattern: TargetPattern = "b w w\nw b w\nw w b".parse().unwrap();
        PatsApproximator::new(config, pattern).unwrap()
    }

    fn first_event(engine: &PatsApproximator) -> NewBestEvent {
        NewBestEvent {
            generation: engine.generation(),
            previous_best: i64::MIN,
            candidate: engine.best().to_snapshot(),
        }
    }

    #[test]
    fn test_recorder_writes_run_info() {
        let dir = TempDir::new().unwrap();
        let engine = engine();
        let recorder = RunRecorder::new(dir.path(), &engine.run_info()).unwrap();

        assert_eq!(recorder.run_dir(), dir.path().join(engine.run_id()));
        let content = fs::read_to_string(recorder.run_dir().join("run.json")).unwrap();
        let info: RunInfo = serde_json::from_str(&content).unwrap();
        assert_eq!(info.random_seed, 12);
        assert_eq!(info.pattern, *engine.pattern());
    }

    #[test]
    fn test_new_best_roundtrip() {
        let dir = TempDir::new().unwrap();
        let engine = engine();
        let recorder = RunRecorder::new(dir.path(), &engine.run_info()).unwrap();

        let event = first_event(&engine);
        let path = recorder.record_new_best(&event).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            format!("best_gen0_score{}.json", event.score())
        );
        assert!(path.with_extension("txt").exists());

        let loaded = load_best(&path).unwrap();
        let genome = &loaded.candidate.genome;
        let regrown = Assembly::assemble(&genome.seed, &genome.glue_table);
        assert_eq!(regrown, loaded.candidate.assembly);

        let fitness = FitnessStrategy::PatternMatchFirst.build();
        let eval = fitness.evaluate(&regrown, engine.pattern());
        assert_eq!(eval.score, loaded.candidate.score);
        assert_eq!(eval.assignment, loaded.candidate.assignment);
    }

    #[test]
    fn test_population_snapshot() {
        let dir = TempDir::new().unwrap();
        let engine = engine();
        let recorder = RunRecorder::new(dir.path(), &engine.run_info()).unwrap();

        let path = recorder.record_population(0, engine.population()).unwrap();
        let content = fs::read_to_string(path).unwrap();
        let snapshot: PopulationSnapshot = serde_json::from_str(&content).unwrap();

        assert_eq!(snapshot.organisms.len(), 10);
        assert_eq!(snapshot.organisms[0].score, engine.best_score());
        assert!(
            snapshot
                .organisms
                .windows(2)
                .all(|w| w[0].score >= w[1].score)
        );
    }

    #[test]
    fn test_summary_written() {
        let dir = TempDir::new().unwrap();
        let mut engine = engine();
        let recorder = RunRecorder::new(dir.path(), &engine.run_info()).unwrap();

        let summary = engine.run(2);
        recorder.record_summary(&summary).unwrap();

        let content = fs::read_to_string(recorder.run_dir().join("summary.json")).unwrap();
        let loaded: RunSummary = serde_json::from_str(&content).unwrap();
        assert_eq!(loaded.generations, 2);
        assert_eq!(loaded.history.len(), 2);
    }

    #[test]
    fn test_load_best_rejects_out_of_range_label() {
        let dir = TempDir::new().unwrap();
        let engine = engine();
        let recorder = RunRecorder::new(dir.path(), &engine.run_info()).unwrap();
        let path = recorder.record_new_best(&first_event(&engine)).unwrap();

        let mut record: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        record["candidate"]["genome"]["seed"][3] = serde_json::json!(999);
        fs::write(&path, record.to_string()).unwrap();

        let err = load_best(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_load_best_rejects_genome_assembly_mismatch() {
        let dir = TempDir::new().unwrap();
        let engine = engine();
        let recorder = RunRecorder::new(dir.path(), &engine.run_info()).unwrap();

        let mut event = first_event(&engine);
        let small = GenomeRng::new(1).random_genome(2);
        event.candidate.genome = small;
        let path = recorder.record_new_best(&event).unwrap();

        let err = load_best(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_load_best_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();
        let err = load_best(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
