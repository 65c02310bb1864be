use crate::error::{Result, SimError};
use serde::{Deserialize, Serialize};

/// A rated team entering the bracket
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Team {
    /// Stable identifier; falls back to the name when left empty
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub region: String,
    /// Strength rating (typically 1000-2000), supplied by the rating source
    #[serde(alias = "elo_rating")]
    pub rating: f64,
    /// Seed assigned by the seeding stage (1 = strongest)
    #[serde(default)]
    pub seed: Option<u32>,
}

impl Team {
    pub fn new(id: &str, name: &str, region: &str, rating: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            region: region.to_string(),
            rating,
            seed: None,
        }
    }

    /// Identifier used in reports and lookups
    pub fn key(&self) -> &str {
        if self.id.is_empty() {
            &self.name
        } else {
            &self.id
        }
    }
}

/// Series format
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Format {
    BestOf1,
    BestOf3,
    BestOf5,
}

impl Format {
    /// Maximum number of maps in the series
    pub fn games(&self) -> u32 {
        match self {
            Format::BestOf1 => 1,
            Format::BestOf3 => 3,
            Format::BestOf5 => 5,
        }
    }

    /// Map wins needed to take the series
    pub fn wins_needed(&self) -> u32 {
        self.games() / 2 + 1
    }
}

impl TryFrom<u8> for Format {
    type Error = SimError;

    fn try_from(best_of: u8) -> Result<Self> {
        match best_of {
            1 => Ok(Format::BestOf1),
            3 => Ok(Format::BestOf3),
            5 => Ok(Format::BestOf5),
            other => Err(SimError::invalid(format!(
                "unsupported format best-of-{} (expected 1, 3 or 5)",
                other
            ))),
        }
    }
}

impl From<Format> for u8 {
    fn from(format: Format) -> u8 {
        format.games() as u8
    }
}

/// Named bracket depth, counted back from the final
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Quarterfinal,
    Semifinal,
    Final,
    Champion,
}

/// Per-team stage-reach counters. Stages the bracket is too small to have
/// are `None`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCounts {
    pub reached_quarterfinals: Option<u64>,
    pub reached_semifinals: Option<u64>,
    pub reached_finals: u64,
    pub won_championship: u64,
}

/// Engine tuning knobs, independent of what is being simulated
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Trials between cancellation checkpoints
    pub batch_size: usize,
    /// `None` = shared rayon pool, `Some(1)` = calling thread only,
    /// `Some(n)` = dedicated pool of n threads
    pub workers: Option<usize>,
    /// Wall-clock budget in milliseconds, checked between batches
    pub timeout_ms: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            batch_size: 512,
            workers: None,
            timeout_ms: None,
        }
    }
}

fn default_trials() -> u64 {
    10_000
}

fn default_best_of() -> u8 {
    3
}

/// Everything needed for one simulation run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub teams: Vec<Team>,
    #[serde(default = "default_trials", alias = "num_simulations")]
    pub trials: u64,
    #[serde(default = "default_best_of", alias = "format")]
    pub best_of: u8,
    /// Standard deviation of per-match rating noise
    #[serde(default, alias = "elo_sigma")]
    pub sigma: Option<f64>,
    #[serde(default)]
    pub seed: Option<u64>,
    /// Keep only the top N teams by rating before seeding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_size: Option<usize>,
    #[serde(default)]
    pub engine: EngineConfig,
}

impl SimulationRequest {
    pub fn new(teams: Vec<Team>) -> Self {
        Self {
            teams,
            trials: default_trials(),
            best_of: default_best_of(),
            sigma: None,
            seed: None,
            field_size: None,
            engine: EngineConfig::default(),
        }
    }

    pub fn with_trials(mut self, trials: u64) -> Self {
        self.trials = trials;
        self
    }

    pub fn with_best_of(mut self, best_of: u8) -> Self {
        self.best_of = best_of;
        self
    }

    pub fn with_sigma(mut self, sigma: f64) -> Self {
        self.sigma = Some(sigma);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }
}

/// Outcome probabilities for one team, in percent
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TeamReport {
    pub id: String,
    pub name: String,
    pub region: String,
    pub seed: u32,
    pub rating: f64,
    pub quarterfinals: Option<f64>,
    pub semifinals: Option<f64>,
    pub finals: f64,
    pub championship: f64,
    /// Percent of trials the team occupied each round; the last entry is
    /// the champion position
    pub round_reach: Vec<f64>,
    pub counts: StageCounts,
}

/// Comparison of a report's prediction against a known winner
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredictionCheck {
    pub predicted_winner: String,
    pub predicted_probability: f64,
    pub actual_winner: String,
    pub actual_probability: f64,
    /// 1-based position of the actual winner by championship percentage
    pub actual_rank: usize,
    pub correct: bool,
}

/// Aggregated result of a simulation run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Sorted by championship percentage, best first
    pub teams: Vec<TeamReport>,
    pub trials_requested: u64,
    pub trials_completed: u64,
    pub best_of: u8,
    pub sigma: f64,
    /// Seed the run used, including one drawn from entropy
    pub seed: u64,
    pub team_count: usize,
    pub bracket_size: usize,
    pub rounds: u32,
    /// Display name of each entry in `TeamReport::round_reach`
    pub round_labels: Vec<String>,
    /// Set when the run stopped before `trials_requested`
    pub partial: bool,
}

impl SimulationReport {
    pub fn team(&self, key: &str) -> Option<&TeamReport> {
        self.teams.iter().find(|t| t.id == key || t.name == key)
    }

    /// Team with the highest championship percentage
    pub fn favorite(&self) -> Option<&TeamReport> {
        self.teams.first()
    }

    /// Score the report against the team that actually won
    pub fn evaluate(&self, actual_winner: &str) -> Result<PredictionCheck> {
        let favorite = self
            .favorite()
            .ok_or_else(|| SimError::invalid("report has no teams"))?;
        let (index, actual) = self
            .teams
            .iter()
            .enumerate()
            .find(|(_, t)| t.id == actual_winner || t.name == actual_winner)
            .ok_or_else(|| {
                SimError::invalid(format!("team '{}' is not in this report", actual_winner))
            })?;

        Ok(PredictionCheck {
            predicted_winner: favorite.name.clone(),
            predicted_probability: favorite.championship,
            actual_winner: actual.name.clone(),
            actual_probability: actual.championship,
            actual_rank: index + 1,
            correct: index == 0,
        })
    }
}
