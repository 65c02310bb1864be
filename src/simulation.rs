use crate::bracket::{round_name, stage_label, Advancer};
use crate::error::{Result, SimError};
use crate::model::MatchModel;
use crate::seeding::{select_field, Bracket};
use crate::types::*;
use log::{debug, info, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cooperative stop signal, polled between trial batches
pub trait CancelHook: Sync {
    fn should_stop(&self) -> bool;
}

/// Hook that lets every run finish
pub struct NeverCancel;

impl CancelHook for NeverCancel {
    fn should_stop(&self) -> bool {
        false
    }
}

/// Shared flag a caller can flip from another thread
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

impl CancelHook for CancelToken {
    fn should_stop(&self) -> bool {
        self.is_cancelled()
    }
}

/// Stops the run once a monotonic instant has passed
#[derive(Clone, Copy, Debug)]
pub struct Deadline(Instant);

impl Deadline {
    pub fn after(budget: Duration) -> Self {
        Self(Instant::now() + budget)
    }
}

impl CancelHook for Deadline {
    fn should_stop(&self) -> bool {
        Instant::now() >= self.0
    }
}

/// Round-reach counts for a share of trials.
///
/// Merging is an element-wise sum, so tallies from any partition of the
/// trial range combine to the same totals.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tally {
    trials: u64,
    /// Rounds tracked per team: match rounds plus the champion position
    width: usize,
    /// Row-major team x round; entry (t, r - 1) counts trials where team t
    /// occupied round r
    reach: Vec<u64>,
}

impl Tally {
    pub fn new(team_count: usize, rounds: u32) -> Self {
        let width = rounds as usize + 1;
        Self {
            trials: 0,
            width,
            reach: vec![0; team_count * width],
        }
    }

    /// Count one trial given each team's deepest round
    pub fn record(&mut self, reached: &[u32]) {
        self.trials += 1;
        for (team, &deepest) in reached.iter().enumerate() {
            let row = &mut self.reach[team * self.width..(team + 1) * self.width];
            for count in &mut row[..deepest as usize] {
                *count += 1;
            }
        }
    }

    pub fn merge(mut self, other: Tally) -> Tally {
        self.trials += other.trials;
        for (count, extra) in self.reach.iter_mut().zip(other.reach) {
            *count += extra;
        }
        self
    }

    pub fn trials(&self) -> u64 {
        self.trials
    }

    /// Trials in which `team` occupied `round` (1-based)
    pub fn reach_count(&self, team: usize, round: u32) -> u64 {
        self.reach[team * self.width + round as usize - 1]
    }

    /// Named stage counters for `team`, omitting stages the bracket lacks
    pub fn stage_counts(&self, team: usize) -> StageCounts {
        let rounds = self.width as u32 - 1;
        let mut counts = StageCounts::default();
        for round in 1..=rounds + 1 {
            let count = self.reach_count(team, round);
            match stage_label(round, rounds) {
                Some(Stage::Quarterfinal) => counts.reached_quarterfinals = Some(count),
                Some(Stage::Semifinal) => counts.reached_semifinals = Some(count),
                Some(Stage::Final) => counts.reached_finals = count,
                Some(Stage::Champion) => counts.won_championship = count,
                None => {}
            }
        }
        counts
    }
}

/// Generator for one trial: the request seed selects the key, the trial
/// index selects the stream
pub fn trial_rng(seed: u64, trial: u64) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(trial);
    rng
}

/// Read-only state shared by every worker
struct TrialContext<'a> {
    bracket: &'a Bracket,
    model: &'a MatchModel,
    seed: u64,
}

impl TrialContext<'_> {
    fn run_range(&self, trials: Range<u64>) -> Result<Tally> {
        let mut tally = Tally::new(self.bracket.team_count(), self.bracket.rounds());
        let mut advancer = Advancer::new(self.bracket, self.model);
        for trial in trials {
            let mut rng = trial_rng(self.seed, trial);
            advancer.play(&mut rng)?;
            tally.record(advancer.reached());
        }
        Ok(tally)
    }
}

/// Check request parameters that do not depend on the roster
pub fn validate(request: &SimulationRequest) -> Result<Format> {
    if request.trials < 1 {
        return Err(SimError::invalid("trial count must be at least 1"));
    }
    let format = Format::try_from(request.best_of)?;
    if let Some(sigma) = request.sigma {
        if !sigma.is_finite() || sigma < 0.0 {
            return Err(SimError::invalid(format!(
                "rating sigma must be a finite non-negative number, got {}",
                sigma
            )));
        }
    }
    if request.engine.batch_size < 1 {
        return Err(SimError::invalid("batch size must be at least 1"));
    }
    if request.engine.workers == Some(0) {
        return Err(SimError::invalid("worker count must be at least 1"));
    }
    Ok(format)
}

/// Run the full Monte Carlo simulation
pub fn simulate(request: &SimulationRequest) -> Result<SimulationReport> {
    simulate_with_hook(request, &NeverCancel)
}

/// `simulate` with the request fields passed directly
pub fn simulate_teams(
    teams: &[Team],
    best_of: u8,
    trials: u64,
    sigma: Option<f64>,
    seed: Option<u64>,
) -> Result<SimulationReport> {
    let request = SimulationRequest {
        teams: teams.to_vec(),
        trials,
        best_of,
        sigma,
        seed,
        field_size: None,
        engine: EngineConfig::default(),
    };
    simulate(&request)
}

/// Run the simulation, polling `hook` between batches. A stopped run
/// returns `SimError::Cancelled` holding the partial report.
pub fn simulate_with_hook(
    request: &SimulationRequest,
    hook: &dyn CancelHook,
) -> Result<SimulationReport> {
    let format = validate(request)?;
    let bracket = match request.field_size {
        Some(count) => Bracket::new(&select_field(&request.teams, Some(count))?)?,
        None => Bracket::new(&request.teams)?,
    };
    let sigma = request.sigma.unwrap_or(0.0);
    let model = MatchModel::new(format, sigma)?;
    let seed = request.seed.unwrap_or_else(|| rand::thread_rng().gen());

    info!(
        "Simulating {} trials: {} teams, bracket of {}, best-of-{}, sigma={}, seed={}",
        request.trials,
        bracket.team_count(),
        bracket.size(),
        format.games(),
        sigma,
        seed
    );

    let timeout = request.engine.timeout_ms.map(timeout_hook);
    let context = TrialContext {
        bracket: &bracket,
        model: &model,
        seed,
    };
    let trials = request.trials;
    let batch_size = request.engine.batch_size as u64;
    let batches = trials.div_ceil(batch_size);

    // `None` ends the iteration; batches already finished are still merged
    let run_batch = |batch: u64| -> Option<Result<Tally>> {
        if hook.should_stop() || timeout.as_ref().is_some_and(|t| t.should_stop()) {
            return None;
        }
        let range = batch_range(batch, batch_size, trials);
        let tally = context.run_range(range.clone());
        if tally.is_ok() {
            debug!("Finished trials {}..{}", range.start, range.end);
        }
        Some(tally)
    };
    let empty = || Tally::new(bracket.team_count(), bracket.rounds());

    let tally = match worker_count(request.engine.workers, THREADED) {
        Some(1) => (0..batches)
            .map_while(run_batch)
            .try_fold(empty(), |acc, tally| Ok::<_, SimError>(acc.merge(tally?)))?,
        Some(workers) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .build()
                .map_err(|e| SimError::Invariant(format!("failed to start worker pool: {}", e)))?;
            pool.install(|| {
                (0..batches)
                    .into_par_iter()
                    .map(run_batch)
                    .while_some()
                    .try_reduce(empty, |a, b| Ok(a.merge(b)))
            })?
        }
        None => (0..batches)
            .into_par_iter()
            .map(run_batch)
            .while_some()
            .try_reduce(empty, |a, b| Ok(a.merge(b)))?,
    };

    let report = build_report(request, format, sigma, seed, &bracket, &tally);
    if report.partial {
        warn!(
            "Simulation stopped early: {} of {} trials completed",
            report.trials_completed, report.trials_requested
        );
        return Err(SimError::Cancelled(Box::new(report)));
    }
    Ok(report)
}

/// Trials `batch * batch_size..` of 0..trials, at most `batch_size` long
fn batch_range(batch: u64, batch_size: u64, trials: u64) -> Range<u64> {
    let start = batch.saturating_mul(batch_size).min(trials);
    start..start.saturating_add(batch_size).min(trials)
}

/// Whether the target can run rayon worker threads
const THREADED: bool = cfg!(not(target_arch = "wasm32"));

/// Worker setting the run actually uses; without threads every run stays
/// on the calling thread
fn worker_count(requested: Option<usize>, threaded: bool) -> Option<usize> {
    if threaded {
        requested
    } else {
        Some(1)
    }
}

/// Hook enforcing `engine.timeout_ms` against the platform clock
#[cfg(not(target_arch = "wasm32"))]
fn timeout_hook(timeout_ms: u64) -> Box<dyn CancelHook> {
    Box::new(Deadline::after(Duration::from_millis(timeout_ms)))
}

/// `Instant` panics in the browser, so wasm builds time out on the JS clock
#[cfg(target_arch = "wasm32")]
fn timeout_hook(timeout_ms: u64) -> Box<dyn CancelHook> {
    Box::new(JsDeadline::after(timeout_ms as f64))
}

/// Deadline against the JS clock
pub(crate) struct JsDeadline {
    at_ms: f64,
}

impl JsDeadline {
    pub(crate) fn after(timeout_ms: f64) -> Self {
        Self {
            at_ms: js_sys::Date::now() + timeout_ms,
        }
    }
}

impl CancelHook for JsDeadline {
    fn should_stop(&self) -> bool {
        js_sys::Date::now() >= self.at_ms
    }
}

fn build_report(
    request: &SimulationRequest,
    format: Format,
    sigma: f64,
    seed: u64,
    bracket: &Bracket,
    tally: &Tally,
) -> SimulationReport {
    let completed = tally.trials();
    let percent = |count: u64| {
        if completed == 0 {
            0.0
        } else {
            count as f64 / completed as f64 * 100.0
        }
    };
    let rounds = bracket.rounds();

    let mut teams: Vec<TeamReport> = bracket
        .teams()
        .iter()
        .enumerate()
        .map(|(index, team)| {
            let counts = tally.stage_counts(index);
            TeamReport {
                id: team.key().to_string(),
                name: team.name.clone(),
                region: team.region.clone(),
                seed: team.seed.unwrap_or(index as u32 + 1),
                rating: team.rating,
                quarterfinals: counts.reached_quarterfinals.map(percent),
                semifinals: counts.reached_semifinals.map(percent),
                finals: percent(counts.reached_finals),
                championship: percent(counts.won_championship),
                round_reach: (1..=rounds + 1)
                    .map(|round| percent(tally.reach_count(index, round)))
                    .collect(),
                counts,
            }
        })
        .collect();

    teams.sort_by(|a, b| {
        b.championship
            .total_cmp(&a.championship)
            .then(a.seed.cmp(&b.seed))
    });

    SimulationReport {
        teams,
        trials_requested: request.trials,
        trials_completed: completed,
        best_of: format.into(),
        sigma,
        seed,
        team_count: bracket.team_count(),
        bracket_size: bracket.size(),
        rounds,
        round_labels: (1..=rounds + 1).map(|round| round_name(round, rounds)).collect(),
        partial: completed < request.trials,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(ratings: &[f64]) -> Vec<Team> {
        ratings
            .iter()
            .enumerate()
            .map(|(i, &r)| Team::new(&format!("t{}", i), &format!("Team {}", i), "NA", r))
            .collect()
    }

    fn request(ratings: &[f64], trials: u64, best_of: u8, seed: u64) -> SimulationRequest {
        SimulationRequest::new(roster(ratings))
            .with_trials(trials)
            .with_best_of(best_of)
            .with_seed(seed)
    }

    fn champion_share(report: &SimulationReport, id: &str) -> f64 {
        report.team(id).unwrap().championship
    }

    #[test]
    fn test_batch_ranges_cover_all_trials() {
        let ranges = |trials: u64, size: u64| -> Vec<Range<u64>> {
            (0..trials.div_ceil(size)).map(|b| batch_range(b, size, trials)).collect()
        };
        assert_eq!(ranges(10, 4), vec![0..4, 4..8, 8..10]);
        assert_eq!(ranges(8, 4), vec![0..4, 4..8]);
        assert_eq!(ranges(3, 512), vec![0..3]);
    }

    #[test]
    fn test_batch_range_saturates_near_u64_max() {
        assert_eq!(batch_range(0, u64::MAX, u64::MAX), 0..u64::MAX);
        assert_eq!(batch_range(1, u64::MAX - 1, u64::MAX), u64::MAX - 1..u64::MAX);
        let last = u64::MAX.div_ceil(512) - 1;
        assert_eq!(batch_range(last, 512, u64::MAX).end, u64::MAX);
    }

    #[test]
    fn test_worker_count_without_threads_is_sequential() {
        assert_eq!(worker_count(None, true), None);
        assert_eq!(worker_count(Some(4), true), Some(4));
        assert_eq!(worker_count(None, false), Some(1));
        assert_eq!(worker_count(Some(4), false), Some(1));
    }

    #[test]
    fn test_cancelled_huge_run_stops_without_allocating_batches() {
        let token = CancelToken::new();
        token.cancel();
        for workers in [None, Some(1), Some(2)] {
            let req = request(&[1600.0, 1500.0, 1400.0], u64::MAX, 3, 5).with_engine(EngineConfig {
                batch_size: 1,
                workers,
                timeout_ms: None,
            });
            let report = simulate_with_hook(&req, &token)
                .unwrap_err()
                .into_partial_report()
                .unwrap();
            assert!(report.partial);
            assert_eq!(report.trials_requested, u64::MAX);
            assert_eq!(report.trials_completed, 0);
        }
    }

    #[test]
    fn test_tally_merge_and_stage_counts() {
        // 4 teams, 2 rounds
        let mut a = Tally::new(4, 2);
        a.record(&[3, 2, 1, 1]);
        let mut b = Tally::new(4, 2);
        b.record(&[2, 1, 3, 1]);
        b.record(&[1, 1, 2, 3]);

        let merged = a.clone().merge(b.clone());
        assert_eq!(merged, b.merge(a));
        assert_eq!(merged.trials(), 3);

        let counts = merged.stage_counts(0);
        assert_eq!(counts.reached_quarterfinals, None);
        assert_eq!(counts.reached_semifinals, Some(3));
        assert_eq!(counts.reached_finals, 2);
        assert_eq!(counts.won_championship, 1);
    }

    #[test]
    fn test_every_trial_has_one_champion() {
        let report = simulate(&request(&[1700.0, 1650.0, 1680.0, 1620.0, 1500.0, 1550.0], 3_000, 3, 5)).unwrap();

        let champions: u64 = report.teams.iter().map(|t| t.counts.won_championship).sum();
        assert_eq!(champions, 3_000);
        let finalists: u64 = report.teams.iter().map(|t| t.counts.reached_finals).sum();
        assert_eq!(finalists, 6_000);
        assert!(!report.partial);
        assert_eq!(report.trials_completed, 3_000);
    }

    #[test]
    fn test_percentages_are_bounded_and_monotonic() {
        let report = simulate(
            &request(&[1800.0, 1700.0, 1650.0, 1600.0, 1550.0, 1500.0, 1450.0, 1400.0, 1350.0], 2_000, 1, 17)
                .with_sigma(60.0),
        )
        .unwrap();

        for team in &report.teams {
            let qf = team.quarterfinals.unwrap();
            let sf = team.semifinals.unwrap();
            assert!((0.0..=100.0).contains(&qf));
            assert!(qf >= sf && sf >= team.finals && team.finals >= team.championship);
            assert!(team.championship >= 0.0);
            for pair in team.round_reach.windows(2) {
                assert!(pair[0] >= pair[1]);
            }
            assert_eq!(team.round_reach[0], 100.0);
        }
    }

    #[test]
    fn test_report_sorted_by_championship() {
        let report = simulate(&request(&[1500.0, 1600.0, 1700.0, 1800.0], 2_000, 3, 3)).unwrap();
        for pair in report.teams.windows(2) {
            assert!(pair[0].championship >= pair[1].championship);
        }
        assert_eq!(report.favorite().unwrap().id, "t3");
        assert_eq!(report.team_count, 4);
        assert_eq!(report.bracket_size, 4);
        assert_eq!(report.best_of, 3);
        assert_eq!(report.round_labels, vec!["Semifinals", "Finals", "Champion"]);
    }

    #[test]
    fn test_equal_ratings_split_evenly() {
        let report = simulate(&request(&[1500.0, 1500.0], 20_000, 1, 99)).unwrap();
        let share = champion_share(&report, "t0");
        assert!((share - 50.0).abs() < 2.0, "share was {}", share);
        assert!((share + champion_share(&report, "t1") - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_large_gap_matches_logistic_curve() {
        let report = simulate(&request(&[1700.0, 1300.0], 20_000, 1, 1234)).unwrap();
        let share = champion_share(&report, "t0");
        let expected = 100.0 / (1.0 + 10f64.powf(-1.0));
        assert!((share - expected).abs() < 2.0, "share was {}", share);
    }

    #[test]
    fn test_longer_series_amplify_favorite() {
        let share = |best_of| {
            let report = simulate(&request(&[1600.0, 1500.0], 20_000, best_of, 8)).unwrap();
            champion_share(&report, "t0")
        };
        let (bo1, bo3, bo5) = (share(1), share(3), share(5));
        assert!(bo5 > bo3 && bo3 > bo1, "bo1={} bo3={} bo5={}", bo1, bo3, bo5);
    }

    #[test]
    fn test_seeded_runs_are_identical() {
        let req = request(&[1700.0, 1650.0, 1600.0, 1550.0, 1500.0], 4_000, 3, 2024).with_sigma(45.0);
        let first = simulate(&req).unwrap();
        let second = simulate(&req).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_worker_partitioning_does_not_change_result() {
        let base = request(&[1750.0, 1700.0, 1600.0, 1580.0, 1500.0, 1450.0, 1400.0], 3_000, 5, 31)
            .with_sigma(25.0);

        let sequential = simulate(&base.clone().with_engine(EngineConfig {
            batch_size: 3_000,
            workers: Some(1),
            timeout_ms: None,
        }))
        .unwrap();
        let pooled = simulate(&base.clone().with_engine(EngineConfig {
            batch_size: 97,
            workers: Some(4),
            timeout_ms: None,
        }))
        .unwrap();
        let shared = simulate(&base).unwrap();

        assert_eq!(sequential, pooled);
        assert_eq!(sequential, shared);
    }

    #[test]
    fn test_five_teams_byes_reach_semifinals() {
        let report = simulate(&request(&[1800.0, 1700.0, 1600.0, 1500.0, 1400.0], 1_000, 3, 4)).unwrap();

        assert_eq!(report.bracket_size, 8);
        for team in &report.teams {
            assert_eq!(team.counts.reached_quarterfinals, Some(1_000));
            if team.seed <= 3 {
                assert_eq!(team.counts.reached_semifinals, Some(1_000));
                assert_eq!(team.semifinals, Some(100.0));
            }
        }
        let seed4 = report.teams.iter().find(|t| t.seed == 4).unwrap();
        let seed5 = report.teams.iter().find(|t| t.seed == 5).unwrap();
        assert_eq!(
            seed4.counts.reached_semifinals.unwrap() + seed5.counts.reached_semifinals.unwrap(),
            1_000
        );
    }

    #[test]
    fn test_small_brackets_omit_missing_stages() {
        let two = simulate(&request(&[1500.0, 1400.0], 100, 1, 1)).unwrap();
        for team in &two.teams {
            assert_eq!(team.quarterfinals, None);
            assert_eq!(team.semifinals, None);
            assert_eq!(team.finals, 100.0);
        }

        let three = simulate(&request(&[1500.0, 1450.0, 1400.0], 100, 1, 1)).unwrap();
        assert_eq!(three.rounds, 2);
        for team in &three.teams {
            assert_eq!(team.quarterfinals, None);
            assert_eq!(team.semifinals, Some(100.0));
        }
    }

    #[test]
    fn test_single_trial_is_all_or_nothing() {
        let report = simulate(&request(&[1700.0, 1600.0, 1500.0, 1400.0, 1300.0, 1200.0, 1100.0, 1000.0], 1, 3, 6)).unwrap();
        for team in &report.teams {
            for pct in &team.round_reach {
                assert!(*pct == 0.0 || *pct == 100.0);
            }
            assert!(team.counts.won_championship <= 1);
        }
    }

    #[test]
    fn test_rejects_invalid_requests() {
        let invalid = |req: SimulationRequest| matches!(simulate(&req), Err(SimError::InvalidInput(_)));

        assert!(invalid(request(&[1500.0, 1400.0], 0, 3, 1)));
        assert!(invalid(request(&[1500.0, 1400.0], 10, 2, 1)));
        assert!(invalid(request(&[1500.0, 1400.0], 10, 7, 1)));
        assert!(invalid(request(&[1500.0, 1400.0], 10, 3, 1).with_sigma(-5.0)));
        assert!(invalid(request(&[1500.0], 10, 3, 1)));
        assert!(invalid(request(&[1500.0, f64::NAN], 10, 3, 1)));

        let mut zero_workers = request(&[1500.0, 1400.0], 10, 3, 1);
        zero_workers.engine.workers = Some(0);
        assert!(invalid(zero_workers));
    }

    #[test]
    fn test_cancelled_run_returns_partial_report() {
        let token = CancelToken::new();
        token.cancel();
        let result = simulate_with_hook(&request(&[1600.0, 1500.0, 1400.0, 1300.0], 5_000, 3, 2), &token);

        let report = result.unwrap_err().into_partial_report().unwrap();
        assert!(report.partial);
        assert_eq!(report.trials_requested, 5_000);
        assert_eq!(report.trials_completed, 0);
        assert!(report.teams.iter().all(|t| t.championship == 0.0));
    }

    struct StopAfter {
        polls: std::sync::atomic::AtomicUsize,
        limit: usize,
    }

    impl CancelHook for StopAfter {
        fn should_stop(&self) -> bool {
            self.polls.fetch_add(1, Ordering::Relaxed) >= self.limit
        }
    }

    #[test]
    fn test_partial_report_counts_completed_batches_only() {
        let hook = StopAfter {
            polls: std::sync::atomic::AtomicUsize::new(0),
            limit: 3,
        };
        let req = request(&[1600.0, 1500.0, 1400.0, 1300.0], 10_000, 1, 12).with_engine(EngineConfig {
            batch_size: 100,
            workers: Some(1),
            timeout_ms: None,
        });

        let err = simulate_with_hook(&req, &hook).unwrap_err();
        assert!(err.to_string().contains("300 of 10000"));
        let report = err.into_partial_report().unwrap();
        assert_eq!(report.trials_completed, 300);

        let champions: u64 = report.teams.iter().map(|t| t.counts.won_championship).sum();
        assert_eq!(champions, 300);
    }

    #[test]
    fn test_zero_timeout_cancels() {
        let mut req = request(&[1600.0, 1500.0], 1_000, 1, 12);
        req.engine.timeout_ms = Some(0);
        assert!(matches!(simulate(&req), Err(SimError::Cancelled(_))));
    }

    #[test]
    fn test_simulate_teams_matches_request_form() {
        let teams = roster(&[1650.0, 1600.0, 1550.0]);
        let direct = simulate_teams(&teams, 5, 1_500, Some(20.0), Some(77)).unwrap();
        let via_request = simulate(
            &SimulationRequest::new(teams)
                .with_trials(1_500)
                .with_best_of(5)
                .with_sigma(20.0)
                .with_seed(77),
        )
        .unwrap();
        assert_eq!(direct, via_request);
    }

    #[test]
    fn test_field_size_keeps_top_teams() {
        let mut req = request(&[1500.0, 1600.0, 1700.0, 1400.0, 1300.0, 1550.0], 500, 3, 10);
        req.field_size = Some(4);
        let report = simulate(&req).unwrap();

        assert_eq!(report.team_count, 4);
        assert!(report.team("t3").is_none());
        assert!(report.team("t4").is_none());
        assert!(report.team("t2").is_some());
    }

    #[test]
    fn test_unseeded_run_echoes_seed() {
        let req = SimulationRequest::new(roster(&[1500.0, 1450.0, 1400.0])).with_trials(200);
        let report = simulate(&req).unwrap();
        let replay = simulate(&req.clone().with_seed(report.seed)).unwrap();
        assert_eq!(report, replay);
    }
}
