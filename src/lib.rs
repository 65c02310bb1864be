mod bracket;
mod console;
mod error;
mod model;
mod seeding;
mod simulation;
mod types;

pub use bracket::{round_name, stage_label, Advancer};
pub use error::{Result, SimError};
pub use model::{map_win_probability, series_win_probability, MatchModel, Side, RATING_SCALE};
pub use seeding::{bracket_order, seed_teams, select_field, Bracket};
pub use simulation::{
    simulate, simulate_teams, simulate_with_hook, trial_rng, validate, CancelHook, CancelToken,
    Deadline, NeverCancel, Tally,
};
pub use types::*;

use simulation::JsDeadline;
use wasm_bindgen::prelude::*;

/// Initialize panic hook and console logging
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    console::install();
}

fn parse_request(request_json: &str) -> Result<SimulationRequest> {
    serde_json::from_str(request_json)
        .map_err(|e| SimError::invalid(format!("Request parse error: {}", e)))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|e| SimError::Invariant(format!("Serialization error: {}", e)))
}

fn to_js(err: SimError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Cancelled runs still hand their partial report (flagged `partial`) to JS
fn report_to_js(result: Result<SimulationReport>) -> std::result::Result<String, JsValue> {
    match result {
        Ok(report) => to_json(&report).map_err(to_js),
        Err(SimError::Cancelled(report)) => to_json(&report).map_err(to_js),
        Err(e) => Err(to_js(e)),
    }
}

/// Run a JSON-encoded `SimulationRequest` and return the JSON report
pub fn simulate_json(request_json: &str) -> Result<String> {
    simulate_json_with_hook(request_json, &NeverCancel)
}

pub fn simulate_json_with_hook(request_json: &str, hook: &dyn CancelHook) -> Result<String> {
    let request = parse_request(request_json)?;
    let report = simulate_with_hook(&request, hook)?;
    to_json(&report)
}

/// Default request as JSON, as a template for callers
pub fn default_request_json() -> String {
    serde_json::to_string_pretty(&SimulationRequest::new(Vec::new())).unwrap_or_default()
}

/// Seeded bracket layout for display: seed order, round-1 slots and byes
pub fn bracket_layout_json(teams: &[Team]) -> Result<String> {
    let bracket = Bracket::new(teams)?;
    let seeds: Vec<_> = bracket
        .teams()
        .iter()
        .map(|t| {
            serde_json::json!({
                "seed": t.seed,
                "id": t.key(),
                "name": t.name,
                "region": t.region,
                "rating": t.rating,
            })
        })
        .collect();
    let slots: Vec<Option<u32>> = bracket
        .first_round()
        .iter()
        .map(|slot| slot.map(|index| index as u32 + 1))
        .collect();
    let byes: Vec<u32> = bracket.byes().iter().map(|&index| index as u32 + 1).collect();

    to_json(&serde_json::json!({
        "bracket_size": bracket.size(),
        "rounds": bracket.rounds(),
        "round_labels": (1..=bracket.rounds() + 1)
            .map(|round| round_name(round, bracket.rounds()))
            .collect::<Vec<_>>(),
        "teams": seeds,
        "slots": slots,
        "byes": byes,
    }))
}

/// Run a JSON request from JS
#[wasm_bindgen(js_name = simulate)]
pub fn simulate_js(request_json: &str) -> std::result::Result<String, JsValue> {
    let request = parse_request(request_json).map_err(to_js)?;
    report_to_js(simulate(&request))
}

/// Run a JSON request from JS, stopping after `timeout_ms` of wall time
#[wasm_bindgen]
pub fn simulate_with_timeout(
    request_json: &str,
    timeout_ms: f64,
) -> std::result::Result<String, JsValue> {
    let request = parse_request(request_json).map_err(to_js)?;
    report_to_js(simulate_with_hook(&request, &JsDeadline::after(timeout_ms)))
}

/// Single-map win probability for rating A against rating B
#[wasm_bindgen]
pub fn map_probability(rating_a: f64, rating_b: f64) -> f64 {
    map_win_probability(rating_a, rating_b)
}

/// Series win probability for a map win probability and best-of value
#[wasm_bindgen]
pub fn series_probability(map_probability: f64, best_of: u8) -> std::result::Result<f64, JsValue> {
    let format = Format::try_from(best_of).map_err(to_js)?;
    Ok(series_win_probability(map_probability, format))
}

/// Get default request as JSON
#[wasm_bindgen]
pub fn get_default_request() -> String {
    default_request_json()
}

/// WASM-exposed simulator holding a roster and run settings
#[wasm_bindgen]
pub struct BracketSimulator {
    request: SimulationRequest,
}

#[wasm_bindgen]
impl BracketSimulator {
    /// Create from a JSON array of teams
    #[wasm_bindgen(constructor)]
    pub fn new(teams_json: &str) -> std::result::Result<BracketSimulator, JsValue> {
        let teams: Vec<Team> = serde_json::from_str(teams_json)
            .map_err(|e| JsValue::from_str(&format!("Teams parse error: {}", e)))?;
        Ok(BracketSimulator {
            request: SimulationRequest::new(teams),
        })
    }

    pub fn set_best_of(&mut self, best_of: u8) {
        self.request.best_of = best_of;
    }

    pub fn set_trials(&mut self, trials: u64) {
        self.request.trials = trials;
    }

    /// Per-match rating noise; 0 disables it
    pub fn set_sigma(&mut self, sigma: f64) {
        self.request.sigma = Some(sigma);
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.request.seed = Some(seed);
    }

    pub fn clear_seed(&mut self) {
        self.request.seed = None;
    }

    /// Limit the bracket to the top N teams (0 = whole roster)
    pub fn set_field_size(&mut self, count: usize) {
        self.request.field_size = (count > 0).then_some(count);
    }

    /// Get seeded bracket layout as JSON
    pub fn get_seeding(&self) -> std::result::Result<String, JsValue> {
        let teams = match self.request.field_size {
            Some(count) => select_field(&self.request.teams, Some(count)).map_err(to_js)?,
            None => self.request.teams.clone(),
        };
        bracket_layout_json(&teams).map_err(to_js)
    }

    /// Get current request as JSON
    pub fn get_request(&self) -> String {
        serde_json::to_string(&self.request).unwrap_or_default()
    }

    /// Run and return the report JSON
    pub fn run(&self) -> std::result::Result<String, JsValue> {
        report_to_js(simulate(&self.request))
    }

    /// Run with a wall-clock budget; a timed-out run returns a partial report
    pub fn run_with_timeout(&self, timeout_ms: f64) -> std::result::Result<String, JsValue> {
        report_to_js(simulate_with_hook(&self.request, &JsDeadline::after(timeout_ms)))
    }
}
