use crate::error::{Result, SimError};
use crate::model::{MatchModel, Side};
use crate::seeding::Bracket;
use crate::types::Stage;
use rand::Rng;

/// Stage name for a bracket depth.
///
/// `round` runs 1..=total_rounds + 1, where round r is "playing the r-th
/// match round" and total_rounds + 1 is the champion position. Labels count
/// back from the final so they hold for any bracket size.
pub fn stage_label(round: u32, total_rounds: u32) -> Option<Stage> {
    if round == 0 || round > total_rounds + 1 {
        return None;
    }
    match total_rounds + 1 - round {
        0 => Some(Stage::Champion),
        1 => Some(Stage::Final),
        2 => Some(Stage::Semifinal),
        3 => Some(Stage::Quarterfinal),
        _ => None,
    }
}

/// Display name for a bracket depth, e.g. "Round of 16"
pub fn round_name(round: u32, total_rounds: u32) -> String {
    match stage_label(round, total_rounds) {
        Some(Stage::Champion) => "Champion".to_string(),
        Some(Stage::Final) => "Finals".to_string(),
        Some(Stage::Semifinal) => "Semifinals".to_string(),
        Some(Stage::Quarterfinal) => "Quarterfinals".to_string(),
        None => format!("Round of {}", 1u64 << (total_rounds + 1 - round)),
    }
}

/// Plays single-elimination trials over one bracket, reusing its buffers
/// between trials
pub struct Advancer<'a> {
    bracket: &'a Bracket,
    model: &'a MatchModel,
    /// Occupants of the round being played
    slots: Vec<Option<usize>>,
    /// Deepest round each team occupied in the last trial
    reached: Vec<u32>,
}

impl<'a> Advancer<'a> {
    pub fn new(bracket: &'a Bracket, model: &'a MatchModel) -> Self {
        Self {
            bracket,
            model,
            slots: Vec::with_capacity(bracket.size()),
            reached: vec![0; bracket.team_count()],
        }
    }

    /// Run one trial to completion and return the champion's team index
    pub fn play<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<usize> {
        self.slots.clear();
        self.slots.extend_from_slice(self.bracket.first_round());
        // Every team starts in round 1, byes included
        self.reached.fill(1);

        for round in 1..=self.bracket.rounds() {
            let matches = self.slots.len() / 2;
            // Winner of match i moves into slot i; slots 2i and 2i + 1 are
            // always read before slot i is written
            for i in 0..matches {
                let winner = self.play_match(self.slots[2 * i], self.slots[2 * i + 1], rng)?;
                self.slots[i] = Some(winner);
                self.reached[winner] = round + 1;
            }
            self.slots.truncate(matches);
        }

        match self.slots.as_slice() {
            [Some(champion)] => Ok(*champion),
            other => Err(SimError::Invariant(format!(
                "bracket finished with {} slots instead of a single champion",
                other.len()
            ))),
        }
    }

    fn play_match<R: Rng + ?Sized>(
        &self,
        a: Option<usize>,
        b: Option<usize>,
        rng: &mut R,
    ) -> Result<usize> {
        match (a, b) {
            (Some(a), Some(b)) => {
                let teams = self.bracket.teams();
                Ok(match self.model.resolve(teams[a].rating, teams[b].rating, rng) {
                    Side::A => a,
                    Side::B => b,
                })
            }
            // Bye: no probability, no randomness
            (Some(team), None) | (None, Some(team)) => Ok(team),
            (None, None) => Err(SimError::Invariant(
                "match has no live occupant".to_string(),
            )),
        }
    }

    /// Deepest round per team index from the last `play`; values run
    /// 1..=rounds + 1
    pub fn reached(&self) -> &[u32] {
        &self.reached
    }
}
