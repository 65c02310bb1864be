use crate::error::{Result, SimError};
use crate::types::Team;

/// Fixed bracket skeleton shared read-only by every trial
#[derive(Clone, Debug)]
pub struct Bracket {
    /// Teams in seed order: index i holds seed i + 1
    teams: Vec<Team>,
    /// Round-1 slots in bracket order, as indices into `teams`. `None` is a bye.
    slots: Vec<Option<usize>>,
    rounds: u32,
}

impl Bracket {
    /// Seed `teams` by rating and lay out round 1
    pub fn new(teams: &[Team]) -> Result<Self> {
        let teams = seed_teams(teams)?;
        let size = teams.len().next_power_of_two();
        let slots = bracket_order(size)
            .into_iter()
            .map(|seed| {
                let index = seed as usize - 1;
                (index < teams.len()).then_some(index)
            })
            .collect();

        Ok(Self {
            teams,
            slots,
            rounds: size.trailing_zeros(),
        })
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn team_count(&self) -> usize {
        self.teams.len()
    }

    /// Number of round-1 slots (smallest power of two >= team count)
    pub fn size(&self) -> usize {
        self.slots.len()
    }

    /// Number of match rounds; the last one is the final
    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn first_round(&self) -> &[Option<usize>] {
        &self.slots
    }

    /// Team indices that skip round 1, strongest first
    pub fn byes(&self) -> Vec<usize> {
        let mut byes: Vec<usize> = self
            .slots
            .chunks(2)
            .filter_map(|pair| match pair {
                [Some(team), None] | [None, Some(team)] => Some(*team),
                _ => None,
            })
            .collect();
        byes.sort_unstable();
        byes
    }
}

/// Validate, sort descending by rating and assign seeds 1..=N.
/// Equal ratings keep their input order.
pub fn seed_teams(teams: &[Team]) -> Result<Vec<Team>> {
    validate_teams(teams)?;

    let mut seeded = teams.to_vec();
    // sort_by is stable
    seeded.sort_by(|a, b| b.rating.total_cmp(&a.rating));
    for (i, team) in seeded.iter_mut().enumerate() {
        team.seed = Some(i as u32 + 1);
        if team.id.is_empty() {
            team.id = team.name.clone();
        }
    }
    Ok(seeded)
}

/// Keep the top `count` teams by rating. `None` picks the largest power of
/// two the roster can fill.
pub fn select_field(teams: &[Team], count: Option<usize>) -> Result<Vec<Team>> {
    let available = teams.len();
    let count = match count {
        Some(count) => count,
        None if available == 0 => 0,
        // largest power of 2 <= available
        None => 1 << (usize::BITS - 1 - available.leading_zeros()),
    };

    if count > available {
        return Err(SimError::invalid(format!(
            "requested {} teams, but only {} available",
            count, available
        )));
    }

    let mut field = seed_teams(teams)?;
    field.truncate(count);
    Ok(field)
}

fn validate_teams(teams: &[Team]) -> Result<()> {
    if teams.len() < 2 {
        return Err(SimError::invalid(format!(
            "a bracket needs at least 2 teams, got {}",
            teams.len()
        )));
    }
    if let Some(team) = teams.iter().find(|t| !t.rating.is_finite()) {
        return Err(SimError::invalid(format!(
            "team '{}' has a non-finite rating ({})",
            team.key(),
            team.rating
        )));
    }
    Ok(())
}

/// Seed numbers in bracket position order for a power-of-two `size`.
///
/// Each pair of adjacent positions sums to `size + 1`, and the layout is
/// built recursively so seeds 1 and 2 can only meet in the final.
/// For 8: `[1, 8, 4, 5, 2, 7, 3, 6]`.
pub fn bracket_order(size: usize) -> Vec<u32> {
    let mut order = vec![1u32];
    while order.len() < size {
        let next = order.len() as u32 * 2 + 1;
        order = order.iter().flat_map(|&seed| [seed, next - seed]).collect();
    }
    order
}
