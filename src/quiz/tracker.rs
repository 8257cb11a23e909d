//! Score, power-up inventory and streak bookkeeping.
//!
//! The tracker never applies a power-up's effect itself; it only accounts for
//! uses. The state machine reads the returned bool and performs the actual
//! option removal / time extension / hint display.

/// Limited-use player actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PowerupKind {
    /// Remove two wrong options from the visible set.
    FiftyFifty,
    /// Add seconds to the running question timer.
    ExtendTime,
    /// Reveal the character's description text.
    Hint,
}

impl PowerupKind {
    pub const ALL: [PowerupKind; 3] = [
        PowerupKind::FiftyFifty,
        PowerupKind::ExtendTime,
        PowerupKind::Hint,
    ];

    fn slot(self) -> usize {
        match self {
            PowerupKind::FiftyFifty => 0,
            PowerupKind::ExtendTime => 1,
            PowerupKind::Hint => 2,
        }
    }
}

/// Result kind of one resolved question.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Lose,
    Tie,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Streak {
    pub length: u32,
    pub kind: Outcome,
}

/// Win-streak length at which the focus bonus activates.
pub const FOCUS_STREAK: u32 = 3;
/// Flat additive points while focus is active.
pub const FOCUS_BONUS: i64 = 5;

/// Per-session uses: one fifty-fifty, one time extension, two hints.
const STANDARD_ALLOWANCE: [u32; 3] = [1, 1, 2];

#[derive(Debug)]
pub struct Tracker {
    score: i64,
    correct: u32,
    wrong: u32,
    powerups: [u32; 3],
    streak: Option<Streak>,
    best_win_streak: u32,
}

impl Tracker {
    pub fn new() -> Self {
        Self {
            score: 0,
            correct: 0,
            wrong: 0,
            powerups: STANDARD_ALLOWANCE,
            streak: None,
            best_win_streak: 0,
        }
    }

    /// Points awarded for a correct answer: base plus half the unspent time
    /// (floored, never negative), plus the focus bonus while it is active.
    pub fn score_for_correct(
        &self,
        base_points: i64,
        time_spent_seconds: u32,
        time_limit_seconds: u32,
    ) -> i64 {
        let time_bonus = (time_limit_seconds.saturating_sub(time_spent_seconds) / 2) as i64;
        base_points + time_bonus + if self.focus_active() { FOCUS_BONUS } else { 0 }
    }

    /// Focus is a streak reward: active once the current win streak has
    /// reached `FOCUS_STREAK`, dropped the moment the streak breaks.
    pub fn focus_active(&self) -> bool {
        matches!(
            self.streak,
            Some(Streak { length, kind: Outcome::Win }) if length >= FOCUS_STREAK
        )
    }

    pub fn record_correct(&mut self, points: i64) {
        self.correct += 1;
        self.score += points.max(0);
        self.update_streak(Outcome::Win);
    }

    pub fn record_incorrect(&mut self) {
        self.wrong += 1;
        self.update_streak(Outcome::Lose);
    }

    fn update_streak(&mut self, kind: Outcome) {
        let length = match self.streak {
            Some(prev) if prev.kind == kind => prev.length + 1,
            _ => 1,
        };
        self.streak = Some(Streak { length, kind });
        if kind == Outcome::Win && length > self.best_win_streak {
            self.best_win_streak = length;
        }
    }

    /// Consume one use of `kind`. Returns false (and changes nothing) when the
    /// count is already zero.
    pub fn use_powerup(&mut self, kind: PowerupKind) -> bool {
        let slot = kind.slot();
        if self.powerups[slot] == 0 {
            return false;
        }
        self.powerups[slot] -= 1;
        true
    }

    pub fn powerup_count(&self, kind: PowerupKind) -> u32 {
        self.powerups[kind.slot()]
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn correct_count(&self) -> u32 {
        self.correct
    }

    pub fn wrong_count(&self) -> u32 {
        self.wrong
    }

    pub fn streak(&self) -> Option<Streak> {
        self.streak
    }

    pub fn best_win_streak(&self) -> u32 {
        self.best_win_streak
    }
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new()
    }
}
