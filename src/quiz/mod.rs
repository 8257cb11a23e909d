//! Game core: a pure state machine over provider / timer / tracker.
//!
//! `QuizEngine` owns all session state and mutates it only in response to the
//! input methods below, each of which returns the `GameEvent`s the transition
//! produced. The presentation layer (src/web) consumes those events and
//! performs every DOM / canvas / audio effect; nothing in this module touches
//! the browser, so full sessions run natively under `cargo test`.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

pub mod provider;
pub mod timer;
pub mod tracker;

pub use provider::{Character, ProviderConfig, Question};
pub use timer::{Countdown, Tick, TimerGeneration};
pub use tracker::{Outcome, PowerupKind, Streak, Tracker};

/// Seconds the correct answer stays on screen between questions.
pub const REVIEW_SECONDS: u32 = 2;
/// Seconds added to the question timer by the extend-time power-up.
pub const EXTEND_SECONDS: u32 = 10;

// --- Difficulty --------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DifficultySettings {
    pub question_count: usize,
    pub seconds_per_question: u32,
    pub points_per_correct: i64,
}

impl Difficulty {
    pub fn settings(self) -> DifficultySettings {
        match self {
            Difficulty::Easy => DifficultySettings {
                question_count: 10,
                seconds_per_question: 30,
                points_per_correct: 10,
            },
            Difficulty::Normal => DifficultySettings {
                question_count: 10,
                seconds_per_question: 20,
                points_per_correct: 15,
            },
            Difficulty::Hard => DifficultySettings {
                question_count: 15,
                seconds_per_question: 15,
                points_per_correct: 20,
            },
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }
}

// --- Session data ------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Welcome,
    Loading,
    Playing,
    Reviewing,
    Results,
}

/// One resolved question. `chosen == None` means the timer expired.
#[derive(Clone, Debug, PartialEq)]
pub struct AnswerRecord {
    pub question_index: usize,
    pub chosen: Option<String>,
    pub correct: bool,
    pub time_spent_ms: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rank {
    Legend,
    Hero,
    Sidekick,
    Trainee,
    Civilian,
}

impl Rank {
    pub fn for_accuracy(percent: u32) -> Rank {
        match percent {
            90..=100 => Rank::Legend,
            75..=89 => Rank::Hero,
            60..=74 => Rank::Sidekick,
            40..=59 => Rank::Trainee,
            _ => Rank::Civilian,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Rank::Legend => "Legend",
            Rank::Hero => "Hero",
            Rank::Sidekick => "Sidekick",
            Rank::Trainee => "Trainee",
            Rank::Civilian => "Civilian",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SessionSummary {
    pub score: i64,
    pub correct: u32,
    pub wrong: u32,
    pub total: usize,
    pub accuracy_percent: u32,
    pub rank: Rank,
    pub best_streak: u32,
}

// --- Transition events -------------------------------------------------------

/// Typed transition events emitted by the engine. The presentation layer maps
/// these to DOM updates, timer intervals, network fetches and effects; the
/// engine itself performs none of that.
#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    PhaseChanged(Phase),
    /// Remote pool fetch should be started (URL comes from `load_url`).
    LoadRequested,
    /// Even the fallback pool was empty; back to Welcome with a message.
    LoadFailed { message: String },
    QuestionPresented {
        index: usize,
        total: usize,
        options: Vec<String>,
        image_url: String,
    },
    TimerStarted {
        generation: TimerGeneration,
        seconds: u32,
    },
    TimerTick { remaining: u32 },
    TimerStopped,
    AnswerJudged {
        correct: bool,
        chosen: Option<String>,
        correct_answer: String,
    },
    ScoreChanged { score: i64, delta: i64 },
    StreakChanged { length: u32, kind: Outcome },
    PowerupSpent {
        kind: PowerupKind,
        remaining_uses: u32,
    },
    OptionsReduced { removed: Vec<String> },
    TimeExtended { remaining: u32 },
    HintShown { text: String },
    Finished { summary: SessionSummary },
    ReviewShown,
}

// --- Engine ------------------------------------------------------------------

pub struct QuizEngine {
    config: ProviderConfig,
    fallback: Vec<Character>,
    rng: SmallRng,
    phase: Phase,
    settings: DifficultySettings,
    questions: Vec<Question>,
    current: usize,
    visible_options: Vec<String>,
    answers: Vec<AnswerRecord>,
    countdown: Countdown,
    tracker: Tracker,
    summary: Option<SessionSummary>,
}

impl QuizEngine {
    pub fn new(config: ProviderConfig, fallback: Vec<Character>) -> Self {
        Self::with_rng(config, fallback, SmallRng::from_entropy())
    }

    /// Deterministic construction for tests.
    pub fn with_seed(config: ProviderConfig, fallback: Vec<Character>, seed: u64) -> Self {
        Self::with_rng(config, fallback, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(config: ProviderConfig, fallback: Vec<Character>, rng: SmallRng) -> Self {
        Self {
            config,
            fallback,
            rng,
            phase: Phase::Welcome,
            settings: Difficulty::Normal.settings(),
            questions: Vec::new(),
            current: 0,
            visible_options: Vec::new(),
            answers: Vec::new(),
            countdown: Countdown::new(),
            tracker: Tracker::new(),
            summary: None,
        }
    }

    // --- Inputs --------------------------------------------------------------

    /// Welcome → Loading. When remote fetching applies, a `LoadRequested`
    /// event asks the caller to fetch `load_url(ts)` and report back through
    /// `pool_ready` / `pool_failed`; otherwise the fallback list resolves the
    /// pool synchronously.
    pub fn start(&mut self, difficulty: Difficulty) -> Vec<GameEvent> {
        if self.phase != Phase::Welcome {
            return Vec::new();
        }
        self.settings = difficulty.settings();
        self.phase = Phase::Loading;
        let mut events = vec![GameEvent::PhaseChanged(Phase::Loading)];
        if self.config.wants_remote() {
            events.push(GameEvent::LoadRequested);
        } else {
            events.extend(self.resolve_pool(Vec::new()));
        }
        events
    }

    /// Signed fetch URL for the remote pool, if remote loading applies.
    /// The timestamp is supplied by the caller (the core has no clock).
    pub fn load_url(&self, ts: u64) -> Option<String> {
        self.config.wants_remote().then(|| self.config.signed_url(ts))
    }

    pub fn pool_ready(&mut self, remote: Vec<Character>) -> Vec<GameEvent> {
        if self.phase != Phase::Loading {
            return Vec::new();
        }
        self.resolve_pool(remote)
    }

    /// Fetch failed (network, status, payload). Recovered with the fallback
    /// list; only an empty fallback surfaces as an error.
    pub fn pool_failed(&mut self) -> Vec<GameEvent> {
        if self.phase != Phase::Loading {
            return Vec::new();
        }
        self.resolve_pool(Vec::new())
    }

    fn resolve_pool(&mut self, remote: Vec<Character>) -> Vec<GameEvent> {
        let pool = provider::merge_pools(
            remote,
            &self.fallback,
            self.config.min_valid_results,
            self.config.pool_size_cap,
        );
        if pool.is_empty() {
            self.phase = Phase::Welcome;
            return vec![
                GameEvent::LoadFailed {
                    message: "No character data available. Try again.".to_string(),
                },
                GameEvent::PhaseChanged(Phase::Welcome),
            ];
        }
        self.questions =
            provider::generate_questions(&mut self.rng, &pool, self.settings.question_count);
        self.current = 0;
        self.phase = Phase::Playing;
        let mut events = vec![GameEvent::PhaseChanged(Phase::Playing)];
        events.extend(self.present_current());
        events
    }

    fn present_current(&mut self) -> Vec<GameEvent> {
        let question = &self.questions[self.current];
        self.visible_options = question.options.clone();
        let presented = GameEvent::QuestionPresented {
            index: self.current,
            total: self.questions.len(),
            options: self.visible_options.clone(),
            image_url: question.image_url.clone(),
        };
        let generation = self.countdown.start(self.settings.seconds_per_question);
        vec![
            presented,
            GameEvent::TimerStarted {
                generation,
                seconds: self.settings.seconds_per_question,
            },
        ]
    }

    /// Player picked an option. Ignored outside Playing and for options not
    /// currently visible (e.g. removed by fifty-fifty).
    pub fn answer(&mut self, chosen: &str) -> Vec<GameEvent> {
        if self.phase != Phase::Playing {
            return Vec::new();
        }
        if !self.visible_options.iter().any(|o| o == chosen) {
            return Vec::new();
        }
        let spent = self.countdown.elapsed_seconds();
        self.countdown.stop();

        let question = &self.questions[self.current];
        let correct = question.correct_answer == chosen;
        let correct_answer = question.correct_answer.clone();
        let mut events = vec![GameEvent::TimerStopped];

        if correct {
            let delta = self.tracker.score_for_correct(
                self.settings.points_per_correct,
                spent,
                self.settings.seconds_per_question,
            );
            self.tracker.record_correct(delta);
            events.push(GameEvent::AnswerJudged {
                correct: true,
                chosen: Some(chosen.to_string()),
                correct_answer,
            });
            events.push(GameEvent::ScoreChanged {
                score: self.tracker.score(),
                delta,
            });
        } else {
            self.tracker.record_incorrect();
            events.push(GameEvent::AnswerJudged {
                correct: false,
                chosen: Some(chosen.to_string()),
                correct_answer,
            });
        }
        self.answers.push(AnswerRecord {
            question_index: self.current,
            chosen: Some(chosen.to_string()),
            correct,
            time_spent_ms: u64::from(spent) * 1000,
        });
        events.push(self.streak_event());
        events.extend(self.enter_review());
        events
    }

    /// One-second tick from the presentation layer's interval. Stale
    /// generations (stopped timers, superseded runs) are discarded here.
    pub fn tick(&mut self, generation: TimerGeneration) -> Vec<GameEvent> {
        match self.countdown.tick(generation) {
            Tick::Stale => Vec::new(),
            Tick::Running(remaining) => {
                if self.phase == Phase::Playing {
                    vec![GameEvent::TimerTick { remaining }]
                } else {
                    Vec::new()
                }
            }
            Tick::Expired => match self.phase {
                Phase::Playing => self.time_expired(),
                Phase::Reviewing => self.advance(),
                _ => Vec::new(),
            },
        }
    }

    fn time_expired(&mut self) -> Vec<GameEvent> {
        let correct_answer = self.questions[self.current].correct_answer.clone();
        self.tracker.record_incorrect();
        self.answers.push(AnswerRecord {
            question_index: self.current,
            chosen: None,
            correct: false,
            time_spent_ms: u64::from(self.settings.seconds_per_question) * 1000,
        });
        let mut events = vec![
            GameEvent::AnswerJudged {
                correct: false,
                chosen: None,
                correct_answer,
            },
            self.streak_event(),
        ];
        events.extend(self.enter_review());
        events
    }

    fn streak_event(&self) -> GameEvent {
        // record_correct / record_incorrect always leave a streak behind
        let streak = self.tracker.streak().unwrap_or(Streak {
            length: 0,
            kind: Outcome::Tie,
        });
        GameEvent::StreakChanged {
            length: streak.length,
            kind: streak.kind,
        }
    }

    fn enter_review(&mut self) -> Vec<GameEvent> {
        self.phase = Phase::Reviewing;
        let generation = self.countdown.start(REVIEW_SECONDS);
        vec![
            GameEvent::PhaseChanged(Phase::Reviewing),
            GameEvent::TimerStarted {
                generation,
                seconds: REVIEW_SECONDS,
            },
        ]
    }

    fn advance(&mut self) -> Vec<GameEvent> {
        if self.current + 1 < self.questions.len() {
            self.current += 1;
            self.phase = Phase::Playing;
            let mut events = vec![GameEvent::PhaseChanged(Phase::Playing)];
            events.extend(self.present_current());
            events
        } else {
            self.finish()
        }
    }

    fn finish(&mut self) -> Vec<GameEvent> {
        self.phase = Phase::Results;
        let total = self.questions.len();
        let correct = self.tracker.correct_count();
        let accuracy_percent = if total == 0 {
            0
        } else {
            correct * 100 / total as u32
        };
        let summary = SessionSummary {
            score: self.tracker.score(),
            correct,
            wrong: self.tracker.wrong_count(),
            total,
            accuracy_percent,
            rank: Rank::for_accuracy(accuracy_percent),
            best_streak: self.tracker.best_win_streak(),
        };
        self.summary = Some(summary.clone());
        vec![
            GameEvent::PhaseChanged(Phase::Results),
            GameEvent::Finished { summary },
        ]
    }

    /// Apply a power-up from Playing. No phase change; a use is only consumed
    /// when the tracker still has one and the effect can apply.
    pub fn use_powerup(&mut self, kind: PowerupKind) -> Vec<GameEvent> {
        if self.phase != Phase::Playing {
            return Vec::new();
        }
        if !self.tracker.use_powerup(kind) {
            return Vec::new();
        }
        let mut events = vec![GameEvent::PowerupSpent {
            kind,
            remaining_uses: self.tracker.powerup_count(kind),
        }];
        match kind {
            PowerupKind::FiftyFifty => {
                let correct = self.questions[self.current].correct_answer.clone();
                let mut wrong: Vec<String> = self
                    .visible_options
                    .iter()
                    .filter(|o| **o != correct)
                    .cloned()
                    .collect();
                // Remove two wrong options, always leaving the correct one and
                // at least one wrong one (fewer with degraded tiny-pool sets).
                let removable = wrong.len().saturating_sub(1).min(2);
                let mut removed = Vec::with_capacity(removable);
                for _ in 0..removable {
                    let idx = self.rng.gen_range(0..wrong.len());
                    removed.push(wrong.swap_remove(idx));
                }
                if !removed.is_empty() {
                    self.visible_options.retain(|o| !removed.contains(o));
                    events.push(GameEvent::OptionsReduced { removed });
                }
            }
            PowerupKind::ExtendTime => {
                self.countdown.extend(EXTEND_SECONDS);
                events.push(GameEvent::TimeExtended {
                    remaining: self.countdown.remaining(),
                });
            }
            PowerupKind::Hint => {
                let text = self.questions[self.current]
                    .description
                    .clone()
                    .unwrap_or_else(|| "No intel on this character.".to_string());
                events.push(GameEvent::HintShown { text });
            }
        }
        events
    }

    /// Read-only replay of the answer list from the Results screen.
    pub fn review_answers(&self) -> Vec<GameEvent> {
        if self.phase != Phase::Results {
            return Vec::new();
        }
        vec![GameEvent::ReviewShown]
    }

    /// Results → Welcome (also usable as an abort from any phase). Cancels
    /// the countdown so pending interval callbacks land stale, and restores
    /// every piece of session state to its initial value.
    pub fn reset(&mut self) -> Vec<GameEvent> {
        self.countdown.stop();
        self.questions.clear();
        self.visible_options.clear();
        self.answers.clear();
        self.current = 0;
        self.tracker = Tracker::new();
        self.summary = None;
        self.phase = Phase::Welcome;
        vec![GameEvent::PhaseChanged(Phase::Welcome)]
    }

    // --- Accessors -----------------------------------------------------------

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> i64 {
        self.tracker.score()
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn visible_options(&self) -> &[String] {
        &self.visible_options
    }

    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    pub fn powerup_count(&self, kind: PowerupKind) -> u32 {
        self.tracker.powerup_count(kind)
    }

    pub fn streak(&self) -> Option<Streak> {
        self.tracker.streak()
    }

    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    pub fn time_remaining(&self) -> u32 {
        self.countdown.remaining()
    }
}
