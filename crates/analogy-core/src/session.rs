//! Presentation state machine.
//!
//! A [`Session`] walks an assembled form: `InSession(idx)` until the last item
//! is passed or the reviewer finishes, then `Finished`. `NotStarted` is the
//! absence of a session inside a [`Controller`]. Starting or resetting always
//! produces a fresh session; nothing is shared between attempts.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use thiserror::Error;
use uuid::Uuid;

use crate::assembler::{AssemblyPolicy, Form, DEFAULT_ROTATION_SAMPLE};
use crate::model::{Bank, ChoiceKey, Item, Lang};
use crate::recorder::{elapsed_ms, LocalizationEdits, LocalizationField, ResponseRecord, Responses};
use crate::scoring::{compute_score, Score};
use crate::statistics::ResponseTimeStats;
use crate::traits::Clock;

/// Delay between a selection and the automatic advance in answer-gated mode.
pub const DEFAULT_AUTO_ADVANCE: Duration = Duration::from_millis(350);

/// Errors returned by session operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// No session has been started.
    #[error("no session in progress")]
    NotInSession,

    /// The session already reached the end of the form.
    #[error("session is finished")]
    Finished,

    /// Answer-gated navigation refuses to leave an unanswered item.
    #[error("item {item_id} must be answered before moving on")]
    AnswerRequired { item_id: String },

    /// Localization edits are only recorded in review mode.
    #[error("localization edits are only available in review mode")]
    LocalizationDisabled,
}

/// Which of the two operating modes a session runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// Full bank in fixed order, free navigation, localization editing.
    Review,
    /// Randomized subset, one answer required per item, auto-advance.
    Prototype,
}

/// Whether `next()` requires an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationPolicy {
    Free,
    /// `next()` needs a response on the current item; a selection schedules an
    /// advance after `auto_advance` (zero disables scheduling).
    AnswerGated { auto_advance: Duration },
}

/// Everything fixed at session start.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub mode: SessionMode,
    pub rotation_count: usize,
    pub auto_advance: Duration,
    pub lang: Lang,
    pub dev_mode: bool,
}

impl SessionConfig {
    pub fn review() -> Self {
        Self {
            mode: SessionMode::Review,
            rotation_count: DEFAULT_ROTATION_SAMPLE,
            auto_advance: DEFAULT_AUTO_ADVANCE,
            lang: Lang::default(),
            dev_mode: false,
        }
    }

    pub fn prototype() -> Self {
        Self {
            mode: SessionMode::Prototype,
            ..Self::review()
        }
    }

    pub fn assembly_policy(&self) -> AssemblyPolicy {
        match self.mode {
            SessionMode::Review => AssemblyPolicy::Deterministic,
            SessionMode::Prototype => AssemblyPolicy::Randomized {
                rotation_count: self.rotation_count,
            },
        }
    }

    pub fn navigation_policy(&self) -> NavigationPolicy {
        match self.mode {
            SessionMode::Review => NavigationPolicy::Free,
            SessionMode::Prototype => NavigationPolicy::AnswerGated {
                auto_advance: self.auto_advance,
            },
        }
    }
}

/// Where the session is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    InSession(usize),
    Finished,
}

/// A deferred advance created by a selection in answer-gated mode.
///
/// It only takes effect if nothing moved the session since it was scheduled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledAdvance {
    attempt_id: String,
    index: usize,
    moves: u64,
    /// How long to wait before firing.
    pub delay: Duration,
}

/// One attempt over an assembled form.
pub struct Session {
    attempt_id: String,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    config: SessionConfig,
    form: Form,
    phase: Phase,
    lang: Lang,
    dev_mode: bool,
    responses: Responses,
    localization: LocalizationEdits,
    shown_at: Duration,
    moves: u64,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("attempt_id", &self.attempt_id)
            .field("mode", &self.config.mode)
            .field("phase", &self.phase)
            .field("form_len", &self.form.len())
            .field("responses", &self.responses.len())
            .finish()
    }
}

/// Fresh attempt id combining randomness and the start time.
fn new_attempt_id(started_at: &DateTime<Utc>) -> String {
    format!(
        "att_{}_{:x}",
        Uuid::new_v4().simple(),
        started_at.timestamp_millis()
    )
}

impl Session {
    /// Assemble a form and enter its first item. An empty form starts finished.
    pub fn start<R: Rng + ?Sized>(
        bank: Arc<Bank>,
        config: SessionConfig,
        clock: Arc<dyn Clock>,
        rng: &mut R,
    ) -> Self {
        let started_at = clock.now_utc();
        let form = config.assembly_policy().assemble(bank, rng);
        let mut session = Session {
            attempt_id: new_attempt_id(&started_at),
            started_at,
            ended_at: None,
            lang: config.lang,
            dev_mode: config.dev_mode,
            config,
            form,
            phase: Phase::Finished,
            responses: Responses::new(),
            localization: LocalizationEdits::new(),
            shown_at: Duration::ZERO,
            moves: 0,
            clock,
        };

        tracing::info!(
            attempt_id = %session.attempt_id,
            mode = ?session.config.mode,
            items = session.form.len(),
            "session started"
        );

        if session.form.is_empty() {
            session.finish();
        } else {
            session.enter(0);
        }
        session
    }

    fn enter(&mut self, idx: usize) {
        self.phase = Phase::InSession(idx);
        self.shown_at = self.clock.monotonic();
        self.moves += 1;
        if self.config.mode == SessionMode::Review {
            if let Some(item) = self.form.get(idx) {
                self.localization.record_for(item);
            }
        }
        tracing::debug!(idx, "entered item");
    }

    pub fn attempt_id(&self) -> &str {
        &self.attempt_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// When the session finished, if it has.
    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn mode(&self) -> SessionMode {
        self.config.mode
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn bank(&self) -> &Bank {
        self.form.bank()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    /// Current form position while in session.
    pub fn index(&self) -> Option<usize> {
        match self.phase {
            Phase::InSession(idx) => Some(idx),
            Phase::Finished => None,
        }
    }

    pub fn current_item(&self) -> Option<&Item> {
        self.index().and_then(|idx| self.form.get(idx))
    }

    pub fn lang(&self) -> Lang {
        self.lang
    }

    pub fn set_lang(&mut self, lang: Lang) {
        self.lang = lang;
    }

    pub fn dev_mode(&self) -> bool {
        self.dev_mode
    }

    pub fn set_dev_mode(&mut self, on: bool) {
        self.dev_mode = on;
    }

    pub fn responses(&self) -> &Responses {
        &self.responses
    }

    pub fn localization(&self) -> &LocalizationEdits {
        &self.localization
    }

    /// Whether `next()` would currently be accepted.
    pub fn can_advance(&self) -> bool {
        match (self.current_item(), self.config.navigation_policy()) {
            (None, _) => false,
            (Some(_), NavigationPolicy::Free) => true,
            (Some(item), NavigationPolicy::AnswerGated { .. }) => {
                self.responses.is_answered(&item.id)
            }
        }
    }

    /// Move forward one item, or finish after the last one.
    pub fn next(&mut self) -> Result<Phase, SessionError> {
        let Phase::InSession(idx) = self.phase else {
            return Ok(Phase::Finished);
        };
        if !self.can_advance() {
            let item_id = self
                .current_item()
                .map(|item| item.id.clone())
                .unwrap_or_default();
            return Err(SessionError::AnswerRequired { item_id });
        }

        if idx + 1 < self.form.len() {
            self.enter(idx + 1);
        } else {
            self.finish();
        }
        Ok(self.phase)
    }

    /// Move back one item. A no-op on the first item.
    pub fn back(&mut self) -> Result<Phase, SessionError> {
        if let Phase::InSession(idx) = self.phase {
            if idx > 0 {
                self.enter(idx - 1);
            }
        }
        Ok(self.phase)
    }

    /// Record a choice for the current item, replacing any earlier one.
    ///
    /// In answer-gated mode this returns the advance to schedule.
    pub fn select(&mut self, key: ChoiceKey) -> Result<Option<ScheduledAdvance>, SessionError> {
        let Phase::InSession(idx) = self.phase else {
            return Err(SessionError::Finished);
        };
        let Some(item) = self.form.get(idx) else {
            return Err(SessionError::Finished);
        };

        let record = ResponseRecord {
            chosen: key,
            rt_ms: elapsed_ms(self.shown_at, self.clock.monotonic()),
            ts: self.clock.now_utc(),
        };
        tracing::debug!(item_id = %item.id, chosen = %key, rt_ms = record.rt_ms, "response recorded");
        let item_id = item.id.clone();
        self.responses.record(&item_id, record);

        Ok(match self.config.navigation_policy() {
            NavigationPolicy::AnswerGated { auto_advance } if !auto_advance.is_zero() => {
                Some(ScheduledAdvance {
                    attempt_id: self.attempt_id.clone(),
                    index: idx,
                    moves: self.moves,
                    delay: auto_advance,
                })
            }
            _ => None,
        })
    }

    /// Apply a scheduled advance if the session has not moved since it was
    /// scheduled. Returns whether it advanced.
    pub fn fire_advance(&mut self, scheduled: &ScheduledAdvance) -> bool {
        let current = scheduled.attempt_id == self.attempt_id
            && scheduled.moves == self.moves
            && self.phase == Phase::InSession(scheduled.index);
        if !current {
            tracing::debug!(index = scheduled.index, "stale auto-advance ignored");
            return false;
        }
        self.next().is_ok()
    }

    /// Update one localization field of the current item.
    pub fn edit_localization(
        &mut self,
        field: LocalizationField,
        value: impl Into<String>,
    ) -> Result<(), SessionError> {
        if self.config.mode != SessionMode::Review {
            return Err(SessionError::LocalizationDisabled);
        }
        let Phase::InSession(idx) = self.phase else {
            return Err(SessionError::Finished);
        };
        let Some(item) = self.form.get(idx) else {
            return Err(SessionError::Finished);
        };
        self.localization.record_for(item).set(field, value);
        Ok(())
    }

    /// End the session from wherever it is.
    pub fn finish(&mut self) {
        if self.ended_at.is_none() {
            self.ended_at = Some(self.clock.now_utc());
        }
        self.phase = Phase::Finished;
        tracing::info!(attempt_id = %self.attempt_id, answered = self.responses.len(), "session finished");
    }

    pub fn score(&self) -> Score {
        compute_score(self.form.items(), &self.responses)
    }

    pub fn response_time_stats(&self) -> ResponseTimeStats {
        ResponseTimeStats::from_responses(self.form.items(), &self.responses)
    }

    /// Current wall-clock time as seen by this session.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now_utc()
    }
}

/// Owns the bank and user preferences; holds at most one session.
pub struct Controller {
    bank: Arc<Bank>,
    clock: Arc<dyn Clock>,
    lang: Lang,
    dev_mode: bool,
    session: Option<Session>,
}

impl Controller {
    pub fn new(bank: Arc<Bank>, clock: Arc<dyn Clock>) -> Self {
        Self {
            bank,
            clock,
            lang: Lang::default(),
            dev_mode: false,
            session: None,
        }
    }

    /// Set the preferences the next session starts with.
    pub fn with_preferences(mut self, lang: Lang, dev_mode: bool) -> Self {
        self.lang = lang;
        self.dev_mode = dev_mode;
        self
    }

    pub fn bank(&self) -> &Arc<Bank> {
        &self.bank
    }

    /// Start a fresh session, discarding any previous one.
    pub fn start<R: Rng + ?Sized>(&mut self, config: SessionConfig, rng: &mut R) -> &mut Session {
        let config = SessionConfig {
            lang: self.lang,
            dev_mode: self.dev_mode,
            ..config
        };
        let session = Session::start(self.bank.clone(), config, self.clock.clone(), rng);
        self.session.insert(session)
    }

    /// Back to `NotStarted`.
    pub fn reset(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::info!(attempt_id = %session.attempt_id(), "session reset");
        }
    }

    pub fn is_started(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Result<&Session, SessionError> {
        self.session.as_ref().ok_or(SessionError::NotInSession)
    }

    pub fn session_mut(&mut self) -> Result<&mut Session, SessionError> {
        self.session.as_mut().ok_or(SessionError::NotInSession)
    }

    pub fn lang(&self) -> Lang {
        self.lang
    }

    /// Flip the language for this and later sessions.
    pub fn toggle_lang(&mut self) -> Lang {
        self.lang = self.lang.toggled();
        if let Some(session) = self.session.as_mut() {
            session.set_lang(self.lang);
        }
        self.lang
    }

    pub fn dev_mode(&self) -> bool {
        self.dev_mode
    }

    /// Flip dev info for this and later sessions.
    pub fn toggle_dev(&mut self) -> bool {
        self.dev_mode = !self.dev_mode;
        if let Some(session) = self.session.as_mut() {
            session.set_dev_mode(self.dev_mode);
        }
        self.dev_mode
    }
}
