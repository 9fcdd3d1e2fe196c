//! The `analogy review` and `analogy take` commands.
//!
//! Both drive a [`Controller`] from lines on stdin. A selection in
//! answer-gated mode arms a deadline; the loop races the next line against it
//! and lets the session decide whether the advance is still current.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::time::Instant;

use analogy_bank::AnalogyConfig;
use analogy_core::export::{AttemptPayload, LocalizationPayload};
use analogy_core::session::ScheduledAdvance;
use analogy_core::traits::SystemClock;
use analogy_core::{Controller, Lang, Session, SessionConfig, SessionError, SessionMode};
use analogy_report::{write_attempt, write_localization, LocalizationNaming};

use crate::input::{Input, HELP};
use crate::screen;

/// Command-line choices for an interactive session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub mode: SessionMode,
    pub bank: Option<String>,
    pub output: Option<PathBuf>,
    pub lang: Option<Lang>,
    pub dev: bool,
    pub rotation: Option<usize>,
    pub auto_advance_ms: Option<u64>,
    pub seed: Option<u64>,
}

impl SessionOptions {
    pub fn review(bank: Option<String>, output: Option<PathBuf>, lang: Option<Lang>, dev: bool) -> Self {
        Self {
            mode: SessionMode::Review,
            bank,
            output,
            lang,
            dev,
            rotation: None,
            auto_advance_ms: None,
            seed: None,
        }
    }

    pub fn take(
        bank: Option<String>,
        output: Option<PathBuf>,
        lang: Option<Lang>,
        dev: bool,
        rotation: Option<usize>,
        auto_advance_ms: Option<u64>,
        seed: Option<u64>,
    ) -> Self {
        Self {
            mode: SessionMode::Prototype,
            rotation,
            auto_advance_ms,
            seed,
            ..Self::review(bank, output, lang, dev)
        }
    }

    /// Merge flags over the config file.
    pub fn session_config(&self, config: &AnalogyConfig) -> SessionConfig {
        let base = match self.mode {
            SessionMode::Review => SessionConfig::review(),
            SessionMode::Prototype => SessionConfig::prototype(),
        };
        SessionConfig {
            rotation_count: self.rotation.unwrap_or(config.rotation_sample_size),
            auto_advance: Duration::from_millis(
                self.auto_advance_ms.unwrap_or(config.auto_advance_ms),
            ),
            lang: self.lang.unwrap_or(config.default_lang),
            dev_mode: self.dev || config.dev_mode,
            ..base
        }
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

pub async fn execute(options: SessionOptions, config_path: Option<PathBuf>) -> Result<()> {
    let config = super::resolve_config(options.bank.clone(), config_path)?;
    let bank = Arc::new(super::load_bank(&config).await?);
    println!("{}", bank.summary());

    let session_config = options.session_config(&config);
    let controller = Controller::new(bank, Arc::new(SystemClock::new()))
        .with_preferences(session_config.lang, session_config.dev_mode);
    let out_dir = options.output.clone().unwrap_or_else(|| config.output_dir.clone());

    let mut driver = Driver::new(
        controller,
        session_config,
        options.rng(),
        out_dir,
        std::io::stdout(),
    );
    driver.start()?;
    driver.run(BufReader::new(tokio::io::stdin())).await
}

/// Interactive loop over one controller.
pub struct Driver<W> {
    controller: Controller,
    config: SessionConfig,
    rng: StdRng,
    out_dir: PathBuf,
    out: W,
    pending: Option<(ScheduledAdvance, Instant)>,
    /// Attempt whose end-of-session exports were written.
    reported: Option<String>,
}

impl<W: Write> Driver<W> {
    pub fn new(
        controller: Controller,
        config: SessionConfig,
        rng: StdRng,
        out_dir: PathBuf,
        out: W,
    ) -> Self {
        Self {
            controller,
            config,
            rng,
            out_dir,
            out,
            pending: None,
            reported: None,
        }
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Start a fresh attempt and show its first item.
    pub fn start(&mut self) -> Result<()> {
        self.pending = None;
        self.controller.reset();
        self.controller.start(self.config.clone(), &mut self.rng);
        writeln!(self.out, "Type ? for help.")?;
        self.after_move()
    }

    /// Read lines until `q` or end of input. End of input finishes the attempt.
    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, input: R) -> Result<()> {
        let mut lines = input.lines();
        loop {
            let line = match self.pending.clone() {
                Some((scheduled, deadline)) => tokio::select! {
                    line = lines.next_line() => line?,
                    _ = tokio::time::sleep_until(deadline) => {
                        self.pending = None;
                        if self.session_mut()?.fire_advance(&scheduled) {
                            self.after_move()?;
                        }
                        continue;
                    }
                },
                None => lines.next_line().await?,
            };

            let Some(line) = line else {
                self.finish()?;
                break;
            };
            if !self.handle(Input::parse(&line))? {
                break;
            }
        }
        Ok(())
    }

    /// Apply one input. Returns `false` when the loop should stop.
    pub fn handle(&mut self, input: Input) -> Result<bool> {
        match input {
            Input::Select(key) => match self.session_mut()?.select(key) {
                Ok(scheduled) => {
                    let session = self.session()?;
                    let rt = session
                        .current_item()
                        .and_then(|item| session.responses().get(&item.id))
                        .map(|r| r.rt_ms)
                        .unwrap_or_default();
                    writeln!(self.out, "selected {key} ({rt} ms)")?;
                    self.pending = scheduled.map(|s| {
                        let deadline = Instant::now() + s.delay;
                        (s, deadline)
                    });
                }
                Err(e) => self.report_refusal(e)?,
            },
            Input::Next => match self.session_mut()?.next() {
                Ok(_) => self.after_move()?,
                Err(e) => self.report_refusal(e)?,
            },
            Input::Back => {
                self.session_mut()?.back()?;
                self.after_move()?;
            }
            Input::ToggleLang => {
                let lang = self.controller.toggle_lang();
                writeln!(self.out, "language: {lang}")?;
                self.show()?;
            }
            Input::ToggleDev => {
                let on = self.controller.toggle_dev();
                writeln!(self.out, "dev info: {}", if on { "on" } else { "off" })?;
                self.show()?;
            }
            Input::Panel => {
                let payload = AttemptPayload::from_session(self.session()?);
                writeln!(self.out, "{}", serde_json::to_string_pretty(&payload)?)?;
            }
            Input::SaveAttempt => {
                let payload = AttemptPayload::from_session(self.session()?);
                let path = write_attempt(&self.out_dir, &payload)?;
                writeln!(self.out, "saved {}", path.display())?;
            }
            Input::SaveLocalization => {
                if self.session()?.mode() != SessionMode::Review {
                    self.report_refusal(SessionError::LocalizationDisabled)?;
                } else {
                    let payload = LocalizationPayload::from_session(self.session()?);
                    let path =
                        write_localization(&self.out_dir, &payload, LocalizationNaming::Versioned)?;
                    writeln!(
                        self.out,
                        "saved {} ({} edited items)",
                        path.display(),
                        payload.count_items_with_edits
                    )?;
                }
            }
            Input::Finish => self.finish()?,
            Input::Restart => self.start()?,
            Input::Quit => {
                if !self.session()?.is_finished() {
                    tracing::warn!(
                        attempt_id = %self.session()?.attempt_id(),
                        "quit before finishing, nothing exported"
                    );
                }
                return Ok(false);
            }
            Input::Help => writeln!(self.out, "{HELP}")?,
            Input::Edit(field, value) => {
                let edited = self.session_mut()?.edit_localization(field, value);
                match edited {
                    Ok(()) => {
                        let count = self.session()?.localization().edited_count();
                        writeln!(self.out, "{field} updated ({count} edited items)")?;
                    }
                    Err(e) => self.report_refusal(e)?,
                }
            }
            Input::Unknown(line) => writeln!(self.out, "unknown command: {line} (? for help)")?,
        }
        Ok(true)
    }

    fn session(&self) -> Result<&Session> {
        Ok(self.controller.session()?)
    }

    fn session_mut(&mut self) -> Result<&mut Session> {
        Ok(self.controller.session_mut()?)
    }

    fn report_refusal(&mut self, e: SessionError) -> Result<()> {
        writeln!(self.out, "! {e}")?;
        Ok(())
    }

    fn show(&mut self) -> Result<()> {
        let text = screen::render(self.session()?);
        write!(self.out, "{text}")?;
        Ok(())
    }

    fn after_move(&mut self) -> Result<()> {
        self.show()?;
        if self.session()?.is_finished() {
            self.write_final_exports()?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.pending = None;
        if !self.session()?.is_finished() {
            self.session_mut()?.finish();
            self.show()?;
        }
        self.write_final_exports()
    }

    /// Score table plus the exports, once per attempt.
    fn write_final_exports(&mut self) -> Result<()> {
        let session = self.session()?;
        if self.reported.as_deref() == Some(session.attempt_id()) {
            return Ok(());
        }

        let attempt = AttemptPayload::from_session(session);
        let localization = (session.mode() == SessionMode::Review)
            .then(|| LocalizationPayload::from_session(session));
        let table = screen::score_table(&attempt.score(), &attempt.response_time_stats());
        let attempt_id = session.attempt_id().to_string();

        writeln!(self.out, "{table}")?;
        let path = write_attempt(&self.out_dir, &attempt)?;
        writeln!(self.out, "attempt saved to {}", path.display())?;
        if let Some(payload) = localization {
            let path = write_localization(&self.out_dir, &payload, LocalizationNaming::Stamped)?;
            writeln!(
                self.out,
                "localization saved to {} ({} edited items)",
                path.display(),
                payload.count_items_with_edits
            )?;
        }
        writeln!(self.out, "Type restart for a new attempt or q to quit.")?;

        self.reported = Some(attempt_id);
        Ok(())
    }
}
