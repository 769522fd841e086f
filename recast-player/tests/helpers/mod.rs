//! Test harness for PlaybackEngine integration tests
//!
//! Provides scripted doubles for the three environment ports plus a
//! TestEngine wrapper that wires them together over a fixed-origin
//! schedule.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use recast_player::playback::ports::{
    DurationProbe, FetchError, PayloadFetcher, PlaybackStartError, PlayerPort, ProbeError,
};
use recast_player::schedule::{Schedule, ScheduleItem};
use recast_player::{PlaybackEngine, PlayerConfig};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Fixed broadcast origin used by all scenario schedules.
pub fn t0() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 15)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap()
}

/// Commands recorded by the mock player, in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCommand {
    Load(String),
    Seek(f64),
    Play,
    Pause,
    Stop,
}

/// How the mock player answers `play()`.
#[derive(Debug, Clone, Copy)]
pub enum PlayScript {
    Accept,
    Block,
    Fail,
}

/// Scripted player port recording every command.
pub struct MockPlayer {
    commands: Mutex<Vec<PlayerCommand>>,
    position: Mutex<f64>,
    script: Mutex<PlayScript>,
}

impl MockPlayer {
    pub fn new() -> Self {
        Self {
            commands: Mutex::new(Vec::new()),
            position: Mutex::new(0.0),
            script: Mutex::new(PlayScript::Accept),
        }
    }

    pub fn set_play_script(&self, script: PlayScript) {
        *self.script.lock().unwrap() = script;
    }

    pub fn set_position(&self, secs: f64) {
        *self.position.lock().unwrap() = secs;
    }

    pub fn commands(&self) -> Vec<PlayerCommand> {
        self.commands.lock().unwrap().clone()
    }

    pub fn last_loaded(&self) -> Option<String> {
        self.commands()
            .into_iter()
            .rev()
            .find_map(|command| match command {
                PlayerCommand::Load(source) => Some(source),
                _ => None,
            })
    }

    pub fn play_count(&self) -> usize {
        self.commands()
            .iter()
            .filter(|c| matches!(c, PlayerCommand::Play))
            .count()
    }

    fn record(&self, command: PlayerCommand) {
        self.commands.lock().unwrap().push(command);
    }
}

#[async_trait]
impl PlayerPort for MockPlayer {
    async fn load(&self, source: &str) {
        self.record(PlayerCommand::Load(source.to_string()));
    }

    async fn seek(&self, position_secs: f64) {
        self.record(PlayerCommand::Seek(position_secs));
    }

    async fn play(&self) -> Result<(), PlaybackStartError> {
        self.record(PlayerCommand::Play);
        match *self.script.lock().unwrap() {
            PlayScript::Accept => Ok(()),
            PlayScript::Block => Err(PlaybackStartError::AutoplayBlocked),
            PlayScript::Fail => Err(PlaybackStartError::Failed("scripted failure".to_string())),
        }
    }

    async fn pause(&self) {
        self.record(PlayerCommand::Pause);
    }

    async fn stop(&self) {
        self.record(PlayerCommand::Stop);
    }

    async fn position_secs(&self) -> f64 {
        *self.position.lock().unwrap()
    }
}

/// Scripted duration probe: sources map to a duration or a failure.
/// Unknown sources fail. Every call is logged in order.
pub struct ScriptedProbe {
    durations: Mutex<HashMap<String, Option<f64>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedProbe {
    pub fn new() -> Self {
        Self {
            durations: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with(self, source: &str, duration_secs: f64) -> Self {
        self.durations
            .lock()
            .unwrap()
            .insert(source.to_string(), Some(duration_secs));
        self
    }

    pub fn failing(self, source: &str) -> Self {
        self.durations.lock().unwrap().insert(source.to_string(), None);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, source: &str) -> usize {
        self.calls().iter().filter(|s| s.as_str() == source).count()
    }
}

#[async_trait]
impl DurationProbe for ScriptedProbe {
    async fn probe(&self, source: &str) -> Result<f64, ProbeError> {
        self.calls.lock().unwrap().push(source.to_string());
        match self.durations.lock().unwrap().get(source) {
            Some(Some(secs)) => Ok(*secs),
            _ => Err(ProbeError::Unsupported("scripted failure".to_string())),
        }
    }
}

/// Fetcher counting completed fetches.
pub struct CountingFetcher {
    pub calls: AtomicUsize,
}

impl CountingFetcher {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PayloadFetcher for CountingFetcher {
    async fn fetch(&self, _source: &str) -> Result<(), FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Engine plus its scripted ports.
pub struct TestEngine {
    pub engine: Arc<PlaybackEngine>,
    pub player: Arc<MockPlayer>,
    pub probe: Arc<ScriptedProbe>,
    pub fetcher: Arc<CountingFetcher>,
}

impl TestEngine {
    /// Build an engine over items starting `offset` seconds past `t0()`.
    pub fn build(items: &[(i64, &str)], probe: ScriptedProbe) -> Self {
        Self::build_with_config(items, probe, PlayerConfig::default())
    }

    pub fn build_with_config(
        items: &[(i64, &str)],
        probe: ScriptedProbe,
        config: PlayerConfig,
    ) -> Self {
        let schedule = Schedule::from_items(
            items
                .iter()
                .map(|(offset, source)| {
                    ScheduleItem::new(
                        t0() + chrono::Duration::seconds(*offset),
                        source.to_string(),
                    )
                })
                .collect(),
        );

        let player = Arc::new(MockPlayer::new());
        let probe = Arc::new(probe);
        let fetcher = Arc::new(CountingFetcher::new());
        let engine = Arc::new(PlaybackEngine::new(
            config,
            schedule,
            player.clone(),
            probe.clone(),
            fetcher.clone(),
        ));

        Self {
            engine,
            player,
            probe,
            fetcher,
        }
    }

    /// Wall-clock instant `offset` seconds past the broadcast origin.
    pub fn at(&self, offset: i64) -> NaiveDateTime {
        t0() + chrono::Duration::seconds(offset)
    }
}
