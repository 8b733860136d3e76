//! Combat logging
//!
//! Records all combat events for post-run analysis. Headless runs save the
//! log as JSON alongside a short summary of the run.

use bevy::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

/// A single entry in the combat log
#[derive(Debug, Clone, Serialize)]
pub struct CombatLogEntry {
    /// Timestamp in run time (seconds since the run started)
    pub timestamp: f32,
    /// The type of event
    pub event_type: CombatLogEventType,
    /// Human-readable description of the event
    pub message: String,
    /// Damage/healing amount for HP-changing events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f32>,
    /// Who caused the event (spell or enemy name)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Types of combat log events for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CombatLogEventType {
    /// Damage dealt
    Damage,
    /// Healing done
    Healing,
    /// Player cast or discarded a spell card
    SpellCast,
    /// Spell usage crossed a mastery threshold
    Mastery,
    /// Status effect applied or refreshed
    StatusApplied,
    /// Status effect expired or was cleared
    StatusRemoved,
    /// Enemy ability or state change (enrage, teleport, survival skill)
    EnemyAction,
    /// Enemy spawned
    Spawn,
    /// Combatant died
    Death,
    /// Wave started or completed
    Wave,
    /// Run event (start, end, etc.)
    RunEvent,
}

/// Summary written at the top of a saved log file
#[derive(Debug, Clone, Serialize)]
pub struct RunMetadata {
    pub waves_cleared: u32,
    pub survived: bool,
    pub elapsed: f32,
    pub enemies_killed: u32,
    pub random_seed: Option<u64>,
}

#[derive(Serialize)]
struct SavedLog<'a> {
    metadata: &'a RunMetadata,
    entries: &'a [CombatLogEntry],
}

/// The combat log resource storing all events
#[derive(Resource, Default)]
pub struct CombatLog {
    /// All log entries in chronological order
    pub entries: Vec<CombatLogEntry>,
    /// Current run time
    pub match_time: f32,
}

impl CombatLog {
    /// Clear the log for a new run
    pub fn clear(&mut self) {
        self.entries.clear();
        self.match_time = 0.0;
    }

    /// Add a new entry to the log
    pub fn log(&mut self, event_type: CombatLogEventType, message: String) {
        self.entries.push(CombatLogEntry {
            timestamp: self.match_time,
            event_type,
            message,
            amount: None,
            source: None,
        });
    }

    /// Add an HP-changing entry with structured amount and source
    pub fn log_amount(
        &mut self,
        event_type: CombatLogEventType,
        source: impl Into<String>,
        amount: f32,
        message: String,
    ) {
        self.entries.push(CombatLogEntry {
            timestamp: self.match_time,
            event_type,
            message,
            amount: Some(amount),
            source: Some(source.into()),
        });
    }

    /// Get entries filtered by event type
    pub fn filter_by_type(&self, event_type: CombatLogEventType) -> Vec<&CombatLogEntry> {
        self.entries
            .iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Total damage per source, from entries logged with `log_amount`
    pub fn damage_by_source(&self) -> HashMap<String, f32> {
        let mut totals = HashMap::new();
        for entry in self.filter_by_type(CombatLogEventType::Damage) {
            if let (Some(source), Some(amount)) = (&entry.source, entry.amount) {
                *totals.entry(source.clone()).or_insert(0.0) += amount;
            }
        }
        totals
    }

    /// Get the last N entries
    pub fn recent(&self, count: usize) -> Vec<&CombatLogEntry> {
        self.entries.iter().rev().take(count).rev().collect()
    }

    /// Save the log as pretty JSON. Returns the path written.
    pub fn save_to_file(&self, metadata: &RunMetadata, path: &Path) -> Result<String, String> {
        let saved = SavedLog {
            metadata,
            entries: &self.entries,
        };
        let json = serde_json::to_string_pretty(&saved)
            .map_err(|e| format!("Failed to serialize combat log: {}", e))?;
        std::fs::write(path, json)
            .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
        Ok(path.display().to_string())
    }
}
