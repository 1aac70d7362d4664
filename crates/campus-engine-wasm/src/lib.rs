//! WASM bindings for campus-engine.
//!
//! Exposes conflict checking and shared slot finding to JavaScript via
//! `wasm-bindgen`. The calendar snapshot and all results cross the boundary
//! as JSON strings.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p campus-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target nodejs --out-dir packages/campus-engine-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/campus_engine_wasm.wasm
//! ```

use campus_engine::{
    parse_instant, ConflictChecker, EngineConfig, Interval, MemoryStore, PersonRef, RecordKey,
    Scenario, SlotFinder,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ConflictDto {
    has_conflict: bool,
    category: campus_engine::ConflictCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    record_id: Option<String>,
    message: &'static str,
}

#[derive(Serialize)]
struct SlotDto {
    start: String,
    end: String,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn config_for(timezone: Option<&str>) -> EngineConfig {
    timezone.map_or_else(EngineConfig::default, EngineConfig::with_timezone)
}

fn person(raw: &str) -> Result<PersonRef, String> {
    raw.parse().map_err(|e: campus_engine::ScheduleError| e.to_string())
}

fn instant(raw: &str, config: &EngineConfig) -> Result<DateTime<Utc>, String> {
    parse_instant(raw, config).map_err(|e| e.to_string())
}

fn record_key(raw: Option<&str>) -> Result<Option<RecordKey>, String> {
    raw.map(|r| RecordKey::parse_for(r, Scenario::Any))
        .transpose()
        .map_err(|e| e.to_string())
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

fn check_conflict_inner(
    snapshot_json: &str,
    person_ref: &str,
    start: &str,
    end: &str,
    exclude: Option<&str>,
    timezone: Option<&str>,
) -> Result<String, String> {
    let config = config_for(timezone);
    let exclude = record_key(exclude)?;
    let store = MemoryStore::from_json(snapshot_json).map_err(|e| e.to_string())?;
    let candidate = Interval::new(instant(start, &config)?, instant(end, &config)?)
        .map_err(|e| e.to_string())?;

    let result = ConflictChecker::new(&store, &config)
        .check(&person(person_ref)?, candidate, exclude.as_ref())
        .map_err(|e| e.to_string())?;

    to_json(&ConflictDto {
        has_conflict: result.has_conflict,
        category: result.category,
        message: result.category.message(),
        record_id: result.record_id,
    })
}

fn find_available_slots_inner(
    snapshot_json: &str,
    person_a: &str,
    person_b: &str,
    duration_minutes: i64,
    window_start: &str,
    window_end: &str,
    timezone: Option<&str>,
) -> Result<String, String> {
    let config = config_for(timezone);
    let store = MemoryStore::from_json(snapshot_json).map_err(|e| e.to_string())?;

    let slots = SlotFinder::new(&store, &config)
        .find_available_slots(
            &person(person_a)?,
            &person(person_b)?,
            duration_minutes,
            instant(window_start, &config)?,
            instant(window_end, &config)?,
        )
        .map_err(|e| e.to_string())?;

    let dtos: Vec<SlotDto> = slots
        .iter()
        .map(|s| SlotDto {
            start: s.start.to_rfc3339(),
            end: s.end.to_rfc3339(),
        })
        .collect();
    to_json(&dtos)
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Check a candidate booking against one person's calendar.
///
/// Returns a JSON object `{has_conflict, category, record_id?, message}`.
///
/// # Arguments
/// - `snapshot_json` -- Calendar snapshot (students, faculty, units, lectures, ...)
/// - `person` -- `"student:<id>"` or `"faculty:<id>"`
/// - `start`, `end` -- RFC 3339, or naive local time in `timezone`
/// - `exclude` -- `"<kind>:<id>"` of the record being edited, left out of the comparison
///   (`lecture`, `personal_event` or `meeting`)
/// - `timezone` -- Institution IANA timezone (defaults to UTC)
#[wasm_bindgen(js_name = "checkConflict")]
pub fn check_conflict(
    snapshot_json: &str,
    person: &str,
    start: &str,
    end: &str,
    exclude: Option<String>,
    timezone: Option<String>,
) -> Result<String, JsValue> {
    check_conflict_inner(
        snapshot_json,
        person,
        start,
        end,
        exclude.as_deref(),
        timezone.as_deref(),
    )
    .map_err(|e| JsValue::from_str(&e))
}

/// Slots of `duration_minutes` free for both people within the window.
///
/// Returns a JSON array of `{start, end}` objects with RFC 3339 strings.
#[wasm_bindgen(js_name = "findAvailableSlots")]
pub fn find_available_slots(
    snapshot_json: &str,
    person_a: &str,
    person_b: &str,
    duration_minutes: i32,
    window_start: &str,
    window_end: &str,
    timezone: Option<String>,
) -> Result<String, JsValue> {
    find_available_slots_inner(
        snapshot_json,
        person_a,
        person_b,
        i64::from(duration_minutes),
        window_start,
        window_end,
        timezone.as_deref(),
    )
    .map_err(|e| JsValue::from_str(&e))
}
