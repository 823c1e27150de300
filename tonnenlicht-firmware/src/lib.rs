// Library-Root: Wiederverwendbare Logik und Module
// Keine Standard-Bibliothek (Embedded System)
#![no_std]

// Module
pub mod config;
pub mod hal;
pub mod tasks;

// Re-exports von tonnenlicht-core
pub use tonnenlicht_core::{
    CalendarIngest, Clock, DueEvent, Event, EventList, IngestFlow, IngestResult, LedError,
    LedFrameWriter, LocalDateTime, MatchDay, RolloverTracker, SimpleDate, TickAction, TrashType,
    compose_frame, find_due_events, refresh_frame,
};

// RGB Farb-Typ (direkt von rgb crate)
use rgb::RGB8;

use crate::config::LED_COUNT;

/// Ein komplettes Anzeige-Frame für den Streifen
///
/// Wird immer als Ganzes berechnet und als Ganzes zur Hardware geschoben,
/// damit keine halb aktualisierten Zwischenzustände sichtbar werden.
pub type LedFrame = [RGB8; LED_COUNT];

/// Frame mit allen Slots aus
pub const FRAME_OFF: LedFrame = [RGB8 { r: 0, g: 0, b: 0 }; LED_COUNT];
