//! Integration Tests für die Kalender-Ingestion
//!
//! Diese Tests laufen auf dem Host (x86_64) und füttern die Pipeline mit
//! vorgefertigten Byte-Strömen

use tonnenlicht_core::parser::MAX_LINE;
use tonnenlicht_core::{CalendarIngest, IngestFlow, IngestResult, SimpleDate, TrashType};

// ============================================================================
// Helpers
// ============================================================================

fn ingest_bytes(bytes: &[u8]) -> IngestResult {
    let mut ingest = CalendarIngest::new();
    ingest.feed(bytes);
    ingest.finish()
}

fn ingest_str(text: &str) -> IngestResult {
    ingest_bytes(text.as_bytes())
}

/// Ein gültiges Marker-Paar wie es der Kalender liefert
fn pair(date: &str, summary: &str) -> String {
    format!("DTSTART;VALUE=DATE:{date}\nSUMMARY:{summary}\n")
}

// ============================================================================
// Tests: Marker-Paare und Event-Aufbau
// ============================================================================

#[test]
fn test_single_pair_yields_one_event() {
    let result = ingest_str(&pair("20250315", "Restabfall"));
    assert!(result.success());
    assert_eq!(result.event_count(), 1);
    assert_eq!(result.events[0].kind, TrashType::Restabfall);
    assert_eq!(result.events[0].date, SimpleDate::new(25, 3, 15));
}

#[test]
fn test_surrounding_calendar_noise_is_ignored() {
    let text = format!(
        "BEGIN:VCALENDAR\nVERSION:2.0\nBEGIN:VEVENT\n{}END:VEVENT\nEND:VCALENDAR\n",
        pair("20250315", "Bioabfall")
    );
    let result = ingest_str(&text);
    assert_eq!(result.event_count(), 1);
    assert_eq!(result.events[0].kind, TrashType::Bioabfall);
}

#[test]
fn test_events_keep_stream_order() {
    let text = format!(
        "{}{}{}",
        pair("20250310", "Papiertonne"),
        pair("20250302", "Restabfall"),
        pair("20250320", "Wertstoff")
    );
    let result = ingest_str(&text);
    let kinds: Vec<_> = result.events.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        [
            TrashType::Papiertonne,
            TrashType::Restabfall,
            TrashType::Wertstoff
        ]
    );
    // Keine Sortierung nach Datum
    assert_eq!(result.events[1].date, SimpleDate::new(25, 3, 2));
}

#[test]
fn test_idempotent_reparse() {
    let mut text = String::new();
    for day in 1..=20 {
        text.push_str(&pair(&format!("202503{day:02}"), "Restabfall"));
    }
    let first = ingest_str(&text);
    let second = ingest_str(&text);
    assert_eq!(first.events, second.events);
    assert_eq!(first.event_count(), 20);
}

#[test]
fn test_crlf_line_endings_are_trimmed() {
    let result = ingest_str("DTSTART;VALUE=DATE:20250315\r\nSUMMARY:Tannenbaum\r\n");
    assert_eq!(result.event_count(), 1);
    assert_eq!(result.events[0].kind, TrashType::Tannenbaum);
}

// ============================================================================
// Tests: Datums-Parsing
// ============================================================================

#[test]
fn test_year_is_stored_as_offset_from_2000() {
    let result = ingest_str(&pair("21001231", "Restabfall"));
    assert_eq!(result.events[0].date, SimpleDate::new(100, 12, 31));
}

#[test]
fn test_impossible_month_and_day_are_stored_verbatim() {
    // Keine Kalender-Validierung: Monat 13 und Tag 32 landen so im Event
    let result = ingest_str(&pair("20251332", "Restabfall"));
    assert_eq!(result.events[0].date, SimpleDate::new(25, 13, 32));
}

#[test]
fn test_short_date_is_not_a_marker() {
    let result = ingest_str("DTSTART;VALUE=DATE:2025031\nSUMMARY:Restabfall\n");
    assert_eq!(result.event_count(), 0);
    assert!(!result.success());
}

#[test]
fn test_marker_prefix_is_case_sensitive_and_exact() {
    let result = ingest_str("dtstart;value=date:20250315\nSUMMARY:Restabfall\n");
    assert_eq!(result.event_count(), 0);
}

// ============================================================================
// Tests: Kategorie-Abgleich
// ============================================================================

#[test]
fn test_label_matches_anywhere_in_line() {
    let result = ingest_str(&pair("20250315", "Abholung Wertstofftonne (gelb)"));
    assert_eq!(result.events[0].kind, TrashType::Wertstoff);
}

#[test]
fn test_first_label_in_enum_order_wins() {
    // Beide Labels in der Zeile: die Suchreihenfolge entscheidet
    let result = ingest_str(&pair("20250315", "Papiertonne und Restabfall"));
    assert_eq!(result.events[0].kind, TrashType::Restabfall);
}

#[test]
fn test_unknown_label_drops_pending_date() {
    let text = format!(
        "{}SUMMARY:Restabfall\n",
        pair("20250315", "Sperrmuell-Sammlung")
    );
    let result = ingest_str(&text);
    // Das Datum wurde mit der unbekannten Kategorie verworfen; die zweite
    // SUMMARY-Zeile hat kein offenes Datum mehr
    assert_eq!(result.event_count(), 0);
    assert_eq!(result.dropped_unmatched, 1);
}

#[test]
fn test_orphan_category_is_ignored() {
    let text = format!("SUMMARY:Restabfall\n{}", pair("20250316", "Bioabfall"));
    let result = ingest_str(&text);
    // Die verwaiste Kategoriezeile desynchronisiert nichts
    assert_eq!(result.event_count(), 1);
    assert_eq!(result.events[0].kind, TrashType::Bioabfall);
    assert_eq!(result.dropped_unmatched, 0);
}

#[test]
fn test_second_date_overwrites_pending_date() {
    let result = ingest_str(
        "DTSTART;VALUE=DATE:20250310\nDTSTART;VALUE=DATE:20250311\nSUMMARY:Restabfall\n",
    );
    assert_eq!(result.event_count(), 1);
    assert_eq!(result.events[0].date, SimpleDate::new(25, 3, 11));
}

// ============================================================================
// Tests: Kapazität
// ============================================================================

#[test]
fn test_capacity_clamps_at_100_events() {
    let mut text = String::new();
    for i in 0..150u32 {
        let day = (i % 28) + 1;
        let month = (i / 28) + 1;
        text.push_str(&pair(&format!("2025{month:02}{day:02}"), "Restabfall"));
    }
    let result = ingest_str(&text);
    assert_eq!(result.event_count(), 100);
    assert!(result.ignored_after_full > 0);
    // Die gespeicherten Events sind vollständig und unversehrt
    assert_eq!(result.events[0].date, SimpleDate::new(25, 1, 1));
    assert_eq!(result.events[99].date, SimpleDate::new(25, 4, 16));
    for event in &result.events {
        assert_eq!(event.kind, TrashType::Restabfall);
    }
}

// ============================================================================
// Tests: Zeilen-Entfaltung und Chunk-Grenzen
// ============================================================================

#[test]
fn test_folded_date_line_is_unfolded() {
    let result = ingest_str("DTSTART;VALUE=DATE:\n20250315\nSUMMARY:Bioabfall\n");
    assert_eq!(result.event_count(), 1);
    assert_eq!(result.events[0].date, SimpleDate::new(25, 3, 15));
}

#[test]
fn test_partially_folded_date_is_unfolded() {
    // Umbruch mitten in der Ziffernfolge
    let result = ingest_str("DTSTART;VALUE=DATE:2025\n0315\nSUMMARY:Bioabfall\n");
    assert_eq!(result.event_count(), 1);
    assert_eq!(result.events[0].date, SimpleDate::new(25, 3, 15));
}

#[test]
fn test_chunk_boundaries_do_not_change_the_result() {
    let text = format!(
        "{}{}",
        pair("20250315", "Restabfall"),
        pair("20250316", "Papiertonne")
    );
    let whole = ingest_str(&text);

    // Byte für Byte gefüttert
    let mut bytewise = CalendarIngest::new();
    for byte in text.as_bytes() {
        bytewise.feed(core::slice::from_ref(byte));
    }
    let bytewise = bytewise.finish();

    assert_eq!(whole.events, bytewise.events);
}

#[test]
fn test_missing_trailing_newline_still_parses_last_line() {
    let result = ingest_str("DTSTART;VALUE=DATE:20250315\nSUMMARY:Restabfall");
    assert_eq!(result.event_count(), 1);
}

#[test]
fn test_overlong_line_is_counted() {
    let mut text = String::from("X");
    text.push_str(&"y".repeat(MAX_LINE + 50));
    text.push('\n');
    text.push_str(&pair("20250315", "Restabfall"));
    let result = ingest_str(&text);
    assert_eq!(result.bad_lines, 1);
    assert_eq!(result.event_count(), 1);
}

// ============================================================================
// Tests: Inhalts-Ende und Verdikt
// ============================================================================

#[test]
fn test_double_blank_line_ends_content() {
    let text = format!(
        "{}\n\n{}",
        pair("20250315", "Restabfall"),
        pair("20250316", "Bioabfall")
    );
    let mut ingest = CalendarIngest::new();
    assert_eq!(ingest.feed(text.as_bytes()), IngestFlow::Done);
    let result = ingest.finish();
    // Alles nach dem Endmarker ist nicht mehr Teil des Inhalts
    assert_eq!(result.event_count(), 1);
}

#[test]
fn test_single_blank_line_does_not_end_content() {
    let text = format!(
        "{}\n{}",
        pair("20250315", "Restabfall"),
        pair("20250316", "Bioabfall")
    );
    let result = ingest_str(&text);
    assert_eq!(result.event_count(), 2);
}

#[test]
fn test_feeding_after_done_is_a_noop() {
    let mut ingest = CalendarIngest::new();
    ingest.feed(b"\n\n");
    assert_eq!(ingest.feed(b"DTSTART;VALUE=DATE:20250315\n"), IngestFlow::Done);
    let result = ingest.finish();
    assert_eq!(result.event_count(), 0);
}

#[test]
fn test_zero_events_is_a_failed_fetch() {
    // Transport lieferte Daten, aber keine Marker: gleicher Retry-Pfad
    // wie ein Netzwerkfehler
    let result = ingest_str("BEGIN:VCALENDAR\nPRODID:-//Entsorger//DE\nEND:VCALENDAR\n");
    assert!(!result.success());
    assert_eq!(result.event_count(), 0);
}
