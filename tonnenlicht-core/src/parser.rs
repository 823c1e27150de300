//! Kalender-Ingestion: Bytes → Rohzeilen → logische Zeilen → Events
//!
//! Der Kalender kommt als zeilenorientierter Textstrom über einen nicht
//! spulbaren Transport. Drei Stufen:
//!
//! 1. [`LineSplitter`] zerlegt Transport-Chunks an Zeilenumbrüchen.
//! 2. [`LineUnfolder`] macht den Zeilenumbruch langer Zeilen rückgängig
//!    (eine Fortsetzungszeile besteht nur aus Ziffern).
//! 3. [`EventParser`] erkennt die beiden Marker und baut die Event-Liste.
//!
//! [`CalendarIngest`] bündelt alle drei Stufen für einen kompletten Abruf.

use crate::types::{Event, EventList, SimpleDate, TrashType};

/// Maximale Länge einer (entfalteten) Zeile in Bytes
pub const MAX_LINE: usize = 256;

const DATE_PREFIX: &str = "DTSTART;VALUE=DATE:";
const CATEGORY_PREFIX: &str = "SUMMARY:";

type LineBuf = heapless::String<MAX_LINE>;
type RawLine = heapless::Vec<u8, MAX_LINE>;

// ============================================================================
// Stufe 1: Chunks → Rohzeilen
// ============================================================================

/// Zerlegt beliebig geschnittene Byte-Chunks in LF-terminierte Rohzeilen
///
/// Überlange Zeilen werden auf [`MAX_LINE`] Bytes gekürzt und gezählt.
#[derive(Default)]
pub struct LineSplitter {
    buf: RawLine,
    overflow: bool,
    truncated: u16,
}

impl LineSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ein Byte einspeisen; bei LF kommt die abgeschlossene Rohzeile zurück
    pub fn feed_byte(&mut self, byte: u8) -> Option<RawLine> {
        if byte == b'\n' {
            if self.overflow {
                self.truncated = self.truncated.saturating_add(1);
                self.overflow = false;
            }
            return Some(core::mem::take(&mut self.buf));
        }
        if self.buf.push(byte).is_err() {
            self.overflow = true;
        }
        None
    }

    /// Rest ohne abschließendes LF beim Transport-Ende
    pub fn flush(&mut self) -> Option<RawLine> {
        if self.buf.is_empty() {
            None
        } else {
            Some(core::mem::take(&mut self.buf))
        }
    }

    pub fn truncated_lines(&self) -> u16 {
        self.truncated
    }
}

// ============================================================================
// Stufe 2: Rohzeilen → logische Zeilen
// ============================================================================

/// Macht den Umbruch langer Kalenderzeilen rückgängig
///
/// Eine nicht-leere Zeile, die nur aus Ziffern besteht, ist die Fortsetzung
/// der vorigen Zeile (typisch: das Datum hinter einem umgebrochenen
/// DTSTART-Präfix). Sie wird an den Puffer angehängt und noch nicht
/// ausgegeben. Jede andere Zeile schließt den Puffer als logische Zeile ab
/// und wird selbst zum neuen Pufferinhalt.
///
/// Das Flag `continued` merkt sich genau eine Zeile lang, dass zuletzt eine
/// Fortsetzung anlag: die unmittelbar folgende Zeile startet dann immer
/// einen frischen Puffer und kann nie in die bereits entfaltete Zeile
/// hineinlaufen.
#[derive(Default)]
pub struct LineUnfolder {
    pending: LineBuf,
    continued: bool,
}

impl LineUnfolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rohzeile einspeisen, Zeilenende-Reste bereits abgeschnitten
    ///
    /// Liefert die fertige logische Zeile, sobald sie abgeschlossen ist.
    pub fn feed(&mut self, line: &str) -> Option<LineBuf> {
        if !line.is_empty() && line.bytes().all(|b| b.is_ascii_digit()) {
            // Fortsetzungszeile: Umbruch rückgängig machen
            let _ = self.pending.push_str(line);
            self.continued = true;
            return None;
        }
        let out = if self.continued {
            // Zeile direkt nach einer Fortsetzung: der Puffer ist die
            // entfaltete Zeile und wird nicht wiederverwendet
            self.continued = false;
            Some(core::mem::take(&mut self.pending))
        } else if self.pending.is_empty() {
            None
        } else {
            Some(core::mem::take(&mut self.pending))
        };
        let _ = self.pending.push_str(line);
        out
    }

    /// Beim Stream-Ende die noch offene Zeile ausgeben
    pub fn flush(&mut self) -> Option<LineBuf> {
        self.continued = false;
        if self.pending.is_empty() {
            None
        } else {
            Some(core::mem::take(&mut self.pending))
        }
    }
}

// ============================================================================
// Stufe 3: logische Zeilen → Events
// ============================================================================

/// Erkennt Datums- und Kategorie-Marker und baut die Event-Liste
///
/// Ein Event entsteht nur aus einem Paar: erst die Datumszeile, dann die
/// Kategoriezeile. Eine Kategoriezeile ohne offenes Datum wird komplett
/// ignoriert, ein Datum ohne auflösbare Kategorie verworfen.
#[derive(Default)]
pub struct EventParser {
    events: EventList,
    pending_date: Option<SimpleDate>,
    dropped_unmatched: u16,
    ignored_after_full: u16,
}

impl EventParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Eine logische Zeile auswerten
    pub fn handle_line(&mut self, line: &str) {
        // Kapazitätsprüfung vor jeder Marker-Auswertung: ist die Liste
        // voll, wird der Rest des Abrufs ignoriert
        if self.events.is_full() {
            self.ignored_after_full = self.ignored_after_full.saturating_add(1);
            return;
        }
        if let Some(rest) = line.strip_prefix(DATE_PREFIX) {
            // Noch kein Commit, erst die Kategoriezeile macht das Event voll
            if let Some(date) = parse_compact_date(rest) {
                self.pending_date = Some(date);
            }
            return;
        }
        if let Some(date) = self.pending_date
            && line.starts_with(CATEGORY_PREFIX)
        {
            self.pending_date = None;
            match TrashType::match_label(line) {
                Some(kind) => {
                    // is_full() oben geprüft, push kann nicht fehlschlagen
                    let _ = self.events.push(Event { kind, date });
                }
                None => {
                    self.dropped_unmatched = self.dropped_unmatched.saturating_add(1);
                }
            }
        }
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }
}

/// "YYYYMMDD" am Zeilenrest, genau 8 Ziffern direkt nach dem Präfix
fn parse_compact_date(rest: &str) -> Option<SimpleDate> {
    let digits = rest.as_bytes().get(..8)?;
    if !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let num = |lo: usize, hi: usize| {
        digits[lo..hi]
            .iter()
            .fold(0u16, |acc, b| acc * 10 + u16::from(b - b'0'))
    };
    // Keine Kalender-Validierung: Monat 13 oder Tag 32 werden so gespeichert.
    // Der Jahres-Offset läuft außerhalb 2000-2255 über.
    Some(SimpleDate {
        year: num(0, 4).wrapping_sub(2000) as u8,
        month: num(4, 6) as u8,
        day: num(6, 8) as u8,
    })
}

// ============================================================================
// Fassade für einen kompletten Abruf
// ============================================================================

/// Steuersignal an den Transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestFlow {
    /// Weiterlesen
    Continue,
    /// Inhalt zu Ende (zwei Leerzeilen in Folge), Transport kann schließen
    Done,
}

/// Ergebnis eines kompletten Abrufs
#[derive(Debug)]
pub struct IngestResult {
    pub events: EventList,
    /// Kategoriezeilen, deren Label zu keiner Kategorie passte
    pub dropped_unmatched: u16,
    /// Zeilen, die nach Erreichen der Kapazität ignoriert wurden
    pub ignored_after_full: u16,
    /// Gekürzte oder nicht dekodierbare Rohzeilen
    pub bad_lines: u16,
}

impl IngestResult {
    /// Abruf-Verdikt
    ///
    /// Null Events sind von einem Totalausfall des Parsens nicht zu
    /// unterscheiden und zählen wie ein Transportfehler.
    pub fn success(&self) -> bool {
        !self.events.is_empty()
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }
}

/// Komplette Ingestion-Pipeline für einen Abruf
///
/// Chunks mit [`feed`](Self::feed) einspeisen, bis `Done` kommt oder der
/// Transport endet, dann [`finish`](Self::finish). Der Zustand wird pro
/// Abruf frisch angelegt, nichts überlebt zwischen zwei Abrufen.
#[derive(Default)]
pub struct CalendarIngest {
    splitter: LineSplitter,
    unfolder: LineUnfolder,
    parser: EventParser,
    blank_run: u8,
    bad_utf8: u16,
    done: bool,
}

impl CalendarIngest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Einen Transport-Chunk einspeisen
    pub fn feed(&mut self, chunk: &[u8]) -> IngestFlow {
        if self.done {
            return IngestFlow::Done;
        }
        for &byte in chunk {
            if let Some(raw) = self.splitter.feed_byte(byte) {
                self.process_raw(&raw);
                if self.done {
                    return IngestFlow::Done;
                }
            }
        }
        IngestFlow::Continue
    }

    fn process_raw(&mut self, raw: &[u8]) {
        let Ok(text) = core::str::from_utf8(raw) else {
            self.bad_utf8 = self.bad_utf8.saturating_add(1);
            return;
        };
        let line =
            text.trim_end_matches(|c: char| c.is_ascii_whitespace() || c.is_ascii_control());
        if line.is_empty() {
            self.blank_run += 1;
            if self.blank_run >= 2 {
                // Zwei Leerzeilen in Folge: expliziter Endmarker des Inhalts
                self.done = true;
                return;
            }
        } else {
            self.blank_run = 0;
        }
        if let Some(logical) = self.unfolder.feed(line) {
            self.parser.handle_line(&logical);
        }
    }

    /// Abruf abschließen und Ergebnis übernehmen
    pub fn finish(mut self) -> IngestResult {
        if !self.done {
            // Beim Transport-Ende hängt ggf. noch eine Zeile in den Stufen
            if let Some(raw) = self.splitter.flush() {
                self.process_raw(&raw);
            }
            if let Some(last) = self.unfolder.flush() {
                self.parser.handle_line(&last);
            }
        }
        IngestResult {
            events: self.parser.events,
            dropped_unmatched: self.parser.dropped_unmatched,
            ignored_after_full: self.parser.ignored_after_full,
            bad_lines: self.splitter.truncated.saturating_add(self.bad_utf8),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ingest(text: &str) -> IngestResult {
        let mut ingest = CalendarIngest::new();
        ingest.feed(text.as_bytes());
        ingest.finish()
    }

    #[test]
    fn test_date_and_category_become_event() {
        let result = ingest("DTSTART;VALUE=DATE:20250315\nSUMMARY:Abfuhr Restabfall\n");
        assert_eq!(result.event_count(), 1);
        assert_eq!(result.events[0].kind, TrashType::Restabfall);
        assert_eq!(result.events[0].date, SimpleDate::new(25, 3, 15));
    }

    #[test]
    fn test_folded_date_line_is_reassembled() {
        // Datumszeile nach dem Präfix umgebrochen, Fortsetzung nur Ziffern
        let result = ingest("DTSTART;VALUE=DATE:\n20250315\nSUMMARY:Bioabfall\n");
        assert_eq!(result.event_count(), 1);
        assert_eq!(result.events[0].date, SimpleDate::new(25, 3, 15));
    }

    #[test]
    fn test_compact_date_rejects_short_or_nondigit() {
        assert_eq!(parse_compact_date("2025031"), None);
        assert_eq!(parse_compact_date("2025O315"), None);
        assert!(parse_compact_date("20250315").is_some());
    }

    #[test]
    fn test_unparsed_month_and_day_stored_verbatim() {
        let date = parse_compact_date("20251332").unwrap();
        assert_eq!(date.month, 13);
        assert_eq!(date.day, 32);
    }

    #[test]
    fn test_unfolder_emits_on_next_line() {
        let mut unfolder = LineUnfolder::new();
        assert_eq!(unfolder.feed("BEGIN:VEVENT"), None);
        let emitted = unfolder.feed("SUMMARY:x").unwrap();
        assert_eq!(emitted.as_str(), "BEGIN:VEVENT");
        let last = unfolder.flush().unwrap();
        assert_eq!(last.as_str(), "SUMMARY:x");
    }

    #[test]
    fn test_unfolder_fresh_buffer_after_continuation() {
        let mut unfolder = LineUnfolder::new();
        assert_eq!(unfolder.feed("DTSTART;VALUE=DATE:"), None);
        assert_eq!(unfolder.feed("20250101"), None);
        let unfolded = unfolder.feed("SUMMARY:Wertstoff").unwrap();
        assert_eq!(unfolded.as_str(), "DTSTART;VALUE=DATE:20250101");
        // Die SUMMARY-Zeile steht jetzt allein im Puffer
        assert_eq!(unfolder.flush().unwrap().as_str(), "SUMMARY:Wertstoff");
    }

    #[test]
    fn test_double_blank_ends_content() {
        let result = ingest(
            "DTSTART;VALUE=DATE:20250315\nSUMMARY:Restabfall\n\n\nDTSTART;VALUE=DATE:20250316\nSUMMARY:Bioabfall\n",
        );
        assert_eq!(result.event_count(), 1);
    }
}
