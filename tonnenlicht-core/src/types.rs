//! Core Types für den Abfallkalender
//!
//! Datenstrukturen ohne Hardware-Dependencies

use chrono::{Datelike, NaiveDate};
use rgb::RGB8;

/// Maximale Anzahl gespeicherter Events pro Abruf
///
/// Weitere Kandidaten werden still verworfen (Zähler in `IngestResult`).
pub const MAX_EVENTS: usize = 100;

/// Event-Liste eines kompletten Abrufs, feste Kapazität
pub type EventList = heapless::Vec<Event, MAX_EVENTS>;

/// Abfall-Kategorie
///
/// Die Reihenfolge der Varianten ist die Suchreihenfolge beim Abgleich
/// einer SUMMARY-Zeile: der erste Treffer gewinnt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrashType {
    /// Restabfall (graue Tonne)
    Restabfall,
    /// Bioabfall (braune Tonne)
    Bioabfall,
    /// Wertstoff (gelbe Tonne)
    Wertstoff,
    /// Papiertonne (blaue Tonne)
    Papiertonne,
    /// Tannenbaum-Abholung im Januar
    Tannenbaum,
}

impl TrashType {
    /// Alle Kategorien in Suchreihenfolge
    pub const ALL: [TrashType; 5] = [
        TrashType::Restabfall,
        TrashType::Bioabfall,
        TrashType::Wertstoff,
        TrashType::Papiertonne,
        TrashType::Tannenbaum,
    ];

    /// Anzahl der Kategorien
    pub const COUNT: usize = Self::ALL.len();

    /// Label wie es im Kalendertext vorkommt
    pub fn label(self) -> &'static str {
        match self {
            TrashType::Restabfall => "Restabfall",
            TrashType::Bioabfall => "Bioabfall",
            TrashType::Wertstoff => "Wertstoff",
            TrashType::Papiertonne => "Papiertonne",
            TrashType::Tannenbaum => "Tannenbaum",
        }
    }

    /// Anzeigefarbe der Kategorie
    pub fn color(self) -> RGB8 {
        match self {
            TrashType::Restabfall => RGB8 { r: 150, g: 150, b: 140 },
            TrashType::Bioabfall => RGB8 { r: 150, g: 20, b: 0 },
            TrashType::Wertstoff => RGB8 { r: 200, g: 200, b: 0 },
            TrashType::Papiertonne => RGB8 { r: 0, g: 0, b: 200 },
            TrashType::Tannenbaum => RGB8 { r: 0, g: 200, b: 0 },
        }
    }

    /// Sucht das erste Label das irgendwo in `line` vorkommt
    ///
    /// Bewusst tolerante Teilstring-Suche: der Kalendertext verpackt die
    /// Kategorie in wechselnde Formulierungen ("SUMMARY:Abfuhr Restabfall").
    pub fn match_label(line: &str) -> Option<TrashType> {
        Self::ALL.into_iter().find(|t| line.contains(t.label()))
    }
}

/// Kalenderdatum ohne Zeitanteil
///
/// `year` wird als Offset zum Jahr 2000 gespeichert. Jahre außerhalb
/// 2000-2255 laufen beim Parsen über, das Feld wird nicht validiert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SimpleDate {
    /// Jahre seit 2000
    pub year: u8,
    /// Monat 1-12 (unvalidiert gespeichert)
    pub month: u8,
    /// Tag 1-31 (unvalidiert gespeichert)
    pub day: u8,
}

impl SimpleDate {
    pub const fn new(year: u8, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }

    /// Der folgende Kalendertag, schaltjahresbewusst
    ///
    /// None wenn die Felder kein reales Datum ergeben.
    pub fn succ(self) -> Option<SimpleDate> {
        let date = NaiveDate::from_ymd_opt(
            2000 + i32::from(self.year),
            u32::from(self.month),
            u32::from(self.day),
        )?;
        Some(SimpleDate::from(date.succ_opt()?))
    }
}

impl From<NaiveDate> for SimpleDate {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: (date.year() - 2000) as u8,
            month: date.month() as u8,
            day: date.day() as u8,
        }
    }
}

/// Lokale Uhrzeit mit Datum, sekundengenau
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalDateTime {
    pub date: SimpleDate,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

/// Ein Abfuhrtermin aus dem Kalender
///
/// Unveränderlich nach dem Parsen; die komplette Liste wird bei jedem
/// erfolgreichen Abruf neu aufgebaut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub kind: TrashType,
    pub date: SimpleDate,
}

/// Heute oder morgen fällig?
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchDay {
    Today,
    Tomorrow,
}

/// Treffer des Datumsabgleichs, nur für einen Refresh gültig
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueEvent {
    pub kind: TrashType,
    pub day: MatchDay,
}

/// Treffer-Liste eines Refreshs, ein Slot je Kategorie
pub type DueList = heapless::Vec<DueEvent, { TrashType::COUNT }>;

// ============================================================================
// defmt::Format Implementations (optional feature)
// ============================================================================

#[cfg(feature = "defmt")]
impl defmt::Format for TrashType {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}", self.label());
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for SimpleDate {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "{}-{=u8:02}-{=u8:02}",
            2000u16 + u16::from(self.year),
            self.month,
            self.day
        );
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Event {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "Event {{ {} am {} }}", self.kind, self.date);
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for DueEvent {
    fn format(&self, fmt: defmt::Formatter) {
        let day = match self.day {
            MatchDay::Today => "heute",
            MatchDay::Tomorrow => "morgen",
        };
        defmt::write!(fmt, "DueEvent {{ {} {} }}", self.kind, day);
    }
}
