//! Tageswechsel-Erkennung
//!
//! Entscheidet einmal pro Scheduling-Tick, ob die Anzeige neu berechnet
//! werden muss (neuer Kalendertag) und ob die Event-Liste neu abzurufen ist
//! (neuer Monat).

use crate::types::SimpleDate;

/// Entscheidung eines Ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickAction {
    /// Gleicher Kalendertag wie beim letzten Tick, nichts zu tun
    Skip,
    /// Neuer Tag: Anzeige auffrischen; bei `new_month` zusätzlich die
    /// Event-Liste neu abrufen
    Refresh { new_month: bool },
}

/// Tag/Monat-Zustand über die Prozesslaufzeit
///
/// Der Monatsvergleich ist bewusst grob: es werden nur Monatsnummern
/// verglichen, nicht Jahr und Monat. Bei Tick-Abständen im Minutenbereich
/// reicht das.
pub struct RolloverTracker {
    last_month: u8,
    last_day: u8,
    first_run: bool,
}

impl RolloverTracker {
    pub fn new() -> Self {
        Self {
            last_month: 0,
            last_day: 0,
            first_run: true,
        }
    }

    /// Einen Scheduling-Tick auswerten
    ///
    /// Der allererste Tick frischt immer auf und initialisiert den Zustand,
    /// meldet aber keinen Monatswechsel.
    pub fn tick(&mut self, today: SimpleDate) -> TickAction {
        if !self.first_run && self.last_day == today.day {
            return TickAction::Skip;
        }
        let new_month = !self.first_run && self.last_month != today.month;
        self.first_run = false;
        self.last_day = today.day;
        self.last_month = today.month;
        TickAction::Refresh { new_month }
    }
}

impl Default for RolloverTracker {
    fn default() -> Self {
        Self::new()
    }
}
