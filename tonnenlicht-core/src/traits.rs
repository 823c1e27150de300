//! Hardware Abstraction Traits
//!
//! Diese Traits definieren Schnittstellen für Hardware-Zugriff
//! ohne konkrete Implementierung.

use rgb::RGB8;

use crate::types::LocalDateTime;

/// Fehler-Typ für LED-Operationen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedError {
    WriteFailed,
}

#[cfg(feature = "defmt")]
impl defmt::Format for LedError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            LedError::WriteFailed => defmt::write!(fmt, "WriteFailed"),
        }
    }
}

/// Trait für den LED-Streifen
///
/// Abstrahiert den Zugriff auf die RGB LEDs (WS2812/Neopixel). Das Frame
/// wird als Ganzes übernommen, damit keine Zwischenzustände sichtbar werden.
///
/// # Implementierungen
/// - **Production:** RmtLedWriter (ESP32 RMT Peripheral)
/// - **Testing:** MockFrameWriter (in-memory Mock)
pub trait LedFrameWriter: Send {
    /// Schreibt ein komplettes Frame auf den Streifen
    fn show(&mut self, frame: &[RGB8]) -> Result<(), LedError>;
}

/// Trait für die lokale Uhr
///
/// Liefert None solange die Uhr noch nicht synchronisiert ist; ein Tick
/// ohne Uhrzeit wird ausgelassen und beim nächsten Tick nachgeholt.
pub trait Clock {
    fn now(&self) -> Option<LocalDateTime>;
}
