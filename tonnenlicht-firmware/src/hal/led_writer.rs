// LED-Streifen-Ansteuerung über das RMT Peripheral
//
// Implementiert das LedFrameWriter Trait aus tonnenlicht-core für die
// echte Hardware. Der Mock für Host-Tests lebt im Test-Crate.

use esp_hal::Blocking;
use esp_hal::rmt::Rmt;
use esp_hal::time::Rate;
use esp_hal_smartled::SmartLedsAdapter;
use rgb::RGB8;
use smart_leds_trait::SmartLedsWrite;
use tonnenlicht_core::{LedError, LedFrameWriter};

use crate::config::LED_COUNT;

/// Buffer-Größe für den Streifen (LEDs * 3 Farben * 8 Bits + 1 Reset)
pub const LED_BUFFER_SIZE: usize = LED_COUNT * 24 + 1;

/// LED Writer für den WS2812-Streifen
///
/// Nutzt das ESP32 RMT Peripheral für das präzise WS2812-Timing. Alle
/// Pixel eines Frames gehen in einem einzigen write() raus, der Streifen
/// übernimmt sie gemeinsam mit dem Reset-Puls.
///
/// Hinweis: Der Buffer muss den Task überleben, daher wird er im Task
/// erstellt und als Parameter übergeben statt im Constructor allokiert.
pub struct RmtLedWriter<'a> {
    strip: SmartLedsAdapter<'a, LED_BUFFER_SIZE>,
}

impl<'a> RmtLedWriter<'a> {
    /// Erstellt einen neuen RmtLedWriter
    ///
    /// # Parameter
    /// - `gpio`: GPIO Peripheral für die LED-Datenleitung
    /// - `rmt_peripheral`: RMT Peripheral
    /// - `rmt_clock_mhz`: RMT Clock Frequenz in MHz (z.B. 80)
    /// - `buffer`: Buffer für LED-Daten (erstellt mit smart_led_buffer! Macro)
    pub fn new(
        gpio: esp_hal::peripherals::GPIO8<'a>,
        rmt_peripheral: esp_hal::peripherals::RMT<'a>,
        rmt_clock_mhz: u32,
        buffer: &'a mut [esp_hal::rmt::PulseCode; LED_BUFFER_SIZE],
    ) -> Self {
        let rmt: Rmt<'a, Blocking> =
            Rmt::new(rmt_peripheral, Rate::from_mhz(rmt_clock_mhz)).unwrap();
        let strip = SmartLedsAdapter::new(rmt.channel0, gpio, buffer);

        Self { strip }
    }
}

impl<'a> LedFrameWriter for RmtLedWriter<'a> {
    fn show(&mut self, frame: &[RGB8]) -> Result<(), LedError> {
        self.strip
            .write(frame.iter().copied())
            .map_err(|_| LedError::WriteFailed)
    }
}
