// Kalender-Task - die Kontrollschleife des Geräts
//
// Ablauf: Netzwerk abwarten, Uhr synchronisieren, Erstabruf, dann ein Tick
// pro Minute. Die Tageswechsel-Erkennung macht aus allen weiteren Ticks
// desselben Tages ein No-Op; beim Monatswechsel wird der Kalender neu
// abgerufen. Abruf und Anzeige laufen strikt nacheinander in dieser einen
// Schleife, die Event-Liste braucht deshalb kein Locking.

use defmt::{error, info, warn};
use embassy_net::Stack;
use embassy_time::{Duration, Timer};
use esp_hal_smartled::smart_led_buffer;
use rgb::RGB8;
use tonnenlicht_core::{
    Clock, EventList, FAILURE_COLOR, LedFrameWriter, RolloverTracker, TickAction, refresh_frame,
};

use crate::config::{
    FAILURE_BLINK_MS, FETCH_RETRY_ATTEMPTS, FETCH_RETRY_DELAY_SECS, NTP_RETRY_DELAY_SECS,
    RMT_CLOCK_MHZ, TICK_INTERVAL_SECS,
};
use crate::hal::RmtLedWriter;
use crate::tasks::clock::{WallClock, sync_clock};
use crate::tasks::fetch::{FetchError, fetch_calendar};
use crate::tasks::wifi::wait_for_network;
use crate::{FRAME_OFF, LedFrame};

/// Kalender-Task - Embassy Task für die Kontrollschleife
///
/// Übernimmt die Hardware-Initialisierung des LED-Streifens und ruft dann
/// die Schleife auf, die nur noch über das Trait auf die LEDs zugreift.
#[embassy_executor::task]
pub async fn calendar_task(
    stack: &'static Stack<'static>,
    gpio8: esp_hal::peripherals::GPIO8<'static>,
    rmt_peripheral: esp_hal::peripherals::RMT<'static>,
    tls_seed: u64,
) {
    // Macro braucht ein Literal, Wert muss LED_COUNT entsprechen
    let mut rmt_buffer = smart_led_buffer!(3);
    let led = RmtLedWriter::new(gpio8, rmt_peripheral, RMT_CLOCK_MHZ, &mut rmt_buffer);
    calendar_run(stack, led, tls_seed).await;
}

/// Die eigentliche Kontrollschleife, Hardware nur über Traits
async fn calendar_run<L: LedFrameWriter>(
    stack: &'static Stack<'static>,
    mut led: L,
    tls_seed: u64,
) -> ! {
    info!("Kalender: Task gestartet, warte auf Netzwerk...");
    wait_for_network(stack).await;
    info!("Kalender: Netzwerk bereit");

    // Ohne Uhrzeit gibt es keinen Tageswechsel: erst synchronisieren
    let mut clock = WallClock::new();
    while let Err(e) = sync_clock(stack, &mut clock).await {
        warn!("Uhr: Synchronisation fehlgeschlagen ({}), neuer Versuch...", e);
        Timer::after(Duration::from_secs(NTP_RETRY_DELAY_SECS)).await;
    }

    // Erstabruf: ohne Kalender keine Anzeige, also endlos versuchen und
    // währenddessen den Fehlerindikator blinken lassen
    let mut events: EventList = loop {
        match fetch_calendar(stack, tls_seed).await {
            Ok(list) => break list,
            Err(e) => {
                error!("Kalender: Erstabruf fehlgeschlagen: {}", e);
                failure_blink(&mut led, FETCH_RETRY_DELAY_SECS).await;
            }
        }
    };
    let mut last_fetch_ok = true;

    let mut rollover = RolloverTracker::new();
    let mut frame: LedFrame = FRAME_OFF;

    loop {
        match clock.now() {
            None => {
                // Uhr nicht verfügbar: Tick auslassen, nächster holt es nach
                warn!("Kalender: keine Uhrzeit, Tick übersprungen");
            }
            Some(now) => match rollover.tick(now.date) {
                TickAction::Skip => {}
                TickAction::Refresh { new_month } => {
                    if new_month {
                        info!("Kalender: Monatswechsel, Liste wird neu abgerufen");
                        // Die Uhr driftet mit dem Quarz, beim monatlichen
                        // Abruf wird sie gleich mit nachgezogen
                        if let Err(e) = sync_clock(stack, &mut clock).await {
                            warn!("Uhr: Nachsynchronisation fehlgeschlagen: {}", e);
                        }
                        match refetch(stack, &mut led, tls_seed).await {
                            Ok(list) => {
                                events = list;
                                last_fetch_ok = true;
                            }
                            Err(e) => {
                                // Alte Liste bleibt stehen, Slot 0 zeigt Rot
                                error!("Kalender: Neuabruf fehlgeschlagen: {}", e);
                                last_fetch_ok = false;
                            }
                        }
                    }
                    show_today(&events, &clock, last_fetch_ok, &mut frame, &mut led);
                }
            },
        }
        Timer::after(Duration::from_secs(TICK_INTERVAL_SECS)).await;
    }
}

/// Berechnet das Frame für heute/morgen und schiebt es zum Streifen
fn show_today<L: LedFrameWriter>(
    events: &EventList,
    clock: &impl Clock,
    last_fetch_ok: bool,
    frame: &mut LedFrame,
    led: &mut L,
) {
    // Uhrzeit frisch holen: ein Neuabruf kann Minuten gedauert haben
    let Some(now) = clock.now() else {
        return;
    };
    let Some(tomorrow) = now.date.succ() else {
        return;
    };
    let due = refresh_frame(events, now.date, tomorrow, last_fetch_ok, frame);
    info!("Anzeige: {} Treffer am {}", due.len(), now.date);
    for hit in &due {
        info!("  {}", hit);
    }
    if let Err(e) = led.show(frame) {
        error!("LED: Frame konnte nicht geschrieben werden: {}", e);
    }
}

/// Monatlicher Neuabruf mit begrenzten Versuchen
async fn refetch<L: LedFrameWriter>(
    stack: &'static Stack<'static>,
    led: &mut L,
    tls_seed: u64,
) -> Result<EventList, FetchError> {
    let mut attempt = 1;
    loop {
        match fetch_calendar(stack, tls_seed).await {
            Ok(list) => return Ok(list),
            Err(e) if attempt < FETCH_RETRY_ATTEMPTS => {
                warn!(
                    "Kalender: Abruf-Versuch {}/{} fehlgeschlagen: {}",
                    attempt, FETCH_RETRY_ATTEMPTS, e
                );
                failure_blink(led, FETCH_RETRY_DELAY_SECS).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Lässt Slot 0 für die Wartezeit rot blinken
///
/// Ersetzt die Wartepause zwischen zwei Abruf-Versuchen und macht den
/// Fehlerzustand dabei sichtbar.
async fn failure_blink<L: LedFrameWriter>(led: &mut L, wait_secs: u64) {
    let mut frame: LedFrame = FRAME_OFF;
    let cycles = (wait_secs * 1000) / (2 * FAILURE_BLINK_MS);
    for _ in 0..cycles {
        frame[0] = FAILURE_COLOR;
        let _ = led.show(&frame);
        Timer::after(Duration::from_millis(FAILURE_BLINK_MS)).await;
        frame[0] = RGB8::default();
        let _ = led.show(&frame);
        Timer::after(Duration::from_millis(FAILURE_BLINK_MS)).await;
    }
}
