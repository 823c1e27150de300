//! Pure Business Logic: Datumsabgleich und LED-Frame-Berechnung
//!
//! Funktionen ohne Hardware-Dependencies (testbar!)

use rgb::RGB8;

use crate::types::{DueEvent, DueList, Event, MatchDay, SimpleDate};

/// Farbe des Fehlerindikators auf Slot 0
pub const FAILURE_COLOR: RGB8 = RGB8 { r: 255, g: 0, b: 0 };

/// Sucht die Events, die heute oder morgen fällig sind
///
/// Die Liste wird in Speicherreihenfolge durchlaufen, das Datum feldweise
/// verglichen. Heute wird vor morgen geprüft: fällt ein Event auf beide
/// Tage, bleibt genau ein Treffer mit dem Tag "heute" übrig. Treffer werden
/// weder gruppiert noch dedupliziert; was über die Kapazität hinausgeht,
/// fällt weg.
pub fn find_due_events(events: &[Event], today: SimpleDate, tomorrow: SimpleDate) -> DueList {
    let mut due = DueList::new();
    for event in events {
        let day = if event.date == today {
            Some(MatchDay::Today)
        } else if event.date == tomorrow {
            Some(MatchDay::Tomorrow)
        } else {
            None
        };
        if let Some(day) = day {
            let _ = due.push(DueEvent {
                kind: event.kind,
                day,
            });
        }
    }
    due
}

/// Berechnet die Farbbelegung für den LED-Streifen
///
/// Regeln in dieser Reihenfolge:
/// - kein Treffer: alle Slots aus
/// - genau ein Treffer: alle Slots in der Kategoriefarbe; ist er heute
///   fällig, bleibt der mittlere Slot dunkel (Ring an, Mitte aus)
/// - mehrere Treffer: Slot 0 bleibt dunkel, die Slots 1..N zeigen die
///   Treffer in Fundreihenfolge; was nicht mehr passt, bleibt unsichtbar
/// - schlug der letzte Abruf fehl, wird Slot 0 zuletzt auf Rot gezwungen
///
/// Der Aufrufer schiebt das fertige Frame in einem Stück zur Hardware.
pub fn compose_frame(due: &[DueEvent], last_fetch_ok: bool, frame: &mut [RGB8]) {
    for slot in frame.iter_mut() {
        *slot = RGB8::default();
    }
    match due {
        [] => {}
        [single] => {
            let color = single.kind.color();
            for slot in frame.iter_mut() {
                *slot = color;
            }
            if single.day == MatchDay::Today && !frame.is_empty() {
                frame[frame.len() / 2] = RGB8::default();
            }
        }
        many => {
            for (slot, hit) in frame.iter_mut().skip(1).zip(many) {
                *slot = hit.kind.color();
            }
        }
    }
    if !last_fetch_ok && !frame.is_empty() {
        frame[0] = FAILURE_COLOR;
    }
}

/// Datumsabgleich und Frame-Berechnung in einem Schritt
///
/// Liefert die Trefferliste zurück, damit der Aufrufer sie loggen kann.
pub fn refresh_frame(
    events: &[Event],
    today: SimpleDate,
    tomorrow: SimpleDate,
    last_fetch_ok: bool,
    frame: &mut [RGB8],
) -> DueList {
    let due = find_due_events(events, today, tomorrow);
    compose_frame(&due, last_fetch_ok, frame);
    due
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TrashType;

    const BLACK: RGB8 = RGB8 { r: 0, g: 0, b: 0 };

    fn event(kind: TrashType, year: u8, month: u8, day: u8) -> Event {
        Event {
            kind,
            date: SimpleDate::new(year, month, day),
        }
    }

    #[test]
    fn test_today_beats_tomorrow_on_degenerate_clock() {
        let events = [event(TrashType::Bioabfall, 25, 3, 15)];
        let same = SimpleDate::new(25, 3, 15);
        let due = find_due_events(&events, same, same);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].day, MatchDay::Today);
    }

    #[test]
    fn test_single_today_match_darkens_center() {
        let due = [DueEvent {
            kind: TrashType::Restabfall,
            day: MatchDay::Today,
        }];
        let mut frame = [BLACK; 3];
        compose_frame(&due, true, &mut frame);
        let color = TrashType::Restabfall.color();
        assert_eq!(frame, [color, BLACK, color]);
    }

    #[test]
    fn test_two_matches_shift_past_slot_zero() {
        let due = [
            DueEvent {
                kind: TrashType::Bioabfall,
                day: MatchDay::Today,
            },
            DueEvent {
                kind: TrashType::Wertstoff,
                day: MatchDay::Tomorrow,
            },
        ];
        let mut frame = [BLACK; 3];
        compose_frame(&due, true, &mut frame);
        assert_eq!(
            frame,
            [
                BLACK,
                TrashType::Bioabfall.color(),
                TrashType::Wertstoff.color()
            ]
        );
    }

    #[test]
    fn test_failed_fetch_forces_slot_zero_red() {
        let mut frame = [BLACK; 3];
        compose_frame(&[], false, &mut frame);
        assert_eq!(frame, [FAILURE_COLOR, BLACK, BLACK]);
    }
}
