//! Tasten-Zustandsmaschinen: Entprellung, Klick-Klassifizierung, Long-Press
//!
//! Beide Detektoren sind reine Zustandsmaschinen mit injizierter Zeit:
//! der Edge-Handler ruft sie mit dem aktuellen Pegel und einem monotonen
//! Millisekunden-Zeitstempel auf, nur das Klassifikations-Ergebnis
//! überquert die Task-Grenze.

use crate::types::ClickEvent;

/// Entprell-Schwelle: Flanken dichter als 50 ms sind Kontakt-Prellen
pub const DEBOUNCE_MS: u64 = 50;

/// Doppelklick-Fenster: zweiter Release muss innerhalb von 500 ms liegen
pub const DOUBLE_CLICK_WINDOW_MS: u64 = 500;

/// Mindestabstand zwischen zwei Releases eines Doppelklicks
///
/// Ein Release, der schneller als 200 ms auf den vorigen folgt, stammt
/// vom selben physischen Loslassen und wird verworfen.
pub const DOUBLE_CLICK_MIN_GAP_MS: u64 = 200;

/// Haltedauer für den Factory-Reset
pub const FACTORY_RESET_HOLD_MS: u64 = 3_000;

/// Klick-Klassifizierer der Ruftaste
///
/// Reagiert nur auf Flanken, bei denen die Taste im losgelassenen
/// Zustand beobachtet wird. Ablauf pro Flanke:
///
/// 1. Flanken innerhalb der Entprell-Schwelle ignorieren
/// 2. Taste nicht losgelassen → ignorieren
/// 3. Abstand zum letzten Klick bestimmt die Klassifizierung:
///    innerhalb des Doppelklick-Fensters UND über dem Mindestabstand
///    → `Double`; innerhalb des Fensters aber zu dicht → verwerfen;
///    sonst → `Single`
///
/// Ein `Single` wird nicht zurückgezogen, wenn später ein `Double`
/// daraus wird - der Konsument sieht beide Ereignisse.
#[derive(Debug, Default)]
pub struct ClickDetector {
    last_interrupt_ms: u64,
    last_click_ms: u64,
}

impl ClickDetector {
    pub const fn new() -> Self {
        Self {
            last_interrupt_ms: 0,
            last_click_ms: 0,
        }
    }

    /// Verarbeitet eine Flanke; `released` ist der beim Feuern der
    /// Flanke beobachtete Pegel.
    pub fn on_edge(&mut self, released: bool, now_ms: u64) -> Option<ClickEvent> {
        if now_ms.saturating_sub(self.last_interrupt_ms) < DEBOUNCE_MS {
            return None;
        }
        self.last_interrupt_ms = now_ms;

        if !released {
            return None;
        }

        let diff = now_ms.saturating_sub(self.last_click_ms);
        if diff < DOUBLE_CLICK_WINDOW_MS {
            if diff > DOUBLE_CLICK_MIN_GAP_MS {
                self.last_click_ms = 0;
                Some(ClickEvent::Double)
            } else {
                // Re-Trigger desselben Loslassens
                None
            }
        } else {
            self.last_click_ms = now_ms;
            Some(ClickEvent::Single)
        }
    }
}

/// Long-Press-Detektor der Reset-Taste
///
/// Bewusst eine eigene, einfachere Zustandsmaschine: der Factory-Reset
/// darf nicht mit Klick-Gesten verwechselt werden und muss schon beim
/// allerersten Boot eines unkonfigurierten Geräts funktionieren.
#[derive(Debug, Default)]
pub struct LongPressDetector {
    press_start_ms: u64,
}

impl LongPressDetector {
    pub const fn new() -> Self {
        Self { press_start_ms: 0 }
    }

    /// Verarbeitet eine Flanke; liefert `true` wenn die Taste länger
    /// als die Haltedauer gedrückt war.
    pub fn on_edge(&mut self, pressed: bool, now_ms: u64) -> bool {
        if pressed {
            self.press_start_ms = now_ms;
            false
        } else {
            now_ms.saturating_sub(self.press_start_ms) > FACTORY_RESET_HOLD_MS
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Zwei Releases 300 ms auseinander: Single, dann Double
    #[test]
    fn test_double_click_within_window() {
        let mut det = ClickDetector::new();
        assert_eq!(det.on_edge(true, 10_000), Some(ClickEvent::Single));
        assert_eq!(det.on_edge(true, 10_300), Some(ClickEvent::Double));
    }

    /// Zwei Releases 50 ms auseinander: Single, dann nichts
    /// (Mindestabstands-Regel verwirft den zweiten)
    #[test]
    fn test_release_below_min_gap_discarded() {
        let mut det = ClickDetector::new();
        assert_eq!(det.on_edge(true, 10_000), Some(ClickEvent::Single));
        assert_eq!(det.on_edge(true, 10_050), None);
    }

    /// Zwei Releases 800 ms auseinander: Single, dann wieder Single
    #[test]
    fn test_release_outside_window_restarts() {
        let mut det = ClickDetector::new();
        assert_eq!(det.on_edge(true, 10_000), Some(ClickEvent::Single));
        assert_eq!(det.on_edge(true, 10_800), Some(ClickEvent::Single));
    }

    /// Flanken unterhalb der Entprell-Schwelle werden komplett ignoriert
    #[test]
    fn test_bounce_suppressed() {
        let mut det = ClickDetector::new();
        assert_eq!(det.on_edge(true, 10_000), Some(ClickEvent::Single));
        assert_eq!(det.on_edge(true, 10_020), None);
        assert_eq!(det.on_edge(true, 10_049), None);
    }

    /// Gedrückte Taste (Flanke ohne Release-Pegel) klassifiziert nichts
    #[test]
    fn test_pressed_level_ignored() {
        let mut det = ClickDetector::new();
        assert_eq!(det.on_edge(false, 10_000), None);
        assert_eq!(det.on_edge(true, 10_100), Some(ClickEvent::Single));
    }

    /// Nach einem Double beginnt die Sequenz von vorn
    #[test]
    fn test_sequence_restarts_after_double() {
        let mut det = ClickDetector::new();
        assert_eq!(det.on_edge(true, 10_000), Some(ClickEvent::Single));
        assert_eq!(det.on_edge(true, 10_300), Some(ClickEvent::Double));
        // nächster Release weit später: wieder ein Single
        assert_eq!(det.on_edge(true, 11_300), Some(ClickEvent::Single));
    }

    #[test]
    fn test_long_press_triggers_after_hold() {
        let mut det = LongPressDetector::new();
        assert!(!det.on_edge(true, 1_000)); // gedrückt
        assert!(det.on_edge(false, 4_200)); // 3,2 s gehalten
    }

    #[test]
    fn test_short_press_does_not_trigger() {
        let mut det = LongPressDetector::new();
        assert!(!det.on_edge(true, 1_000));
        assert!(!det.on_edge(false, 3_900)); // 2,9 s: zu kurz
    }
}
