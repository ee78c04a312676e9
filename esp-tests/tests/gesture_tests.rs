//! Integration Tests für die Tasten-Zustandsmaschinen
//!
//! Simuliert komplette Drück-/Loslass-Zyklen mit beiden Flanken, so wie
//! sie der Flanken-Handler auf der Hardware sieht.

use esp_core::{ClickDetector, ClickEvent, LongPressDetector};

/// Ein kompletter Tastendruck: Drück-Flanke, dann Loslass-Flanke
fn click(det: &mut ClickDetector, press_ms: u64, release_ms: u64) -> Option<ClickEvent> {
    assert_eq!(det.on_edge(false, press_ms), None, "press edge must not classify");
    det.on_edge(true, release_ms)
}

#[test]
fn test_single_click_cycle() {
    let mut det = ClickDetector::new();
    assert_eq!(click(&mut det, 10_000, 10_080), Some(ClickEvent::Single));
}

#[test]
fn test_double_click_cycle() {
    let mut det = ClickDetector::new();
    // Releases liegen 300 ms auseinander: im Fenster, über dem Mindestabstand
    assert_eq!(click(&mut det, 10_000, 10_080), Some(ClickEvent::Single));
    assert_eq!(click(&mut det, 10_250, 10_380), Some(ClickEvent::Double));
}

#[test]
fn test_slow_clicks_stay_single() {
    let mut det = ClickDetector::new();
    // 800 ms zwischen den Releases: außerhalb des Doppelklick-Fensters
    assert_eq!(click(&mut det, 10_000, 10_080), Some(ClickEvent::Single));
    assert_eq!(click(&mut det, 10_700, 10_880), Some(ClickEvent::Single));
}

#[test]
fn test_release_bounce_discarded_by_min_gap() {
    let mut det = ClickDetector::new();
    assert_eq!(det.on_edge(false, 10_000), None);
    assert_eq!(det.on_edge(true, 10_080), Some(ClickEvent::Single));
    // dasselbe Loslassen prellt 80 ms später noch einmal: im Fenster,
    // aber unter dem Mindestabstand - kein zweites Ereignis
    assert_eq!(det.on_edge(true, 10_160), None);
}

#[test]
fn test_contact_bounce_suppressed_by_debounce() {
    let mut det = ClickDetector::new();
    assert_eq!(det.on_edge(false, 10_000), None);
    // Prellen der Drück-Flanke innerhalb von 50 ms
    assert_eq!(det.on_edge(false, 10_010), None);
    assert_eq!(det.on_edge(true, 10_030), None);
    // sauberer Release danach
    assert_eq!(det.on_edge(true, 10_100), Some(ClickEvent::Single));
}

#[test]
fn test_triple_click_gives_single_double_single() {
    let mut det = ClickDetector::new();
    assert_eq!(click(&mut det, 10_000, 10_080), Some(ClickEvent::Single));
    assert_eq!(click(&mut det, 10_250, 10_380), Some(ClickEvent::Double));
    // nach dem Double ist die Sequenz zurückgesetzt
    assert_eq!(click(&mut det, 10_550, 10_680), Some(ClickEvent::Single));
}

// ============================================================================
// Long-Press (Factory Reset)
// ============================================================================

#[test]
fn test_long_press_triggers() {
    let mut det = LongPressDetector::new();
    assert!(!det.on_edge(true, 5_000));
    assert!(det.on_edge(false, 8_400));
}

#[test]
fn test_short_press_ignored() {
    let mut det = LongPressDetector::new();
    assert!(!det.on_edge(true, 5_000));
    assert!(!det.on_edge(false, 7_500));
}

#[test]
fn test_exact_threshold_is_not_enough() {
    let mut det = LongPressDetector::new();
    assert!(!det.on_edge(true, 5_000));
    // genau 3000 ms: "länger als" ist gefordert
    assert!(!det.on_edge(false, 8_000));
}

#[test]
fn test_repeated_presses_track_latest_start() {
    let mut det = LongPressDetector::new();
    assert!(!det.on_edge(true, 1_000));
    assert!(!det.on_edge(false, 1_500));
    // zweiter Druck zählt ab seinem eigenen Start
    assert!(!det.on_edge(true, 10_000));
    assert!(det.on_edge(false, 13_200));
}
