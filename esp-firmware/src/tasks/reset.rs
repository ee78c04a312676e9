// Factory-Reset Task - Long-Press löscht die Konfiguration
//
// Eigene Taste, eigener Task, eigene Zustandsmaschine - unabhängig vom
// Gesten-Worker. Muss ab dem allerersten Boot funktionieren, also vor
// jeder Netzwerk- oder Konfigurations-Initialisierung gespawnt werden.

use defmt::{error, info, warn};
use embassy_time::Instant;
use esp_hal::gpio::Input;

use esp_core::{ConfigStore, LongPressDetector};

use crate::{RestartReason, RestartSignal, SharedConfigStore};

/// Factory-Reset Task
///
/// Auf Drücken wird der Zeitpunkt gemerkt, auf Loslassen entscheidet
/// die Haltedauer. Bei Long-Press: Store löschen, Neustart signalisieren.
#[embassy_executor::task]
pub async fn factory_reset_task(
    mut button: Input<'static>,
    store: &'static SharedConfigStore,
    restart: &'static RestartSignal,
) {
    let mut detector = LongPressDetector::new();
    info!("RESET: factory reset button armed");

    loop {
        button.wait_for_any_edge().await;

        let pressed = button.is_low();
        if !detector.on_edge(pressed, Instant::now().as_millis()) {
            continue;
        }

        warn!("RESET: long press detected, erasing configuration");
        let result = {
            let mut store = store.lock().await;
            store.erase()
        };

        // Auch bei Fehler neu starten: mit einem Store in unbekanntem
        // Zustand darf das Gerät nicht weiterlaufen
        if let Err(_e) = result {
            error!("RESET: erase failed");
            restart.signal(RestartReason::StoreFailure);
        } else {
            restart.signal(RestartReason::FactoryReset);
        }
    }
}
