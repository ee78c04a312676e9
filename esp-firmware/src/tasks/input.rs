// Ruftasten-Tasks: Flanken-Handler und Gesten-Worker
//
// Der Flanken-Handler besitzt die Zeitstempel der Zustandsmaschine
// exklusiv; über die Task-Grenze geht nur das Klassifikations-Ergebnis
// als non-blocking Notification. Validierung, Display und Publishing
// passieren ausschließlich im Worker.

use defmt::{info, warn};
use embassy_time::Instant;
use esp_hal::gpio::Input;

use esp_core::{ClickDetector, ClickEvent, StatusMessage};

use crate::config::STATUS_DISPLAY_MS;
use crate::{ClickReceiver, ClickSender, DisplaySender, PublishSender};

/// Status-Text für den Einzelklick (beim Boot aus Konfiguration + IP gebaut)
pub type StatusText = heapless::String<{ esp_core::types::STATUS_TEXT_MAX }>;

/// Flanken-Handler der Ruftaste
///
/// Wartet auf Pegelwechsel, füttert den Klassifizierer mit Pegel und
/// monotonem Zeitstempel und notified den Worker. try_send: dieser
/// Handler blockiert nie, eine volle Queue verwirft das Ereignis.
#[embassy_executor::task]
pub async fn call_button_task(mut button: Input<'static>, events: ClickSender) {
    let mut detector = ClickDetector::new();
    info!("BUTTON: call button armed");

    loop {
        button.wait_for_any_edge().await;

        // Taste gegen GND mit Pull-Up: high = losgelassen
        let released = button.is_high();
        if let Some(event) = detector.on_edge(released, Instant::now().as_millis()) {
            if events.try_send(event).is_err() {
                warn!("BUTTON: event queue full, dropping {}", event);
            }
        }
    }
}

/// Gesten-Worker
///
/// Blockiert auf dem Ereignis-Channel:
/// - `Single` → Status-Seite kurz aufs Display
/// - `Double` → Ruf-Anforderung an den MQTT-Task
#[embassy_executor::task]
pub async fn click_worker_task(
    events: ClickReceiver,
    display: DisplaySender,
    publish: PublishSender,
    status_text: StatusText,
) {
    loop {
        match events.receive().await {
            ClickEvent::Single => {
                info!("BUTTON: single click, showing status");
                display
                    .send(StatusMessage::new(&status_text, Some(STATUS_DISPLAY_MS)))
                    .await;
            }
            ClickEvent::Double => {
                info!("BUTTON: double click, calling everyone");
                if publish.try_send(()).is_err() {
                    warn!("BUTTON: publish queue full, call dropped");
                }
            }
        }
    }
}
