// Display Task - asynchrone Senke für Status-Texte
//
// Konsumiert den Display-Channel und reicht die Nachrichten an die
// externe Render-Senke weiter. Nach Ablauf der Anzeigedauer wird die
// Senke geleert, damit das Panel dunkel werden kann.

use defmt::info;
use embassy_time::{Duration, with_timeout};

use esp_core::{StatusMessage, StatusSink};

use crate::DisplayReceiver;

/// Produktions-Senke: defmt-Logging an der Grenze zur externen
/// Render-Bibliothek (Rendering selbst ist nicht Teil dieser Firmware)
pub struct LogStatusSink;

impl StatusSink for LogStatusSink {
    fn show(&mut self, msg: &StatusMessage) {
        info!("DISPLAY: {=str}", msg.text.as_str());
    }

    fn clear(&mut self) {
        info!("DISPLAY: off");
    }
}

/// Display Logic - testbare Konsumenten-Schleife ohne Hardware
///
/// Blockiert auf dem Channel; eine aktive Anzeigedauer wird als Timeout
/// auf den Empfang gelegt: kommt nichts Neues, wird geleert.
pub async fn display_logic<S: StatusSink>(mut sink: S, receiver: DisplayReceiver) {
    let mut active_timeout: Option<u32> = None;

    loop {
        match active_timeout {
            Some(timeout_ms) => {
                match with_timeout(
                    Duration::from_millis(u64::from(timeout_ms)),
                    receiver.receive(),
                )
                .await
                {
                    Ok(msg) => {
                        sink.show(&msg);
                        active_timeout = msg.timeout_ms;
                    }
                    Err(_) => {
                        sink.clear();
                        active_timeout = None;
                    }
                }
            }
            None => {
                let msg = receiver.receive().await;
                sink.show(&msg);
                active_timeout = msg.timeout_ms;
            }
        }
    }
}

/// Display Task - Embassy Task für parallele Ausführung
#[embassy_executor::task]
pub async fn display_task(receiver: DisplayReceiver) {
    display_logic(LogStatusSink, receiver).await;
}
