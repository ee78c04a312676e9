// Neustart-Task - der einzige Teardown-Pfad des Systems
//
// Handler und Tasks signalisieren nur den Grund; der eigentliche Reset
// passiert hier, nach einer kurzen Gnadenfrist, damit die laufende
// HTTP-Antwort den Netzwerk-Stack noch verlassen kann.

use defmt::warn;
use embassy_time::{Duration, Timer};

use crate::RestartSignal;
use crate::config::RESTART_GRACE_MS;

/// Restart Task
#[embassy_executor::task]
pub async fn restart_task(restart: &'static RestartSignal) {
    let reason = restart.wait().await;
    warn!("RESTART: {} - resetting in {} ms", reason, RESTART_GRACE_MS);

    Timer::after(Duration::from_millis(RESTART_GRACE_MS)).await;
    esp_hal::system::software_reset();
}
