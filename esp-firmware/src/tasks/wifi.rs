// WiFi Tasks - Access Point fürs Provisioning, Station für den Betrieb
use defmt::{Debug2Format, error, info, warn};
use embassy_net::{Runner, Stack, StaticConfigV4};
use embassy_time::{Duration, Timer};
use esp_radio::wifi::{
    AccessPointConfig, AuthMethod, ClientConfig, ModeConfig, WifiController, WifiDevice, WifiEvent,
};

use esp_core::DeviceConfig;

use crate::Hostname;
use crate::config::{WIFI_RECONNECT_DELAY_SECS, WIFI_RETRY_DELAY_SECS};

/// Access-Point Task (Provisioning-Modus)
///
/// Startet einen offenen AP, dessen SSID die Geräte-Identität ist.
/// Der AP läuft bis zum Neustart nach dem Speichern - es gibt keinen
/// Teardown-Pfad außer dem Reset.
#[embassy_executor::task]
pub async fn softap_task(mut controller: WifiController<'static>, ssid: Hostname) {
    info!("WiFi: Starting access point '{}'", ssid.as_str());

    let ap_config = ModeConfig::AccessPoint(
        AccessPointConfig::default()
            .with_ssid(ssid.as_str().into())
            .with_auth_method(AuthMethod::None),
    );

    if let Err(e) = controller.set_config(&ap_config) {
        error!("WiFi: Failed to set AP configuration: {}", Debug2Format(&e));
        return;
    }

    if let Err(e) = controller.start_async().await {
        error!("WiFi: Failed to start AP: {}", Debug2Format(&e));
        return;
    }

    info!("WiFi: Access point running");

    loop {
        Timer::after(Duration::from_secs(3600)).await;
    }
}

/// WiFi Connection Task (Client-Modus)
///
/// Verbindet mit dem konfigurierten Netz und reconnected bei Abbruch.
/// Die Credentials kommen als read-only Kopie der Konfiguration herein,
/// nicht aus globalen Puffern.
#[embassy_executor::task]
pub async fn connection_task(mut controller: WifiController<'static>, cfg: DeviceConfig) {
    info!(
        "WiFi: Starting connection task for '{}'",
        cfg.wifi_ssid.as_str()
    );

    loop {
        if matches!(controller.is_started(), Ok(false)) {
            let client_config = ModeConfig::Client(
                ClientConfig::default()
                    .with_ssid(cfg.wifi_ssid.as_str().into())
                    .with_password(cfg.wifi_pass.as_str().into()),
            );

            if let Err(e) = controller.set_config(&client_config) {
                error!("WiFi: Failed to set configuration: {}", Debug2Format(&e));
                Timer::after(Duration::from_secs(WIFI_RETRY_DELAY_SECS)).await;
                continue;
            }

            if let Err(e) = controller.start_async().await {
                error!("WiFi: Failed to start: {}", Debug2Format(&e));
                Timer::after(Duration::from_secs(WIFI_RETRY_DELAY_SECS)).await;
                continue;
            }

            info!("WiFi: Started successfully");
        }

        info!("WiFi: Connecting to '{}'...", cfg.wifi_ssid.as_str());
        match controller.connect_async().await {
            Ok(_) => {
                info!("WiFi: Connected successfully!");

                // Wait for disconnect
                controller.wait_for_event(WifiEvent::StaDisconnected).await;
                warn!("WiFi: Disconnected from AP, will retry...");
                Timer::after(Duration::from_secs(WIFI_RECONNECT_DELAY_SECS)).await;
            }
            Err(e) => {
                error!("WiFi: Connection failed: {}", Debug2Format(&e));
                Timer::after(Duration::from_secs(WIFI_RETRY_DELAY_SECS)).await;
            }
        }
    }
}

/// Network Task
///
/// Prozessiert Netzwerk-Pakete für den embassy-net Stack
/// (AP- oder STA-Interface, je nach Betriebsmodus).
#[embassy_executor::task]
pub async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) -> ! {
    runner.run().await
}

/// Blockiert bis Link up ist und eine IPv4-Konfiguration vorliegt
///
/// Bewusst OHNE Timeout: ist das konfigurierte Netz dauerhaft nicht
/// erreichbar, wartet das Gerät hier für immer statt ins Provisioning
/// zurückzufallen - bekannte Einschränkung des Basis-Designs.
pub async fn wait_for_ipv4(stack: &'static Stack<'static>) -> StaticConfigV4 {
    loop {
        if stack.is_link_up() {
            break;
        }
        Timer::after(Duration::from_millis(500)).await;
    }

    info!("WiFi: Link is up, waiting for IP address...");

    loop {
        if let Some(config) = stack.config_v4() {
            info!("WiFi: Got IP address!");
            info!("  IP:      {}", Debug2Format(&config.address.address()));
            info!("  Gateway: {}", Debug2Format(&config.gateway));
            return config;
        }
        Timer::after(Duration::from_millis(500)).await;
    }
}
