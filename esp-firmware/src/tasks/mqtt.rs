// MQTT Task - der Ruf-Kanal des Geräts
//
// Verbindet sich mit dem konfigurierten Broker (direkte IPv4-Adresse,
// keine Namensauflösung nötig), abonniert den gemeinsamen Kanal und
// arbeitet dann event-basiert in beide Richtungen:
// - Ruf-Anforderung vom Gesten-Worker → Gerätename publishen
// - eingehende Nachricht → "<Name> called everyone!" aufs Display

use defmt::{Debug2Format, error, info, warn};
use embassy_futures::select::{Either, select};
use embassy_net::{Stack, tcp::TcpSocket};
use embassy_time::{Duration, Timer};

use rust_mqtt::client::client::MqttClient;
use rust_mqtt::client::client_config::{ClientConfig, MqttVersion};
use rust_mqtt::packet::v5::publish_packet::QualityOfService;
use rust_mqtt::utils::rng_generator::CountingRng;
use rust_mqtt::utils::types::EncodedString;

use esp_core::{DeviceConfig, StatusMessage};

use crate::config::{
    CALL_DISPLAY_MS, ERROR_DISPLAY_MS, MQTT_BUFFER_SIZE, MQTT_CHANNEL_TOPIC, MQTT_KEEPALIVE_SECS,
    MQTT_PORT, MQTT_RECONNECT_DELAY_SECS,
};
use crate::{DisplaySender, Hostname, PublishReceiver};

/// MQTT Task - läuft parallel zu anderen Tasks
///
/// Wartet auf Netzwerk, verbindet zum Broker aus der Konfiguration und
/// reconnected bei jedem Fehler nach fester Wartezeit.
///
/// # Parameter
/// - `stack`: embassy-net Stack für Netzwerk-Zugriff
/// - `cfg`: Geräte-Konfiguration (Broker-Adresse, Gerätename)
/// - `hostname`: Geräte-Identität als MQTT Client-ID
/// - `publish_requests`: Ruf-Anforderungen vom Gesten-Worker
/// - `display`: Display-Channel für eingehende Rufe
#[embassy_executor::task]
pub async fn mqtt_task(
    stack: &'static Stack<'static>,
    cfg: DeviceConfig,
    hostname: Hostname,
    publish_requests: PublishReceiver,
    display: DisplaySender,
) {
    info!("MQTT: Task started, waiting for network...");
    wait_for_network(stack).await;
    info!("MQTT: Network ready");

    loop {
        match mqtt_session(stack, &cfg, &hostname, &publish_requests, &display).await {
            Ok(_) => warn!("MQTT: Connection closed normally"),
            Err(e) => {
                error!("MQTT: Error: {}", e);
                display
                    .send(StatusMessage::new(
                        "MQTT\nnot connected",
                        Some(ERROR_DISPLAY_MS),
                    ))
                    .await;
            }
        }
        info!("MQTT: Reconnecting in {}s...", MQTT_RECONNECT_DELAY_SECS);
        Timer::after(Duration::from_secs(MQTT_RECONNECT_DELAY_SECS)).await;
    }
}

/// Wartet bis Netzwerk-Verbindung verfügbar ist
async fn wait_for_network(stack: &'static Stack<'static>) {
    loop {
        if stack.is_link_up() && stack.config_v4().is_some() {
            break;
        }
        Timer::after(Duration::from_millis(500)).await;
    }
}

/// Arbeit einer MQTT-Session zwischen der Task-Schleife
enum SessionEvent {
    /// Ruf-Anforderung vom Gesten-Worker
    PublishCall,
    /// Eingehende Nachricht auf dem Kanal (Absender-Name)
    Inbound(heapless::String<64>),
}

/// Eine MQTT-Session: verbinden, abonnieren, Event-Loop
///
/// Endet bei jedem Fehler; der Haupt-Loop reconnected.
async fn mqtt_session(
    stack: &'static Stack<'static>,
    cfg: &DeviceConfig,
    hostname: &Hostname,
    publish_requests: &PublishReceiver,
    display: &DisplaySender,
) -> Result<(), MqttError> {
    // Broker-Adresse kommt validiert aus dem Config Store
    let broker_ip = cfg.server_ip().ok_or(MqttError::NoBrokerAddress)?;

    // TCP Connect
    let mut rx_buffer = [0u8; 4096];
    let mut tx_buffer = [0u8; 4096];
    let mut socket = TcpSocket::new(*stack, &mut rx_buffer, &mut tx_buffer);
    socket.set_timeout(Some(Duration::from_secs(10)));

    socket
        .connect((broker_ip, MQTT_PORT))
        .await
        .map_err(|_| MqttError::ConnectionFailed)?;
    info!("MQTT: TCP connected to {}:{}", Debug2Format(&broker_ip), MQTT_PORT);

    // MQTT Client Configuration
    let rng = CountingRng(20000);
    let mut config = ClientConfig::<5, _>::new(MqttVersion::MQTTv5, rng);
    config.client_id = EncodedString {
        string: hostname.as_str(),
        len: hostname.len() as u16,
    };
    config.keep_alive = MQTT_KEEPALIVE_SECS;
    config.max_packet_size = MQTT_BUFFER_SIZE as u32;

    // MQTT Buffer
    let mut send_buffer = [0u8; MQTT_BUFFER_SIZE];
    let mut recv_buffer = [0u8; MQTT_BUFFER_SIZE];

    // MQTT Client erstellen
    let mut client = MqttClient::<_, 5, _>::new(
        socket,
        &mut send_buffer,
        MQTT_BUFFER_SIZE,
        &mut recv_buffer,
        MQTT_BUFFER_SIZE,
        config,
    );

    // MQTT CONNECT + SUBSCRIBE auf den gemeinsamen Kanal
    client
        .connect_to_broker()
        .await
        .map_err(|_| MqttError::ProtocolError)?;
    client
        .subscribe_to_topic(MQTT_CHANNEL_TOPIC)
        .await
        .map_err(|_| MqttError::SubscribeFailed)?;
    info!("MQTT: Connected, subscribed to '{}'", MQTT_CHANNEL_TOPIC);

    // Event-Loop: Ruf-Anforderungen und eingehende Nachrichten
    loop {
        // Der Borrow auf den Client endet mit dem inneren match; erst
        // danach darf wieder gesendet werden
        let event = match select(publish_requests.receive(), client.receive_message()).await {
            Either::First(()) => SessionEvent::PublishCall,
            Either::Second(Ok((_topic, payload))) => {
                let mut name = heapless::String::new();
                if let Ok(text) = core::str::from_utf8(payload) {
                    // abgeschnittener Name ist besser als gar keiner
                    for ch in text.chars() {
                        if name.push(ch).is_err() {
                            break;
                        }
                    }
                }
                SessionEvent::Inbound(name)
            }
            Either::Second(Err(e)) => {
                error!("MQTT: receive failed: {}", Debug2Format(&e));
                return Err(MqttError::ReceiveFailed);
            }
        };

        match event {
            SessionEvent::PublishCall => {
                client
                    .send_message(
                        MQTT_CHANNEL_TOPIC,
                        cfg.device_name.as_bytes(),
                        QualityOfService::QoS1,
                        false,
                    )
                    .await
                    .map_err(|_| MqttError::PublishFailed)?;
                info!(
                    "MQTT: Published call from '{}'",
                    cfg.device_name.as_str()
                );
            }
            SessionEvent::Inbound(name) => {
                info!("MQTT: Incoming call from '{}'", name.as_str());

                let mut text = heapless::String::<{ esp_core::types::STATUS_TEXT_MAX }>::new();
                let _ = core::fmt::Write::write_fmt(
                    &mut text,
                    format_args!("{}\ncalled everyone!", name),
                );
                display
                    .send(StatusMessage::new(&text, Some(CALL_DISPLAY_MS)))
                    .await;
            }
        }
    }
}

/// MQTT Fehler-Typen
#[derive(Debug)]
enum MqttError {
    NoBrokerAddress,
    ConnectionFailed,
    ProtocolError,
    SubscribeFailed,
    PublishFailed,
    ReceiveFailed,
}

impl defmt::Format for MqttError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            MqttError::NoBrokerAddress => defmt::write!(fmt, "No broker address"),
            MqttError::ConnectionFailed => defmt::write!(fmt, "Connection failed"),
            MqttError::ProtocolError => defmt::write!(fmt, "Protocol error"),
            MqttError::SubscribeFailed => defmt::write!(fmt, "Subscribe failed"),
            MqttError::PublishFailed => defmt::write!(fmt, "Publish failed"),
            MqttError::ReceiveFailed => defmt::write!(fmt, "Receive failed"),
        }
    }
}
