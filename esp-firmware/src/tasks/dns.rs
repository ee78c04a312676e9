// Captive-DNS Task - beantwortet jede Anfrage mit der Portal-Adresse
//
// Läuft nur im Provisioning-Modus. Ein einziger UDP-Socket auf Port 53;
// pro Datagramm wird die Antwort über den Codec aus esp-core gebaut.
// Malformte oder übergroße Datagramme werden still verworfen, der Loop
// läuft weiter - keine Retries, kein Fehler Richtung Client.

use defmt::{Debug2Format, error, info, warn};
use embassy_net::Stack;
use embassy_net::udp::{PacketMetadata, UdpSocket};
use embassy_time::{Duration, Timer};

use esp_core::dns::build_captive_response;

use crate::config::{DNS_BUFFER_SIZE, DNS_PORT, PORTAL_ADDR};

/// Captive-DNS Responder Task
///
/// # Parameter
/// - `stack`: embassy-net Stack des AP-Interfaces
#[embassy_executor::task]
pub async fn captive_dns_task(stack: &'static Stack<'static>) {
    loop {
        match run_captive_dns(stack).await {
            Ok(_) => warn!("DNS: Responder stopped normally"),
            Err(e) => error!("DNS: Error: {}", e),
        }
        Timer::after(Duration::from_secs(1)).await;
    }
}

/// Führt den Responder-Loop aus
///
/// Endet nur bei Socket-Fehlern; der Haupt-Loop bindet dann neu.
async fn run_captive_dns(stack: &'static Stack<'static>) -> Result<(), DnsError> {
    let mut rx_meta = [PacketMetadata::EMPTY; 8];
    let mut rx_buffer = [0u8; DNS_BUFFER_SIZE];
    let mut tx_meta = [PacketMetadata::EMPTY; 8];
    let mut tx_buffer = [0u8; DNS_BUFFER_SIZE];

    let mut socket = UdpSocket::new(
        *stack,
        &mut rx_meta,
        &mut rx_buffer,
        &mut tx_meta,
        &mut tx_buffer,
    );
    socket.bind(DNS_PORT).map_err(|_| DnsError::BindFailed)?;

    info!(
        "DNS: Captive responder on port {}, answering everything with {}",
        DNS_PORT,
        Debug2Format(&PORTAL_ADDR)
    );

    let mut query = [0u8; DNS_BUFFER_SIZE];
    let mut response = [0u8; DNS_BUFFER_SIZE];

    loop {
        let (len, remote) = socket
            .recv_from(&mut query)
            .await
            .map_err(|_| DnsError::RecvFailed)?;

        // Zu kurz für einen Header oder zu groß für die Antwort: verwerfen
        let Some(response_len) =
            build_captive_response(&query[..len], &mut response, PORTAL_ADDR.octets())
        else {
            continue;
        };

        if let Err(e) = socket.send_to(&response[..response_len], remote).await {
            warn!("DNS: send error: {}", Debug2Format(&e));
        }
    }
}

/// DNS Fehler-Typen
#[derive(Debug)]
enum DnsError {
    /// UDP Socket konnte nicht auf Port 53 gebunden werden
    BindFailed,
    /// Socket-Fehler beim Empfang
    RecvFailed,
}

impl defmt::Format for DnsError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            DnsError::BindFailed => defmt::write!(fmt, "Socket bind failed"),
            DnsError::RecvFailed => defmt::write!(fmt, "Receive failed"),
        }
    }
}
