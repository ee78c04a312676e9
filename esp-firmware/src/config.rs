// Projekt-Konfiguration: Konstanten und Hardware-Zuordnungen
#![allow(dead_code)]

use core::net::Ipv4Addr;

// ============================================================================
// Geräte-Identität
// ============================================================================

/// Präfix der Geräte-Identität; der MAC-Suffix macht sie eindeutig
/// ("Rufbox 4A2F01"). Dient als AP-SSID und als MQTT Client-ID.
pub const HOSTNAME_PREFIX: &str = "Rufbox";

// ============================================================================
// Tasten (GPIO)
// ============================================================================

/// GPIO-Pin der Ruftaste (gegen GND, interner Pull-Up)
pub const CALL_BUTTON_GPIO: u8 = 4;

/// GPIO-Pin der Factory-Reset-Taste (BOOT-Taste des ESP32-C6)
pub const RESET_BUTTON_GPIO: u8 = 9;

// ============================================================================
// Access Point / Captive Portal
// ============================================================================

/// Feste Adresse des Provisioning-Portals
pub const PORTAL_ADDR: Ipv4Addr = Ipv4Addr::new(192, 168, 4, 1);

/// Präfix-Länge des AP-Netzes (192.168.4.0/24)
pub const PORTAL_PREFIX_LEN: u8 = 24;

/// UDP-Port des Captive-DNS Responders
pub const DNS_PORT: u16 = 53;

/// Puffer-Größe für DNS-Datagramme
/// Größere Queries werden verworfen (die Antwort muss noch hineinpassen)
pub const DNS_BUFFER_SIZE: usize = 512;

// ============================================================================
// HTTP Server Konfiguration
// ============================================================================

/// TCP-Port des Konfigurations-Services
pub const HTTP_PORT: u16 = 80;

/// Obergrenze für den Body des Speichern-Formulars in Bytes
/// Übergroße Bodies sind ein DoS-Vektor, kein legitimer Anwendungsfall
pub const SAVE_BODY_MAX: usize = 2048;

/// HTTP Buffer-Größe in Bytes (Request-Zeile + Header + Body)
pub const HTTP_BUFFER_SIZE: usize = 2560;

/// TCP RX/TX Buffer-Größen in Bytes
pub const TCP_RX_BUFFER_SIZE: usize = 2048;
pub const TCP_TX_BUFFER_SIZE: usize = 2048;

/// Anzahl paralleler HTTP-Server-Instanzen
/// Das Portal bedient genau ein Telefon - zwei Instanzen reichen, damit
/// Probe-Requests eine laufende Formular-Auslieferung nicht blockieren
pub const HTTP_TASK_POOL: usize = 2;

// ============================================================================
// Neustart
// ============================================================================

/// Wartezeit zwischen Neustart-Signal und Reset in Millisekunden,
/// damit die laufende HTTP-Antwort den Netzwerk-Stack verlassen kann
pub const RESTART_GRACE_MS: u64 = 200;

// ============================================================================
// WLAN Konfiguration
// ============================================================================

/// Wartezeit nach Verbindungsfehler vor erneutem Versuch
pub const WIFI_RETRY_DELAY_SECS: u64 = 5;

/// Wartezeit nach Verbindungsabbruch vor Reconnect
pub const WIFI_RECONNECT_DELAY_SECS: u64 = 2;

/// Heap-Größe für WiFi (Bytes)
/// WiFi benötigt dynamischen Speicher für Pakete
pub const WIFI_HEAP_SIZE: usize = 65536; // 64 KB

/// Zusätzliche Heap-Größe (Bytes)
pub const EXTRA_HEAP_SIZE: usize = 36864; // 36 KB

// ============================================================================
// MQTT Konfiguration
// ============================================================================

/// MQTT Broker Port (Broker-Adresse kommt aus der Geräte-Konfiguration)
pub const MQTT_PORT: u16 = 1883;

/// Gemeinsamer Ruf-Kanal aller Geräte
pub const MQTT_CHANNEL_TOPIC: &str = "channel/0";

/// MQTT Keep-Alive in Sekunden
pub const MQTT_KEEPALIVE_SECS: u16 = 10;

/// MQTT Reconnect Delay in Sekunden
pub const MQTT_RECONNECT_DELAY_SECS: u64 = 5;

/// MQTT Buffer-Größe in Bytes
pub const MQTT_BUFFER_SIZE: usize = 1024;

// ============================================================================
// mDNS-Konfiguration
// ============================================================================

/// mDNS Hostname (ohne .local suffix)
/// Das Gerät ist im Client-Modus erreichbar unter: <MDNS_HOSTNAME>.local
pub const MDNS_HOSTNAME: &str = "rufbox";

/// mDNS TTL (Time To Live) in Sekunden
pub const MDNS_TTL_SECS: u32 = 120;

/// mDNS Reconnect Delay in Sekunden
pub const MDNS_RECONNECT_DELAY_SECS: u64 = 5;

/// mDNS Port (Standard: 5353 laut RFC 6762)
pub const MDNS_PORT: u16 = 5353;

/// mDNS IPv4 Multicast-Adresse (224.0.0.251 laut RFC 6762)
pub const MDNS_MULTICAST_ADDR: [u8; 4] = [224, 0, 0, 251];

/// UDP Buffer-Größen für mDNS (Bytes)
pub const MDNS_UDP_BUFFER_SIZE: usize = 512;

/// mDNS Packet Buffer-Größe (1500 Bytes = Standard MTU)
pub const MDNS_PACKET_BUFFER_SIZE: usize = 1500;

// ============================================================================
// Display
// ============================================================================

/// Anzeigedauer der Status-Seite (Einzelklick, Boot) in Millisekunden
pub const STATUS_DISPLAY_MS: u32 = 5_000;

/// Anzeigedauer eines eingehenden Rufs in Millisekunden
pub const CALL_DISPLAY_MS: u32 = 60_000;

/// Anzeigedauer von Fehler-Hinweisen in Millisekunden
pub const ERROR_DISPLAY_MS: u32 = 10_000;
