// Library-Root: Wiederverwendbare Logik und Module
// Keine Standard-Bibliothek (Embedded System)
#![no_std]

// Heap Allocator für dynamische HTML-Seiten (WiFi braucht ihn ohnehin)
extern crate alloc;

// Module
pub mod config;
pub mod hal;
pub mod tasks;
pub mod web;

// Re-exports von esp-core
pub use esp_core::{
    ClickDetector, ClickEvent, DeviceConfig, LongPressDetector, RunMode, StatusMessage,
    select_mode,
};

// Embassy Channel-Typen
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;

use crate::config::HOSTNAME_PREFIX;
use crate::hal::FlashConfigStore;

// ============================================================================
// Geräte-Identität
// ============================================================================

/// Identität wie "Rufbox 4A2F01" - passt samt Terminator in 16 Bytes
pub type Hostname = heapless::String<15>;

/// Leitet die Geräte-Identität aus dem MAC-Suffix ab
///
/// Stabil über Neustarts hinweg; dient als AP-SSID im Provisioning und
/// als MQTT Client-ID im Betrieb.
pub fn hostname_from_mac(mac: [u8; 6]) -> Hostname {
    use core::fmt::Write;
    let mut name = Hostname::new();
    let _ = write!(
        name,
        "{} {:02X}{:02X}{:02X}",
        HOSTNAME_PREFIX, mac[3], mac[4], mac[5]
    );
    name
}

// ============================================================================
// Type-Aliase für Channel-Typen
// ============================================================================
//
// Diese Type-Aliase vereinfachen die Lesbarkeit der Funktionssignaturen.

/// Channel zur Display-Senke (Text + Anzeigedauer)
/// - 4: Nachrichten-Kapazität der UI-Queue
pub type DisplayChannel = Channel<NoopRawMutex, StatusMessage, 4>;
pub type DisplaySender = Sender<'static, NoopRawMutex, StatusMessage, 4>;
pub type DisplayReceiver = Receiver<'static, NoopRawMutex, StatusMessage, 4>;

/// Channel vom Flanken-Handler der Ruftaste zum Worker-Task
/// try_send auf Sender-Seite: der Handler darf nie blockieren
pub type ClickChannel = Channel<NoopRawMutex, ClickEvent, 4>;
pub type ClickSender = Sender<'static, NoopRawMutex, ClickEvent, 4>;
pub type ClickReceiver = Receiver<'static, NoopRawMutex, ClickEvent, 4>;

/// Channel für Ruf-Anforderungen (Worker → MQTT Task)
pub type PublishChannel = Channel<NoopRawMutex, (), 2>;
pub type PublishSender = Sender<'static, NoopRawMutex, (), 2>;
pub type PublishReceiver = Receiver<'static, NoopRawMutex, (), 2>;

// ============================================================================
// Geteilter Config Store und Neustart-Signal
// ============================================================================

/// Der Flash-Store hinter einem async Mutex: save/erase aus HTTP-Handlern
/// und Factory-Reset-Task werden gegeneinander serialisiert
pub type SharedConfigStore = Mutex<NoopRawMutex, FlashConfigStore>;

/// Grund für den anstehenden Neustart
///
/// Der Neustart selbst ist eine explizite Aktion des Restart-Tasks -
/// Handler signalisieren nur, damit die laufende Antwort noch abfließt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartReason {
    /// Neue Konfiguration gespeichert
    ConfigSaved,
    /// Konfiguration über /reset gelöscht
    ConfigReset,
    /// Long-Press auf der Reset-Taste
    FactoryReset,
    /// Persistenz fehlgeschlagen; Weiterlaufen mit unbekanntem
    /// Store-Zustand wäre riskanter als ein frischer Boot
    StoreFailure,
}

impl defmt::Format for RestartReason {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            RestartReason::ConfigSaved => defmt::write!(fmt, "config saved"),
            RestartReason::ConfigReset => defmt::write!(fmt, "config reset"),
            RestartReason::FactoryReset => defmt::write!(fmt, "factory reset"),
            RestartReason::StoreFailure => defmt::write!(fmt, "store failure"),
        }
    }
}

/// Signal an den Restart-Task
pub type RestartSignal = Signal<NoopRawMutex, RestartReason>;
