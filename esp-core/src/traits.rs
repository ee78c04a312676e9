//! Hardware Abstraction Traits
//!
//! Diese Traits definieren Schnittstellen für Persistenz und Display
//! ohne konkrete Implementierung.

use crate::config::DeviceConfig;
use crate::form::parse_config_form;
use crate::types::StatusMessage;

/// Trait für den durablen Konfigurations-Speicher
///
/// `load` liefert NIE eine teilweise befüllte Konfiguration: fehlt ein
/// Feld oder ist die Server-Adresse ungültig, ist das Ergebnis `None`.
/// `save` ist aus Sicht des Aufrufers atomar (eine logische Transaktion),
/// `erase` ist idempotent.
///
/// # Implementierungen
/// - **Production:** FlashConfigStore (Flash-Sektor in der NVS-Partition)
/// - **Testing:** MockConfigStore (in-memory Mock)
pub trait ConfigStore {
    type Error;

    fn load(&mut self) -> Result<Option<DeviceConfig>, Self::Error>;
    fn save(&mut self, cfg: &DeviceConfig) -> Result<(), Self::Error>;
    fn erase(&mut self) -> Result<(), Self::Error>;
}

/// Trait für die Display-Senke
///
/// Abstrahiert die externe Render-Bibliothek: sie bekommt Text plus
/// Anzeigedauer und wird nach Ablauf geleert.
pub trait StatusSink {
    fn show(&mut self, msg: &StatusMessage);
    fn clear(&mut self);
}

/// Ergebnis des Speichern-Ablaufs
///
/// Der Neustart nach `Saved` ist eine EXPLIZITE Folge-Aktion der
/// Firmware, kein versteckter Seiteneffekt - so kann ein Test-Harness
/// den Ablauf ohne echten Reboot prüfen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Konfiguration validiert und persistiert; Neustart folgt
    Saved(DeviceConfig),
    /// Body unvollständig/ungültig; Store unangetastet
    Invalid,
    /// Persistenz fehlgeschlagen; für diesen Boot fatal
    StoreFailed,
}

/// Validiert einen Formular-Body und persistiert ihn bei Erfolg
///
/// Bei ungültiger Eingabe bleibt der Store unangetastet.
pub fn apply_save<S: ConfigStore>(store: &mut S, body: &[u8]) -> SaveOutcome {
    let cfg = match parse_config_form(body) {
        Ok(cfg) => cfg,
        Err(_) => return SaveOutcome::Invalid,
    };

    match store.save(&cfg) {
        Ok(()) => SaveOutcome::Saved(cfg),
        Err(_) => SaveOutcome::StoreFailed,
    }
}
