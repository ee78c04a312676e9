//! Geräte-Konfiguration und Betriebsmodus-Auswahl
//!
//! Die Konfiguration ist entweder VOLLSTÄNDIG (alle vier Felder belegt,
//! Server-Adresse parsebar) oder sie gilt als nicht vorhanden. Teilweise
//! befüllte Konfigurationen verlassen den Store nie.

use core::net::Ipv4Addr;

use heapless::String;

/// Maximale Länge der Textfelder (SSID, Passwort, Gerätename)
pub const CONFIG_FIELD_MAX: usize = 31;

/// Maximale Länge der Server-Adresse ("255.255.255.255" = 15 Zeichen)
pub const SERVER_ADDR_MAX: usize = 15;

/// Persistente Geräte-Konfiguration
///
/// Wird einmal beim Boot aus dem Config Store gelesen und danach nur
/// als read-only Kopie an die Tasks weitergereicht - keine globalen
/// Puffer wie in klassischer Firmware.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceConfig {
    pub wifi_ssid: String<CONFIG_FIELD_MAX>,
    pub wifi_pass: String<CONFIG_FIELD_MAX>,
    pub device_name: String<CONFIG_FIELD_MAX>,
    pub server_addr: String<SERVER_ADDR_MAX>,
}

impl DeviceConfig {
    /// Prüft die Vollständigkeits-Invariante
    ///
    /// # Beispiele
    ///
    /// ```
    /// # use esp_core::DeviceConfig;
    /// let mut cfg = DeviceConfig::default();
    /// assert!(!cfg.is_complete());
    ///
    /// cfg.wifi_ssid.push_str("Heimnetz").unwrap();
    /// cfg.wifi_pass.push_str("geheim").unwrap();
    /// cfg.device_name.push_str("Kueche").unwrap();
    /// cfg.server_addr.push_str("192.168.4.1").unwrap();
    /// assert!(cfg.is_complete());
    /// ```
    pub fn is_complete(&self) -> bool {
        !self.wifi_ssid.is_empty()
            && !self.wifi_pass.is_empty()
            && !self.device_name.is_empty()
            && self.server_ip().is_some()
    }

    /// Server-Adresse als IPv4, `None` wenn kein gültiges dotted-quad
    pub fn server_ip(&self) -> Option<Ipv4Addr> {
        self.server_addr.parse().ok()
    }
}

/// Betriebsmodus nach dem Boot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Keine gültige Konfiguration: Access Point + Captive Portal
    Provisioning,
    /// Konfiguration vorhanden: WLAN-Client + Betriebs-Tasks
    Operational,
}

/// Reine Entscheidungsfunktion des Mode Selectors
///
/// `Provisioning` genau dann, wenn der Store keine vollständige
/// Konfiguration geliefert hat.
pub fn select_mode(cfg: Option<&DeviceConfig>) -> RunMode {
    match cfg {
        Some(_) => RunMode::Operational,
        None => RunMode::Provisioning,
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for RunMode {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            RunMode::Provisioning => defmt::write!(fmt, "Provisioning"),
            RunMode::Operational => defmt::write!(fmt, "Operational"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(ssid: &str, pass: &str, name: &str, server: &str) -> DeviceConfig {
        let mut cfg = DeviceConfig::default();
        cfg.wifi_ssid.push_str(ssid).unwrap();
        cfg.wifi_pass.push_str(pass).unwrap();
        cfg.device_name.push_str(name).unwrap();
        cfg.server_addr.push_str(server).unwrap();
        cfg
    }

    #[test]
    fn test_complete_config_accepted() {
        assert!(config("Heimnetz", "geheim42", "Kueche", "10.0.0.5").is_complete());
        assert!(config("a", "b", "c", "192.168.4.1").is_complete());
    }

    #[test]
    fn test_any_empty_field_rejected() {
        assert!(!config("", "geheim42", "Kueche", "10.0.0.5").is_complete());
        assert!(!config("Heimnetz", "", "Kueche", "10.0.0.5").is_complete());
        assert!(!config("Heimnetz", "geheim42", "", "10.0.0.5").is_complete());
        assert!(!config("Heimnetz", "geheim42", "Kueche", "").is_complete());
    }

    #[test]
    fn test_server_addr_validation() {
        // gültige dotted-quads
        assert!(config("a", "b", "c", "192.168.4.1").is_complete());
        assert!(config("a", "b", "c", "0.0.0.0").is_complete());
        assert!(config("a", "b", "c", "255.255.255.255").is_complete());

        // Oktett außerhalb des Wertebereichs
        assert!(!config("a", "b", "c", "192.168.4.999").is_complete());
        // falsche Segment-Anzahl
        assert!(!config("a", "b", "c", "192.168.4").is_complete());
        assert!(!config("a", "b", "c", "1.2.3.4.5").is_complete());
        // nicht-numerisch
        assert!(!config("a", "b", "c", "not-an-ip").is_complete());
        assert!(!config("a", "b", "c", "10.0.0.x").is_complete());
    }

    #[test]
    fn test_select_mode() {
        assert_eq!(select_mode(None), RunMode::Provisioning);
        let cfg = config("Heimnetz", "geheim42", "Kueche", "10.0.0.5");
        assert_eq!(select_mode(Some(&cfg)), RunMode::Operational);
    }
}
