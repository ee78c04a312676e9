//! Integration Tests für Config Store, Speichern-Ablauf und Modus-Wahl
//!
//! Diese Tests laufen auf dem Host (x86_64) und nutzen MockConfigStore

use esp_core::{
    ConfigStore, DeviceConfig, RunMode, SaveOutcome, StatusSink, apply_save, select_mode,
};

// ============================================================================
// Mock Config Store
// ============================================================================

#[derive(Debug, PartialEq, Eq)]
pub struct MockStoreError;

#[derive(Default)]
pub struct MockConfigStore {
    /// Roh-Inhalt des Mediums (kann auch unvollständig sein, wie ein
    /// von Hand beschriebener Flash-Sektor)
    pub stored: Option<DeviceConfig>,
    pub save_count: usize,
    pub erase_count: usize,
    pub fail_next_save: bool,
    pub fail_next_erase: bool,
}

impl MockConfigStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStore for MockConfigStore {
    type Error = MockStoreError;

    fn load(&mut self) -> Result<Option<DeviceConfig>, MockStoreError> {
        // Vertrag: unvollständige Inhalte verlassen den Store nie
        Ok(self.stored.clone().filter(DeviceConfig::is_complete))
    }

    fn save(&mut self, cfg: &DeviceConfig) -> Result<(), MockStoreError> {
        if self.fail_next_save {
            self.fail_next_save = false;
            return Err(MockStoreError);
        }

        self.stored = Some(cfg.clone());
        self.save_count += 1;
        Ok(())
    }

    fn erase(&mut self) -> Result<(), MockStoreError> {
        if self.fail_next_erase {
            self.fail_next_erase = false;
            return Err(MockStoreError);
        }

        self.stored = None;
        self.erase_count += 1;
        Ok(())
    }
}

fn complete_config() -> DeviceConfig {
    let mut cfg = DeviceConfig::default();
    cfg.wifi_ssid.push_str("Heimnetz").unwrap();
    cfg.wifi_pass.push_str("geheim42").unwrap();
    cfg.device_name.push_str("Kueche").unwrap();
    cfg.server_addr.push_str("10.0.0.5").unwrap();
    cfg
}

// ============================================================================
// Tests: Store-Vertrag
// ============================================================================

#[test]
fn test_empty_store_loads_absent() {
    let mut store = MockConfigStore::new();
    assert_eq!(store.load(), Ok(None));
}

#[test]
fn test_save_then_load_roundtrip() {
    let mut store = MockConfigStore::new();
    let cfg = complete_config();

    store.save(&cfg).unwrap();
    assert_eq!(store.load(), Ok(Some(cfg)));
}

#[test]
fn test_partial_content_never_escapes_load() {
    let mut store = MockConfigStore::new();

    // Medium enthält einen Record mit leerem Passwort
    let mut partial = complete_config();
    partial.wifi_pass.clear();
    store.stored = Some(partial);

    assert_eq!(store.load(), Ok(None));
}

#[test]
fn test_bad_server_addr_never_escapes_load() {
    let mut store = MockConfigStore::new();

    let mut broken = complete_config();
    broken.server_addr.clear();
    broken.server_addr.push_str("10.0.0.999").unwrap();
    store.stored = Some(broken);

    assert_eq!(store.load(), Ok(None));
}

#[test]
fn test_erase_is_idempotent() {
    let mut store = MockConfigStore::new();
    store.save(&complete_config()).unwrap();

    store.erase().unwrap();
    assert_eq!(store.load(), Ok(None));

    // zweites erase: gleicher Zustand, kein Fehler
    store.erase().unwrap();
    assert_eq!(store.load(), Ok(None));
    assert_eq!(store.erase_count, 2);
}

// ============================================================================
// Tests: Speichern-Ablauf (HTTP /save Semantik)
// ============================================================================

#[test]
fn test_apply_save_persists_valid_form() {
    let mut store = MockConfigStore::new();

    let outcome = apply_save(&mut store, b"ssid=A&pass=B&name=C&server=10.0.0.5");
    let SaveOutcome::Saved(cfg) = outcome else {
        panic!("expected Saved");
    };
    assert_eq!(cfg.wifi_ssid.as_str(), "A");

    let loaded = store.load().unwrap().unwrap();
    assert_eq!(loaded.wifi_pass.as_str(), "B");
    assert_eq!(loaded.device_name.as_str(), "C");
    assert_eq!(loaded.server_addr.as_str(), "10.0.0.5");
}

#[test]
fn test_apply_save_rejects_bad_server_and_keeps_prior() {
    let mut store = MockConfigStore::new();
    let prior = complete_config();
    store.save(&prior).unwrap();

    let outcome = apply_save(&mut store, b"ssid=A&pass=B&name=C&server=bad");
    assert_eq!(outcome, SaveOutcome::Invalid);

    // vorige Konfiguration unangetastet
    assert_eq!(store.load(), Ok(Some(prior)));
    assert_eq!(store.save_count, 1);
}

#[test]
fn test_apply_save_rejects_missing_field_on_empty_store() {
    let mut store = MockConfigStore::new();

    let outcome = apply_save(&mut store, b"ssid=A&pass=B&server=10.0.0.5");
    assert_eq!(outcome, SaveOutcome::Invalid);
    assert_eq!(store.load(), Ok(None));
}

#[test]
fn test_apply_save_reports_store_failure() {
    let mut store = MockConfigStore::new();
    store.fail_next_save = true;

    let outcome = apply_save(&mut store, b"ssid=A&pass=B&name=C&server=10.0.0.5");
    assert_eq!(outcome, SaveOutcome::StoreFailed);
}

#[test]
fn test_apply_save_decodes_url_escapes() {
    let mut store = MockConfigStore::new();

    let outcome = apply_save(
        &mut store,
        b"ssid=Heim+Netz&pass=pa%26ss&name=K%C3%BCche&server=192.168.0.7",
    );
    let SaveOutcome::Saved(cfg) = outcome else {
        panic!("expected Saved");
    };
    assert_eq!(cfg.wifi_ssid.as_str(), "Heim Netz");
    assert_eq!(cfg.wifi_pass.as_str(), "pa&ss");
    assert_eq!(cfg.device_name.as_str(), "Küche");
}

// ============================================================================
// Tests: Modus-Wahl über den Store
// ============================================================================

#[test]
fn test_fresh_device_boots_into_provisioning() {
    let mut store = MockConfigStore::new();
    let current = store.load().unwrap();
    assert_eq!(select_mode(current.as_ref()), RunMode::Provisioning);
}

#[test]
fn test_saved_config_boots_into_operational() {
    let mut store = MockConfigStore::new();
    assert!(matches!(
        apply_save(&mut store, b"ssid=A&pass=B&name=C&server=10.0.0.5"),
        SaveOutcome::Saved(_)
    ));

    let current = store.load().unwrap();
    assert_eq!(select_mode(current.as_ref()), RunMode::Operational);
}

#[test]
fn test_reset_flow_returns_to_provisioning() {
    let mut store = MockConfigStore::new();
    store.save(&complete_config()).unwrap();

    store.erase().unwrap();
    let current = store.load().unwrap();
    assert_eq!(select_mode(current.as_ref()), RunMode::Provisioning);
}

// ============================================================================
// Mock Status Sink (Display-Senke)
// ============================================================================

#[derive(Default)]
pub struct MockStatusSink {
    pub shown: Vec<String>,
    pub clear_count: usize,
}

impl StatusSink for MockStatusSink {
    fn show(&mut self, msg: &esp_core::StatusMessage) {
        self.shown.push(msg.text.as_str().into());
    }

    fn clear(&mut self) {
        self.clear_count += 1;
    }
}

#[test]
fn test_mock_status_sink_records_messages() {
    let mut sink = MockStatusSink::default();
    sink.show(&esp_core::StatusMessage::new("Wi-Fi SSID\nRufbox 4A2F01", None));
    sink.clear();

    assert_eq!(sink.shown, ["Wi-Fi SSID\nRufbox 4A2F01"]);
    assert_eq!(sink.clear_count, 1);
}
