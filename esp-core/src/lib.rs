//! ESP Core - Platform-agnostic Logic and Traits
//!
//! Diese Crate enthält KEINE Hardware-Dependencies.
//! Sie definiert nur Traits und Pure Functions: Konfigurations-Modell,
//! Formular-Decoder, Captive-DNS Codec und die Tasten-Zustandsmaschinen.

#![no_std]

pub mod click;
pub mod config;
pub mod dns;
pub mod form;
pub mod traits;
pub mod types;

// Re-exports für einfachen Zugriff
pub use click::{ClickDetector, LongPressDetector};
pub use config::{DeviceConfig, RunMode, select_mode};
pub use form::{FormError, parse_config_form, url_decode_in_place};
pub use traits::{ConfigStore, SaveOutcome, StatusSink, apply_save};
pub use types::{ClickEvent, StatusMessage};
