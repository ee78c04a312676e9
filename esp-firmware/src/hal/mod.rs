// Hardware Abstraction Layer (HAL) Module
//
// Dieses Modul kapselt Hardware-Zugriffe hinter den esp-core Traits,
// um Testbarkeit und Wartbarkeit zu verbessern.

pub mod config_store;

pub use config_store::{FlashConfigStore, FlashStoreError};
