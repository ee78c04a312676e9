// Task-Modul: Enthält alle Embassy Tasks
//
// Jeder Task läuft asynchron und unabhängig.
// Tasks kommunizieren über Embassy Channels (Tasten → Worker → MQTT,
// alle → Display) und das Neustart-Signal.

pub mod dhcp;
pub mod display;
pub mod dns;
pub mod http;
pub mod input;
pub mod mdns;
pub mod mqtt;
pub mod reset;
pub mod restart;
pub mod wifi;

// Re-export Tasks für einfachen Import
pub use dhcp::dhcp_server_task;
pub use display::display_task;
pub use dns::captive_dns_task;
pub use http::http_server_task;
pub use input::{call_button_task, click_worker_task};
pub use mdns::mdns_responder_task;
pub use mqtt::mqtt_task;
pub use reset::factory_reset_task;
pub use restart::restart_task;
pub use wifi::{connection_task, net_task, softap_task, wait_for_ipv4};
