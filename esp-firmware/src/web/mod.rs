// Web-Modul: HTML-Seiten des Konfigurations-Portals
// Die Seiten sind direkt ins Binary eingebettet; das Formular wird
// pro Request mit den aktuellen Werten befüllt.

use alloc::string::String;
use core::fmt::Write;

use esp_core::DeviceConfig;

/// Ziel der Captive-Portal-Umleitungen
pub const PORTAL_URL: &str = "http://192.168.4.1/";

const HTML_PRE: &str = "<!doctype html><html><head><meta charset='utf-8'/>\
<meta name='viewport' content='width=device-width,initial-scale=1'/>\
<style>\
*{box-sizing:border-box}\
label{display:block;margin-top:12px;font-weight:600}\
input{width:100%;min-width:0;padding:10px;margin-top:6px;font-size:16px;border:1px solid #ccc;border-radius:10px}\
button{margin-top:16px;padding:12px 14px;font-size:16px;width:100%;border-radius:12px;border:none}\
.card{border:1px solid #ddd;border-radius:12px;padding:14px}\
.row{display:flex;gap:10px;flex-wrap:wrap}\
.row > div{flex:1 1 240px}\
.danger{background:#ffd8d8}\
</style></head><body style='font-family:system-ui,Arial;margin:16px'>";

/// Erfolgs-Seite nach Speichern/Reset
pub const HTML_OK: &str = "<!doctype html><html><head><meta charset='utf-8'/></head>\
<body style='font-family:system-ui,Arial;margin:16px'>\
<h2>Success</h2><p>Device will be rebooted shortly</p></body></html>";

/// Fehler-Seite bei ungültiger Eingabe
pub const HTML_FAIL: &str = "<!doctype html><html><head><meta charset='utf-8'/></head>\
<body style='font-family:system-ui,Arial;margin:16px'>\
<h2>Error</h2><p>Invalid configuration</p></body></html>";

/// Rendert die Formular-Seite, vorbefüllt mit der aktuellen Konfiguration
///
/// Im Provisioning-Modus (keine Konfiguration) bleiben die Felder leer.
pub fn config_page(hostname: &str, current: Option<&DeviceConfig>) -> String {
    let empty = DeviceConfig::default();
    let cfg = current.unwrap_or(&empty);

    let mut page = String::new();
    let _ = write!(
        page,
        "{HTML_PRE}\
<h2>{hostname} Configuration</h2>\
<div class='card'>\
<form method='POST' action='/save'>\
<div class='row'>\
<div><label>Wi-Fi SSID</label><input name='ssid' required maxlength='31' value='{ssid}'/></div>\
<div><label>Wi-Fi Password</label><input name='pass' required maxlength='31' value='{pass}'/></div>\
</div>\
<div class='row'>\
<div><label>Device Name</label><input name='name' required maxlength='31' value='{name}'/></div>\
<div><label>Server</label><input name='server' required maxlength='15' inputmode='numeric' value='{server}'/></div>\
</div>\
<button type='submit'>Save</button>\
</form>\
<form method='POST' action='/reset' onsubmit=\"return confirm('Reset all configurations?');\">\
<button class='danger' type='submit'>Reset</button>\
</form>\
</div>\
</body></html>",
        ssid = cfg.wifi_ssid,
        pass = cfg.wifi_pass,
        name = cfg.device_name,
        server = cfg.server_addr,
    );
    page
}
