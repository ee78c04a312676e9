//! Decoder für `application/x-www-form-urlencoded` Request-Bodies
//!
//! Bewusst minimal gehalten: `+` wird zu Leerzeichen, `%XX` zu seinem
//! Byte-Wert. Ein unvollständiger oder nicht-hexadezimaler Escape wird
//! unverändert durchgereicht statt als Fehler behandelt.

use heapless::{String, Vec};

use crate::config::{CONFIG_FIELD_MAX, DeviceConfig, SERVER_ADDR_MAX};

/// Fehler beim Parsen des Konfigurations-Formulars
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormError {
    /// Pflichtfeld fehlt im Body
    MissingField,
    /// Feld ist nach dem Decoden leer
    EmptyField,
    /// Roh-Wert überschreitet die Feld-Kapazität
    FieldTooLong,
    /// Decodierte Bytes sind kein gültiges UTF-8
    InvalidEncoding,
    /// Server-Feld ist kein gültiges IPv4 dotted-quad
    BadServerAddr,
}

fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(10 + c - b'a'),
        b'A'..=b'F' => Some(10 + c - b'A'),
        _ => None,
    }
}

/// URL-decoded den Puffer in-place und liefert die neue Länge
///
/// `%` mit weniger als zwei Folgezeichen oder mit Nicht-Hex-Ziffern
/// wird literal kopiert (das Prozentzeichen selbst, die Folgezeichen
/// werden danach normal weiterverarbeitet).
pub fn url_decode_in_place(buf: &mut [u8]) -> usize {
    let mut out = 0;
    let mut i = 0;

    while i < buf.len() {
        let c = buf[i];

        if c == b'+' {
            buf[out] = b' ';
            out += 1;
            i += 1;
        } else if c == b'%' && i + 2 < buf.len() {
            match (hex_val(buf[i + 1]), hex_val(buf[i + 2])) {
                (Some(hi), Some(lo)) => {
                    buf[out] = (hi << 4) | lo;
                    out += 1;
                    i += 3;
                }
                _ => {
                    buf[out] = c;
                    out += 1;
                    i += 1;
                }
            }
        } else {
            buf[out] = c;
            out += 1;
            i += 1;
        }
    }

    out
}

/// Sucht den Roh-Wert (noch URL-encoded) eines Formular-Schlüssels
///
/// Erster Treffer gewinnt; Wert reicht bis zum nächsten `&` oder zum
/// Body-Ende.
fn form_field<'a>(body: &'a [u8], key: &str) -> Option<&'a [u8]> {
    for pair in body.split(|&b| b == b'&') {
        let mut parts = pair.splitn(2, |&b| b == b'=');
        let k = parts.next()?;
        if k == key.as_bytes() {
            return Some(parts.next().unwrap_or(&[]));
        }
    }
    None
}

/// Extrahiert und decoded ein Pflichtfeld mit Kapazität `N`
///
/// Der ROH-Wert muss bereits in die Feld-Kapazität passen - ein zu
/// langer encodeter Wert wird abgelehnt statt stillschweigend gekürzt.
fn decoded_field<const N: usize>(body: &[u8], key: &str) -> Result<String<N>, FormError> {
    let raw = form_field(body, key).ok_or(FormError::MissingField)?;
    if raw.len() > N {
        return Err(FormError::FieldTooLong);
    }

    let mut buf: Vec<u8, N> = Vec::from_slice(raw).map_err(|_| FormError::FieldTooLong)?;
    let len = url_decode_in_place(&mut buf);
    buf.truncate(len);

    let decoded = core::str::from_utf8(&buf).map_err(|_| FormError::InvalidEncoding)?;
    if decoded.is_empty() {
        return Err(FormError::EmptyField);
    }

    let mut value = String::new();
    value.push_str(decoded).map_err(|_| FormError::FieldTooLong)?;
    Ok(value)
}

/// Parst den Body des Speichern-Formulars zu einer vollständigen,
/// validierten `DeviceConfig`
///
/// Benötigt die Schlüssel `ssid`, `pass`, `name` und `server`; jedes
/// Feld muss nach dem Decoden nicht-leer sein und `server` ein gültiges
/// IPv4 dotted-quad.
pub fn parse_config_form(body: &[u8]) -> Result<DeviceConfig, FormError> {
    let cfg = DeviceConfig {
        wifi_ssid: decoded_field::<CONFIG_FIELD_MAX>(body, "ssid")?,
        wifi_pass: decoded_field::<CONFIG_FIELD_MAX>(body, "pass")?,
        device_name: decoded_field::<CONFIG_FIELD_MAX>(body, "name")?,
        server_addr: decoded_field::<SERVER_ADDR_MAX>(body, "server")?,
    };

    if cfg.server_ip().is_none() {
        return Err(FormError::BadServerAddr);
    }

    Ok(cfg)
}

#[cfg(feature = "defmt")]
impl defmt::Format for FormError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            FormError::MissingField => defmt::write!(fmt, "missing field"),
            FormError::EmptyField => defmt::write!(fmt, "empty field"),
            FormError::FieldTooLong => defmt::write!(fmt, "field too long"),
            FormError::InvalidEncoding => defmt::write!(fmt, "invalid encoding"),
            FormError::BadServerAddr => defmt::write!(fmt, "bad server address"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(input: &str) -> heapless::String<256> {
        let mut buf: Vec<u8, 256> = Vec::from_slice(input.as_bytes()).unwrap();
        let len = url_decode_in_place(&mut buf);
        buf.truncate(len);
        let mut out = heapless::String::new();
        out.push_str(core::str::from_utf8(&buf).unwrap()).unwrap();
        out
    }

    #[test]
    fn test_decode_plus_and_percent() {
        assert_eq!(decode("a+b"), "a b");
        assert_eq!(decode("Heim%20Netz"), "Heim Netz");
        assert_eq!(decode("100%25"), "100%");
        assert_eq!(decode("%C3%A4"), "ä");
    }

    #[test]
    fn test_decode_broken_escapes_copied_literally() {
        // zu wenige Folgezeichen
        assert_eq!(decode("abc%"), "abc%");
        assert_eq!(decode("abc%4"), "abc%4");
        // keine Hex-Ziffern
        assert_eq!(decode("abc%zz"), "abc%zz");
        assert_eq!(decode("%g1x"), "%g1x");
    }

    #[test]
    fn test_decode_roundtrip_printable_ascii() {
        // RFC3986-Encoding mit + für Leerzeichen, dann decoden
        let original: &[u8] = b"Mein Netz/42 &co=x?~";
        let mut encoded: Vec<u8, 256> = Vec::new();
        for &b in original {
            if b == b' ' {
                encoded.push(b'+').unwrap();
            } else if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~') {
                encoded.push(b).unwrap();
            } else {
                const HEX: &[u8; 16] = b"0123456789ABCDEF";
                encoded.push(b'%').unwrap();
                encoded.push(HEX[(b >> 4) as usize]).unwrap();
                encoded.push(HEX[(b & 0x0F) as usize]).unwrap();
            }
        }

        let len = url_decode_in_place(&mut encoded);
        assert_eq!(&encoded[..len], original);
    }

    #[test]
    fn test_parse_valid_form() {
        let cfg = parse_config_form(b"ssid=Heim+Netz&pass=ge%26heim&name=Kueche&server=10.0.0.5")
            .unwrap();
        assert_eq!(cfg.wifi_ssid.as_str(), "Heim Netz");
        assert_eq!(cfg.wifi_pass.as_str(), "ge&heim");
        assert_eq!(cfg.device_name.as_str(), "Kueche");
        assert_eq!(cfg.server_addr.as_str(), "10.0.0.5");
    }

    #[test]
    fn test_parse_rejects_missing_and_empty_fields() {
        assert_eq!(
            parse_config_form(b"ssid=A&pass=B&name=C"),
            Err(FormError::MissingField)
        );
        assert_eq!(
            parse_config_form(b"ssid=&pass=B&name=C&server=10.0.0.5"),
            Err(FormError::EmptyField)
        );
    }

    #[test]
    fn test_parse_rejects_bad_server() {
        assert_eq!(
            parse_config_form(b"ssid=A&pass=B&name=C&server=bad"),
            Err(FormError::BadServerAddr)
        );
        assert_eq!(
            parse_config_form(b"ssid=A&pass=B&name=C&server=192.168.4.999"),
            Err(FormError::BadServerAddr)
        );
    }

    #[test]
    fn test_parse_rejects_oversized_raw_value() {
        // 32 Roh-Bytes überschreiten die 31-Byte-Kapazität
        let body = b"ssid=0123456789012345678901234567891x&pass=B&name=C&server=10.0.0.5";
        assert_eq!(parse_config_form(body), Err(FormError::FieldTooLong));
    }

    #[test]
    fn test_field_order_is_irrelevant() {
        let cfg =
            parse_config_form(b"server=10.0.0.5&name=Kueche&pass=geheim&ssid=Heimnetz").unwrap();
        assert_eq!(cfg.wifi_ssid.as_str(), "Heimnetz");
    }
}
