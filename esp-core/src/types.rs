//! Core Types für die Rufbox-Steuerung
//!
//! Datenstrukturen ohne Hardware-Dependencies

use heapless::String;

/// Maximale Textlänge einer Display-Nachricht (längere Texte werden gekürzt)
pub const STATUS_TEXT_MAX: usize = 128;

/// Klassifiziertes Tasten-Ereignis der Ruftaste
///
/// Wird vom Edge-Handler an den Worker-Task gesendet. Ein Single, das
/// später Teil eines Double wird, wird NICHT zurückgezogen - der Worker
/// sieht dann beides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickEvent {
    Single,
    Double,
}

/// Status-Nachricht für das Display
///
/// Text plus Anzeigedauer; nach Ablauf wird das Display geleert.
/// `None` bedeutet: anzeigen bis zur nächsten Nachricht.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String<STATUS_TEXT_MAX>,
    pub timeout_ms: Option<u32>,
}

impl StatusMessage {
    /// Erstellt eine StatusMessage; zu langer Text wird an einer
    /// Zeichengrenze abgeschnitten.
    pub fn new(text: &str, timeout_ms: Option<u32>) -> Self {
        let mut buf: String<STATUS_TEXT_MAX> = String::new();
        for ch in text.chars() {
            if buf.push(ch).is_err() {
                break;
            }
        }
        Self {
            text: buf,
            timeout_ms,
        }
    }
}

// ============================================================================
// defmt::Format Implementations (optional feature)
// ============================================================================

#[cfg(feature = "defmt")]
impl defmt::Format for ClickEvent {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            ClickEvent::Single => defmt::write!(fmt, "Single"),
            ClickEvent::Double => defmt::write!(fmt, "Double"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for StatusMessage {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "StatusMessage {{ text: {=str}, timeout_ms: {} }}",
            self.text.as_str(),
            self.timeout_ms
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message_keeps_short_text() {
        let msg = StatusMessage::new("Wi-Fi SSID\nRufbox 4A2F01", Some(5000));
        assert_eq!(msg.text.as_str(), "Wi-Fi SSID\nRufbox 4A2F01");
        assert_eq!(msg.timeout_ms, Some(5000));
    }

    #[test]
    fn test_status_message_truncates_long_text() {
        let mut long = heapless::String::<256>::new();
        for _ in 0..(STATUS_TEXT_MAX + 40) {
            long.push('x').unwrap();
        }
        let msg = StatusMessage::new(&long, None);
        assert_eq!(msg.text.len(), STATUS_TEXT_MAX);
    }
}
