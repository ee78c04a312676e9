//! Captive-DNS Codec
//!
//! Beantwortet JEDE Anfrage mit demselben A-Record auf die Portal-Adresse.
//! Genau das macht Clients glauben, sie müssten sich erst am Portal
//! anmelden - der Mechanismus hinter der Captive-Portal-Umleitung.

/// DNS-Header-Länge; kürzere Datagramme werden verworfen
pub const DNS_HEADER_LEN: usize = 12;

/// Länge des synthetisierten Answer-Records
/// (Name-Pointer 2 + TYPE 2 + CLASS 2 + TTL 4 + RDLENGTH 2 + RDATA 4)
pub const DNS_ANSWER_LEN: usize = 16;

/// TTL der Antwort in Sekunden
pub const DNS_ANSWER_TTL_SECS: u32 = 60;

/// Baut aus einer Query die Captive-Portal-Antwort
///
/// Die Query wird unverändert übernommen, dann werden nur die Header-Flags
/// umgebogen ("Response, no error, keine Rekursion") und genau ein
/// A-Record mit komprimiertem Namens-Pointer auf Offset 12 angehängt.
///
/// Liefert `None` (Datagramm still verwerfen) wenn die Query kürzer als
/// ein Header ist oder die Antwort nicht in `resp` passen würde.
pub fn build_captive_response(query: &[u8], resp: &mut [u8], portal_addr: [u8; 4]) -> Option<usize> {
    if query.len() < DNS_HEADER_LEN || query.len() + DNS_ANSWER_LEN > resp.len() {
        return None;
    }

    let len = query.len();
    resp[..len].copy_from_slice(query);

    resp[2] = 0x81;
    resp[3] = 0x80; // Response, no error
    resp[6] = 0x00;
    resp[7] = 0x01; // ANCOUNT = 1
    resp[8..12].fill(0x00); // NSCOUNT/ARCOUNT = 0

    let answer = &mut resp[len..len + DNS_ANSWER_LEN];
    answer[0] = 0xC0;
    answer[1] = 0x0C; // Name: Pointer auf die Question
    answer[2] = 0x00;
    answer[3] = 0x01; // TYPE A
    answer[4] = 0x00;
    answer[5] = 0x01; // CLASS IN
    answer[6..10].copy_from_slice(&DNS_ANSWER_TTL_SECS.to_be_bytes());
    answer[10] = 0x00;
    answer[11] = 0x04; // RDLENGTH
    answer[12..16].copy_from_slice(&portal_addr);

    Some(len + DNS_ANSWER_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PORTAL: [u8; 4] = [192, 168, 4, 1];

    /// Standard-Query für example.com, Typ A (29 Bytes)
    fn example_com_query() -> [u8; 29] {
        let mut q = [0u8; 29];
        q[0] = 0xAB;
        q[1] = 0xCD; // Transaction ID
        q[2] = 0x01;
        q[3] = 0x00; // Standard-Query, Rekursion erwünscht
        q[5] = 0x01; // QDCOUNT = 1
        q[12] = 7;
        q[13..20].copy_from_slice(b"example");
        q[20] = 3;
        q[21..24].copy_from_slice(b"com");
        // q[24] = 0 Root-Label
        q[26] = 0x01; // QTYPE A
        q[28] = 0x01; // QCLASS IN
        q
    }

    #[test]
    fn test_response_layout_for_example_com() {
        let query = example_com_query();
        let mut resp = [0u8; 512];

        let len = build_captive_response(&query, &mut resp, PORTAL).unwrap();
        assert_eq!(len, 29 + DNS_ANSWER_LEN);

        // Transaction ID unverändert, Flags umgebogen
        assert_eq!(&resp[0..2], &[0xAB, 0xCD]);
        assert_eq!(&resp[2..4], &[0x81, 0x80]);
        // ANCOUNT = 1, NSCOUNT/ARCOUNT = 0
        assert_eq!(&resp[6..8], &[0x00, 0x01]);
        assert_eq!(&resp[8..12], &[0, 0, 0, 0]);
        // Question unverändert
        assert_eq!(&resp[12..29], &query[12..29]);
        // genau ein 16-Byte Answer-Record
        let answer = &resp[29..45];
        assert_eq!(&answer[0..2], &[0xC0, 0x0C]);
        assert_eq!(&answer[2..6], &[0x00, 0x01, 0x00, 0x01]);
        assert_eq!(&answer[6..10], &[0x00, 0x00, 0x00, 0x3C]); // TTL 60
        assert_eq!(&answer[10..12], &[0x00, 0x04]);
        assert_eq!(&answer[12..16], &PORTAL);
    }

    #[test]
    fn test_runt_query_dropped() {
        let mut resp = [0u8; 512];
        assert_eq!(build_captive_response(&[0u8; 11], &mut resp, PORTAL), None);
        assert!(build_captive_response(&[0u8; 12], &mut resp, PORTAL).is_some());
    }

    #[test]
    fn test_oversized_query_dropped() {
        // Antwort würde den Ausgabe-Puffer sprengen
        let query = [0u8; 500];
        let mut resp = [0u8; 512];
        assert_eq!(build_captive_response(&query, &mut resp, PORTAL), None);
    }

    #[test]
    fn test_any_query_type_gets_same_answer() {
        let mut query = example_com_query();
        query[26] = 0x1C; // QTYPE AAAA
        let mut resp = [0u8; 512];

        let len = build_captive_response(&query, &mut resp, PORTAL).unwrap();
        assert_eq!(&resp[len - 4..len], &PORTAL);
    }
}
