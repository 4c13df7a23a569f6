//! Reading the header block of a stored message.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::Result;

/// Header blocks larger than this are cut off.
const MAX_HEADER_BYTES: usize = 256 * 1024;

/// Unfolded header fields in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    fields: Vec<(String, String)>,
}

impl Headers {
    /// Parse a header block. Parsing stops at the first empty line.
    pub fn parse(text: &str) -> Self {
        let mut fields: Vec<(String, String)> = Vec::new();

        for line in text.lines() {
            if line.trim().is_empty() {
                break;
            }

            if line.starts_with(|c: char| c == ' ' || c == '\t') {
                // Folded continuation of the previous field.
                if let Some((_, value)) = fields.last_mut() {
                    value.push(' ');
                    value.push_str(line.trim());
                }
                continue;
            }

            if let Some((name, value)) = line.split_once(':') {
                fields.push((name.trim().to_string(), value.trim().to_string()));
            }
        }

        Self { fields }
    }

    /// First value of a field, matched case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// First value of a field with RFC 2047 encoded words decoded.
    pub fn get_decoded(&self, name: &str) -> Option<String> {
        self.get(name).map(decode_words)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Read and parse the header block of the message at `path`.
pub fn read_headers(path: &Path) -> Result<Headers> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut block = Vec::new();
    let mut line = Vec::new();

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        if line.iter().all(|b| matches!(b, b'\r' | b'\n')) {
            break;
        }
        block.extend_from_slice(&line);
        if block.len() >= MAX_HEADER_BYTES {
            break;
        }
    }

    Ok(Headers::parse(&decode(&block)))
}

/// Decode RFC 2047 encoded words (`=?charset?Q|B?...?=`) in a header value.
///
/// Malformed values are returned as they are.
pub fn decode_words(value: &str) -> String {
    rfc2047_decoder::decode(value.as_bytes()).unwrap_or_else(|_| value.to_string())
}

/// UTF-8 when valid, Latin-1 otherwise.
fn decode(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_parse_folded_headers() {
        let headers = Headers::parse(
            "From: a@example.com\r\nSubject: first\r\n  second\r\nDate: Fri, 15 Mar 2024\r\n\t10:30:00 +0000\r\n\r\nBody: not a header\r\n",
        );
        assert_eq!(headers.len(), 3);
        assert_eq!(headers.get("subject"), Some("first second"));
        assert_eq!(headers.get("DATE"), Some("Fri, 15 Mar 2024 10:30:00 +0000"));
        assert_eq!(headers.get("Body"), None);
    }

    #[test]
    fn test_first_occurrence_wins() {
        let headers = Headers::parse("Received: one\nReceived: two\n");
        assert_eq!(headers.get("Received"), Some("one"));
    }

    #[test]
    fn test_read_latin1_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("msg.eml");
        let mut bytes = b"Subject: Relat".to_vec();
        bytes.push(0xF3); // 'ó' in Latin-1
        bytes.extend_from_slice(b"rio\r\nDate: Mon, 1 Jan 2024 08:00:00 -0300\r\n\r\nbody");
        fs::write(&path, bytes).unwrap();

        let headers = read_headers(&path).unwrap();
        assert_eq!(headers.get("Subject"), Some("Relatório"));
        assert_eq!(headers.get("Date"), Some("Mon, 1 Jan 2024 08:00:00 -0300"));
    }

    #[test]
    fn test_decode_encoded_words() {
        assert_eq!(decode_words("=?UTF-8?Q?Relat=C3=B3rio?= mensal"), "Relatório mensal");
        assert_eq!(decode_words("=?ISO-8859-1?B?RulyaWFz?="), "Férias");
        assert_eq!(decode_words("Weekly report"), "Weekly report");

        let headers = Headers::parse("From: =?UTF-8?Q?Jo=C3=A3o?= <joao@example.com>\n");
        assert_eq!(
            headers.get_decoded("from").as_deref(),
            Some("João <joao@example.com>")
        );
        assert_eq!(headers.get_decoded("Subject"), None);
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempdir().unwrap();
        assert!(read_headers(&dir.path().join("absent.eml")).is_err());
    }
}
