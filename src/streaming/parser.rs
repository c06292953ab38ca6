//! Incremental event-stream parser for advisory responses
//!
//! Turns the raw byte chunks of a response body into discrete records:
//! - Decoding: stateful UTF-8, codepoints split across chunks are held back
//! - Framing: records end at a blank line (`"\n\n"`), empty records dropped
//! - Payload: `data: <JSON>` records parsed into [`StreamPayload`]
//! - Buffer: 1MB maximum of undelimited text

use crate::errors::AdvisorError;
use crate::types::StreamPayload;

/// Maximum pending (undelimited) text size (1MB)
pub const MAX_BUFFER_SIZE: usize = 1_048_576;

/// Separator between records
pub const RECORD_DELIMITER: &str = "\n\n";

/// Prefix carried by every payload record
pub const DATA_PREFIX: &str = "data: ";

/// One framed record after classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedRecord {
    /// `data: ` record with a recognized payload
    Payload(StreamPayload),

    /// `data: ` record whose body is not JSON or has no recognized field
    Malformed(String),

    /// Record without the `data: ` prefix (comments, other SSE fields)
    Ignored,

    /// Undelimited text past the buffer limit was discarded
    Overflow { discarded: usize },
}

impl ParsedRecord {
    /// Classify a single record's text
    pub fn classify(raw: &str) -> Self {
        let Some(body) = raw.strip_prefix(DATA_PREFIX) else {
            return ParsedRecord::Ignored;
        };

        match StreamPayload::parse(body) {
            Some(payload) => ParsedRecord::Payload(payload),
            None => ParsedRecord::Malformed(body.to_string()),
        }
    }

    /// Diagnostic error for records that are skipped as unusable
    pub fn diagnostic(&self) -> Option<AdvisorError> {
        match self {
            ParsedRecord::Malformed(body) => Some(AdvisorError::MalformedRecord(body.clone())),
            ParsedRecord::Overflow { discarded } => Some(AdvisorError::MalformedRecord(format!(
                "{} bytes without a record delimiter exceeded the buffer limit",
                discarded
            ))),
            ParsedRecord::Payload(_) | ParsedRecord::Ignored => None,
        }
    }
}

/// Stateful UTF-8 decoder
///
/// Incomplete trailing sequences wait for the next chunk; invalid
/// sequences decode to U+FFFD.
#[derive(Debug, Default)]
struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    fn decode(&mut self, bytes: &[u8], out: &mut String) {
        self.pending.extend_from_slice(bytes);

        let mut input: &[u8] = &self.pending;
        loop {
            match std::str::from_utf8(input) {
                Ok(text) => {
                    out.push_str(text);
                    input = &[];
                    break;
                }
                Err(e) => {
                    let (valid, rest) = input.split_at(e.valid_up_to());
                    out.push_str(&String::from_utf8_lossy(valid));

                    match e.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            input = &rest[len..];
                        }
                        None => {
                            // Incomplete sequence at the end of the chunk
                            input = rest;
                            break;
                        }
                    }
                }
            }
        }

        let remainder = input.to_vec();
        self.pending = remainder;
    }

    fn finish(&mut self, out: &mut String) {
        if !self.pending.is_empty() {
            out.push_str(&String::from_utf8_lossy(&self.pending));
            self.pending.clear();
        }
    }

    fn clear(&mut self) {
        self.pending.clear();
    }
}

/// Incremental event-stream parser
#[derive(Debug)]
pub struct EventStreamParser {
    decoder: Utf8Decoder,

    /// Decoded text not yet terminated by a delimiter
    buffer: String,

    max_buffer_size: usize,
}

impl EventStreamParser {
    /// Create new parser with default settings
    pub fn new() -> Self {
        Self::with_capacity(MAX_BUFFER_SIZE)
    }

    /// Create parser with custom buffer capacity
    pub fn with_capacity(max_buffer_size: usize) -> Self {
        Self {
            decoder: Utf8Decoder::default(),
            buffer: String::with_capacity(4096),
            max_buffer_size,
        }
    }

    /// Add a chunk of bytes and return every record it completes
    ///
    /// Records are returned in arrival order. When the pending text grows
    /// past the buffer limit without a delimiter, that text is discarded
    /// and a trailing `Overflow` record reports it; records completed
    /// earlier in the same chunk are still returned.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<ParsedRecord> {
        self.decoder.decode(bytes, &mut self.buffer);
        let mut records = self.drain_complete();

        if self.buffer.len() > self.max_buffer_size {
            let discarded = self.buffer.len();
            self.clear();
            records.push(ParsedRecord::Overflow { discarded });
        }

        records
    }

    /// Flush at end of stream
    ///
    /// Remaining text without a trailing delimiter is treated as one last record.
    pub fn finish(&mut self) -> Vec<ParsedRecord> {
        self.decoder.finish(&mut self.buffer);
        let mut records = self.drain_complete();

        let rest = std::mem::take(&mut self.buffer);
        if !rest.is_empty() {
            records.push(ParsedRecord::classify(&rest));
        }

        records
    }

    /// Split off every delimiter-terminated record in the buffer
    fn drain_complete(&mut self) -> Vec<ParsedRecord> {
        let mut records = Vec::new();
        let mut consumed = 0;

        while let Some(pos) = self.buffer[consumed..].find(RECORD_DELIMITER) {
            let raw = &self.buffer[consumed..consumed + pos];
            if !raw.is_empty() {
                records.push(ParsedRecord::classify(raw));
            }
            consumed += pos + RECORD_DELIMITER.len();
        }

        if consumed > 0 {
            self.buffer.drain(..consumed);
        }

        records
    }

    /// Get current pending text size
    pub fn buffer_size(&self) -> usize {
        self.buffer.len()
    }

    /// Clear pending text and undecoded bytes
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.decoder.clear();
    }

    /// Check if nothing is pending
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty() && self.decoder.pending.is_empty()
    }
}

impl Default for EventStreamParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    fn token(text: &str) -> ParsedRecord {
        ParsedRecord::Payload(StreamPayload::Token(text.to_string()))
    }

    #[test]
    fn test_single_chunk_multiple_records() {
        let mut parser = EventStreamParser::new();

        let records = parser.push(b"data: {\"token\":\"Hel\"}\n\ndata: {\"token\":\"lo\"}\n\n");

        assert_eq!(records, vec![token("Hel"), token("lo")]);
        assert!(parser.is_empty());
    }

    #[test]
    fn test_record_split_across_chunks() {
        let mut parser = EventStreamParser::new();

        assert!(parser.push(b"data: {\"tok").is_empty());
        assert!(parser.push(b"en\":\"Hel\"}\n").is_empty());

        let records = parser.push(b"\ndata: {\"token\":\"lo\"}\n\n");
        assert_eq!(records, vec![token("Hel"), token("lo")]);
    }

    #[test]
    fn test_delimiter_mid_chunk_keeps_tail() {
        let mut parser = EventStreamParser::new();

        let records = parser.push(b"data: {\"token\":\"a\"}\n\ndata: {\"token\":");
        assert_eq!(records, vec![token("a")]);
        assert!(!parser.is_empty());

        let records = parser.push(b"\"b\"}\n\n");
        assert_eq!(records, vec![token("b")]);
    }

    #[test]
    fn test_multibyte_char_split_across_chunks() {
        let mut parser = EventStreamParser::new();
        let full = "data: {\"token\":\"गेहूं\"}\n\n".as_bytes();

        // Split inside the first Devanagari codepoint
        let split = "data: {\"token\":\"".len() + 1;
        assert!(parser.push(&full[..split]).is_empty());

        let records = parser.push(&full[split..]);
        assert_eq!(records, vec![token("गेहूं")]);
    }

    #[test]
    fn test_invalid_utf8_becomes_replacement() {
        let mut parser = EventStreamParser::new();

        let mut bytes = b"data: {\"token\":\"a".to_vec();
        bytes.push(0xFF);
        bytes.extend_from_slice(b"b\"}\n\n");

        let records = parser.push(&bytes);
        assert_eq!(records, vec![token("a\u{FFFD}b")]);
    }

    #[test]
    fn test_empty_records_discarded() {
        let mut parser = EventStreamParser::new();
        let records = parser.push(b"\n\n\n\ndata: {\"token\":\"x\"}\n\n");
        assert_eq!(records, vec![token("x")]);
    }

    #[test]
    fn test_non_data_records_ignored() {
        let mut parser = EventStreamParser::new();
        let records = parser.push(b": keep-alive\n\nevent: ping\n\n");
        assert_eq!(records, vec![ParsedRecord::Ignored, ParsedRecord::Ignored]);
    }

    #[test]
    fn test_malformed_payload() {
        let mut parser = EventStreamParser::new();
        let records = parser.push(b"data: not-json\n\ndata: {\"token\":\"ok\"}\n\n");

        assert_eq!(
            records,
            vec![ParsedRecord::Malformed("not-json".to_string()), token("ok")]
        );
    }

    #[test]
    fn test_done_and_error_payloads() {
        let mut parser = EventStreamParser::new();
        let records = parser.push(b"data: {\"error\":\"boom\"}\n\ndata: {\"done\": true}\n\n");

        assert_eq!(
            records,
            vec![
                ParsedRecord::Payload(StreamPayload::Error("boom".to_string())),
                ParsedRecord::Payload(StreamPayload::Done),
            ]
        );
    }

    #[test]
    fn test_finish_flushes_trailing_record() {
        let mut parser = EventStreamParser::new();

        assert!(parser.push(b"data: {\"token\":\"tail\"}").is_empty());
        assert_eq!(parser.finish(), vec![token("tail")]);
        assert!(parser.is_empty());
    }

    #[test]
    fn test_finish_on_empty_parser() {
        let mut parser = EventStreamParser::new();
        assert!(parser.finish().is_empty());
    }

    #[test]
    fn test_buffer_overflow() {
        let mut parser = EventStreamParser::with_capacity(100);

        let large_data = vec![b'a'; 150];
        let records = parser.push(&large_data);

        assert_eq!(records, vec![ParsedRecord::Overflow { discarded: 150 }]);
        assert!(parser.is_empty());
    }

    #[test]
    fn test_overflow_keeps_records_completed_in_same_chunk() {
        let mut parser = EventStreamParser::with_capacity(100);

        let mut chunk = b"data: {\"token\":\"keep\"}\n\n".to_vec();
        chunk.extend(vec![b'a'; 150]);

        let records = parser.push(&chunk);
        assert_eq!(
            records,
            vec![token("keep"), ParsedRecord::Overflow { discarded: 150 }]
        );
        assert!(parser.is_empty());

        // Parsing resumes normally after the discarded tail
        assert_eq!(parser.push(b"data: {\"token\":\"next\"}\n\n"), vec![token("next")]);
    }

    #[test]
    fn test_diagnostics() {
        assert!(token("x").diagnostic().is_none());
        assert!(ParsedRecord::Ignored.diagnostic().is_none());
        assert!(matches!(
            ParsedRecord::Malformed("oops".to_string()).diagnostic(),
            Some(AdvisorError::MalformedRecord(ref body)) if body == "oops"
        ));
        assert!(matches!(
            ParsedRecord::Overflow { discarded: 7 }.diagnostic(),
            Some(AdvisorError::MalformedRecord(_))
        ));
    }

    #[test]
    fn test_clear() {
        let mut parser = EventStreamParser::new();

        parser.push(b"data: partial");
        assert!(!parser.is_empty());

        parser.clear();
        assert!(parser.is_empty());
        assert_eq!(parser.buffer_size(), 0);
    }

    /// Chunking must never change the records a body produces
    #[quickcheck]
    fn prop_chunking_is_transparent(tokens: Vec<String>, cuts: Vec<usize>) -> bool {
        let body: String = tokens
            .iter()
            .map(|t| format!("data: {}\n\n", serde_json::json!({ "token": t })))
            .collect();
        let bytes = body.as_bytes();

        let mut points: Vec<usize> = cuts
            .into_iter()
            .map(|c| if bytes.is_empty() { 0 } else { c % bytes.len() })
            .collect();
        points.sort_unstable();
        points.dedup();

        let mut parser = EventStreamParser::new();
        let mut records = Vec::new();
        let mut start = 0;
        for point in points {
            records.extend(parser.push(&bytes[start..point]));
            start = point;
        }
        records.extend(parser.push(&bytes[start..]));
        records.extend(parser.finish());

        let expected: Vec<ParsedRecord> = tokens.iter().map(|t| token(t)).collect();
        records == expected
    }
}
