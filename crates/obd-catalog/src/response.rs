//! Raw Response Hygiene
//!
//! Cleans adapter responses and extracts the hex payload behind the
//! positive reply echo.

use crate::error::DecodeError;

/// Transient adapter chatter that may precede a real reply
const CHATTER: [&str; 3] = ["SEARCHING...", "BUSINIT...OK", "BUSINIT..."];

/// Strip whitespace, carriage returns, and transient adapter chatter
pub fn clean(raw: &str) -> String {
    let mut cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    for chatter in CHATTER {
        cleaned = cleaned.replace(chatter, "");
    }
    cleaned
}

/// Extract payload bytes from a cleaned response.
///
/// A positive reply echoes the request with `0x40` added to the mode byte:
/// request `010C` answers as `410C` followed by the payload hex pairs. The
/// echo is searched for rather than anchored, since adapters with echo
/// enabled prefix the reply with the request itself.
pub fn payload_bytes(cleaned: &str, mode: u8, pid: u8) -> Result<Vec<u8>, DecodeError> {
    let echo = format!("{:02X}{:02X}", mode + 0x40, pid);
    let start = cleaned.find(&echo).ok_or_else(|| DecodeError::MissingEcho {
        expected: echo.clone(),
        response: cleaned.to_string(),
    })?;

    let data = &cleaned[start + echo.len()..];
    if data.is_empty() {
        return Err(DecodeError::EmptyPayload);
    }
    hex_pairs(data)
}

fn hex_pairs(data: &str) -> Result<Vec<u8>, DecodeError> {
    if data.len() % 2 != 0 {
        return Err(DecodeError::OddHexLength(data.len()));
    }
    data.as_bytes()
        .chunks(2)
        .map(|pair| {
            let digits = std::str::from_utf8(pair)
                .map_err(|_| DecodeError::BadHexPair(String::from_utf8_lossy(pair).into_owned()))?;
            u8::from_str_radix(digits, 16).map_err(|_| DecodeError::BadHexPair(digits.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_clean_strips_whitespace_and_chatter() {
        assert_eq!(clean("41 0C 1A F8 \r\r"), "410C1AF8");
        assert_eq!(clean("SEARCHING...\r41 0D 41\r"), "410D41");
    }

    #[test]
    fn test_payload_bytes_behind_echo() {
        assert_eq!(payload_bytes("410C1AF8", 0x01, 0x0C).unwrap(), vec![0x1A, 0xF8]);
    }

    #[test]
    fn test_payload_bytes_skips_request_echo() {
        // Adapter with echo enabled repeats the request first
        assert_eq!(payload_bytes("010C410C1AF8", 0x01, 0x0C).unwrap(), vec![0x1A, 0xF8]);
    }

    #[test]
    fn test_missing_echo_is_an_error() {
        assert!(matches!(
            payload_bytes("NODATA", 0x01, 0x0C),
            Err(DecodeError::MissingEcho { .. })
        ));
    }

    #[test]
    fn test_empty_payload_is_an_error() {
        assert!(matches!(
            payload_bytes("410C", 0x01, 0x0C),
            Err(DecodeError::EmptyPayload)
        ));
    }

    #[test]
    fn test_odd_hex_length_is_an_error() {
        assert!(matches!(
            payload_bytes("410C1AF", 0x01, 0x0C),
            Err(DecodeError::OddHexLength(3))
        ));
    }

    #[test]
    fn test_non_hex_payload_is_an_error() {
        assert!(matches!(
            payload_bytes("410CZZ", 0x01, 0x0C),
            Err(DecodeError::BadHexPair(_))
        ));
    }

    proptest! {
        // Arbitrary adapter garbage must classify as an error, never panic
        #[test]
        fn test_payload_extraction_never_panics(raw in ".{0,64}", mode in 0u8..=0x0A, pid: u8) {
            let _ = payload_bytes(&clean(&raw), mode, pid);
        }
    }
}
