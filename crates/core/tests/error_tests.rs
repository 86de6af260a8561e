// ═══════════════════════════════════════════════════════════════════
// Error Tests — CoreError variants, Display formatting, classification
// ═══════════════════════════════════════════════════════════════════

use crypto_assistant_core::errors::{redact_query, CoreError};

// ── Display formatting ──────────────────────────────────────────────

mod display {
    use super::*;

    #[test]
    fn invalid_file_format() {
        let err = CoreError::InvalidFileFormat("bad header".into());
        assert_eq!(err.to_string(), "Invalid state file: bad header");
    }

    #[test]
    fn unsupported_version() {
        let err = CoreError::UnsupportedVersion(99);
        assert_eq!(err.to_string(), "Unsupported state file version: 99");
    }

    #[test]
    fn decryption() {
        assert_eq!(
            CoreError::Decryption.to_string(),
            "Decryption failed: wrong password or corrupted file"
        );
    }

    #[test]
    fn missing_api_key_names_signup_url() {
        let err = CoreError::MissingApiKey {
            provider: "Cohere".into(),
            signup_url: "https://dashboard.cohere.com/api-keys".into(),
        };
        assert_eq!(
            err.to_string(),
            "Cohere API key not configured. Get a free key at: https://dashboard.cohere.com/api-keys"
        );
    }

    #[test]
    fn api_shorthand() {
        let err = CoreError::api("CoinGecko", "HTTP 500: boom");
        assert_eq!(err.to_string(), "API error (CoinGecko): HTTP 500: boom");
    }

    #[test]
    fn unsupported_chain() {
        let err = CoreError::UnsupportedChain("solana".into());
        assert_eq!(err.to_string(), "No explorer available for chain: solana");
    }

    #[test]
    fn not_found_variants() {
        assert_eq!(
            CoreError::CoinNotFound("dogecoin".into()).to_string(),
            "Coin not found: dogecoin"
        );
        assert_eq!(
            CoreError::HoldingNotFound("abc".into()).to_string(),
            "Holding not found: abc"
        );
        assert_eq!(
            CoreError::AlertNotFound("abc".into()).to_string(),
            "Alert not found: abc"
        );
    }
}

// ── Classification ──────────────────────────────────────────────────

mod classification {
    use super::*;

    #[test]
    fn rate_limited_variant() {
        assert!(CoreError::RateLimited("Cohere".into()).is_rate_limited());
        assert!(!CoreError::RateLimited("Cohere".into()).is_unauthorized());
    }

    #[test]
    fn rate_limit_from_message_text() {
        assert!(CoreError::api("Cohere", "HTTP 429: slow down").is_rate_limited());
        assert!(CoreError::api("Cohere", "Monthly quota exceeded").is_rate_limited());
        assert!(CoreError::Network("rate limit hit".into()).is_rate_limited());
    }

    #[test]
    fn unauthorized_variant_and_text() {
        assert!(CoreError::Unauthorized("Cohere".into()).is_unauthorized());
        assert!(CoreError::api("Cohere", "HTTP 401: invalid token").is_unauthorized());
        assert!(CoreError::api("Cohere", "Unauthorized request").is_unauthorized());
    }

    #[test]
    fn other_errors_are_neither() {
        let err = CoreError::api("Cohere", "HTTP 500: internal");
        assert!(!err.is_rate_limited());
        assert!(!err.is_unauthorized());
        assert!(!CoreError::Decryption.is_rate_limited());
        assert!(!CoreError::ValidationError("429".into()).is_rate_limited());
    }
}

// ── From impls ──────────────────────────────────────────────────────

mod conversions {
    use super::*;

    #[test]
    fn from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err: CoreError = io.into();
        assert!(matches!(err, CoreError::FileIO(ref m) if m.contains("no such file")));
    }

    #[test]
    fn from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: CoreError = json_err.into();
        assert!(matches!(err, CoreError::Deserialization(_)));
    }

    #[test]
    fn from_bincode_error() {
        let bin_err = bincode::deserialize::<String>(&[0xff]).unwrap_err();
        let err: CoreError = bin_err.into();
        assert!(matches!(err, CoreError::Serialization(_)));
    }
}

// ── Query redaction ─────────────────────────────────────────────────

mod redaction {
    use super::*;

    #[test]
    fn strips_query_string() {
        let msg = "error sending request for url (https://api.etherscan.io/v2/api?module=account&apikey=SECRET)";
        let redacted = redact_query(msg);
        assert!(!redacted.contains("SECRET"));
        assert!(redacted.starts_with("error sending request for url (https://api.etherscan.io/v2/api"));
        assert!(redacted.ends_with("?<query redacted>"));
    }

    #[test]
    fn leaves_plain_messages_alone() {
        assert_eq!(redact_query("connection reset"), "connection reset");
    }
}
