// ═══════════════════════════════════════════════════════════════════
// Storage Tests — encryption, file format, StorageManager
// ═══════════════════════════════════════════════════════════════════

use chrono::NaiveDate;

use crypto_assistant_core::errors::CoreError;
use crypto_assistant_core::models::alert::{AlertCondition, PriceAlert};
use crypto_assistant_core::models::chat::ChatMessage;
use crypto_assistant_core::models::portfolio::PortfolioHolding;
use crypto_assistant_core::models::state::AppState;
use crypto_assistant_core::services::portfolio_service::PortfolioService;
use crypto_assistant_core::storage::encryption::{
    derive_key, open, seal, KdfParams, KEY_LEN, NONCE_LEN, SALT_LEN,
};
use crypto_assistant_core::storage::format::{self, CURRENT_VERSION, HEADER_SIZE, MAGIC};
use crypto_assistant_core::storage::manager::StorageManager;

/// Cheap KDF costs so the suite stays fast.
fn fast() -> KdfParams {
    KdfParams {
        memory_cost: 1024,
        time_cost: 1,
        parallelism: 1,
    }
}

fn sample_state() -> AppState {
    let mut state = AppState::default();
    state.messages.push(ChatMessage::user("What is the price of Bitcoin?"));
    state.messages.push(ChatMessage::assistant("About $50,000."));
    PortfolioService::new()
        .add_holding(
            &mut state.portfolio,
            PortfolioHolding::new(
                "bitcoin",
                "btc",
                "Bitcoin",
                0.5,
                40_000.0,
                NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            ),
        )
        .unwrap();
    state.watchlist = vec!["bitcoin".into(), "solana".into()];
    state
        .alerts
        .push(PriceAlert::new("bitcoin", "btc", AlertCondition::Above, 60_000.0, 50_000.0));
    state.settings.set_api_key("cohere", "co-key");
    state
}

// ═══════════════════════════════════════════════════════════════════
// KdfParams
// ═══════════════════════════════════════════════════════════════════

mod kdf_params {
    use super::*;

    #[test]
    fn default_values() {
        let p = KdfParams::default();
        assert_eq!((p.memory_cost, p.time_cost, p.parallelism), (65_536, 3, 4));
        assert!(p.validate().is_ok());
    }

    #[test]
    fn interactive_values() {
        let p = KdfParams::interactive();
        assert_eq!((p.memory_cost, p.time_cost, p.parallelism), (19_456, 2, 1));
        assert!(p.validate().is_ok());
    }

    #[test]
    fn out_of_range_costs_are_rejected() {
        let too_much_memory = KdfParams {
            memory_cost: 2_000_000,
            ..fast()
        };
        let zero_time = KdfParams {
            time_cost: 0,
            ..fast()
        };
        let many_lanes = KdfParams {
            parallelism: 64,
            ..fast()
        };
        for p in [too_much_memory, zero_time, many_lanes] {
            assert!(matches!(p.validate(), Err(CoreError::InvalidFileFormat(_))));
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// Encryption
// ═══════════════════════════════════════════════════════════════════

mod encryption {
    use super::*;

    #[test]
    fn derive_key_is_deterministic_per_salt() {
        let salt = [7u8; SALT_LEN];
        let a = derive_key("hunter2", &salt, &fast()).unwrap();
        let b = derive_key("hunter2", &salt, &fast()).unwrap();
        let c = derive_key("hunter2", &[8u8; SALT_LEN], &fast()).unwrap();
        assert_eq!(a.len(), KEY_LEN);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn seal_uses_fresh_salt_and_nonce() {
        let a = seal(b"secret", "pw", fast()).unwrap();
        let b = seal(b"secret", "pw", fast()).unwrap();
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.ciphertext, b.ciphertext);
        assert_eq!(a.nonce.len(), NONCE_LEN);
        // plaintext + 16-byte tag
        assert_eq!(a.ciphertext.len(), b"secret".len() + 16);
    }

    #[test]
    fn open_recovers_plaintext() {
        let sealed = seal(b"portfolio bytes", "pw", fast()).unwrap();
        assert_eq!(open(&sealed, "pw").unwrap(), b"portfolio bytes");
    }

    #[test]
    fn wrong_password_or_tampering_fails() {
        let sealed = seal(b"portfolio bytes", "pw", fast()).unwrap();
        assert!(matches!(open(&sealed, "PW"), Err(CoreError::Decryption)));

        let mut tampered = sealed.clone();
        tampered.ciphertext[0] ^= 0x01;
        assert!(matches!(open(&tampered, "pw"), Err(CoreError::Decryption)));
    }
}

// ═══════════════════════════════════════════════════════════════════
// File format
// ═══════════════════════════════════════════════════════════════════

mod file_format {
    use super::*;

    #[test]
    fn header_layout() {
        let sealed = seal(b"abc", "pw", fast()).unwrap();
        let bytes = format::encode(&sealed);

        assert_eq!(&bytes[0..4], MAGIC);
        assert_eq!(u16::from_le_bytes([bytes[4], bytes[5]]), CURRENT_VERSION);
        assert_eq!(u32::from_le_bytes(bytes[6..10].try_into().unwrap()), 1024);
        assert_eq!(&bytes[18..18 + SALT_LEN], &sealed.salt);
        assert_eq!(bytes.len(), HEADER_SIZE + sealed.ciphertext.len());
        assert_eq!(format::decode(&bytes).unwrap(), sealed);
    }

    #[test]
    fn rejects_short_and_foreign_files() {
        assert!(matches!(format::decode(b"CRAI"), Err(CoreError::InvalidFileFormat(_))));

        let mut bytes = format::encode(&seal(b"abc", "pw", fast()).unwrap());
        bytes[0] = b'X';
        assert!(matches!(format::decode(&bytes), Err(CoreError::InvalidFileFormat(_))));
    }

    #[test]
    fn rejects_future_versions() {
        let mut bytes = format::encode(&seal(b"abc", "pw", fast()).unwrap());
        bytes[4..6].copy_from_slice(&(CURRENT_VERSION + 1).to_le_bytes());
        assert!(matches!(format::decode(&bytes), Err(CoreError::UnsupportedVersion(v)) if v == CURRENT_VERSION + 1));
    }

    #[test]
    fn rejects_hostile_kdf_params() {
        let mut bytes = format::encode(&seal(b"abc", "pw", fast()).unwrap());
        bytes[6..10].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(format::decode(&bytes), Err(CoreError::InvalidFileFormat(_))));
    }

    #[test]
    fn rejects_truncated_ciphertext() {
        let bytes = format::encode(&seal(b"some longer payload", "pw", fast()).unwrap());
        let truncated = &bytes[..bytes.len() - 3];
        assert!(matches!(format::decode(truncated), Err(CoreError::InvalidFileFormat(_))));
    }
}

// ═══════════════════════════════════════════════════════════════════
// StorageManager
// ═══════════════════════════════════════════════════════════════════

mod manager {
    use super::*;

    #[test]
    fn bytes_round_trip_keeps_every_store() {
        let state = sample_state();
        let bytes = StorageManager::save_with_params(&state, "pw", fast()).unwrap();
        let loaded = StorageManager::load_from_bytes(&bytes, "pw").unwrap();

        assert_eq!(loaded.messages, state.messages);
        assert_eq!(loaded.portfolio, state.portfolio);
        assert_eq!(loaded.watchlist, state.watchlist);
        assert_eq!(loaded.alerts, state.alerts);
        assert_eq!(loaded.preferences, state.preferences);
        assert_eq!(loaded.settings.api_key("cohere"), Some("co-key"));
    }

    #[test]
    fn wrong_password_is_decryption_error() {
        let bytes = StorageManager::save_with_params(&sample_state(), "pw", fast()).unwrap();
        assert!(matches!(
            StorageManager::load_from_bytes(&bytes, "nope"),
            Err(CoreError::Decryption)
        ));
    }

    #[test]
    fn empty_password_is_rejected() {
        assert!(matches!(
            StorageManager::save_with_params(&AppState::default(), "", fast()),
            Err(CoreError::ValidationError(_))
        ));
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.crai");
        let state = sample_state();

        let bytes = StorageManager::save_with_params(&state, "pw", fast()).unwrap();
        std::fs::write(&path, &bytes).unwrap();
        let loaded = StorageManager::load_from_file(&path, "pw").unwrap();
        assert_eq!(loaded.watchlist, state.watchlist);
    }

    #[test]
    fn save_to_file_uses_default_costs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.crai");
        StorageManager::save_to_file(&AppState::default(), &path, "pw").unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let sealed = format::decode(&bytes).unwrap();
        assert_eq!(sealed.kdf_params, KdfParams::default());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            StorageManager::load_from_file(dir.path().join("absent.crai"), "pw"),
            Err(CoreError::FileIO(_))
        ));
    }
}
