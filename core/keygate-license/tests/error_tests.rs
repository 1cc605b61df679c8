use keygate_blobstore::BlobStoreError;
use keygate_license::{KeygateConfig, LicenseError, RejectReason};

#[test]
fn error_display_forbidden() {
    let err = LicenseError::Forbidden;
    assert!(format!("{err}").contains("admin credential"));
    assert!(err.is_forbidden());
}

#[test]
fn error_display_invalid_expiry() {
    let err = LicenseError::InvalidExpiry("zero hours".into());
    assert!(format!("{err}").contains("zero hours"));
    assert!(!err.is_forbidden());
}

#[test]
fn error_display_exhausted() {
    let err = LicenseError::CodeSpaceExhausted(16);
    assert!(format!("{err}").contains("16"));
}

#[test]
fn error_from_blob_store() {
    let err: LicenseError = BlobStoreError::Storage("disk full".into()).into();
    let msg = format!("{err}");
    assert!(msg.contains("storage"));
    assert!(msg.contains("disk full"));
}

#[test]
fn error_from_serde_json() {
    let serde_err: Result<serde_json::Value, _> = serde_json::from_str("not json");
    let err: LicenseError = serde_err.unwrap_err().into();
    assert!(format!("{err}").contains("serialization"));
}

#[test]
fn reject_reason_messages() {
    assert_eq!(RejectReason::NoCode.message(), "No key provided");
    assert_eq!(RejectReason::NoDevice.message(), "No HWID provided");
    assert_eq!(RejectReason::InvalidKey.message(), "Invalid key");
    assert_eq!(RejectReason::Expired.message(), "Key has expired");
    assert_eq!(
        RejectReason::DeviceMismatch.message(),
        "Key already used on another device"
    );
}

#[test]
fn reject_reason_serde() {
    let json = serde_json::to_string(&RejectReason::DeviceMismatch).unwrap();
    assert_eq!(json, r#""device_mismatch""#);
}

// ── Config ───────────────────────────────────────────────────────

#[test]
fn config_defaults() {
    let config = KeygateConfig::default();
    assert_eq!(config.key_expiry_hours, 24);
    assert!(config.is_demo_redirect());
}

#[test]
fn config_debug_redacts_secret() {
    let config = KeygateConfig {
        admin_secret: "hunter2".into(),
        ..KeygateConfig::default()
    };
    let debug = format!("{config:?}");
    assert!(!debug.contains("hunter2"));
    assert!(debug.contains("<redacted>"));
}

#[test]
fn config_partial_json_uses_defaults() {
    let config: KeygateConfig =
        serde_json::from_str(r#"{"key_expiry_hours": 12, "redirect_link": "https://x.test/go"}"#)
            .unwrap();
    assert_eq!(config.key_expiry_hours, 12);
    assert!(!config.is_demo_redirect());
    assert_eq!(config.admin_secret, "admin123");
}
