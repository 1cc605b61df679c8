use keygate_license::{
    format_remaining, generate_code, is_well_formed_code, Key, KeyRecord, CODE_ALPHABET,
};
use keygate_types::{DeviceId, KeyCode, Timestamp, MILLIS_PER_HOUR};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

// ── Code generation ──────────────────────────────────────────────

#[test]
fn generated_code_has_fixed_shape() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..500 {
        let code = generate_code(&mut rng);
        let s = code.as_str();
        assert_eq!(s.len(), 18);
        assert!(s.starts_with("KEY-"));
        assert!(is_well_formed_code(s), "bad code {s}");
    }
}

#[test]
fn generated_codes_use_whole_alphabet() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut seen = std::collections::HashSet::new();
    for _ in 0..2_000 {
        let code = generate_code(&mut rng);
        seen.extend(code.as_str()[4..].bytes().filter(|b| *b != b'-'));
    }
    assert_eq!(seen.len(), CODE_ALPHABET.len());
}

#[test]
fn well_formed_rejects_wrong_shapes() {
    assert!(is_well_formed_code("KEY-ABCD-EF12-3456"));
    assert!(!is_well_formed_code("KEY-abcd-EF12-3456"));
    assert!(!is_well_formed_code("KEY-ABCD-EF12"));
    assert!(!is_well_formed_code("KEY-ABCD-EF12-3456-7890"));
    assert!(!is_well_formed_code("KEX-ABCD-EF12-3456"));
    assert!(!is_well_formed_code("KEY-ABC-EF12-34567"));
    assert!(!is_well_formed_code("KEY_ABCD_EF12_3456"));
    assert!(!is_well_formed_code(""));
}

// ── Remaining-time formatting ────────────────────────────────────

#[test]
fn format_ninety_minutes() {
    assert_eq!(format_remaining(5_400_000), "1h 30m");
}

#[test]
fn format_under_a_minute() {
    assert_eq!(format_remaining(59_000), "0h 0m");
}

#[test]
fn format_truncates_not_rounds() {
    assert_eq!(format_remaining(MILLIS_PER_HOUR - 1), "0h 59m");
    assert_eq!(format_remaining(24 * MILLIS_PER_HOUR), "24h 0m");
}

#[test]
fn format_negative_clamps_to_zero() {
    assert_eq!(format_remaining(-5_000), "0h 0m");
}

proptest! {
    #[test]
    fn format_roundtrips_whole_minutes(h in 0i64..10_000, m in 0i64..60, s in 0i64..60_000) {
        let ms = h * MILLIS_PER_HOUR + m * 60_000 + s;
        prop_assert_eq!(format_remaining(ms), format!("{h}h {m}m"));
    }

    #[test]
    fn seeded_codes_are_well_formed(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let code = generate_code(&mut rng);
        prop_assert!(is_well_formed_code(code.as_str()));
    }
}

// ── KeyRecord ────────────────────────────────────────────────────

#[test]
fn new_record_is_unbound() {
    let now = Timestamp::from_millis(1_000);
    let record = KeyRecord::new(now, 24, "lootlabs");
    assert_eq!(record.created_at, now);
    assert_eq!(record.expires_at.as_millis(), 1_000 + 24 * MILLIS_PER_HOUR);
    assert!(record.expires_at > record.created_at);
    assert!(!record.is_bound());
    assert_eq!(record.use_count, 0);
    assert_eq!(record.created_by, "lootlabs");
    assert!(record.first_used_at.is_none());
}

#[test]
fn expiry_is_strictly_after() {
    let record = KeyRecord::new(Timestamp::from_millis(0), 1, "t");
    let at_expiry = record.expires_at;
    assert!(!record.is_expired_at(at_expiry));
    assert!(record.is_expired_at(Timestamp::from_millis(at_expiry.as_millis() + 1)));
}

#[test]
fn remaining_reports_expired() {
    let record = KeyRecord::new(Timestamp::from_millis(0), 1, "t");
    assert_eq!(record.remaining_at(Timestamp::from_millis(0)), "1h 0m");
    assert_eq!(
        record.remaining_at(Timestamp::from_millis(2 * MILLIS_PER_HOUR)),
        "Expired"
    );
}

// ── Persisted layout ─────────────────────────────────────────────

#[test]
fn record_serializes_with_camel_case_fields() {
    let record = KeyRecord::new(Timestamp::from_millis(10), 1, "admin");
    let json: serde_json::Value = serde_json::to_value(&record).unwrap();
    assert_eq!(json["createdAt"], 10);
    assert_eq!(json["expiresAt"], 10 + MILLIS_PER_HOUR);
    assert!(json["boundDevice"].is_null());
    assert_eq!(json["useCount"], 0);
    assert_eq!(json["createdBy"], "admin");
    assert!(json.get("firstUsedAt").is_none());
}

#[test]
fn record_reads_bound_layout() {
    let json = r#"{
        "createdAt": 1000,
        "expiresAt": 2000,
        "boundDevice": "hwid-1",
        "useCount": 1,
        "createdBy": "lootlabs",
        "firstUsedAt": 1500
    }"#;
    let record: KeyRecord = serde_json::from_str(json).unwrap();
    assert_eq!(record.bound_device, DeviceId::parse("hwid-1"));
    assert_eq!(record.first_used_at, Some(Timestamp::from_millis(1500)));
}

#[test]
fn key_flattens_record() {
    let key = Key {
        code: KeyCode::new("KEY-AAAA-BBBB-CCCC"),
        record: KeyRecord::new(Timestamp::from_millis(0), 2, "t"),
    };
    let json = serde_json::to_value(&key).unwrap();
    assert_eq!(json["code"], "KEY-AAAA-BBBB-CCCC");
    assert_eq!(json["expiresAt"], 2 * MILLIS_PER_HOUR);
}
