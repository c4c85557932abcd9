/// Quota rules loaded from TOML resolve with the same precedence as rules
/// built in code: user → group → group default → user default → denied.
use mediakey_core::{defaults::BYTES_PER_MB, resolve_quota, EngineConfig, Identity, QuotaSource};

const CONFIG: &str = r#"
[mediakey]
collection_root = "/srv/collections"
holding_root = "/srv/holding"

[[mediakey.quota.users]]
id = "u1"
size_limit_mb = 5

[[mediakey.quota.users]]
id = "banned"
size_limit_mb = 0

[[mediakey.quota.users]]
id = "default"
size_limit_mb = "not a number"

[[mediakey.quota.groups]]
id = "default"
size_limit_mb = 2

[[mediakey.quota.groups]]
id = "g-big"
size_limit_mb = 1.5
"#;

fn config() -> EngineConfig {
    EngineConfig::from_toml_str(CONFIG).expect("valid config")
}

#[test]
fn test_user_rule_wins_over_group_default() {
    let decision = resolve_quota(&config().quota, &Identity::user("u1").in_group("g1"));
    assert_eq!(decision.limit_bytes, 5 * BYTES_PER_MB);
    assert_eq!(decision.source, QuotaSource::User);
}

#[test]
fn test_group_default_for_unlisted_user_and_group() {
    let decision = resolve_quota(&config().quota, &Identity::user("u2").in_group("g1"));
    assert_eq!(decision.limit_bytes, 2 * BYTES_PER_MB);
    assert_eq!(decision.source, QuotaSource::GroupDefault);
}

#[test]
fn test_fractional_group_limit() {
    let decision = resolve_quota(&config().quota, &Identity::user("u2").in_group("g-big"));
    assert_eq!(decision.limit_bytes, BYTES_PER_MB + BYTES_PER_MB / 2);
    assert_eq!(decision.source, QuotaSource::Group);
}

#[test]
fn test_explicit_zero_denies_even_in_group() {
    let decision = resolve_quota(&config().quota, &Identity::user("banned").in_group("g-big"));
    assert!(decision.is_denied());
    assert_eq!(decision.source, QuotaSource::User);
}

#[test]
fn test_non_numeric_user_default_denies_outside_groups() {
    // No group, so the group table is skipped and the user default coerces to 0
    let decision = resolve_quota(&config().quota, &Identity::user("u3"));
    assert!(decision.is_denied());
    assert_eq!(decision.source, QuotaSource::UserDefault);
}
