use std::{env, fs};

use regauth_auth::config::PolicyKind;
use regauth_auth::{KeyIdFormat, SigningAlgorithm};
use regauth_server::config::loader::load_config;

#[test]
fn config_parsing_and_env_overrides_and_validation() {
    // Create a temporary TOML configuration file
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("regauth.toml");

    let toml_content = r#"
[server]
host = "127.0.0.1"
port = 4445

[logging]
level = "debug"

[auth]
registry_domain = "registry.example.com"
issuer_domain = "auth.example.com"
token_duration_secs = 600

[auth.signing]
algorithm = "ES256"
private_key_path = "certs/server.key"
key_id_format = "thumbprint"

[auth.store]
backend = "memory"
accounts = ["alice:secret1", "bob:secret2"]

[auth.policy]
kind = "acl"

[[auth.policy.rules]]
account = "alice"
type = "repository"
name = "alice/*"
actions = ["pull", "push"]
"#;
    fs::write(&path, toml_content).expect("write toml");

    // 1) Valid config parses
    let cfg = load_config(path.to_str()).expect("should parse config");
    assert_eq!(cfg.server.port, 4445);
    assert_eq!(cfg.logging.level, "debug");
    assert_eq!(cfg.auth.registry_domain, "registry.example.com");
    assert_eq!(cfg.auth.token_duration_secs, 600);
    assert_eq!(cfg.auth.signing.algorithm().unwrap(), SigningAlgorithm::ES256);
    assert_eq!(cfg.auth.signing.key_id_format, KeyIdFormat::Thumbprint);
    assert_eq!(cfg.auth.store.accounts.len(), 2);
    assert_eq!(cfg.auth.policy.kind, PolicyKind::Acl);
    assert_eq!(cfg.auth.policy.rules[0].name, "alice/*");

    // 2) Env overrides win over the file; accounts may be space-separated
    unsafe {
        env::set_var("REGAUTH__AUTH__TOKEN_DURATION_SECS", "120");
        env::set_var("REGAUTH__AUTH__STORE__ACCOUNTS", "carol:s1 dave:s2 erin:s3");
    }
    let cfg_env = load_config(path.to_str()).expect("should parse config with env overrides");
    assert_eq!(cfg_env.auth.token_duration_secs, 120);
    assert_eq!(
        cfg_env.auth.store.accounts,
        vec!["carol:s1", "dave:s2", "erin:s3"]
    );
    // cleanup env vars
    unsafe {
        env::remove_var("REGAUTH__AUTH__TOKEN_DURATION_SECS");
        env::remove_var("REGAUTH__AUTH__STORE__ACCOUNTS");
    }

    // 3) Invalid values fail validation
    let bad_path = dir.path().join("bad.toml");
    fs::write(
        &bad_path,
        r#"
[auth]
token_duration_secs = 0

[auth.signing]
private_key_path = "certs/server.key"
"#,
    )
    .expect("write bad toml");
    let err = load_config(bad_path.to_str()).unwrap_err();
    assert!(err.contains("token_duration_secs"));

    // 4) Unknown store backend fails deserialization
    let unknown_backend = dir.path().join("backend.toml");
    fs::write(
        &unknown_backend,
        r#"
[auth.signing]
private_key_path = "certs/server.key"

[auth.store]
backend = "redis"
"#,
    )
    .expect("write backend toml");
    assert!(load_config(unknown_backend.to_str()).is_err());
}
