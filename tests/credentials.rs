use search_console_mcp::services::credentials::{CredentialResolver, CredentialSource};
use search_console_mcp::services::logger::Logger;
use std::path::{Path, PathBuf};

mod common;
use common::ENV_LOCK;

const ENV_FILE: &str = "GOOGLE_SERVICE_ACCOUNT_FILE";
const ENV_JSON: &str = "GOOGLE_SERVICE_ACCOUNT_JSON";

fn tmp_dir(prefix: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("{}-{}", prefix, uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn write(path: &Path, contents: &str) {
    std::fs::write(path, contents).expect("write file");
}

fn clear_env() {
    std::env::remove_var(ENV_FILE);
    std::env::remove_var(ENV_JSON);
}

fn resolver(dir: &Path) -> CredentialResolver {
    CredentialResolver::new(Logger::new("test")).with_dot_env_path(dir.join(".env"))
}

#[tokio::test]
async fn cli_flag_wins_over_environment() {
    let _guard = ENV_LOCK.lock().await;
    clear_env();
    let dir = tmp_dir("gsc-creds-cli");
    let cli = dir.join("cli.json");
    let env_file = dir.join("env.json");
    write(&cli, r#"{"from":"cli"}"#);
    write(&env_file, r#"{"from":"env-file"}"#);
    std::env::set_var(ENV_FILE, env_file.to_string_lossy().as_ref());
    std::env::set_var(ENV_JSON, r#"{"from":"env-json"}"#);

    let creds = resolver(&dir).resolve(Some(&cli)).expect("credentials");
    assert_eq!(creds.source, CredentialSource::CliFlag);
    assert_eq!(creds.service_account_json, br#"{"from":"cli"}"#.to_vec());
    clear_env();
}

#[tokio::test]
async fn env_file_wins_over_inline_json() {
    let _guard = ENV_LOCK.lock().await;
    clear_env();
    let dir = tmp_dir("gsc-creds-envfile");
    let env_file = dir.join("env.json");
    write(&env_file, r#"{"from":"env-file"}"#);
    std::env::set_var(ENV_FILE, env_file.to_string_lossy().as_ref());
    std::env::set_var(ENV_JSON, r#"{"from":"env-json"}"#);

    let creds = resolver(&dir).resolve(None).expect("credentials");
    assert_eq!(creds.source, CredentialSource::EnvFile);
    clear_env();
}

#[tokio::test]
async fn unreadable_cli_file_falls_through_to_next_source() {
    let _guard = ENV_LOCK.lock().await;
    clear_env();
    let dir = tmp_dir("gsc-creds-missing");
    std::env::set_var(ENV_JSON, r#"{"from":"env-json"}"#);

    let creds = resolver(&dir)
        .resolve(Some(&dir.join("does-not-exist.json")))
        .expect("credentials");
    assert_eq!(creds.source, CredentialSource::EnvJson);
    assert_eq!(creds.service_account_json, br#"{"from":"env-json"}"#.to_vec());
    clear_env();
}

#[tokio::test]
async fn dot_env_is_the_last_resort() {
    let _guard = ENV_LOCK.lock().await;
    clear_env();
    let dir = tmp_dir("gsc-creds-dotenv");
    let key_file = dir.join("key.json");
    write(&key_file, r#"{"from":"dotenv-file"}"#);
    write(
        &dir.join(".env"),
        &format!("OTHER=1\n{}=\"{}\"\n", ENV_FILE, key_file.display()),
    );

    let creds = resolver(&dir).resolve(None).expect("credentials");
    assert_eq!(creds.source, CredentialSource::DotEnv);
    assert_eq!(creds.service_account_json, br#"{"from":"dotenv-file"}"#.to_vec());
}

#[tokio::test]
async fn dot_env_inline_json_is_used_when_file_key_is_absent() {
    let _guard = ENV_LOCK.lock().await;
    clear_env();
    let dir = tmp_dir("gsc-creds-dotenv-json");
    write(&dir.join(".env"), &format!("{}='{{\"from\":\"dotenv\"}}'\n", ENV_JSON));

    let creds = resolver(&dir).resolve(None).expect("credentials");
    assert_eq!(creds.source, CredentialSource::DotEnv);
    assert_eq!(creds.service_account_json, br#"{"from":"dotenv"}"#.to_vec());
}

#[tokio::test]
async fn nothing_configured_yields_none() {
    let _guard = ENV_LOCK.lock().await;
    clear_env();
    let dir = tmp_dir("gsc-creds-none");
    assert!(resolver(&dir).resolve(None).is_none());
}

#[tokio::test]
async fn blank_environment_values_are_ignored() {
    let _guard = ENV_LOCK.lock().await;
    clear_env();
    std::env::set_var(ENV_FILE, "  ");
    std::env::set_var(ENV_JSON, "");
    let dir = tmp_dir("gsc-creds-blank");
    assert!(resolver(&dir).resolve(None).is_none());
    clear_env();
}

#[tokio::test]
async fn dot_env_accepts_unquoted_json_with_spaces() {
    let _guard = ENV_LOCK.lock().await;
    clear_env();
    let dir = tmp_dir("gsc-creds-dotenv-raw");
    let json = r#"{"type": "service_account", "client_email": "a@b.c"}"#;
    write(&dir.join(".env"), &format!("# local dev\nOTHER=1\n{}={}\n", ENV_JSON, json));

    let creds = resolver(&dir).resolve(None).expect("credentials");
    assert_eq!(creds.source, CredentialSource::DotEnv);
    assert_eq!(creds.service_account_json, json.as_bytes().to_vec());
}
