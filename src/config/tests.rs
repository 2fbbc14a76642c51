use super::{apply_config, load_config_file, types::ConfigFile};
use clap::{CommandFactory, FromArgMatches};
use tempfile::tempdir;

use crate::args::{HttpMethod, TesterArgs};

fn parse_cli(raw: &[&str]) -> Result<(TesterArgs, clap::ArgMatches), String> {
    let matches = TesterArgs::command()
        .try_get_matches_from(raw)
        .map_err(|err| format!("parse failed: {}", err))?;
    let args =
        TesterArgs::from_arg_matches(&matches).map_err(|err| format!("args failed: {}", err))?;
    Ok((args, matches))
}

#[test]
fn parse_toml_config() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("loadphase.toml");
    let content = r#"
url = "http://localhost:3000/health"
method = "post"
headers = ["Content-Type: application/json", "X-Trace: 1"]
data = "{}"
concurrency = 8
requests = 400
timeout = 0
max_retries = 2
disable_keepalive = true
"#;
    std::fs::write(&path, content).map_err(|err| format!("write failed: {}", err))?;

    let config = load_config_file(&path).map_err(|err| err.to_string())?;
    if config.url.as_deref() != Some("http://localhost:3000/health") {
        return Err("Unexpected url".to_owned());
    }
    if config.method != Some(HttpMethod::Post) {
        return Err("Unexpected method".to_owned());
    }
    if config.concurrency != Some(8) || config.requests != Some(400) {
        return Err("Unexpected concurrency or requests".to_owned());
    }
    if config.timeout != Some(0) || config.max_retries != Some(2) {
        return Err("Unexpected timeout or retries".to_owned());
    }
    if config.disable_keepalive != Some(true) {
        return Err("Expected keep-alive disabled".to_owned());
    }
    Ok(())
}

#[test]
fn parse_json_config() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("loadphase.json");
    let content = r#"{"url": "https://example.com", "requests": 10, "json": true, "output": "out"}"#;
    std::fs::write(&path, content).map_err(|err| format!("write failed: {}", err))?;

    let config = load_config_file(&path).map_err(|err| err.to_string())?;
    if config.url.as_deref() != Some("https://example.com") || config.requests != Some(10) {
        return Err("Unexpected JSON config values".to_owned());
    }
    if config.json != Some(true) || config.output.as_deref() != Some("out") {
        return Err("Unexpected export settings".to_owned());
    }
    Ok(())
}

#[test]
fn rejects_unknown_extension() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("loadphase.yaml");
    std::fs::write(&path, "url: x").map_err(|err| format!("write failed: {}", err))?;

    match load_config_file(&path) {
        Err(err) if err.to_string().contains("Unsupported config extension") => Ok(()),
        Err(err) => Err(format!("Unexpected error: {}", err)),
        Ok(_) => Err("Expected an error".to_owned()),
    }
}

#[test]
fn rejects_unknown_fields() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("loadphase.toml");
    std::fs::write(&path, "rate = 10\n").map_err(|err| format!("write failed: {}", err))?;

    if load_config_file(&path).is_ok() {
        return Err("Expected unknown field to be rejected".to_owned());
    }
    Ok(())
}

#[test]
fn config_fills_values_missing_from_cli() -> Result<(), String> {
    let (mut args, matches) = parse_cli(&["loadphase"])?;
    let config = ConfigFile {
        url: Some("http://localhost:8080".to_owned()),
        headers: Some(vec!["Accept: text/plain".to_owned()]),
        concurrency: Some(3),
        requests: Some(30),
        timeout: Some(10),
        max_retries: Some(1),
        no_progress: Some(true),
        ..ConfigFile::default()
    };

    apply_config(&mut args, &matches, &config).map_err(|err| err.to_string())?;

    if args.url.as_deref() != Some("http://localhost:8080") {
        return Err("Expected url from config".to_owned());
    }
    if args.headers != vec![("Accept".to_owned(), "text/plain".to_owned())] {
        return Err(format!("Unexpected headers: {:?}", args.headers));
    }
    if args.concurrency.get() != 3 || args.requests.get() != 30 {
        return Err("Expected counts from config".to_owned());
    }
    if args.timeout_secs != 10 || args.max_retries != 1 || !args.no_progress {
        return Err("Expected run options from config".to_owned());
    }
    Ok(())
}

#[test]
fn cli_values_take_precedence() -> Result<(), String> {
    let (mut args, matches) = parse_cli(&[
        "loadphase",
        "--url",
        "http://cli.local",
        "-c",
        "7",
        "--timeout",
        "2",
    ])?;
    let config = ConfigFile {
        url: Some("http://config.local".to_owned()),
        concurrency: Some(2),
        requests: Some(50),
        timeout: Some(30),
        ..ConfigFile::default()
    };

    apply_config(&mut args, &matches, &config).map_err(|err| err.to_string())?;

    if args.url.as_deref() != Some("http://cli.local") {
        return Err("CLI url should win".to_owned());
    }
    if args.concurrency.get() != 7 || args.timeout_secs != 2 {
        return Err("CLI values should win".to_owned());
    }
    if args.requests.get() != 50 {
        return Err("Config should fill requests".to_owned());
    }
    Ok(())
}

#[test]
fn zero_concurrency_in_config_is_rejected() -> Result<(), String> {
    let (mut args, matches) = parse_cli(&["loadphase"])?;
    let config = ConfigFile {
        concurrency: Some(0),
        ..ConfigFile::default()
    };

    match apply_config(&mut args, &matches, &config) {
        Err(err) if err.to_string().contains("concurrency") => Ok(()),
        Err(err) => Err(format!("Unexpected error: {}", err)),
        Ok(()) => Err("Expected zero concurrency to be rejected".to_owned()),
    }
}

#[test]
fn malformed_config_header_is_rejected() -> Result<(), String> {
    let (mut args, matches) = parse_cli(&["loadphase"])?;
    let config = ConfigFile {
        headers: Some(vec!["no-colon-here".to_owned()]),
        ..ConfigFile::default()
    };

    if apply_config(&mut args, &matches, &config).is_ok() {
        return Err("Expected malformed header to be rejected".to_owned());
    }
    Ok(())
}
