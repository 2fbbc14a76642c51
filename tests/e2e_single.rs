mod support_single;

use std::fs;

use tempfile::tempdir;

use support_single::{closed_port_url, expect_success, run_loadphase, spawn_http_server};

fn require_line(stdout: &str, line: &str) -> Result<(), String> {
    if stdout.lines().any(|candidate| candidate.trim_end() == line) {
        Ok(())
    } else {
        Err(format!("Missing '{}' in output:\n{}", line, stdout))
    }
}

#[test]
fn e2e_single_cli_basic() -> Result<(), String> {
    let (url, _server) = spawn_http_server(200)?;

    let output = run_loadphase(["-u", url.as_str(), "-n", "20", "-c", "4", "--no-progress"])?;
    let stdout = expect_success(&output)?;

    require_line(&stdout, "Total Requests: 20")?;
    require_line(&stdout, "Failed Requests: 0")?;
    require_line(&stdout, "  200: 20")?;
    Ok(())
}

#[test]
fn e2e_single_json_export() -> Result<(), String> {
    let (url, _server) = spawn_http_server(200)?;
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let output_base = dir.path().join("result");
    let output_arg = output_base.to_string_lossy().into_owned();

    let output = run_loadphase([
        "-u",
        url.as_str(),
        "-n",
        "12",
        "-c",
        "3",
        "--no-progress",
        "--json",
        "-o",
        output_arg.as_str(),
    ])?;
    expect_success(&output)?;

    let path = dir.path().join("result.json");
    let content = fs::read_to_string(&path).map_err(|err| format!("read export failed: {}", err))?;
    let value: serde_json::Value =
        serde_json::from_str(&content).map_err(|err| format!("parse export failed: {}", err))?;
    let summary = value
        .get("result")
        .and_then(|result| result.get("summary_metrics"))
        .ok_or_else(|| format!("Missing summary_metrics: {}", content))?;

    if summary.get("total_requests").and_then(serde_json::Value::as_u64) != Some(12) {
        return Err(format!("Unexpected total: {}", summary));
    }
    if summary.get("error_percentage").and_then(serde_json::Value::as_f64) != Some(0.0) {
        return Err(format!("Unexpected error rate: {}", summary));
    }
    let ok_count = summary
        .get("status_codes")
        .and_then(|codes| codes.get("200"))
        .and_then(serde_json::Value::as_u64);
    if ok_count != Some(12) {
        return Err(format!("Unexpected status codes: {}", summary));
    }
    let snapshots = value
        .get("result")
        .and_then(|result| result.get("aggregate_metrics"))
        .and_then(serde_json::Value::as_object)
        .ok_or_else(|| "Missing aggregate_metrics".to_owned())?;
    if snapshots.is_empty() {
        return Err("Expected at least one snapshot".to_owned());
    }
    Ok(())
}

#[test]
fn e2e_single_server_errors_count_as_failed() -> Result<(), String> {
    let (url, _server) = spawn_http_server(500)?;

    let output = run_loadphase(["-u", url.as_str(), "-n", "10", "-c", "2", "--no-progress"])?;
    let stdout = expect_success(&output)?;

    require_line(&stdout, "Failed Requests: 10")?;
    require_line(&stdout, "Error Rate: 100.00%")?;
    require_line(&stdout, "  500: 10")?;
    Ok(())
}

#[test]
fn e2e_single_refused_connections_complete() -> Result<(), String> {
    let url = closed_port_url()?;

    let output = run_loadphase(["-u", url.as_str(), "-n", "3", "-r", "1", "--no-progress"])?;
    let stdout = expect_success(&output)?;

    require_line(&stdout, "Total Requests: 3")?;
    require_line(&stdout, "Failed Requests: 3")?;
    if stdout.contains("Status Codes:") {
        return Err(format!("Refused requests should have no status:\n{}", stdout));
    }
    Ok(())
}

#[test]
fn e2e_single_config_file() -> Result<(), String> {
    let (url, _server) = spawn_http_server(200)?;
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let config_path = dir.path().join("loadphase.toml");
    let content = format!(
        "url = \"{}\"\nrequests = 7\nconcurrency = 2\nno_progress = true\n",
        url
    );
    fs::write(&config_path, content).map_err(|err| format!("write config failed: {}", err))?;
    let config_arg = config_path.to_string_lossy().into_owned();

    let output = run_loadphase(["--config", config_arg.as_str(), "-n", "5"])?;
    let stdout = expect_success(&output)?;

    require_line(&stdout, "Total Requests: 5")?;
    Ok(())
}

#[test]
fn e2e_single_missing_url_fails() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let bin_output = std::process::Command::new(
        option_env!("CARGO_BIN_EXE_loadphase").ok_or_else(|| "binary path missing".to_owned())?,
    )
    .args(["-n", "3", "--no-progress"])
    .current_dir(dir.path())
    .env("LOADPHASE_LOG", "error")
    .output()
    .map_err(|err| format!("run loadphase failed: {}", err))?;

    if bin_output.status.success() {
        return Err("Expected failure without a URL".to_owned());
    }
    Ok(())
}
