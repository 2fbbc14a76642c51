use std::ffi::OsString;
use std::path::Path;
use std::time::Duration;

use clap::{ArgMatches, CommandFactory, FromArgMatches};

use crate::app::run_local;
use crate::args::{TesterArgs, validate_target_url};
use crate::config::{DEFAULT_CONFIG_FILES, apply_config, load_config};
use crate::error::{AppError, AppResult, ValidationError};
use crate::http::{LoadConfig, RequestSpec};

pub(crate) fn run() -> AppResult<()> {
    let Some((mut args, matches)) = parse_args()? else {
        return Ok(());
    };

    apply_config_file(&mut args, &matches)?;
    crate::logger::init_logging(args.verbose);

    let config = build_load_config(&args)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_local(&args, &config))
}

fn parse_args() -> AppResult<Option<(TesterArgs, ArgMatches)>> {
    let mut cmd = TesterArgs::command();
    let raw_args: Vec<OsString> = std::env::args_os().collect();

    if should_show_help(&raw_args) {
        cmd.print_help()?;
        println!();
        return Ok(None);
    }

    let matches = cmd.get_matches_from(raw_args);
    let args = TesterArgs::from_arg_matches(&matches)?;
    Ok(Some((args, matches)))
}

fn should_show_help(raw_args: &[OsString]) -> bool {
    let treat_as_empty =
        matches!(raw_args, [] | [_]) || matches!(raw_args, [_, second] if second == "--");
    if !treat_as_empty {
        return false;
    }

    !DEFAULT_CONFIG_FILES
        .iter()
        .any(|path| Path::new(path).exists())
}

fn apply_config_file(args: &mut TesterArgs, matches: &ArgMatches) -> AppResult<()> {
    if let Some(config) = load_config(args.config.as_deref())? {
        apply_config(args, matches, &config)?;
    }
    Ok(())
}

/// Validates the merged arguments and turns them into a run description.
pub(crate) fn build_load_config(args: &TesterArgs) -> AppResult<LoadConfig> {
    let url = args
        .url
        .as_deref()
        .ok_or_else(|| AppError::validation(ValidationError::MissingUrl))?;
    validate_target_url(url)?;

    let timeout = (args.timeout_secs > 0).then(|| Duration::from_secs(args.timeout_secs));

    Ok(LoadConfig {
        request: RequestSpec {
            method: args.method,
            url: url.to_owned(),
            headers: args.headers.clone(),
            body: args.data.clone(),
        },
        concurrency: args.concurrency,
        total_requests: args.requests,
        timeout,
        max_retries: args.max_retries,
        keep_alive_disabled: args.disable_keepalive,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &[&str]) -> Result<TesterArgs, String> {
        let matches = TesterArgs::command()
            .try_get_matches_from(raw)
            .map_err(|err| format!("parse failed: {}", err))?;
        TesterArgs::from_arg_matches(&matches).map_err(|err| format!("args failed: {}", err))
    }

    #[test]
    fn builds_load_config_from_args() -> Result<(), String> {
        let args = parse(&[
            "loadphase",
            "-u",
            "http://localhost:8080/api",
            "-X",
            "post",
            "-H",
            "X-One: 1",
            "-H",
            "X-One: 2",
            "-d",
            "payload",
            "-c",
            "4",
            "-n",
            "40",
            "--disable-keepalive",
        ])?;
        let config = build_load_config(&args).map_err(|err| err.to_string())?;

        if config.request.url != "http://localhost:8080/api" || config.request.body != "payload" {
            return Err(format!("Unexpected request: {:?}", config.request));
        }
        if config.request.headers.len() != 2 {
            return Err("Repeated headers should be kept".to_owned());
        }
        if config.concurrency.get() != 4 || config.total_requests.get() != 40 {
            return Err("Unexpected counts".to_owned());
        }
        if config.timeout != Some(Duration::from_secs(5)) || config.max_retries != 3 {
            return Err("Unexpected defaults".to_owned());
        }
        if !config.keep_alive_disabled {
            return Err("Expected keep-alive disabled".to_owned());
        }
        Ok(())
    }

    #[test]
    fn zero_timeout_disables_deadline() -> Result<(), String> {
        let args = parse(&["loadphase", "-u", "http://localhost", "-T", "0"])?;
        let config = build_load_config(&args).map_err(|err| err.to_string())?;
        if config.timeout.is_some() {
            return Err("Expected no timeout".to_owned());
        }
        Ok(())
    }

    #[test]
    fn missing_url_is_rejected() -> Result<(), String> {
        let args = parse(&["loadphase", "-n", "3"])?;
        match build_load_config(&args) {
            Err(AppError::Validation(ValidationError::MissingUrl)) => Ok(()),
            Err(err) => Err(format!("Unexpected error: {}", err)),
            Ok(_) => Err("Expected missing URL error".to_owned()),
        }
    }

    #[test]
    fn url_without_host_is_rejected() -> Result<(), String> {
        let args = parse(&["loadphase", "-u", "localhost:8080"])?;
        if build_load_config(&args).is_ok() {
            return Err("Expected invalid URL error".to_owned());
        }
        Ok(())
    }
}
