//! # CLI Layer
//!
//! The only place that knows about stdin/stdout, logging setup and exit
//! codes. It:
//!
//! 1. Parses arguments via clap
//! 2. Loads process settings and installs the `tracing` subscriber
//! 3. Opens the store and wraps it in the API facade
//! 4. Dispatches the command and renders the `CmdResult`

use super::render;
use super::setup::{Cli, Commands, ConfigCommands, KeyCommands};
use clap::Parser;
use std::io::{IsTerminal, Read};
use tracing_subscriber::EnvFilter;
use txtapp::api::{CmdResult, TxtApi};
use txtapp::error::{Result, TxtError};
use txtapp::model::{Bucket, ConfigForm};
use txtapp::settings::TxtSettings;
use txtapp::store::TxtStore;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let settings = TxtSettings::load()?;
    init_tracing(cli.verbose, &settings);

    let dir = settings.db_dir(cli.db.as_deref());
    tracing::debug!(dir = %dir.display(), "using data directory");
    let store = TxtStore::open_in(&dir)?;
    let offset = store.config().time_offset.clone();
    let mut api = TxtApi::new(store);

    let command = cli.command.unwrap_or(Commands::List {
        bucket: Bucket::Temporary,
        after: None,
        from: None,
        limit: 0,
    });
    let view = matches!(command, Commands::View { .. });
    let result = dispatch(&mut api, command)?;

    if cli.json {
        render::print_json(&result)
    } else {
        render::print_result(&result, &offset, view);
        Ok(())
    }
}

/// `RUST_LOG` wins, then the `log_filter` setting. `-v` forces debug.
fn init_tracing(verbose: bool, settings: &TxtSettings) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_filter))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn dispatch(api: &mut TxtApi, command: Commands) -> Result<CmdResult> {
    match command {
        Commands::Add { words } => {
            let text = if words.is_empty() {
                read_stdin()?
            } else {
                words.join(" ")
            };
            api.add(&text)
        }
        Commands::List {
            bucket,
            after,
            from,
            limit,
        } => match from {
            Some(token) => {
                let (cat, index) = parse_from(&token)?;
                api.list_from(cat, index, limit)
            }
            None => api.list(bucket, after.as_deref().unwrap_or(""), limit),
        },
        Commands::Recent { limit } => api.recent(limit),
        Commands::View { token } => api.view(&token),
        Commands::Delete { token } => api.delete(&token),
        Commands::Toggle { token } => api.toggle(&token),
        Commands::Alias {
            token,
            alias,
            remove,
        } => {
            let alias = if remove { String::new() } else { alias.unwrap_or_default() };
            api.set_alias(&token, &alias)
        }
        Commands::Edit { token, msg, alias } => api.edit(&token, alias.as_deref(), msg.as_deref()),
        Commands::Search { keyword, buckets } => api.search(&keyword, &buckets),
        Commands::Aliases => api.aliases(),
        Commands::Count { bucket } => api.count(bucket),
        Commands::Config { action } => match action {
            None | Some(ConfigCommands::Show) => Ok(api.config()),
            Some(ConfigCommands::Set { key, value }) => {
                let form = set_config_value(api.store().config().to_form(), &key, &value)?;
                api.update_config(&form)
            }
        },
        Commands::Key { action } => match action {
            KeyCommands::Show { password } => api.key_status(&password),
            KeyCommands::New { password } => api.new_key(&password),
            KeyCommands::Check { key } => api.check_key(&key),
        },
        Commands::Password { current, new } => api.change_password(&current, &new),
    }
}

fn read_stdin() -> Result<String> {
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Err(TxtError::EmptyMessage);
    }
    let mut text = String::new();
    stdin.lock().read_to_string(&mut text)?;
    Ok(text.trim_end_matches(['\n', '\r']).to_string())
}

/// `T20` for `--from`: the category and the starting index.
fn parse_from(token: &str) -> Result<(txtapp::model::Category, usize)> {
    let idx: txtapp::index::ShortIndex = token
        .parse()
        .map_err(|_| TxtError::NotFound(token.to_string()))?;
    Ok((idx.cat, idx.rank))
}

fn set_config_value(mut form: ConfigForm, key: &str, value: &str) -> Result<ConfigForm> {
    fn number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
        value
            .trim()
            .parse()
            .map_err(|_| TxtError::InvalidConfig(format!("{} expects a number, got \"{}\"", key, value)))
    }

    match key {
        "key-max-age" => form.key_max_age_days = number(key, value)?,
        "msg-size-limit" => form.msg_size_limit = number(key, value)?,
        "temp-limit" => form.temp_limit = number(key, value)?,
        "page-limit" => form.every_page_limit = number(key, value)?,
        "time-offset" => form.time_offset = value.to_string(),
        other => {
            return Err(TxtError::InvalidConfig(format!(
                "unknown setting \"{}\" (expected key-max-age, msg-size-limit, temp-limit, page-limit or time-offset)",
                other
            )))
        }
    }
    Ok(form)
}
