use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use console_logging::console_info;
use log::LevelFilter;
use records_core::{AppState, Msg, NoticeKind, RecordId};
use records_engine::{EngineConfig, EngineHandle};

use crate::cli::{Cli, Command, QueryArgs};
use crate::config::{load_config, render_config, ConsoleConfig, DEFAULT_CONFIG_FILENAME};
use crate::console::{parse_patch, Console};
use crate::effects::{EffectRunner, ExportSettings};
use crate::logging;
use crate::render::{render_chart, render_notice, render_table};
use crate::session::Session;

/// Slack on top of the request timeouts before giving up on the engine.
const SETTLE_MARGIN: Duration = Duration::from_secs(5);

pub fn run(cli: Cli) -> Result<()> {
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    logging::initialize(cli.log, level);

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILENAME));
    let mut config = load_config(&config_path);
    if let Some(resource) = &cli.resource {
        config.resource = resource.clone();
    }
    if let Some(output_dir) = &cli.output_dir {
        config.output_dir = output_dir.clone();
    }

    let command = cli.command.unwrap_or(Command::Console);
    if command == Command::Config {
        println!("{}", render_config(&config)?);
        return Ok(());
    }

    let engine = EngineHandle::new(EngineConfig {
        settings: config.service_settings(),
        resource: config.resource.clone(),
    })
    .context("failed to start the record engine")?;
    let mut session = build_session(&config, engine);
    let settle_timeout = settle_timeout(&config);
    console_info!(
        "records_console started: {} {} ({:?})",
        config.base_url,
        config.resource,
        command
    );

    let mut stdout = io::stdout();
    match command {
        Command::List(query) => {
            load(&mut session, &config, settle_timeout)?;
            apply_query(&mut session, &query);
            print!("{}", render_table(&session.view(), &config.template().columns));
            Ok(())
        }
        Command::Tally => {
            load(&mut session, &config, settle_timeout)?;
            print!("{}", render_chart(&session.view().chart));
            Ok(())
        }
        Command::Delete { id, yes } => {
            load(&mut session, &config, settle_timeout)?;
            let id = RecordId::new(id);
            session.dispatch(Msg::DeleteClicked(id.clone()));
            if session.view().pending_delete.is_none() {
                bail!("no {} with id {}", config.record_label, id);
            }
            let confirmed = yes || confirm(&mut io::stdin().lock(), &mut stdout)?;
            if !confirmed {
                session.dispatch(Msg::DeleteCancelled);
                println!("Delete cancelled.");
                return Ok(());
            }
            session.dispatch(Msg::DeleteConfirmed);
            session.settle(settle_timeout);
            finish(&session)
        }
        Command::Update { id, set } => {
            load(&mut session, &config, settle_timeout)?;
            let patch = parse_patch(&set).map_err(|message| anyhow!(message))?;
            session.dispatch(Msg::UpdateSubmitted {
                id: RecordId::new(id),
                patch,
            });
            session.settle(settle_timeout);
            finish(&session)
        }
        Command::Export(query) => {
            load(&mut session, &config, settle_timeout)?;
            apply_query(&mut session, &query);
            session.dispatch(Msg::ExportClicked);
            session.settle_all(settle_timeout);
            finish(&session)
        }
        Command::Console => {
            let mut console = Console::new(&mut session, config.template().columns, settle_timeout);
            console.run(io::stdin().lock(), &mut stdout)?;
            Ok(())
        }
        Command::Config => Ok(()),
    }
}

pub fn build_session(config: &ConsoleConfig, engine: EngineHandle) -> Session {
    let state = AppState::with_labels(config.record_label.clone(), config.chart_title.clone());
    let runner = EffectRunner::new(
        engine,
        ExportSettings {
            template: config.template(),
            logo: config.logo_source(),
            output_dir: config.output_dir.clone(),
            collision: config.collision(),
        },
    );
    Session::new(state, runner)
}

fn settle_timeout(config: &ConsoleConfig) -> Duration {
    Duration::from_secs(config.connect_timeout_secs + config.request_timeout_secs) + SETTLE_MARGIN
}

fn load(session: &mut Session, config: &ConsoleConfig, timeout: Duration) -> Result<()> {
    session.dispatch(Msg::RefreshRequested);
    session.settle(timeout);
    if !session.state().store().is_loaded() {
        bail!(
            "could not load {} records from {}",
            config.resource,
            config.base_url
        );
    }
    Ok(())
}

fn apply_query(session: &mut Session, query: &QueryArgs) {
    for msg in query.messages() {
        session.dispatch(msg);
    }
}

/// Prints the outcome notice; an error notice becomes the command's error.
fn finish(session: &Session) -> Result<()> {
    match session.view().notice {
        Some(notice) if notice.kind == NoticeKind::Error => Err(anyhow!(notice.text)),
        Some(notice) => {
            println!("{}", render_notice(&notice));
            Ok(())
        }
        None => bail!("no response from the record service"),
    }
}

fn confirm<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<bool> {
    write!(output, "Are you sure you want to delete this record? [y/N] ")?;
    output.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}
