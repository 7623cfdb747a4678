use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use records_core::{Msg, SortDirection, SortSpec, StatusFilter};

use crate::logging::LogDestination;

#[derive(Parser, Debug)]
#[command(
    name = "records_console",
    version,
    about = "Browse, edit and report on plantation maintenance records"
)]
pub struct Cli {
    /// RON configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[arg(long, global = true, value_enum, default_value_t = LogDestination::File)]
    pub log: LogDestination,
    /// Log at debug level.
    #[arg(short, long, global = true)]
    pub verbose: bool,
    /// Overrides the configured resource, e.g. `maintenance`.
    #[arg(long, global = true)]
    pub resource: Option<String>,
    /// Overrides the configured report directory.
    #[arg(long = "output-dir", global = true)]
    pub output_dir: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Print the records matching the query.
    List(QueryArgs),
    /// Print the per-status chart over all records.
    Tally,
    /// Delete one record after confirmation.
    Delete {
        id: String,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Change fields of one record.
    Update {
        id: String,
        #[arg(long = "set", value_name = "FIELD=VALUE", required = true)]
        set: Vec<String>,
    },
    /// Write the records matching the query to a PDF report.
    Export(QueryArgs),
    /// Interactive session (the default).
    Console,
    /// Print the effective configuration as RON.
    Config,
}

#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct QueryArgs {
    /// Case-insensitive text matched against every field.
    #[arg(long)]
    pub search: Option<String>,
    /// `all`, `in progress` or `completed`.
    #[arg(long, value_parser = parse_status_filter)]
    pub status: Option<StatusFilter>,
    /// Field to sort by.
    #[arg(long)]
    pub sort: Option<String>,
    #[arg(long, value_enum, default_value_t = SortOrder::Asc)]
    pub order: SortOrder,
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl QueryArgs {
    /// The query as the messages a user would produce interactively.
    pub fn messages(&self) -> Vec<Msg> {
        let mut msgs = Vec::new();
        if let Some(text) = &self.search {
            msgs.push(Msg::SearchChanged(text.clone()));
        }
        if let Some(status) = self.status {
            msgs.push(Msg::StatusFilterChanged(status));
        }
        if let Some(field) = &self.sort {
            let direction = match self.order {
                SortOrder::Asc => SortDirection::Ascending,
                SortOrder::Desc => SortDirection::Descending,
            };
            msgs.push(Msg::SortRequested(SortSpec::by(field.clone(), direction)));
        }
        msgs
    }
}

fn parse_status_filter(raw: &str) -> Result<StatusFilter, String> {
    StatusFilter::parse(raw)
        .ok_or_else(|| format!("expected all, in progress or completed, got '{raw}'"))
}
