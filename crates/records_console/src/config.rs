use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use console_logging::{console_info, console_warn};
use records_engine::report::{Letterhead, ReportColumn, ReportTemplate};
use records_engine::{Collision, LogoSource, ServiceSettings};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILENAME: &str = "records_console.ron";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LetterheadConfig {
    pub organization: String,
    pub address_lines: Vec<String>,
    pub contact_lines: Vec<String>,
}

impl Default for LetterheadConfig {
    fn default() -> Self {
        let letterhead = Letterhead::default();
        Self {
            organization: letterhead.organization,
            address_lines: letterhead.address_lines,
            contact_lines: letterhead.contact_lines,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub title: String,
    pub field: String,
    #[serde(default)]
    pub date: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub title: String,
    pub file_name: String,
    pub columns: Vec<ColumnConfig>,
    /// Local path or http(s) URL of the letterhead logo.
    pub logo: Option<String>,
    pub letterhead: LetterheadConfig,
    /// Keep earlier reports of the same name instead of replacing them.
    pub keep_existing: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        let template = ReportTemplate::maintenance();
        Self {
            title: template.title,
            file_name: template.file_name,
            columns: template
                .columns
                .into_iter()
                .map(|column| ColumnConfig {
                    date: column.format == records_engine::report::ColumnFormat::Date,
                    title: column.title,
                    field: column.field,
                })
                .collect(),
            logo: Some("assets/logo.png".to_string()),
            letterhead: LetterheadConfig::default(),
            keep_existing: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub base_url: String,
    pub resource: String,
    /// Lower-case noun used in notices, e.g. "maintenance record".
    pub record_label: String,
    pub chart_title: String,
    pub output_dir: PathBuf,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub report: ReportConfig,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        let settings = ServiceSettings::default();
        Self {
            base_url: settings.base_url,
            resource: "maintenance".to_string(),
            record_label: "maintenance record".to_string(),
            chart_title: "Maintenance Status".to_string(),
            output_dir: PathBuf::from("output"),
            connect_timeout_secs: settings.connect_timeout.as_secs(),
            request_timeout_secs: settings.request_timeout.as_secs(),
            report: ReportConfig::default(),
        }
    }
}

impl ConsoleConfig {
    pub fn service_settings(&self) -> ServiceSettings {
        ServiceSettings {
            base_url: self.base_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            ..ServiceSettings::default()
        }
    }

    pub fn template(&self) -> ReportTemplate {
        let report = &self.report;
        ReportTemplate {
            letterhead: Letterhead {
                organization: report.letterhead.organization.clone(),
                address_lines: report.letterhead.address_lines.clone(),
                contact_lines: report.letterhead.contact_lines.clone(),
            },
            title: report.title.clone(),
            columns: report
                .columns
                .iter()
                .map(|column| {
                    if column.date {
                        ReportColumn::date(&column.title, &column.field)
                    } else {
                        ReportColumn::text(&column.title, &column.field)
                    }
                })
                .collect(),
            file_name: report.file_name.clone(),
        }
    }

    pub fn logo_source(&self) -> Option<LogoSource> {
        self.report
            .logo
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(LogoSource::parse)
    }

    pub fn collision(&self) -> Collision {
        if self.report.keep_existing {
            Collision::KeepBoth
        } else {
            Collision::Replace
        }
    }
}

/// Reads the RON config at `path`. A missing or unreadable file yields the
/// defaults; problems other than absence are logged.
pub fn load_config(path: &Path) -> ConsoleConfig {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return ConsoleConfig::default();
        }
        Err(err) => {
            console_warn!("Failed to read config from {:?}: {}", path, err);
            return ConsoleConfig::default();
        }
    };

    match ron::from_str(&content) {
        Ok(config) => {
            console_info!("Loaded config from {:?}", path);
            config
        }
        Err(err) => {
            console_warn!("Failed to parse config from {:?}: {}", path, err);
            ConsoleConfig::default()
        }
    }
}

pub fn render_config(config: &ConsoleConfig) -> Result<String, ron::Error> {
    ron::ser::to_string_pretty(config, ron::ser::PrettyConfig::new())
}
