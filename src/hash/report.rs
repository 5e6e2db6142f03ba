// Report module
// Renders per-file statuses as text lines or JSON

use colored::Colorize;

use super::reconcile::{FileStatus, Status};

/// Output format of the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// Rendering options
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportStyle {
    pub legacy_collision_label: bool,
    pub color: bool,
}

impl FileStatus {
    /// `<name> <algorithm> <HEX> <STATUS>`
    pub fn line(&self, legacy_collision_label: bool) -> String {
        format!(
            "{} {} {} {}",
            self.name,
            self.algorithm,
            self.digest_hex,
            self.status.label(legacy_collision_label)
        )
    }
}

/// Count of each status in a run
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct Summary {
    pub not_found: usize,
    pub ok: usize,
    pub not_ok: usize,
    pub collision: usize,
}

impl Summary {
    pub fn of(results: &[FileStatus]) -> Self {
        results.iter().fold(Summary::default(), |mut s, r| {
            match r.status {
                Status::NotFound => s.not_found += 1,
                Status::Ok => s.ok += 1,
                Status::NotOk => s.not_ok += 1,
                Status::Collision => s.collision += 1,
            }
            s
        })
    }
}

/// Ledger text around a run, for `--show-ledger`
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct LedgerContent<'a> {
    pub before: &'a str,
    pub after: &'a str,
}

/// Results of a run, ready for display
#[derive(Debug, Clone, serde::Serialize)]
pub struct Report {
    pub results: Vec<FileStatus>,
    pub summary: Summary,
    pub ledger_written: bool,
}

impl Report {
    pub fn new(results: Vec<FileStatus>, ledger_written: bool) -> Self {
        let summary = Summary::of(&results);
        Self {
            results,
            summary,
            ledger_written,
        }
    }

    /// One line per file, each terminated by `\n`
    pub fn to_plain_text(&self, style: ReportStyle) -> String {
        let mut output = String::new();
        for result in &self.results {
            if style.color {
                let label = result.status.label(style.legacy_collision_label);
                let token = match result.status {
                    Status::Ok => label.green(),
                    Status::NotFound => label.cyan(),
                    Status::NotOk => label.red().bold(),
                    Status::Collision => label.yellow().bold(),
                };
                output.push_str(&format!(
                    "{} {} {} {}\n",
                    result.name, result.algorithm, result.digest_hex, token
                ));
            } else {
                output.push_str(&result.line(style.legacy_collision_label));
                output.push('\n');
            }
        }
        output
    }

    /// Format the report as a JSON document
    ///
    /// The `ledger` object is only present when ledger content is given.
    pub fn to_json(
        &self,
        style: ReportStyle,
        ledger: Option<LedgerContent<'_>>,
    ) -> Result<String, serde_json::Error> {
        #[derive(serde::Serialize)]
        struct JsonOutput<'a> {
            metadata: Metadata,
            summary: &'a Summary,
            ledger_written: bool,
            #[serde(skip_serializing_if = "Option::is_none")]
            ledger: Option<LedgerContent<'a>>,
            results: Vec<JsonResult<'a>>,
        }

        #[derive(serde::Serialize)]
        struct Metadata {
            timestamp: String,
        }

        #[derive(serde::Serialize)]
        struct JsonResult<'a> {
            name: &'a str,
            algorithm: &'static str,
            digest: &'a str,
            status: &'static str,
        }

        let output = JsonOutput {
            metadata: Metadata {
                timestamp: chrono::Utc::now().to_rfc3339(),
            },
            summary: &self.summary,
            ledger_written: self.ledger_written,
            ledger,
            results: self
                .results
                .iter()
                .map(|r| JsonResult {
                    name: &r.name,
                    algorithm: r.algorithm.label(),
                    digest: &r.digest_hex,
                    status: r.status.label(style.legacy_collision_label),
                })
                .collect(),
        };

        serde_json::to_string_pretty(&output)
    }
}
