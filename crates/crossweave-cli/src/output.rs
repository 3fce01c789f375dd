//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use crossweave_domain::{ErrorLogRecord, IntegrationCycleRecord, KnowledgeNode};
use std::collections::BTreeMap;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format integration cycle records.
    pub fn format_history(&self, records: &[IntegrationCycleRecord]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(records)?),
            OutputFormat::Quiet => Ok(records
                .iter()
                .map(|r| r.cycle_id.to_string())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => self.format_history_table(records),
        }
    }

    fn format_history_table(&self, records: &[IntegrationCycleRecord]) -> Result<String> {
        if records.is_empty() {
            return Ok(self.colorize("No cycles recorded yet.", "yellow"));
        }

        let mut builder = Builder::default();
        builder.push_record([
            "Cycle", "Outcome", "Domains", "Skipped", "Created", "Merged", "Relations",
            "Pruned", "Avg conf",
        ]);

        for record in records {
            let outcome = match record.outcome {
                crossweave_domain::CycleOutcome::Completed => "completed",
                crossweave_domain::CycleOutcome::Failed => "failed",
            };
            builder.push_record([
                &record.cycle_id.to_string()[..8],
                outcome,
                &record.domains_processed.len().to_string(),
                &record.domains_skipped.len().to_string(),
                &record.nodes_created.to_string(),
                &record.nodes_merged.to_string(),
                &(record.relations_created + record.relations_reinforced).to_string(),
                &record.relations_pruned.to_string(),
                &format!("{:.3}", record.average_confidence),
            ]);
        }

        Ok(self.build_table(builder))
    }

    /// Format knowledge nodes.
    pub fn format_nodes(&self, nodes: &[KnowledgeNode]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(nodes)?),
            OutputFormat::Quiet => Ok(nodes
                .iter()
                .map(|n| n.id.to_string())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => self.format_nodes_table(nodes),
        }
    }

    fn format_nodes_table(&self, nodes: &[KnowledgeNode]) -> Result<String> {
        if nodes.is_empty() {
            return Ok(self.colorize("No nodes found.", "yellow"));
        }

        let mut builder = Builder::default();
        builder.push_record(["ID", "Domain", "Content", "Confidence", "Sources", "Active"]);

        for node in nodes {
            let content: String = if node.content.chars().count() > 48 {
                let truncated: String = node.content.chars().take(45).collect();
                format!("{}...", truncated)
            } else {
                node.content.clone()
            };
            builder.push_record([
                node.id.as_str(),
                &node.domain,
                &content,
                &format!("{:.3}", node.confidence),
                &node.source_count.to_string(),
                if node.active { "yes" } else { "no" },
            ]);
        }

        Ok(self.build_table(builder))
    }

    /// Format the domain registry: active domains and their pair priors.
    pub fn format_domains(
        &self,
        domains: &[String],
        priors: &BTreeMap<String, f64>,
    ) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "domains": domains,
                "priors": priors,
            }))?),
            OutputFormat::Quiet => Ok(domains.join("\n")),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Pair", "Prior"]);
                for (pair, prior) in priors {
                    builder.push_record([pair.as_str(), &format!("{:.3}", prior)]);
                }

                let mut out = format!("Active domains: {}\n", domains.join(", "));
                if priors.is_empty() {
                    out.push_str(&self.colorize("No configured priors.", "yellow"));
                } else {
                    out.push_str(&self.build_table(builder));
                }
                Ok(out)
            }
        }
    }

    /// Format error log entries.
    pub fn format_errors(&self, errors: &[ErrorLogRecord]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(errors)?),
            OutputFormat::Quiet => Ok(errors
                .iter()
                .map(|e| e.message.clone())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if errors.is_empty() {
                    return Ok(self.colorize("No errors logged.", "green"));
                }

                let mut builder = Builder::default();
                builder.push_record(["Cycle", "Stage", "Domain", "Message"]);
                for error in errors {
                    builder.push_record([
                        &error.cycle_id.to_string()[..8],
                        &error.stage,
                        error.domain.as_deref().unwrap_or("-"),
                        &error.message,
                    ]);
                }
                Ok(self.build_table(builder))
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    fn build_table(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }
        match color {
            "green" => text.green().to_string(),
            "red" => text.red().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossweave_domain::{CycleId, CycleOutcome};

    fn record() -> IntegrationCycleRecord {
        IntegrationCycleRecord {
            cycle_id: CycleId::new(),
            started_at: 1000,
            finished_at: 1060,
            domains_processed: vec!["technology_news".into()],
            domains_skipped: vec![],
            nodes_created: 3,
            nodes_merged: 1,
            nodes_deactivated: 0,
            relations_created: 2,
            relations_reinforced: 0,
            relations_pruned: 0,
            average_confidence: 0.81,
            outcome: CycleOutcome::Completed,
        }
    }

    #[test]
    fn test_history_quiet_lists_cycle_ids() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let record = record();
        let out = formatter.format_history(std::slice::from_ref(&record)).unwrap();
        assert_eq!(out, record.cycle_id.to_string());
    }

    #[test]
    fn test_history_json_roundtrips() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let out = formatter.format_history(&[record()]).unwrap();
        let parsed: Vec<IntegrationCycleRecord> = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed[0].nodes_created, 3);
    }

    #[test]
    fn test_empty_history_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let out = formatter.format_history(&[]).unwrap();
        assert!(out.contains("No cycles"));
    }

    #[test]
    fn test_history_table_has_counts() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let out = formatter.format_history(&[record()]).unwrap();
        assert!(out.contains("completed"));
        assert!(out.contains("0.810"));
    }
}
