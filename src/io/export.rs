use std::io::Write;

use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::application::ExpenseService;
use crate::domain::{ExpenseRecord, Metrics};

/// Everything a session holds, for a one-way JSON dump.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub categories: Vec<String>,
    pub metrics: Metrics,
    pub records: Vec<ExpenseRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportKind {
    /// Every record, in entry order
    Records,
    /// Per-category totals
    Categories,
    /// Records, categories and metrics (JSON only)
    Snapshot,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

/// Exporter for writing session data out as CSV or JSON.
pub struct Exporter<'a> {
    service: &'a ExpenseService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a ExpenseService) -> Self {
        Self { service }
    }

    /// Write `kind` in `format` and return the number of rows written.
    pub fn export<W: Write>(
        &self,
        kind: ExportKind,
        format: ExportFormat,
        writer: W,
    ) -> Result<usize> {
        match (kind, format) {
            (ExportKind::Records, ExportFormat::Csv) => self.export_records_csv(writer),
            (ExportKind::Records, ExportFormat::Json) => self.export_records_json(writer),
            (ExportKind::Categories, ExportFormat::Csv) => self.export_categories_csv(writer),
            (ExportKind::Categories, ExportFormat::Json) => self.export_categories_json(writer),
            (ExportKind::Snapshot, ExportFormat::Json) => self
                .export_snapshot_json(writer)
                .map(|snapshot| snapshot.records.len()),
            (ExportKind::Snapshot, ExportFormat::Csv) => {
                bail!("snapshot export is only available as json")
            }
        }
    }

    pub fn export_records_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let records = self.service.records();
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "id",
            "date",
            "category",
            "description",
            "amount_cents",
            "created_at",
        ])?;

        for record in records {
            csv_writer.write_record([
                record.id.to_string(),
                record.date.format("%Y-%m-%d").to_string(),
                record.category.clone(),
                record.description.clone(),
                record.amount_cents.to_string(),
                record.created_at.to_rfc3339(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(records.len())
    }

    pub fn export_records_json<W: Write>(&self, mut writer: W) -> Result<usize> {
        let records = self.service.records();
        serde_json::to_writer_pretty(&mut writer, records)?;
        writer.flush()?;
        Ok(records.len())
    }

    pub fn export_categories_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let report = self.service.category_report();
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["category", "total_cents", "count", "average_cents", "percentage"])?;

        for summary in &report.categories {
            csv_writer.write_record([
                summary.category.clone(),
                summary.total.to_string(),
                summary.count.to_string(),
                summary.average.to_string(),
                format!("{:.2}", summary.percentage),
            ])?;
        }

        csv_writer.flush()?;
        Ok(report.categories.len())
    }

    pub fn export_categories_json<W: Write>(&self, mut writer: W) -> Result<usize> {
        let report = self.service.category_report();
        serde_json::to_writer_pretty(&mut writer, &report)?;
        writer.flush()?;
        Ok(report.categories.len())
    }

    pub fn export_snapshot_json<W: Write>(&self, mut writer: W) -> Result<SessionSnapshot> {
        let snapshot = SessionSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            categories: self.service.categories().iter().map(String::from).collect(),
            metrics: self.service.metrics(),
            records: self.service.records().to_vec(),
        };

        serde_json::to_writer_pretty(&mut writer, &snapshot)?;
        writer.flush()?;

        Ok(snapshot)
    }
}
