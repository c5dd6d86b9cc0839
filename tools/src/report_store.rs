//! SQLite report store — persistence collaborator for finished reports.
//!
//! RULE: Only this module talks to the database. The core engine never
//! sees it; reports are handed over fully assembled, keyed by document id.

use anyhow::Result;
use docrisk_core::types::RiskReport;
use rusqlite::{params, Connection, OptionalExtension};

pub struct ReportStore {
    conn: Connection,
}

impl ReportStore {
    /// Open (or create) the report database at `path`.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Apply the schema. Idempotent.
    pub fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS risk_report (
                document_id  TEXT PRIMARY KEY,
                score        INTEGER NOT NULL,
                tier         TEXT NOT NULL,
                payload      TEXT NOT NULL,
                generated_at TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Save a report. Re-analysis of the same document replaces the row.
    pub fn save_report(&self, report: &RiskReport) -> Result<()> {
        let payload = serde_json::to_string(report)?;
        self.conn.execute(
            "INSERT INTO risk_report (document_id, score, tier, payload, generated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(document_id) DO UPDATE SET
                score = excluded.score,
                tier = excluded.tier,
                payload = excluded.payload,
                generated_at = excluded.generated_at",
            params![
                report.document_id,
                report.score as i64,
                report.tier.label(),
                payload,
                report.generated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_report(&self, document_id: &str) -> Result<Option<RiskReport>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM risk_report WHERE document_id = ?1",
                params![document_id],
                |row| row.get(0),
            )
            .optional()?;
        match payload {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    pub fn report_count(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM risk_report", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docrisk_core::{analyzer::DocumentAnalyzer, config::AnalysisConfig};

    #[test]
    fn save_and_reload_round_trip() {
        let store = ReportStore::in_memory().unwrap();
        store.migrate().unwrap();

        let analyzer = DocumentAnalyzer::new(AnalysisConfig::default()).unwrap();
        let report = analyzer.analyze("doc-001", Vec::new(), None);
        store.save_report(&report).unwrap();

        let loaded = store.get_report("doc-001").unwrap().unwrap();
        assert_eq!(loaded.document_id, "doc-001");
        assert_eq!(loaded.score, report.score);
        assert_eq!(store.report_count().unwrap(), 1);
    }

    #[test]
    fn reanalysis_replaces_existing_row() {
        let store = ReportStore::in_memory().unwrap();
        store.migrate().unwrap();

        let analyzer = DocumentAnalyzer::new(AnalysisConfig::default()).unwrap();
        store
            .save_report(&analyzer.analyze("doc-002", Vec::new(), None))
            .unwrap();
        store
            .save_report(&analyzer.analyze("doc-002", Vec::new(), None))
            .unwrap();

        assert_eq!(store.report_count().unwrap(), 1);
    }

    #[test]
    fn missing_report_is_none() {
        let store = ReportStore::in_memory().unwrap();
        store.migrate().unwrap();
        assert!(store.get_report("nope").unwrap().is_none());
    }
}
