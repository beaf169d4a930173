use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::aggregator::ReportAggregator;
use super::export_serializer::{ExportArtifact, ExportSerializer};
use crate::core::{AppError, PipelineStage, Result};
use crate::modules::fees::models::PaymentTransaction;
use crate::modules::records::models::{Course, Student, StudentStatus};
use crate::modules::records::repositories::{
    fetch_all_courses, fetch_all_students, fetch_all_transactions, CourseQuery, RecordStore,
    StudentQuery, TransactionQuery,
};
use crate::modules::reports::models::{ReportConfiguration, ReportResult};

type Records = (Vec<PaymentTransaction>, Vec<Student>, Vec<Course>);

/// Report pipeline: fetch records, aggregate, serialize.
///
/// Every failure is attributed to the step that produced it so the dashboard can
/// name it. Configuration errors are raised before the record store is touched.
pub struct ReportService {
    store: Arc<dyn RecordStore>,
    aggregator: ReportAggregator,
    serializer: ExportSerializer,
}

impl ReportService {
    pub fn new(store: Arc<dyn RecordStore>, serializer: ExportSerializer) -> Self {
        Self {
            store,
            aggregator: ReportAggregator::new(),
            serializer,
        }
    }

    pub fn serializer(&self) -> &ExportSerializer {
        &self.serializer
    }

    /// Fetch only what the requested report types read
    async fn fetch(&self, config: &ReportConfiguration) -> Result<Records> {
        let store = self.store.as_ref();

        let tx_query = TransactionQuery {
            from: Some(config.start),
            to: Some(config.end),
            division: config.division.clone(),
        };
        let course_query = CourseQuery {
            division: config.division.clone(),
            status: None,
        };
        let student_query = StudentQuery {
            division: None,
            status: Some(StudentStatus::Dropped),
        };

        let (transactions, students, courses) = tokio::try_join!(
            fetch_all_transactions(store, &tx_query),
            async {
                if config.needs_students() {
                    fetch_all_students(store, &student_query).await
                } else {
                    Ok(Vec::new())
                }
            },
            async {
                if config.needs_courses() {
                    fetch_all_courses(store, &course_query).await
                } else {
                    Ok(Vec::new())
                }
            },
        )
        .map_err(|e| e.at_stage(PipelineStage::Fetch))?;

        Ok((transactions, students, courses))
    }

    fn aggregate(
        &self,
        records: &Records,
        config: &ReportConfiguration,
        generated_at: DateTime<Utc>,
    ) -> Result<ReportResult> {
        let (transactions, students, courses) = records;
        self.aggregator
            .aggregate(transactions, students, courses, config, generated_at)
            .map_err(|e| e.at_stage(PipelineStage::Aggregate))
    }

    /// Build the report for an on-screen preview
    pub async fn generate(
        &self,
        config: &ReportConfiguration,
        generated_at: DateTime<Utc>,
    ) -> Result<ReportResult> {
        config.validate()?;

        info!(
            start = %config.start,
            end = %config.end,
            report_types = ?config.report_types,
            "Generating report"
        );

        let records = self.fetch(config).await?;
        let result = self.aggregate(&records, config, generated_at)?;

        if result.is_empty() {
            warn!(
                start = %config.start,
                end = %config.end,
                "Report has no data for the selected filters"
            );
        }

        Ok(result)
    }

    /// Run the whole pipeline into a downloadable artifact.
    ///
    /// `cancel` is honored up to hand-off: a cancelled export never returns an artifact.
    pub async fn export(
        &self,
        config: &ReportConfiguration,
        generated_at: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<ExportArtifact> {
        config.validate()?;
        ensure_active(cancel)?;

        let records = tokio::select! {
            _ = cancel.cancelled() => {
                info!("Export cancelled while fetching records");
                return Err(AppError::Cancelled);
            }
            records = self.fetch(config) => records?,
        };

        ensure_active(cancel)?;
        let result = self.aggregate(&records, config, generated_at)?;

        ensure_active(cancel)?;
        let artifact = self
            .serializer
            .serialize(&result, config.format)
            .map_err(|e| e.at_stage(PipelineStage::Export))?;

        ensure_active(cancel)?;
        info!(
            filename = %artifact.filename,
            bytes = artifact.len(),
            "Export ready"
        );
        Ok(artifact)
    }
}

fn ensure_active(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        info!("Export cancelled");
        return Err(AppError::Cancelled);
    }
    Ok(())
}

/// In-flight exports that the dashboard may still cancel, by client-supplied id
#[derive(Debug, Default)]
pub struct ExportRegistry {
    tokens: Mutex<HashMap<String, CancellationToken>>,
}

impl ExportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a new export; an id already in use is cancelled and replaced
    pub async fn register(&self, export_id: &str) -> CancellationToken {
        let token = CancellationToken::new();
        let mut tokens = self.tokens.lock().await;
        if let Some(previous) = tokens.insert(export_id.to_string(), token.clone()) {
            previous.cancel();
        }
        token
    }

    /// Returns false when no export with this id is in flight
    pub async fn cancel(&self, export_id: &str) -> bool {
        match self.tokens.lock().await.remove(export_id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub async fn finish(&self, export_id: &str) {
        self.tokens.lock().await.remove(export_id);
    }

    pub async fn in_flight(&self) -> usize {
        self.tokens.lock().await.len()
    }
}
