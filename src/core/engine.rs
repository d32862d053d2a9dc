use crate::core::Pipeline;
use crate::domain::model::{ImportReport, Validation};
use crate::utils::error::Result;

pub struct ImportEngine<P: Pipeline> {
    pipeline: P,
    dry_run: bool,
}

impl<P: Pipeline> ImportEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            dry_run: false,
        }
    }

    /// 只驗證不匯入
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub async fn run(&self) -> Result<ImportReport> {
        let collection = self.pipeline.collection().to_string();
        tracing::info!("🚀 Starting import into '{}'", collection);

        // Extract
        tracing::info!("📥 Reading upload...");
        let rows = self.pipeline.extract().await?;
        tracing::info!("📥 Read {} rows", rows.len());

        // Transform
        tracing::info!("🔍 Validating rows...");
        let records = match self.pipeline.transform(rows).await? {
            Validation::Valid(records) => records,
            Validation::Invalid(failure) => {
                tracing::warn!(
                    "❌ Validation failed: {} ({} rows with errors)",
                    failure.message,
                    failure.errors.len()
                );
                return Ok(ImportReport::Rejected(failure));
            }
        };
        tracing::info!("✅ {} rows passed validation", records.len());

        if self.dry_run {
            tracing::info!("Dry run, skipping submission");
            return Ok(ImportReport::Validated {
                collection,
                count: records.len(),
            });
        }

        // Load
        tracing::info!("📤 Submitting {} documents...", records.len());
        let summary = self.pipeline.load(records).await?;
        if summary.failures.is_empty() {
            tracing::info!("🎉 Imported {} documents", summary.imported);
        } else {
            tracing::warn!(
                "⚠️ {} documents imported, {} rejected",
                summary.imported,
                summary.failures.len()
            );
        }

        Ok(ImportReport::from_summary(summary))
    }
}
