//! Ingest, filter and combine.
//!
//! Runs every batch through the normalizer and concatenates the surviving
//! line items into one [`CanonicalDataset`]. Duplicates across batches are
//! counted twice; uniqueness of the extracts is the supplier's guarantee.

use crate::normalizer::RecordNormalizer;
use crate::reader::{read_batch_file, RawBatch};
use morsel_core::{CanonicalDataset, Config, Error, LineItem, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Per-batch outcome counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Batch name.
    pub batch: String,
    /// Rows seen, including unreadable ones.
    pub rows: usize,
    /// Rows that became line items.
    pub matched: usize,
    /// Rows for other products.
    pub excluded: usize,
    /// Rows rejected by validation.
    pub rejected: usize,
    /// Rejections keyed by [`morsel_core::RecordError::kind`].
    pub rejections: BTreeMap<&'static str, usize>,
}

/// Result of one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    /// The canonical dataset (never empty).
    pub dataset: CanonicalDataset,
    /// One report per input batch, in input order.
    pub reports: Vec<BatchReport>,
}

impl PipelineRun {
    /// Rows seen across all batches.
    pub fn total_rows(&self) -> usize {
        self.reports.iter().map(|r| r.rows).sum()
    }

    /// Rows rejected across all batches.
    pub fn total_rejected(&self) -> usize {
        self.reports.iter().map(|r| r.rejected).sum()
    }
}

/// Batch pipeline producing the canonical dataset.
#[derive(Debug, Clone)]
pub struct SalesPipeline {
    normalizer: RecordNormalizer,
    /// Where [`SalesPipeline::build_artifact`] writes.
    artifact_path: PathBuf,
}

impl SalesPipeline {
    /// Create a pipeline from configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            normalizer: RecordNormalizer::from_config(config),
            artifact_path: config.artifact.path.clone(),
        }
    }

    /// Create a pipeline around an existing normalizer, writing to the
    /// default artifact path.
    pub fn with_normalizer(normalizer: RecordNormalizer) -> Self {
        Self {
            normalizer,
            artifact_path: Config::default().artifact.path,
        }
    }

    /// Configured artifact path.
    pub fn artifact_path(&self) -> &Path {
        &self.artifact_path
    }

    /// Normalize one batch, returning its line items and report.
    pub fn process_batch(&self, batch: &RawBatch) -> (Vec<LineItem>, BatchReport) {
        let mut items = Vec::new();
        let mut report = BatchReport {
            batch: batch.name.clone(),
            rows: batch.row_count(),
            ..BatchReport::default()
        };

        for (line, err) in &batch.unreadable {
            warn!(batch = %batch.name, line, error = %err, "record rejected");
            report.rejected += 1;
            *report.rejections.entry(err.kind()).or_insert(0) += 1;
        }

        for raw in &batch.records {
            match self.normalizer.normalize(raw) {
                Ok(Some(item)) => {
                    items.push(item);
                    report.matched += 1;
                }
                Ok(None) => report.excluded += 1,
                Err(err) => {
                    warn!(batch = %batch.name, line = raw.line, error = %err, "record rejected");
                    report.rejected += 1;
                    *report.rejections.entry(err.kind()).or_insert(0) += 1;
                }
            }
        }

        info!(
            batch = %batch.name,
            rows = report.rows,
            matched = report.matched,
            excluded = report.excluded,
            rejected = report.rejected,
            "batch processed"
        );
        (items, report)
    }

    /// Run all batches and merge them into one dataset.
    ///
    /// Fails with [`Error::NoMatchingData`] when no batch yields a single
    /// line item, and with [`Error::Data`] when the combined sales exceed the
    /// decimal range.
    pub fn run(&self, batches: &[RawBatch]) -> Result<PipelineRun> {
        let mut items = Vec::new();
        let mut reports = Vec::with_capacity(batches.len());

        for batch in batches {
            let (batch_items, report) = self.process_batch(batch);
            items.extend(batch_items);
            reports.push(report);
        }

        if items.is_empty() {
            return Err(Error::NoMatchingData {
                product: self.normalizer.target().to_string(),
                batches: batches.iter().map(|b| b.name.clone()).collect(),
            });
        }

        let dataset = CanonicalDataset::from_items(items)?;
        info!(batches = batches.len(), rows = dataset.len(), "pipeline complete");
        Ok(PipelineRun { dataset, reports })
    }

    /// Run all batches and write the canonical artifact to `path`.
    ///
    /// Nothing is written when the run fails.
    pub fn run_and_persist(&self, batches: &[RawBatch], path: impl AsRef<Path>) -> Result<PipelineRun> {
        let run = self.run(batches)?;
        run.dataset.save(path)?;
        Ok(run)
    }

    /// Run all batches and write the artifact to the configured path.
    pub fn build_artifact(&self, batches: &[RawBatch]) -> Result<PipelineRun> {
        self.run_and_persist(batches, &self.artifact_path)
    }

    /// Read the given extract files, in order, and run them.
    pub fn run_files<P: AsRef<Path>>(&self, paths: &[P]) -> Result<PipelineRun> {
        let batches = paths
            .iter()
            .map(read_batch_file)
            .collect::<Result<Vec<_>>>()?;
        self.run(&batches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use morsel_core::{RawRecord, Region};
    use rust_decimal::Decimal;

    fn pipeline() -> SalesPipeline {
        SalesPipeline::new(&Config::default())
    }

    fn make_raw(product: &str, price: &str, quantity: &str, date: &str, region: &str) -> RawRecord {
        RawRecord {
            product: product.to_string(),
            price: price.to_string(),
            quantity: quantity.to_string(),
            date: date.to_string(),
            region: region.to_string(),
            line: 0,
        }
    }

    fn scenario_batch() -> RawBatch {
        RawBatch::new(
            "daily_sales_data_0.csv",
            vec![
                make_raw("pink morsel", "$3.00", "2", "2021-01-10", "north"),
                make_raw("pink morsel", "$3.00", "1", "2021-01-10", "south"),
                make_raw("other", "$9.99", "5", "2021-01-10", "north"),
            ],
        )
    }

    fn to_csv(dataset: &CanonicalDataset) -> Vec<u8> {
        let mut buf = Vec::new();
        dataset.write_csv(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_scenario_dataset() {
        let run = pipeline().run(&[scenario_batch()]).unwrap();
        let items = run.dataset.items();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].sales().to_string(), "6.00");
        assert_eq!(items[0].region(), Region::North);
        assert_eq!(items[1].sales().to_string(), "3.00");
        assert_eq!(items[1].region(), Region::South);

        assert_eq!(
            run.reports,
            vec![BatchReport {
                batch: "daily_sales_data_0.csv".to_string(),
                rows: 3,
                matched: 2,
                excluded: 1,
                rejected: 0,
                rejections: BTreeMap::new(),
            }]
        );
    }

    #[test]
    fn test_filtering_purity() {
        let mut records = Vec::new();
        for i in 0..20 {
            let product = if i % 3 == 0 { "pink morsel" } else { "gold morsel" };
            records.push(make_raw(product, "$1.00", "1", "2021-01-10", "east"));
        }
        let expected = records.iter().filter(|r| r.product == "pink morsel").count();

        let run = pipeline().run(&[RawBatch::new("mixed", records)]).unwrap();
        assert_eq!(run.dataset.len(), expected);
        assert_eq!(run.reports[0].excluded, 20 - expected);
    }

    #[test]
    fn test_rejections_do_not_abort_batch() {
        let batch = RawBatch::new(
            "dirty",
            vec![
                make_raw("pink morsel", "$abc", "2", "2021-01-10", "north"),
                make_raw("pink morsel", "$3.00", "-1", "2021-01-10", "north"),
                make_raw("pink morsel", "$3.00", "4", "2021-01-10", "west"),
            ],
        );

        let run = pipeline().run(&[batch]).unwrap();
        assert_eq!(run.dataset.len(), 1);
        assert_eq!(run.dataset.items()[0].sales(), "12.00".parse::<Decimal>().unwrap());

        let report = &run.reports[0];
        assert_eq!(report.rejected, 2);
        assert_eq!(report.rejections.get("malformed_price"), Some(&1));
        assert_eq!(report.rejections.get("malformed_quantity"), Some(&1));
        assert_eq!(run.total_rejected(), 2);
    }

    #[test]
    fn test_empty_batch_contributes_nothing() {
        let run = pipeline()
            .run(&[RawBatch::new("empty", Vec::new()), scenario_batch()])
            .unwrap();

        assert_eq!(run.dataset.len(), 2);
        assert_eq!(run.reports.len(), 2);
        assert_eq!(run.reports[0].rows, 0);
        assert_eq!(run.total_rows(), 3);
    }

    #[test]
    fn test_no_matching_data() {
        let batches = vec![
            RawBatch::new("a.csv", vec![make_raw("other", "$1.00", "1", "2021-01-10", "north")]),
            RawBatch::new("b.csv", Vec::new()),
        ];

        match pipeline().run(&batches) {
            Err(Error::NoMatchingData { product, batches }) => {
                assert_eq!(product, "pink morsel");
                assert_eq!(batches, vec!["a.csv".to_string(), "b.csv".to_string()]);
            }
            other => panic!("expected NoMatchingData, got {other:?}"),
        }
    }

    #[test]
    fn test_no_batches_is_no_matching_data() {
        assert!(matches!(pipeline().run(&[]), Err(Error::NoMatchingData { .. })));
    }

    #[test]
    fn test_duplicates_across_batches_are_kept() {
        let run = pipeline().run(&[scenario_batch(), scenario_batch()]).unwrap();
        assert_eq!(run.dataset.len(), 4);
    }

    #[test]
    fn test_merge_orders_by_date() {
        let late = RawBatch::new("late", vec![make_raw("pink morsel", "$1.00", "1", "2021-02-01", "north")]);
        let early = RawBatch::new("early", vec![make_raw("pink morsel", "$1.00", "1", "2021-01-01", "north")]);

        let run = pipeline().run(&[late, early]).unwrap();
        let dates: Vec<String> = run.dataset.items().iter().map(|i| i.date().to_string()).collect();
        assert_eq!(dates, vec!["2021-01-01", "2021-02-01"]);
    }

    #[test]
    fn test_idempotent_output() {
        let batches = vec![scenario_batch(), scenario_batch()];
        let first = pipeline().run(&batches).unwrap();
        let second = pipeline().run(&batches).unwrap();
        assert_eq!(to_csv(&first.dataset), to_csv(&second.dataset));
    }

    #[test]
    fn test_run_and_persist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pink_morsel_sales.csv");

        pipeline().run_and_persist(&[scenario_batch()], &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "sales,date,region\n6.00,2021-01-10,north\n3.00,2021-01-10,south\n");
    }

    #[test]
    fn test_failed_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pink_morsel_sales.csv");

        assert!(pipeline().run_and_persist(&[], &path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_daily_total_beyond_decimal_range_fails_run() {
        let max = "$79228162514264337593543950335";
        let batch = RawBatch::new(
            "huge",
            vec![
                make_raw("pink morsel", max, "1", "2021-01-10", "north"),
                make_raw("pink morsel", max, "1", "2021-01-10", "south"),
            ],
        );

        assert!(matches!(pipeline().run(&[batch]), Err(Error::Data(_))));
    }

    #[test]
    fn test_build_artifact_uses_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.artifact.path = dir.path().join("out").join("sales.csv");

        let pipeline = SalesPipeline::new(&config);
        assert_eq!(pipeline.artifact_path(), config.artifact.path.as_path());
        pipeline.build_artifact(&[scenario_batch()]).unwrap();

        let loaded = CanonicalDataset::load(&config.artifact.path).unwrap();
        assert_eq!(loaded.len(), 2);
    }

    #[test]
    fn test_default_artifact_path() {
        let pipeline = SalesPipeline::with_normalizer(RecordNormalizer::from_config(&Config::default()));
        assert_eq!(pipeline.artifact_path(), Path::new("pink_morsel_sales.csv"));
    }

    #[test]
    fn test_run_files() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("daily_sales_data_0.csv");
        let second = dir.path().join("daily_sales_data_1.csv");
        std::fs::write(
            &first,
            "product,price,quantity,date,region\npink morsel,$3.00,2,2021-01-10,north\n",
        )
        .unwrap();
        std::fs::write(
            &second,
            "product,price,quantity,date,region\npink morsel,$3.00,1,2021-01-09,south\nbad,row\n",
        )
        .unwrap();

        let run = pipeline().run_files(&[&first, &second]).unwrap();
        assert_eq!(run.dataset.len(), 2);
        assert_eq!(run.dataset.items()[0].date().to_string(), "2021-01-09");
        assert_eq!(run.reports[1].rejections.get("unreadable"), Some(&1));
    }
}
