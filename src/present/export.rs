use super::{Dashboard, KpiBlock, RankedTable, YearSeries};
use crate::aggregate::Ranked;
use anyhow::{anyhow, Context, Result};
use arrow::{
    array::{Array, ArrayRef, Int32Array, StringArray, UInt64Array},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use parquet::{
    arrow::{arrow_reader::ParquetRecordBatchReaderBuilder, ArrowWriter},
    basic::Compression,
    file::properties::WriterProperties,
};
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::info;

/// Write the whole dashboard as pretty JSON.
pub fn write_json(dash: &Dashboard, path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("creating file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, dash)
        .with_context(|| format!("writing dashboard JSON to {}", path.display()))?;
    writer.flush().context("flushing dashboard JSON")?;
    Ok(())
}

fn ranked_batch(view: &RankedTable) -> Result<RecordBatch> {
    let schema = Schema::new(vec![
        Field::new(&view.label_column, DataType::Utf8, false),
        Field::new(&view.count_column, DataType::UInt64, false),
    ]);
    let labels = StringArray::from_iter_values(view.rows.iter().map(|r| r.label.as_str()));
    let counts = UInt64Array::from_iter_values(view.rows.iter().map(|r| r.count));
    RecordBatch::try_new(
        Arc::new(schema),
        vec![Arc::new(labels) as ArrayRef, Arc::new(counts) as ArrayRef],
    )
    .context("building ranked view batch")
}

fn series_batch(series: &YearSeries) -> Result<RecordBatch> {
    let schema = Schema::new(vec![
        Field::new(&series.x_label, DataType::Int32, false),
        Field::new(&series.y_label, DataType::UInt64, false),
    ]);
    let xs = Int32Array::from_iter_values(series.points.iter().map(|p| p.x));
    let ys = UInt64Array::from_iter_values(series.points.iter().map(|p| p.y));
    RecordBatch::try_new(
        Arc::new(schema),
        vec![Arc::new(xs) as ArrayRef, Arc::new(ys) as ArrayRef],
    )
    .context("building year series batch")
}

fn kpi_batch(block: &KpiBlock) -> Result<RecordBatch> {
    let schema = Schema::new(vec![
        Field::new("metric", DataType::Utf8, false),
        Field::new("value", DataType::UInt64, false),
    ]);
    let labels = StringArray::from_iter_values(block.metrics.iter().map(|m| m.label.as_str()));
    let values = UInt64Array::from_iter_values(block.metrics.iter().map(|m| m.value));
    RecordBatch::try_new(
        Arc::new(schema),
        vec![Arc::new(labels) as ArrayRef, Arc::new(values) as ArrayRef],
    )
    .context("building KPI batch")
}

fn write_parquet_file(batch: &RecordBatch, output_path: &Path) -> Result<u64> {
    let file = File::create(output_path)
        .with_context(|| format!("creating file {}", output_path.display()))?;

    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();

    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))
        .context("creating parquet writer")?;

    writer.write(batch).context("writing batch to parquet")?;
    writer.close().context("closing parquet writer")?;

    let metadata = fs::metadata(output_path).context("getting file metadata")?;
    Ok(metadata.len())
}

/// Write each view to `<dir>/<view>.parquet`. Returns the written paths.
pub fn write_parquet(dash: &Dashboard, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).context("creating export directory")?;

    let mut batches = vec![
        ("kpis", kpi_batch(&dash.kpis)?),
        ("titles_by_year", series_batch(&dash.titles_by_year)?),
    ];
    for (name, view) in dash.ranked_tables() {
        batches.push((name, ranked_batch(view)?));
    }

    let mut written = Vec::with_capacity(batches.len());
    for (name, batch) in batches {
        let path = dir.join(format!("{}.parquet", name));
        let bytes = write_parquet_file(&batch, &path)?;
        info!(view = name, rows = batch.num_rows(), bytes, "exported view");
        written.push(path);
    }
    Ok(written)
}

/// Read a ranked view written by [`write_parquet`] back into rows.
pub fn read_ranked_parquet(path: &Path) -> Result<Vec<Ranked>> {
    let file = File::open(path).with_context(|| format!("failed to open `{}`", path.display()))?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?
        .with_batch_size(1024)
        .build()?;

    let mut rows = Vec::new();
    for batch in reader {
        let batch = batch?;
        if batch.num_columns() != 2 {
            return Err(anyhow!(
                "{} has {} columns, expected label + count",
                path.display(),
                batch.num_columns()
            ));
        }
        let labels = batch
            .column(0)
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| anyhow!("label column is not Utf8"))?;
        let counts = batch
            .column(1)
            .as_any()
            .downcast_ref::<UInt64Array>()
            .ok_or_else(|| anyhow!("count column is not UInt64"))?;
        for i in 0..batch.num_rows() {
            if labels.is_null(i) || counts.is_null(i) {
                continue;
            }
            rows.push(Ranked::new(labels.value(i), counts.value(i)));
        }
    }
    Ok(rows)
}
