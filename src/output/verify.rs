//! Read-back check of written Parquet files

use crate::error::{Error, Phase, Result, ResultExt};
use crate::schema::{SemanticType, TargetSchema};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::fs::File;
use std::path::Path;

/// Check a written Parquet file against the target schema
///
/// Names and order must match exactly; types must be compatible with the
/// semantic type. Returns the row count from the file footer.
pub fn verify_parquet_schema(path: &Path, expected: &TargetSchema) -> Result<usize> {
    let file = File::open(path)
        .with_phase_context(Phase::Write, || format!("Failed to open {}", path.display()))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .with_phase_context(Phase::Write, || format!("Failed to read {}", path.display()))?;

    let schema = builder.schema();
    let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
    if names != expected.names() {
        return Err(Error::write(format!(
            "Written columns {names:?} do not match target columns {:?}",
            expected.names()
        )));
    }

    for (field, column) in schema.fields().iter().zip(expected.columns()) {
        if !type_matches(column.ty, field.data_type()) {
            return Err(Error::write(format!(
                "Column '{}' written as {} but expected {}",
                column.name,
                field.data_type(),
                column.ty
            )));
        }
    }

    let rows = builder.metadata().file_metadata().num_rows();
    Ok(rows as usize)
}

/// Whether a Parquet-derived Arrow type carries the semantic type
pub fn type_matches(expected: SemanticType, actual: &DataType) -> bool {
    match expected {
        SemanticType::String => matches!(
            actual,
            DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View
        ),
        SemanticType::Integer => matches!(actual, DataType::Int32),
        // Timezone annotation depends on the writer
        SemanticType::Timestamp => matches!(actual, DataType::Timestamp(_, _)),
    }
}
