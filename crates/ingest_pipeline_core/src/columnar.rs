//! Columnar re-encoding of parsed tables as Parquet buffers.

use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;

use crate::tabular::{Column, ColumnValues, Table, TabularError};

/// Encodes a table as an in-memory Parquet file, grouping values by column.
/// Row count and cell values are preserved exactly; all columns are nullable
/// because empty cells carry no value.
pub fn encode_parquet(table: &Table) -> Result<Vec<u8>, TabularError> {
    let schema = Arc::new(parquet_schema(table.columns()));
    let arrays = build_arrays(table.columns());

    let batch = RecordBatch::try_new(schema.clone(), arrays)
        .map_err(|error| TabularError::new(format!("failed to build record batch: {error}")))?;

    let mut buffer = Vec::new();
    let props = WriterProperties::builder().build();
    let mut writer = ArrowWriter::try_new(&mut buffer, schema, Some(props))
        .map_err(|error| TabularError::new(format!("failed to open parquet writer: {error}")))?;
    writer
        .write(&batch)
        .map_err(|error| TabularError::new(format!("failed to write parquet batch: {error}")))?;
    writer
        .close()
        .map_err(|error| TabularError::new(format!("failed to close parquet writer: {error}")))?;

    Ok(buffer)
}

fn parquet_schema(columns: &[Column]) -> Schema {
    let fields: Vec<Field> = columns
        .iter()
        .map(|column| {
            let data_type = match &column.values {
                ColumnValues::Int64(_) => DataType::Int64,
                ColumnValues::Float64(_) => DataType::Float64,
                ColumnValues::Boolean(_) => DataType::Boolean,
                ColumnValues::Utf8(_) => DataType::Utf8,
            };
            Field::new(&column.name, data_type, true)
        })
        .collect();

    Schema::new(fields)
}

fn build_arrays(columns: &[Column]) -> Vec<ArrayRef> {
    columns
        .iter()
        .map(|column| match &column.values {
            ColumnValues::Int64(values) => Arc::new(Int64Array::from(values.clone())) as ArrayRef,
            ColumnValues::Float64(values) => Arc::new(Float64Array::from(values.clone())),
            ColumnValues::Boolean(values) => Arc::new(BooleanArray::from(values.clone())),
            ColumnValues::Utf8(values) => Arc::new(StringArray::from(values.clone())),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tabular::parse_csv;
    use arrow::array::Array;
    use bytes::Bytes;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

    fn read_back(buffer: Vec<u8>) -> Vec<RecordBatch> {
        ParquetRecordBatchReaderBuilder::try_new(Bytes::from(buffer))
            .expect("parquet footer should parse")
            .build()
            .expect("reader should build")
            .collect::<Result<Vec<_>, _>>()
            .expect("batches should decode")
    }

    #[test]
    fn encoded_buffer_is_a_parquet_file() {
        let table = parse_csv(b"id\n1\n").expect("csv should parse");
        let buffer = encode_parquet(&table).expect("encoding should succeed");
        assert!(buffer.starts_with(b"PAR1"));
    }

    #[test]
    fn round_trip_preserves_row_count_and_column_values() {
        let table = parse_csv(b"id,price,city\n1,9.5,Berlin\n2,10,Madrid\n3,,\n")
            .expect("csv should parse");

        let batches = read_back(encode_parquet(&table).expect("encoding should succeed"));
        assert_eq!(batches.len(), 1);
        let batch = &batches[0];
        assert_eq!(batch.num_rows(), 3);
        assert_eq!(batch.num_columns(), 3);

        let ids = batch
            .column(0)
            .as_any()
            .downcast_ref::<Int64Array>()
            .expect("id column should be Int64");
        assert_eq!(ids.value(0), 1);
        assert_eq!(ids.value(1), 2);
        assert_eq!(ids.value(2), 3);

        let prices = batch
            .column(1)
            .as_any()
            .downcast_ref::<Float64Array>()
            .expect("price column should be Float64");
        assert_eq!(prices.value(0), 9.5);
        assert_eq!(prices.value(1), 10.0);
        assert!(prices.is_null(2));

        let cities = batch
            .column(2)
            .as_any()
            .downcast_ref::<StringArray>()
            .expect("city column should be Utf8");
        assert_eq!(cities.value(0), "Berlin");
        assert_eq!(cities.value(1), "Madrid");
        assert!(cities.is_null(2));
    }

    #[test]
    fn header_only_table_encodes_zero_rows() {
        let table = parse_csv(b"id,name\n").expect("csv should parse");

        let batches = read_back(encode_parquet(&table).expect("encoding should succeed"));
        let rows: usize = batches.iter().map(RecordBatch::num_rows).sum();
        assert_eq!(rows, 0);
    }
}
