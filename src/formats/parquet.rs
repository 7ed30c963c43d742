use anyhow::{bail, Context, Result};
use arrow::array::{
    ArrayRef, AsArray, Date32Builder, Float32Builder, Float64Builder, Int32Builder,
    Int64Builder, RecordBatch, StringBuilder, TimestampMillisecondBuilder,
};
use arrow::compute::cast;
use arrow::datatypes::{
    DataType, Date32Type, Field, Float32Type, Float64Type, Int32Type, Int64Type,
    Schema as ArrowSchema, TimeUnit, TimestampMillisecondType,
};
use log::{debug, info};
use parquet::arrow::arrow_reader::{ParquetRecordBatchReader, ParquetRecordBatchReaderBuilder};
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ConvertedType};
use parquet::file::properties::WriterProperties;
use parquet::schema::types::Type;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use crate::models::{Schema, TypeCode, TypedRecord, TypedValue};
use crate::tree::SchemaNode;

const UTC: &str = "UTC";

/// Arrow type used to store each logical type.
pub fn arrow_data_type(type_code: TypeCode) -> DataType {
    match type_code {
        TypeCode::Int64 => DataType::Int64,
        TypeCode::Int32 => DataType::Int32,
        TypeCode::Double => DataType::Float64,
        TypeCode::Float32 => DataType::Float32,
        TypeCode::ByteArray => DataType::Utf8,
        TypeCode::Date => DataType::Date32,
        TypeCode::TimestampMillis => DataType::Timestamp(TimeUnit::Millisecond, Some(UTC.into())),
    }
}

pub fn arrow_schema(schema: &Schema) -> ArrowSchema {
    let fields: Vec<Field> = schema
        .columns()
        .iter()
        .map(|c| Field::new(c.name.as_str(), arrow_data_type(c.type_code), false))
        .collect();
    ArrowSchema::new(fields)
}

/// Build the nested description of a Parquet schema.
///
/// Leaves report their physical type and, when set, their converted type.
pub fn schema_node(ty: &Type) -> SchemaNode {
    let info = ty.get_basic_info();
    if ty.is_group() {
        let children = ty.get_fields().iter().map(|f| schema_node(f)).collect();
        return SchemaNode::group(info.name(), children);
    }

    let physical = format!("{:?}", ty.get_physical_type());
    let logical = match info.converted_type() {
        ConvertedType::NONE => None,
        converted => Some(format!("{:?}", converted)),
    };
    SchemaNode::leaf(info.name(), &physical, logical.as_deref())
}

enum ColumnBuilder {
    Int64(Int64Builder),
    Int32(Int32Builder),
    Double(Float64Builder),
    Float32(Float32Builder),
    Text(StringBuilder),
    Date(Date32Builder),
    Timestamp(TimestampMillisecondBuilder),
}

impl ColumnBuilder {
    fn new(type_code: TypeCode) -> Self {
        match type_code {
            TypeCode::Int64 => ColumnBuilder::Int64(Int64Builder::new()),
            TypeCode::Int32 => ColumnBuilder::Int32(Int32Builder::new()),
            TypeCode::Double => ColumnBuilder::Double(Float64Builder::new()),
            TypeCode::Float32 => ColumnBuilder::Float32(Float32Builder::new()),
            TypeCode::ByteArray => ColumnBuilder::Text(StringBuilder::new()),
            TypeCode::Date => ColumnBuilder::Date(Date32Builder::new()),
            TypeCode::TimestampMillis => {
                ColumnBuilder::Timestamp(TimestampMillisecondBuilder::new().with_timezone(UTC))
            }
        }
    }

    fn type_code(&self) -> TypeCode {
        match self {
            ColumnBuilder::Int64(_) => TypeCode::Int64,
            ColumnBuilder::Int32(_) => TypeCode::Int32,
            ColumnBuilder::Double(_) => TypeCode::Double,
            ColumnBuilder::Float32(_) => TypeCode::Float32,
            ColumnBuilder::Text(_) => TypeCode::ByteArray,
            ColumnBuilder::Date(_) => TypeCode::Date,
            ColumnBuilder::Timestamp(_) => TypeCode::TimestampMillis,
        }
    }

    fn append(&mut self, value: &TypedValue) -> Result<()> {
        match (self, value) {
            (ColumnBuilder::Int64(b), TypedValue::Int64(v)) => b.append_value(*v),
            (ColumnBuilder::Int32(b), TypedValue::Int32(v)) => b.append_value(*v),
            (ColumnBuilder::Double(b), TypedValue::Double(v)) => b.append_value(*v),
            (ColumnBuilder::Float32(b), TypedValue::Float32(v)) => b.append_value(*v),
            (ColumnBuilder::Text(b), TypedValue::Text(v)) => b.append_value(v),
            (ColumnBuilder::Date(b), TypedValue::Date(v)) => b.append_value(*v),
            (ColumnBuilder::Timestamp(b), TypedValue::TimestampMillis(v)) => b.append_value(*v),
            (_, other) => bail!(
                "value {} ({}) does not match its column",
                other,
                other.type_code()
            ),
        }
        Ok(())
    }

    fn finish(&mut self) -> ArrayRef {
        match self {
            ColumnBuilder::Int64(b) => Arc::new(b.finish()),
            ColumnBuilder::Int32(b) => Arc::new(b.finish()),
            ColumnBuilder::Double(b) => Arc::new(b.finish()),
            ColumnBuilder::Float32(b) => Arc::new(b.finish()),
            ColumnBuilder::Text(b) => Arc::new(b.finish()),
            ColumnBuilder::Date(b) => Arc::new(b.finish()),
            ColumnBuilder::Timestamp(b) => Arc::new(b.finish()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SinkOptions {
    /// Rows buffered before a record batch is handed to the Parquet writer
    pub batch_size: usize,
    pub compression: Compression,
    pub max_row_group_size: usize,
}

impl Default for SinkOptions {
    fn default() -> Self {
        Self {
            batch_size: 50_000,
            compression: Compression::SNAPPY,
            max_row_group_size: 1024 * 1024,
        }
    }
}

/// Streaming writer of typed records into one Parquet file.
pub struct ParquetSink {
    schema: Arc<ArrowSchema>,
    builders: Vec<ColumnBuilder>,
    writer: ArrowWriter<File>,
    batch_size: usize,
    buffered: usize,
    rows: usize,
}

impl ParquetSink {
    pub fn create<P: AsRef<Path>>(path: P, schema: &Schema, options: &SinkOptions) -> Result<Self> {
        let path = path.as_ref();
        let arrow_schema = Arc::new(arrow_schema(schema));
        let builders = schema
            .columns()
            .iter()
            .map(|c| ColumnBuilder::new(c.type_code))
            .collect();

        let file = File::create(path)
            .with_context(|| format!("Can't create parquet file {}", path.display()))?;
        let props = WriterProperties::builder()
            .set_compression(options.compression)
            .set_max_row_group_size(options.max_row_group_size)
            .build();
        let writer = ArrowWriter::try_new(file, arrow_schema.clone(), Some(props))
            .context("Can't create parquet writer")?;

        Ok(Self {
            schema: arrow_schema,
            builders,
            writer,
            batch_size: options.batch_size.max(1),
            buffered: 0,
            rows: 0,
        })
    }

    pub fn write(&mut self, record: &TypedRecord) -> Result<()> {
        if record.len() != self.builders.len() {
            bail!(
                "record has {} values but the schema has {} columns",
                record.len(),
                self.builders.len()
            );
        }

        // Check the whole record first so a bad value cannot leave the
        // builders with different lengths.
        for (i, (builder, value)) in self.builders.iter().zip(record).enumerate() {
            if builder.type_code() != value.type_code() {
                bail!(
                    "column {} expects {} but got {}",
                    self.schema.field(i).name(),
                    builder.type_code(),
                    value.type_code()
                );
            }
        }

        for (builder, value) in self.builders.iter_mut().zip(record) {
            builder.append(value)?;
        }
        self.buffered += 1;

        if self.buffered >= self.batch_size {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if self.buffered == 0 {
            return Ok(());
        }

        let arrays: Vec<ArrayRef> = self.builders.iter_mut().map(|b| b.finish()).collect();
        let batch = RecordBatch::try_new(self.schema.clone(), arrays)?;
        debug!("Writing batch of {} rows", batch.num_rows());
        self.writer.write(&batch)?;

        self.rows += self.buffered;
        self.buffered = 0;
        Ok(())
    }

    /// Flush buffered rows and close the file. Returns the total row count.
    pub fn finish(mut self) -> Result<usize> {
        self.flush()?;
        self.writer.close().context("WriteStop error")?;
        info!("Wrote {} rows", self.rows);
        Ok(self.rows)
    }
}

/// Reader of an existing Parquet file: metadata plus chunked typed reads.
pub struct ParquetSource {
    builder: ParquetRecordBatchReaderBuilder<File>,
}

impl ParquetSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Can't open file {}", path.display()))?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)
            .context("Can't create parquet reader")?;
        Ok(Self { builder })
    }

    pub fn num_rows(&self) -> i64 {
        self.builder.metadata().file_metadata().num_rows()
    }

    pub fn schema_tree(&self) -> SchemaNode {
        schema_node(self.builder.parquet_schema().root_schema())
    }

    /// Read the file in chunks of `batch_size` rows, typed per `schema`.
    pub fn batches(self, schema: &Schema, batch_size: usize) -> Result<TypedBatches<'_>> {
        let reader = self.builder.with_batch_size(batch_size.max(1)).build()?;
        Ok(TypedBatches { reader, schema })
    }
}

pub struct TypedBatches<'a> {
    reader: ParquetRecordBatchReader,
    schema: &'a Schema,
}

impl Iterator for TypedBatches<'_> {
    type Item = Result<Vec<TypedRecord>>;

    fn next(&mut self) -> Option<Self::Item> {
        let batch = self.reader.next()?;
        Some(
            batch
                .context("Read error")
                .and_then(|batch| batch_to_records(&batch, self.schema)),
        )
    }
}

/// Column values of one batch, cast to the canonical arrow type first.
/// Null cells become the zero value.
fn column_values(array: &ArrayRef, type_code: TypeCode) -> Result<Vec<TypedValue>> {
    let array = cast(array, &arrow_data_type(type_code))?;
    let zero = TypedValue::zero(type_code);

    fn collect<T>(
        values: impl Iterator<Item = Option<T>>,
        wrap: impl Fn(T) -> TypedValue,
        zero: &TypedValue,
    ) -> Vec<TypedValue> {
        values.map(|v| v.map_or_else(|| zero.clone(), &wrap)).collect()
    }

    let values = match type_code {
        TypeCode::Int64 => collect(
            array.as_primitive::<Int64Type>().iter(),
            TypedValue::Int64,
            &zero,
        ),
        TypeCode::Int32 => collect(
            array.as_primitive::<Int32Type>().iter(),
            TypedValue::Int32,
            &zero,
        ),
        TypeCode::Double => collect(
            array.as_primitive::<Float64Type>().iter(),
            TypedValue::Double,
            &zero,
        ),
        TypeCode::Float32 => collect(
            array.as_primitive::<Float32Type>().iter(),
            TypedValue::Float32,
            &zero,
        ),
        TypeCode::ByteArray => collect(
            array.as_string::<i32>().iter(),
            |s| TypedValue::Text(s.to_string()),
            &zero,
        ),
        TypeCode::Date => collect(
            array.as_primitive::<Date32Type>().iter(),
            TypedValue::Date,
            &zero,
        ),
        TypeCode::TimestampMillis => collect(
            array.as_primitive::<TimestampMillisecondType>().iter(),
            TypedValue::TimestampMillis,
            &zero,
        ),
    };

    Ok(values)
}

fn batch_to_records(batch: &RecordBatch, schema: &Schema) -> Result<Vec<TypedRecord>> {
    if batch.num_columns() != schema.n_fields() {
        bail!(
            "batch has {} columns but the schema has {}",
            batch.num_columns(),
            schema.n_fields()
        );
    }

    let mut records: Vec<TypedRecord> = (0..batch.num_rows())
        .map(|_| Vec::with_capacity(schema.n_fields()))
        .collect();

    for (i, column) in schema.columns().iter().enumerate() {
        let values = column_values(batch.column(i), column.type_code)
            .with_context(|| format!("column {}", column.name))?;
        for (record, value) in records.iter_mut().zip(values) {
            record.push(value);
        }
    }

    Ok(records)
}
