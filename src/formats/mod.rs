pub mod delimited;
pub mod parquet;
