use ingest_pipeline_core::contract::UploadRecord;

pub trait MetadataTable {
    /// Writes the record keyed by filename, overwriting any earlier record
    /// for the same filename.
    fn put_upload_record(&self, record: &UploadRecord) -> Result<(), String>;
}
