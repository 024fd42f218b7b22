use crate::model::{IngestError, VisitRecord};

/// A place the serving dataset can be loaded from. The server tries the
/// database first and falls back to the cleaned CSV.
#[async_trait::async_trait]
pub trait VisitSource: Send + Sync {
    /// Human-readable origin for log lines.
    fn describe(&self) -> String;

    async fn load(&self) -> Result<Vec<VisitRecord>, IngestError>;
}

/// Cleaned-CSV fallback source.
pub struct CsvFileSource {
    pub path: String,
}

#[async_trait::async_trait]
impl VisitSource for CsvFileSource {
    fn describe(&self) -> String {
        format!("cleaned CSV {}", self.path)
    }

    async fn load(&self) -> Result<Vec<VisitRecord>, IngestError> {
        super::reader::read_cleaned_csv(&self.path)
    }
}
