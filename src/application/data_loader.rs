// Data loader - Parse the dispatch CSV and split it into technicians and requests
use crate::domain::record::{CellValue, Record};
use crate::domain::selection::Selected;
use crate::domain::service_request::ServiceRequest;
use crate::domain::technician::Technician;
use crate::infrastructure::csv_source::{CsvSource, FetchError};
use thiserror::Error;

/// Default number of leading rows treated as technicians
pub const DEFAULT_TECHNICIAN_COUNT: usize = 10;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to fetch dataset: {0}")]
    Fetch(#[from] FetchError),
    #[error("failed to parse dataset CSV: {0}")]
    Parse(#[from] csv::Error),
}

/// Everything loaded at startup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub technicians: Vec<Technician>,
    pub requests: Vec<ServiceRequest>,
    /// Number of non-empty data rows parsed
    pub total_rows: usize,
}

impl Dataset {
    pub fn technician_at(&self, index: usize) -> Option<Selected<Technician>> {
        let tech = self.technicians.get(index)?;
        Some(Selected::new(index, tech.clone()))
    }

    pub fn request_at(&self, index: usize) -> Option<Selected<ServiceRequest>> {
        let request = self.requests.get(index)?;
        Some(Selected::new(index, request.clone()))
    }

    /// First technician row carrying this id.
    pub fn find_technician(&self, id: &str) -> Option<Selected<Technician>> {
        let index = self
            .technicians
            .iter()
            .position(|t| t.id.as_deref() == Some(id))?;
        self.technician_at(index)
    }

    /// First request row carrying this id.
    pub fn find_request(&self, id: &str) -> Option<Selected<ServiceRequest>> {
        let index = self.requests.iter().position(|r| r.id == id)?;
        self.request_at(index)
    }
}

/// Fetch and parse the dataset.
pub async fn load_dataset(
    source: &CsvSource,
    technician_count: usize,
) -> Result<Dataset, LoadError> {
    let text = source.fetch().await?;
    let dataset = parse_dataset(&text, technician_count)?;

    tracing::info!(
        "Loaded {} technicians and {} service requests from {} rows ({})",
        dataset.technicians.len(),
        dataset.requests.len(),
        dataset.total_rows,
        source
    );
    Ok(dataset)
}

/// Rows `[0, technician_count)` become technicians regardless of content;
/// the remainder become requests if they carry an id and both coordinates.
pub fn parse_dataset(text: &str, technician_count: usize) -> Result<Dataset, LoadError> {
    let records = parse_records(text)?;
    let total_rows = records.len();
    let split = technician_count.min(total_rows);
    let (technician_rows, request_rows) = records.split_at(split);

    let technicians = technician_rows.iter().map(Technician::from_record).collect();

    let mut requests = Vec::with_capacity(request_rows.len());
    for (offset, record) in request_rows.iter().enumerate() {
        match ServiceRequest::from_record(record.clone()) {
            Some(request) => requests.push(request),
            None => tracing::debug!(
                "Skipping row {}: missing latitude, longitude or request id",
                split + offset
            ),
        }
    }

    Ok(Dataset {
        technicians,
        requests,
        total_rows,
    })
}

/// Header row names the columns; empty lines are skipped and short rows
/// leave their trailing columns null.
pub fn parse_records(text: &str) -> Result<Vec<Record>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let mut records = Vec::new();

    for row in reader.records() {
        let row = row?;
        let record = headers
            .iter()
            .zip(row.iter())
            .map(|(column, cell)| (column, CellValue::infer(cell)))
            .collect::<Record>();
        records.push(record);
    }

    Ok(records)
}
