use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrgChartError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid employee data: {0}")]
    InvalidData(#[from] serde_json::Error),
    #[error("Path is not a file: {0}")]
    NotAFile(String),
    /// Empty or absent record list.
    #[error("No employee data available")]
    MissingInput,
    /// Every record reports to someone else, so nothing can be drawn at the top.
    #[error("No root employee found among {records} records")]
    NoRoot { records: usize },
}

impl OrgChartError {
    /// Both variants the chart shows as "no data available".
    pub fn is_empty_chart(&self) -> bool {
        matches!(self, OrgChartError::MissingInput | OrgChartError::NoRoot { .. })
    }
}
