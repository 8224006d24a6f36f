//! Artifact export port trait.

use crate::domain::analysis::{AnalysisResult, Projection};
use crate::domain::error::PortvisError;
use std::path::PathBuf;

/// Port for writing analysis artifacts.
pub trait ExportPort {
    /// Writes the returns table, metrics and index. Returns the files written.
    fn write_analysis(&self, result: &AnalysisResult) -> Result<Vec<PathBuf>, PortvisError>;

    fn write_projection(&self, projection: &Projection) -> Result<Vec<PathBuf>, PortvisError>;

    /// Default implementation: both of the above.
    fn write_all(
        &self,
        result: &AnalysisResult,
        projection: &Projection,
    ) -> Result<Vec<PathBuf>, PortvisError> {
        let mut written = self.write_analysis(result)?;
        written.extend(self.write_projection(projection)?);
        Ok(written)
    }
}
