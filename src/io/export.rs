//! Export a predicted defect curve to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{PredictionRequest, PredictionResult};
use crate::error::AppError;

/// Write a predicted monthly curve to a CSV file.
pub fn write_prediction_csv(
    path: &Path,
    request: &PredictionRequest,
    result: &PredictionResult,
) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_prediction_rows(&mut file, request, result)
}

/// Write the CSV body to any writer.
pub fn write_prediction_rows<W: Write>(
    out: &mut W,
    request: &PredictionRequest,
    result: &PredictionResult,
) -> Result<(), AppError> {
    writeln!(out, "month,project_size,expected_defects,cumulative_defects")
        .map_err(|e| AppError::io(format!("Failed to write export CSV header: {e}")))?;

    let mut cumulative = 0.0;
    for (&month, &defects) in result.months.iter().zip(result.monthly_distribution.iter()) {
        cumulative += defects;
        writeln!(
            out,
            "{},{},{:.1},{:.1}",
            month, request.project_size, defects, cumulative
        )
        .map_err(|e| AppError::io(format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_carry_running_total() {
        let request = PredictionRequest::new(1200.0, 3).unwrap();
        let result = PredictionResult {
            total_defects_estimated: 6,
            monthly_distribution: vec![1.5, 3.0, 1.5],
            months: vec![1, 2, 3],
        };
        let mut buf = Vec::new();
        write_prediction_rows(&mut buf, &request, &result).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let expected = concat!(
            "month,project_size,expected_defects,cumulative_defects\n",
            "1,1200,1.5,1.5\n",
            "2,1200,3.0,4.5\n",
            "3,1200,1.5,6.0\n",
        );
        assert_eq!(text, expected);
    }
}
