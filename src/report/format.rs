//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the fitting/prediction code stays clean and testable
//! - output changes are localized (important for snapshot-style tests)

use crate::domain::{
    CalibrationMethod, FitConfig, FittedModel, PredictionRequest, PredictionResult,
};
use crate::fit::ShapeFit;
use crate::io::IngestedData;
use crate::validation::{HoldoutConfig, HoldoutReport};

/// Format the training summary (dataset stats + shape fit + calibration).
pub fn format_training_summary(
    ingest: &IngestedData,
    model: &FittedModel,
    shape_fit: &ShapeFit,
    config: &FitConfig,
) -> String {
    let mut out = String::new();

    out.push_str("=== rayleigh - defect curve fit ===\n");
    out.push_str(&format!(
        "Rows: read={} used={} rejected={}\n",
        ingest.rows_read,
        ingest.rows_used,
        ingest.row_errors.len()
    ));
    for e in &ingest.row_errors {
        out.push_str(&format!(
            "  line {} ({}): {}\n",
            e.line,
            e.id.as_deref().unwrap_or("-"),
            e.message
        ));
    }
    out.push_str(&format!(
        "Projects: n={} | size=[{}, {}] | duration=[{}, {}] months | defects={}\n",
        ingest.stats.n_records,
        fmt_num(ingest.stats.size_min),
        fmt_num(ingest.stats.size_max),
        ingest.stats.duration_min,
        ingest.stats.duration_max,
        fmt_num(ingest.stats.total_defects),
    ));

    out.push_str("\nShape search:\n");
    out.push_str(&format!(
        "- grid: {} points in [{}, {}] months, refine={}\n",
        config.shape_steps, config.shape_min, config.shape_max, config.refine_iters
    ));
    out.push_str(&format!(
        "- sigma = {:.4} months{}\n",
        model.shape_parameter,
        if shape_fit.refined { " (refined)" } else { "" }
    ));
    out.push_str(&format!(
        "- SSE={:.3} SST={:.3} R2={:.4}\n",
        shape_fit.sse, shape_fit.sst, model.fit_score
    ));
    out.push_str(&format!(
        "- records used={} skipped (zero defects)={}\n",
        model.records_used, model.records_skipped
    ));

    out.push_str("\nCalibration:\n");
    out.push_str(&format!("- {}\n", fmt_calibration(model)));
    out.push_str(&format!("- R2={:.4}\n", model.calibration.score));

    let usable = ingest.records.iter().filter(|r| !r.is_degenerate());
    out.push_str("\nPer-project totals:\n");
    out.push_str(
        format!(
            "{:<16} {:>12} {:>8} {:>12} {:>12}\n",
            "id", "size", "months", "observed", "fitted K"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<16} {:-<12} {:-<8} {:-<12} {:-<12}\n", "", "", "", "", "").trim_end());
    out.push('\n');
    for (record, k) in usable.zip(shape_fit.totals.iter()) {
        out.push_str(
            format!(
                "{:<16} {:>12} {:>8} {:>12} {:>12.2}\n",
                truncate(&record.label(), 16),
                fmt_num(record.project_size),
                record.duration_months,
                fmt_num(record.total_defects()),
                k
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Format one prediction as a month-by-month table.
pub fn format_prediction(request: &PredictionRequest, model: &FittedModel, result: &PredictionResult) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Project: size={} duration={} months\n",
        fmt_num(request.project_size),
        request.duration_months
    ));
    out.push_str(&format!(
        "Model: sigma={:.4} | {}\n",
        model.shape_parameter,
        fmt_calibration(model)
    ));
    out.push_str(&format!(
        "Estimated total defects: {}\n",
        result.total_defects_estimated
    ));
    if let Some(peak) = result.peak_month() {
        out.push_str(&format!("Peak month: {peak}\n"));
    }
    out.push('\n');

    out.push_str(format!("{:>6} {:>10} {:>12}\n", "month", "defects", "cumulative").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<6} {:-<10} {:-<12}\n", "", "", "").trim_end());
    out.push('\n');

    let mut cumulative = 0.0;
    for (month, defects) in result.months.iter().zip(result.monthly_distribution.iter()) {
        cumulative += defects;
        out.push_str(&format!("{month:>6} {defects:>10.1} {cumulative:>12.1}\n"));
    }

    out
}

/// Format a hold-out validation report.
pub fn format_holdout(ingest: &IngestedData, report: &HoldoutReport, config: &HoldoutConfig) -> String {
    let mut out = String::new();

    out.push_str("=== rayleigh - hold-out validation ===\n");
    out.push_str(&format!(
        "Projects: {} | train={} test={} | seed={} test_fraction={}\n",
        ingest.stats.n_records, report.train_count, report.test_count, config.seed, config.test_fraction
    ));
    out.push_str(&format!(
        "Model (train split): sigma={:.4} fit R2={:.4} | {}\n\n",
        report.model.shape_parameter,
        report.model.fit_score,
        fmt_calibration(&report.model)
    ));

    out.push_str(
        format!(
            "{:<16} {:>12} {:>12} {:>12} {:>10}\n",
            "id", "size", "actual", "predicted", "abs err"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<16} {:-<12} {:-<12} {:-<12} {:-<10}\n", "", "", "", "", "").trim_end());
    out.push('\n');
    for row in &report.rows {
        out.push_str(&format!(
            "{:<16} {:>12} {:>12} {:>12.2} {:>10.2}\n",
            truncate(&row.id, 16),
            fmt_num(row.project_size),
            fmt_num(row.actual_total),
            row.predicted_total,
            row.abs_error()
        ));
    }

    out.push_str(&format!("\nMAE={:.3} defects | R2={:.4}\n", report.mae, report.r2));
    out
}

fn fmt_calibration(model: &FittedModel) -> String {
    let c = &model.calibration;
    match c.method {
        CalibrationMethod::Linear => format!(
            "linear: total = {:.4} + {:.6e} * size",
            c.intercept, c.slope
        ),
        CalibrationMethod::Proportional => format!("proportional: total = {:.6e} * size", c.slope),
    }
}

/// Whole numbers print without decimals.
fn fmt_num(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Calibration;
    use chrono::Utc;

    fn model() -> FittedModel {
        FittedModel {
            shape_parameter: 4.0,
            fit_score: 0.95,
            calibration: Calibration {
                method: CalibrationMethod::Proportional,
                slope: 0.001,
                intercept: 0.0,
                score: 1.0,
            },
            trained_at: Utc::now(),
            records_used: 5,
            records_skipped: 0,
        }
    }

    #[test]
    fn prediction_table_has_running_total() {
        let request = PredictionRequest::new(6000.0, 3).unwrap();
        let result = PredictionResult {
            total_defects_estimated: 6,
            monthly_distribution: vec![1.5, 3.0, 1.5],
            months: vec![1, 2, 3],
        };
        let text = format_prediction(&request, &model(), &result);
        assert!(text.contains("Estimated total defects: 6"));
        assert!(text.contains("Peak month: 2"));
        assert!(text.lines().last().unwrap().ends_with("6.0"));
    }

    #[test]
    fn numbers_and_truncation() {
        assert_eq!(fmt_num(50000.0), "50000");
        assert_eq!(fmt_num(2.5), "2.50");
        assert_eq!(truncate("short", 16), "short");
        assert_eq!(truncate("a-very-long-project-id", 8), "a-very-.");
    }

    #[test]
    fn calibration_line_names_method() {
        assert!(fmt_calibration(&model()).starts_with("proportional"));
        let mut linear = model();
        linear.calibration.method = CalibrationMethod::Linear;
        assert!(fmt_calibration(&linear).starts_with("linear"));
    }
}
