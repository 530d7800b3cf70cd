use std::path::{Path, PathBuf};

use tracing::warn;

use crate::args::CompareArgs;
use crate::comparison::{ComparisonReport, MetricSection, compare};
use crate::error::{AppError, AppResult, ValidationError};
use crate::output::RunOutput;

const SECTIONS: [MetricSection; 5] = [
    MetricSection::Http,
    MetricSection::Memory,
    MetricSection::Cpu,
    MetricSection::DiskIo,
    MetricSection::Pids,
];
const COLUMN_GAP: &str = "  ";

pub(crate) async fn run_compare(args: &CompareArgs) -> AppResult<()> {
    validate_inputs(&args.baseline, &args.tests)?;

    let baseline = RunOutput::read_from_path(&args.baseline).await?;
    let mut reports = Vec::with_capacity(args.tests.len());
    for (offset, path) in args.tests.iter().enumerate() {
        let test = RunOutput::read_from_path(path).await?;
        if !baseline.metadata.is_similar(&test.metadata) {
            warn!(
                "Test {} ({}) used a different URL, connection count or duration than the baseline; results may not be comparable.",
                offset.saturating_add(1),
                path.display()
            );
        }
        reports.push(compare(&baseline.summary, &test.summary));
    }

    println!("Baseline: {}", args.baseline.display());
    for (offset, path) in args.tests.iter().enumerate() {
        println!("Test {}: {}", offset.saturating_add(1), path.display());
    }
    println!();
    for line in comparison_lines(&reports) {
        println!("{}", line);
    }
    Ok(())
}

pub(super) fn validate_inputs(baseline: &Path, tests: &[PathBuf]) -> AppResult<()> {
    for path in std::iter::once(baseline).chain(tests.iter().map(PathBuf::as_path)) {
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if !is_json {
            return Err(AppError::validation(ValidationError::CompareNotJson {
                path: path.display().to_string(),
            }));
        }
    }

    let baseline_key = identity(baseline);
    if let Some(duplicate) = tests.iter().find(|path| identity(path) == baseline_key) {
        return Err(AppError::validation(ValidationError::CompareSameFile {
            path: duplicate.display().to_string(),
        }));
    }
    Ok(())
}

fn identity(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// One table per section: metric name, baseline value, then one
/// "value change" column per test run.
pub(super) fn comparison_lines(reports: &[ComparisonReport]) -> Vec<String> {
    let mut header = vec!["Metric".to_owned(), "Baseline".to_owned()];
    header.extend(
        (1..=reports.len()).map(|number| format!("Test {} (Change)", number)),
    );

    let mut lines = Vec::new();
    for section in SECTIONS {
        let Some(template) = reports
            .iter()
            .find(|report| report.section(section).next().is_some())
        else {
            continue;
        };

        let mut rows = vec![header.clone()];
        for change in template.section(section) {
            let mut row = vec![change.name.to_owned(), change.format_value(change.baseline)];
            row.extend(reports.iter().map(|report| {
                report.find(section, change.name).map_or_else(
                    || "-".to_owned(),
                    |found| format!("{} {}", found.format_value(found.test), found.change_string()),
                )
            }));
            rows.push(row);
        }

        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(section.title().to_owned());
        lines.extend(render_table(&rows));
    }
    lines
}

fn render_table(rows: &[Vec<String>]) -> Vec<String> {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let widths = (0..columns)
        .map(|column| {
            rows.iter()
                .filter_map(|row| row.get(column))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect::<Vec<_>>();

    rows.iter()
        .map(|row| {
            let cells = row
                .iter()
                .enumerate()
                .map(|(column, cell)| {
                    let width = widths.get(column).copied().unwrap_or(0);
                    format!("{:<width$}", cell, width = width)
                })
                .collect::<Vec<_>>();
            format!("  {}", cells.join(COLUMN_GAP)).trim_end().to_owned()
        })
        .collect()
}
