use std::path::Path;

use serde::Serialize;

use crate::error::{PipelineError, Result};
use crate::reviews::{Review, ReviewTable};

/// Header names binding the corpus CSV to the fields the pipeline needs.
/// The defaults match the cleaned beer-review dataset.
#[derive(Debug, Clone)]
pub struct ColumnBindings {
    pub category: String,
    pub item_id: String,
    pub item_name: String,
    pub abv: String,
    pub style: String,
    pub brewery: String,
    pub reviewer: String,
    pub rating: String,
}

impl Default for ColumnBindings {
    fn default() -> Self {
        ColumnBindings {
            category: "beer_type".to_string(),
            item_id: "Beer_ID".to_string(),
            item_name: "Beer_Name".to_string(),
            abv: "ABV".to_string(),
            style: "Style".to_string(),
            brewery: "Brewery".to_string(),
            reviewer: "Reviewer".to_string(),
            rating: "Mean_Review".to_string(),
        }
    }
}

/// Reads the review corpus from a headered CSV file. A configured column
/// missing from the header is a schema error naming that column; a rating
/// cell that does not parse as a number fails the row it appears on.
pub fn read_reviews<P: AsRef<Path>>(path: P, columns: &ColumnBindings) -> Result<ReviewTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;
    let headers = reader.headers()?.clone();

    let position = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|header| header == name)
            .ok_or_else(|| PipelineError::MissingColumn(name.to_string()))
    };

    let category_idx = position(&columns.category)?;
    let item_id_idx = position(&columns.item_id)?;
    let item_name_idx = position(&columns.item_name)?;
    let abv_idx = position(&columns.abv)?;
    let style_idx = position(&columns.style)?;
    let brewery_idx = position(&columns.brewery)?;
    let reviewer_idx = position(&columns.reviewer)?;
    let rating_idx = position(&columns.rating)?;

    let cell = |record: &csv::StringRecord, idx: usize| -> String {
        record.get(idx).unwrap_or_default().to_string()
    };

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        // line numbers are 1-based and account for the header row
        let row_number = line + 2;
        let raw_rating = record.get(rating_idx).unwrap_or_default();
        let rating: f64 = raw_rating
            .trim()
            .parse()
            .map_err(|_| PipelineError::MalformedRow {
                row: row_number,
                message: format!("rating '{}' is not a number", raw_rating),
            })?;
        // ABV is metadata only and missing for some beers in the source data
        let abv = record
            .get(abv_idx)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .and_then(|value| value.parse::<f64>().ok());

        rows.push(Review {
            category: cell(&record, category_idx),
            item_id: cell(&record, item_id_idx),
            item_name: cell(&record, item_name_idx),
            abv,
            style: cell(&record, style_idx),
            brewery: cell(&record, brewery_idx),
            reviewer: cell(&record, reviewer_idx),
            rating,
        });
    }

    log::info!("read {} review rows", rows.len());
    Ok(ReviewTable::new(rows))
}

/// Writes one of the pipeline output tables as a headered CSV file.
pub fn write_records<P: AsRef<Path>, S: Serialize>(path: P, records: &[S]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the cross-validation scoring report in the line format downstream
/// tooling greps for.
pub fn write_scoring_report<P: AsRef<Path>>(
    path: P,
    average_precision: f64,
    average_recall: f64,
) -> Result<()> {
    let report = format!(
        "Average Precision of Model: {:.3}\nAverage Recall of Model: {:.3}\n",
        average_precision, average_recall
    );
    std::fs::write(path, report)?;
    Ok(())
}
