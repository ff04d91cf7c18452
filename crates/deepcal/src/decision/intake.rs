//! CSV intake of forwarder quotes into rankable alternatives.
//!
//! Expected header: `id,name,<criterion columns…>`. Cells may hold plain numbers (currency
//! symbols and thousands separators are ignored, letters are not), an interval `lo..hi`, or be blank / `?` when
//! the value is unknown. Interval and unknown cells become observations for the whitener.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use super::domain::{
    Alternative, CriterionObservation, CriterionSpec, Prior, UncertainObservation,
    WhiteningMethod,
};
use super::grey::field_default;

/// Failures while reading an alternatives CSV.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("failed to read alternatives file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid alternatives CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("alternatives CSV is missing column '{0}'")]
    MissingColumn(String),
    #[error("row {row} column '{column}' holds '{value}', expected a number, lo..hi or a blank")]
    InvalidCell {
        row: usize,
        column: String,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Known(f64),
    Range(f64, f64),
    Unknown,
}

/// Alternatives read from CSV plus the observations their grey cells need.
#[derive(Debug, Clone, PartialEq)]
pub struct AlternativeCsv {
    pub alternatives: Vec<Alternative>,
    pub observations: Vec<CriterionObservation>,
}

impl AlternativeCsv {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        criteria: &[CriterionSpec],
    ) -> Result<Self, IntakeError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, criteria)
    }

    pub fn from_reader<R: Read>(reader: R, criteria: &[CriterionSpec]) -> Result<Self, IntakeError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: HashMap<String, usize> = csv_reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(index, header)| (header.to_ascii_lowercase(), index))
            .collect();
        let column_of = |name: &str| {
            headers
                .get(&name.to_ascii_lowercase())
                .copied()
                .ok_or_else(|| IntakeError::MissingColumn(name.to_string()))
        };
        let id_column = column_of("id")?;
        let name_column = column_of("name")?;
        let criterion_columns = criteria
            .iter()
            .map(|criterion| column_of(&criterion.name))
            .collect::<Result<Vec<_>, _>>()?;

        let mut rows: Vec<(String, String, Vec<Cell>)> = Vec::new();
        for (index, record) in csv_reader.records().enumerate() {
            let record = record?;
            let row = index + 1;
            let id = record.get(id_column).unwrap_or_default().to_string();
            let name = record.get(name_column).unwrap_or_default().to_string();
            let cells = criteria
                .iter()
                .zip(&criterion_columns)
                .map(|(criterion, &column)| {
                    let raw = record.get(column).unwrap_or_default();
                    parse_cell(raw).ok_or_else(|| IntakeError::InvalidCell {
                        row,
                        column: criterion.name.clone(),
                        value: raw.to_string(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            rows.push((id, name, cells));
        }

        let column_priors: Vec<Option<Prior>> = (0..criteria.len())
            .map(|column| {
                let known: Vec<f64> = rows
                    .iter()
                    .filter_map(|(_, _, cells)| match cells[column] {
                        Cell::Known(value) => Some(value),
                        _ => None,
                    })
                    .collect();
                Prior::from_samples(&known)
            })
            .collect();

        let mut alternatives = Vec::with_capacity(rows.len());
        let mut observations = Vec::new();
        for (id, name, cells) in rows {
            let mut values = Vec::with_capacity(cells.len());
            for ((cell, criterion), prior) in cells.into_iter().zip(criteria).zip(&column_priors) {
                match cell {
                    Cell::Known(value) => values.push(value),
                    Cell::Range(lower, upper) => {
                        let prior = Prior::from_range(lower, upper);
                        values.push(prior.mean);
                        observations.push(CriterionObservation::new(
                            id.clone(),
                            UncertainObservation::missing(&criterion.name, WhiteningMethod::Linear)
                                .with_prior(prior),
                        ));
                    }
                    Cell::Unknown => {
                        values.push(field_default(&criterion.name));
                        let mut observation = UncertainObservation::missing(
                            &criterion.name,
                            WhiteningMethod::Exponential,
                        );
                        observation.prior = *prior;
                        observations.push(CriterionObservation::new(id.clone(), observation));
                    }
                }
            }
            alternatives.push(Alternative::new(id, name, values));
        }

        Ok(Self {
            alternatives,
            observations,
        })
    }
}

fn parse_cell(raw: &str) -> Option<Cell> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "?" || trimmed.eq_ignore_ascii_case("n/a") {
        return Some(Cell::Unknown);
    }
    if let Some((lower, upper)) = trimmed.split_once("..") {
        return Some(Cell::Range(parse_number(lower)?, parse_number(upper)?));
    }
    parse_number(trimmed).map(Cell::Known)
}

fn parse_number(raw: &str) -> Option<f64> {
    if raw.chars().any(char::is_alphabetic) {
        return None;
    }
    let cleaned: String = raw
        .chars()
        .filter(|ch| ch.is_ascii_digit() || *ch == '.' || *ch == '-')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}
