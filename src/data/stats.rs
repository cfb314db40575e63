use serde::Serialize;

use super::model::{Field, Table};

/// Number of equal-width bins of the `Total` histogram.
pub const HISTOGRAM_BINS: usize = 30;

// ---------------------------------------------------------------------------
// Total summary
// ---------------------------------------------------------------------------

/// Count, sum and mean of the `Total` column.
///
/// `count` is every record; `sum` and `mean` only see values that coerce to
/// numbers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalSummary {
    pub count: usize,
    pub numeric_count: usize,
    pub sum: f64,
    pub mean: Option<f64>,
}

/// Summarize `Total`; `None` when the column is not part of the table.
pub fn summarize(table: &Table) -> Option<TotalSummary> {
    let totals: Vec<f64> = table
        .column(Field::Total)?
        .filter_map(|cell| cell.as_f64())
        .collect();

    let sum: f64 = totals.iter().sum();
    let mean = if totals.is_empty() {
        None
    } else {
        Some(sum / totals.len() as f64)
    };

    Some(TotalSummary {
        count: table.len(),
        numeric_count: totals.len(),
        sum,
        mean,
    })
}

// ---------------------------------------------------------------------------
// Chart series
// ---------------------------------------------------------------------------

/// Month columns transposed for the line chart, plus the numeric totals for
/// the histogram.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MonthlySeries {
    /// January first; each series has one entry per record, or is empty when
    /// the month is not selected.
    pub months: [Vec<Option<f64>>; 12],
    /// Numeric `Total` values, non-numeric ones skipped.
    pub totals: Vec<f64>,
    pub records: usize,
}

impl MonthlySeries {
    /// Points `[month, value]` (month 1..=12) of one record's line; missing
    /// values and unselected months are left out.
    pub fn record_line(&self, record: usize) -> Vec<[f64; 2]> {
        self.months
            .iter()
            .enumerate()
            .filter_map(|(m, series)| {
                let value = series.get(record).copied().flatten()?;
                Some([(m + 1) as f64, value])
            })
            .collect()
    }

    /// Whether any month column contributed values.
    pub fn has_months(&self) -> bool {
        self.months.iter().any(|series| !series.is_empty())
    }
}

pub fn series_for(table: &Table) -> MonthlySeries {
    let months = std::array::from_fn(|m| match table.column(Field::MONTHS[m]) {
        Some(column) => column.map(|cell| cell.as_f64()).collect::<Vec<_>>(),
        None => Vec::new(),
    });

    let totals = table
        .column(Field::Total)
        .map(|column| column.filter_map(|cell| cell.as_f64()).collect())
        .unwrap_or_default();

    MonthlySeries {
        months,
        totals,
        records: table.len(),
    }
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// Equal-width bins over `[min, max]`; the last bin includes `max`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Histogram {
    /// `counts.len() + 1` bin edges, ascending.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn from_values(values: &[f64], bins: usize) -> Self {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() || bins == 0 {
            return Histogram::default();
        }

        let mut lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let mut hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / bins as f64;
        let edges: Vec<f64> = (0..=bins)
            .map(|i| if i == bins { hi } else { lo + width * i as f64 })
            .collect();
        let mut counts = vec![0usize; bins];
        for v in finite {
            let idx = (((v - lo) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }

        Histogram { edges, counts }
    }

    pub fn bin_width(&self) -> f64 {
        match self.edges.as_slice() {
            [first, second, ..] => second - first,
            _ => 0.0,
        }
    }

    /// `(center, count)` per bin.
    pub fn bars(&self) -> impl Iterator<Item = (f64, usize)> + '_ {
        self.edges
            .windows(2)
            .zip(&self.counts)
            .map(|(edge, &count)| ((edge[0] + edge[1]) / 2.0, count))
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
