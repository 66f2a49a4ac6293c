//! Accident detail page extraction

use crate::crawler::selector;
use crate::record::{AccidentField, AccidentRecord};
use crate::ParseError;
use scraper::{ElementRef, Html};

/// Extracts an accident record from a detail page
///
/// Only the first table on the page is read. Each row with at least two cells is a
/// `label: value` pair; labels known to [`AccidentField`] fill the matching column, all
/// others are ignored. Columns the page does not mention stay empty, so a page without a
/// table still yields a record keyed by `source_url`.
pub fn extract_details(document: &Html, source_url: &str) -> Result<AccidentRecord, ParseError> {
    let table_selector = selector("table")?;
    let row_selector = selector("tr")?;

    let mut record = AccidentRecord::new(source_url);

    let Some(table) = document.select(&table_selector).next() else {
        tracing::debug!("No table on detail page {}", source_url);
        return Ok(record);
    };

    for row in table.select(&row_selector) {
        let cells: Vec<ElementRef> = row
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|cell| cell.value().name() == "td")
            .collect();

        if cells.len() < 2 {
            continue;
        }

        let label = cell_text(&cells[0]);
        let label = label.trim_end_matches(':').trim_end();

        match AccidentField::from_page_label(label) {
            Some(field) => record.set(field, cell_text(&cells[1])),
            None => tracing::trace!("Ignoring unknown field {:?} on {}", label, source_url),
        }
    }

    Ok(record)
}

/// Text content of a cell with runs of whitespace collapsed
fn cell_text(cell: &ElementRef) -> String {
    cell.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
