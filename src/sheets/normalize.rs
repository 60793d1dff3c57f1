use std::collections::HashMap;

use super::{CellValue, NormalizedSheet, RawGrid, Record};

/// Turn a raw grid into named records.
///
/// The first row supplies the column names. Blank names become `Column{i}`
/// and repeats of an already-resolved name get `_1`, `_2`, ... appended.
/// A suffixed name is not checked again, so `["A", "A", "A_1"]` resolves to
/// `["A", "A_1", "A_1"]`.
pub fn normalize(grid: &RawGrid) -> NormalizedSheet {
    let Some((header_row, rows)) = grid.split_first() else {
        return NormalizedSheet::default();
    };

    let headers = resolve_headers(header_row);

    let records = rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let mut record = Record::with_id(index);
            for (i, header) in headers.iter().enumerate() {
                let value = row.get(i).cloned().unwrap_or(CellValue::Null);
                record.insert(header.clone(), value);
            }
            record
        })
        .collect();

    NormalizedSheet { records, headers }
}

fn resolve_headers(header_row: &[CellValue]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();

    header_row
        .iter()
        .enumerate()
        .map(|(index, cell)| {
            let mut name = cell.to_key();
            if name.is_empty() {
                name = format!("Column{}", index);
            }

            match seen.get_mut(&name) {
                Some(count) => {
                    *count += 1;
                    format!("{}_{}", name, count)
                }
                None => {
                    seen.insert(name.clone(), 0);
                    name
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn row(cells: &[&str]) -> Vec<CellValue> {
        cells.iter().map(|c| CellValue::text(*c)).collect()
    }

    #[test]
    fn empty_grid_yields_nothing() {
        let sheet = normalize(&Vec::new());
        assert!(sheet.records.is_empty());
        assert!(sheet.headers.is_empty());
    }

    #[test]
    fn header_only_grid_has_headers_and_no_records() {
        let sheet = normalize(&vec![row(&["status", "amount"])]);
        assert_eq!(sheet.headers, vec!["status", "amount"]);
        assert!(sheet.records.is_empty());
    }

    #[test]
    fn blank_headers_take_their_column_index() {
        let grid = vec![vec![CellValue::text(""), CellValue::text("Name"), CellValue::Null]];
        let sheet = normalize(&grid);
        assert_eq!(sheet.headers, vec!["Column0", "Name", "Column2"]);
    }

    #[test]
    fn repeated_headers_get_numeric_suffixes() {
        let sheet = normalize(&vec![row(&["Name", "Age", "Name", "Name"])]);
        assert_eq!(sheet.headers, vec!["Name", "Age", "Name_1", "Name_2"]);
    }

    #[test]
    fn suffix_collisions_are_not_rechecked() {
        let sheet = normalize(&vec![row(&["A", "A", "A_1"])]);
        assert_eq!(sheet.headers, vec!["A", "A_1", "A_1"]);
    }

    #[test]
    fn numeric_headers_are_stringified() {
        let grid = vec![vec![CellValue::Number(2024.0), CellValue::text("x")]];
        assert_eq!(normalize(&grid).headers, vec!["2024", "x"]);
    }

    #[test]
    fn headers_are_unique_and_match_width() {
        let grid = vec![row(&["a", "", "b", "a", "", "b", "c"])];
        let sheet = normalize(&grid);
        assert_eq!(sheet.headers.len(), 7);
        let unique: HashSet<_> = sheet.headers.iter().collect();
        assert_eq!(unique.len(), 7);
    }

    #[test]
    fn short_rows_pad_with_null_and_long_rows_truncate() {
        let grid = vec![
            row(&["g", "amount", "note"]),
            row(&["a"]),
            row(&["b", "10", "x", "ignored"]),
        ];
        let sheet = normalize(&grid);

        assert_eq!(sheet.records.len(), 2);
        let first = &sheet.records[0];
        assert_eq!(first.id(), Some(0));
        assert_eq!(first.get("g"), Some(&CellValue::text("a")));
        assert_eq!(first.get("amount"), Some(&CellValue::Null));
        assert_eq!(first.get("note"), Some(&CellValue::Null));

        let second = &sheet.records[1];
        assert_eq!(second.id(), Some(1));
        assert_eq!(second.get("note"), Some(&CellValue::text("x")));
        assert_eq!(second.len(), 4);
    }

    #[test]
    fn header_named_id_overwrites_synthetic_id() {
        let grid = vec![row(&["id", "v"]), row(&["abc", "1"])];
        let sheet = normalize(&grid);
        let record = &sheet.records[0];
        assert_eq!(record.get("id"), Some(&CellValue::text("abc")));
        assert_eq!(record.keys().next().map(String::as_str), Some("id"));
    }

    #[test]
    fn normalizing_twice_is_identical() {
        let grid = vec![row(&["x", "x", ""]), row(&["1", "2", "3"]), row(&["4"])];
        assert_eq!(normalize(&grid), normalize(&grid));
    }
}
