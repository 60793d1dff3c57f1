use super::{GroupedRecords, Record};

/// Bucket records by the string value of `column`.
///
/// Records with a null or missing value land in the `""` bucket. Buckets and
/// the records inside them keep the order they were first seen in.
pub fn group_by_column(records: &[Record], column: &str) -> GroupedRecords {
    let mut groups = GroupedRecords::new();

    for record in records {
        let key = record.get(column).map(|v| v.to_key()).unwrap_or_default();
        groups.entry(key).or_default().push(record.clone());
    }

    groups
}
