/// Derives the destination key for a transformed object: the first `.csv`
/// occurrence in the source key is replaced by `.parquet`, as a literal
/// substring substitution rather than a path-aware extension change. Keys
/// without a `.csv` segment pass through unchanged.
pub fn destination_object_key(source_key: &str) -> String {
    source_key.replacen(".csv", ".parquet", 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_csv_suffix_with_parquet() {
        assert_eq!(
            destination_object_key("reports/daily.csv"),
            "reports/daily.parquet"
        );
    }

    #[test]
    fn replaces_only_the_first_occurrence() {
        assert_eq!(
            destination_object_key("archive.csv/daily.csv"),
            "archive.parquet/daily.csv"
        );
    }

    #[test]
    fn leaves_keys_without_csv_segment_unchanged() {
        assert_eq!(destination_object_key("reports/daily.txt"), "reports/daily.txt");
    }
}
