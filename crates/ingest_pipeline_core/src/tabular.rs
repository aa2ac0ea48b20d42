//! Row-oriented table parsed from delimited text, with per-column type
//! inference. No schema is declared ahead of parsing; types are inferred
//! from cell content the way a dataframe reader would.

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: ColumnValues,
}

/// Inferred column content. Empty cells become nulls and do not affect the
/// inferred type; inference tries Int64, then Float64, then Boolean, and
/// falls back to Utf8.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Int64(Vec<Option<i64>>),
    Float64(Vec<Option<f64>>),
    Boolean(Vec<Option<bool>>),
    Utf8(Vec<Option<String>>),
}

impl Table {
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabularError {
    message: String,
}

impl TabularError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for TabularError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for TabularError {}

/// Parses header-row CSV bytes into an in-memory table.
pub fn parse_csv(bytes: &[u8]) -> Result<Table, TabularError> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|error| TabularError::new(format!("failed to read CSV header row: {error}")))?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.is_empty() {
        return Err(TabularError::new("CSV input has no columns"));
    }

    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    let mut row_count = 0usize;
    for record in reader.records() {
        // The reader rejects rows whose field count differs from the header.
        let record =
            record.map_err(|error| TabularError::new(format!("failed to read CSV row: {error}")))?;
        for (column, cell) in cells.iter_mut().zip(record.iter()) {
            column.push(if cell.is_empty() {
                None
            } else {
                Some(cell.to_string())
            });
        }
        row_count += 1;
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, raw)| Column {
            name,
            values: infer_column(raw),
        })
        .collect();

    Ok(Table { columns, row_count })
}

fn infer_column(raw: Vec<Option<String>>) -> ColumnValues {
    if let Some(values) = parse_all(&raw, |cell| cell.parse::<i64>().ok()) {
        return ColumnValues::Int64(values);
    }
    if let Some(values) = parse_all(&raw, |cell| cell.parse::<f64>().ok()) {
        return ColumnValues::Float64(values);
    }
    if let Some(values) = parse_all(&raw, parse_bool) {
        return ColumnValues::Boolean(values);
    }
    ColumnValues::Utf8(raw)
}

fn parse_all<T>(
    raw: &[Option<String>],
    parse: impl Fn(&str) -> Option<T>,
) -> Option<Vec<Option<T>>> {
    raw.iter()
        .map(|cell| match cell {
            None => Some(None),
            Some(text) => parse(text).map(Some),
        })
        .collect()
}

fn parse_bool(cell: &str) -> Option<bool> {
    match cell.to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}
