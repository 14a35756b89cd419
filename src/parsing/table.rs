/// A GitHub-flavored markdown pipe table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownTable {
    pub headers: Vec<String>,
    /// Body rows, each padded or truncated to the header width
    pub rows: Vec<Vec<String>>,
}

impl MarkdownTable {
    /// Index of the first header for which `pred` holds on its lowercase text.
    pub fn find_column<F>(&self, pred: F) -> Option<usize>
    where
        F: Fn(&str) -> bool,
    {
        self.headers
            .iter()
            .position(|header| pred(&header.to_lowercase()))
    }
}

/// Extracts every pipe table in `markdown`, in document order.
///
/// A table is a header row followed directly by a delimiter row
/// (`|---|:---:|`); the body runs until the first line without a pipe.
/// Anything that does not fit this shape is skipped, never an error.
pub fn parse_tables(markdown: &str) -> Vec<MarkdownTable> {
    let lines: Vec<&str> = markdown.lines().collect();
    let mut tables = Vec::new();
    let mut i = 0;

    while i + 1 < lines.len() {
        if !is_row(lines[i]) || !is_delimiter(lines[i + 1]) {
            i += 1;
            continue;
        }

        let headers = split_row(lines[i]);
        let width = headers.len();
        let mut rows = Vec::new();
        i += 2;

        while i < lines.len() && is_row(lines[i]) {
            let mut cells = split_row(lines[i]);
            cells.resize(width, String::new());
            rows.push(cells);
            i += 1;
        }

        tables.push(MarkdownTable { headers, rows });
    }

    tables
}

fn is_row(line: &str) -> bool {
    line.trim().contains('|')
}

fn is_delimiter(line: &str) -> bool {
    if !is_row(line) {
        return false;
    }
    let cells = split_row(line);
    !cells.is_empty()
        && cells.iter().all(|cell| {
            let inner = cell.trim_start_matches(':').trim_end_matches(':');
            !inner.is_empty() && inner.chars().all(|c| c == '-')
        })
}

fn split_row(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let trimmed = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix('|').unwrap_or(trimmed);

    // \| is a literal pipe inside a cell
    trimmed
        .replace("\\|", "\u{0}")
        .split('|')
        .map(|cell| cell.replace('\u{0}', "|").trim().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_table() {
        let md = "Intro\n\n| A | B |\n|---|:--:|\n| 1 | 2 |\n| 3 |\n\nAfter";
        let tables = parse_tables(md);

        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].headers, vec!["A", "B"]);
        assert_eq!(tables[0].rows, vec![vec!["1", "2"], vec!["3", ""]]);
    }

    #[test]
    fn test_parse_tables_without_outer_pipes() {
        let md = "Name | Weight\n--- | ---\nFoo | 10%\n";
        let tables = parse_tables(md);
        assert_eq!(tables[0].rows[0], vec!["Foo", "10%"]);
    }

    #[test]
    fn test_escaped_pipe() {
        let md = "| A | B |\n|---|---|\n| x \\| y | 2 |";
        let tables = parse_tables(md);
        assert_eq!(tables[0].rows[0][0], "x | y");
    }

    #[test]
    fn test_header_without_delimiter_is_not_a_table() {
        let md = "| A | B |\n| 1 | 2 |";
        assert!(parse_tables(md).is_empty());
    }

    #[test]
    fn test_multiple_tables() {
        let md = "| A |\n|---|\n| 1 |\n\ntext\n\n| B |\n|---|\n| 2 |";
        let tables = parse_tables(md);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[1].headers, vec!["B"]);
    }

    #[test]
    fn test_find_column() {
        let table = &parse_tables("| Asset | Allocation % |\n|---|---|\n")[0];
        assert_eq!(table.find_column(|h| h.contains("alloc")), Some(1));
        assert_eq!(table.find_column(|h| h.contains("horizon")), None);
    }
}
