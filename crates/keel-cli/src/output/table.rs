//! Plain aligned tables for `--format table`.

/// Narrowest a column is squeezed to when fitting the terminal.
const MIN_COLUMN: usize = 6;
const SEPARATOR: &str = "  ";

#[derive(Clone, Copy, Debug, Default)]
pub struct TableOptions {
    pub max_width: Option<usize>,
    pub color: bool,
}

/// A header row plus string cells. Short rows are padded with `-`.
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    #[must_use]
    pub fn render(&self, options: TableOptions) -> String {
        let mut widths: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(index, header)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(index))
                    .map(|cell| display_width(cell))
                    .max()
                    .unwrap_or(0)
                    .max(display_width(header))
            })
            .collect();
        self.fit(&mut widths, options.max_width);

        let header_line = self
            .headers
            .iter()
            .zip(&widths)
            .map(|(header, width)| pad(&truncate_text(header, *width), *width, false))
            .collect::<Vec<_>>()
            .join(SEPARATOR)
            .trim_end()
            .to_string();

        let divider = "-".repeat(display_width(&header_line));
        let mut lines = Vec::with_capacity(self.rows.len() + 2);
        lines.push(header_line);
        lines.push(divider);

        for row in &self.rows {
            let line = widths
                .iter()
                .enumerate()
                .map(|(index, width)| {
                    let cell = row.get(index).map_or("-", String::as_str);
                    let text = truncate_text(cell, *width);
                    let numeric = looks_numeric(&text);
                    let padded = pad(&text, *width, numeric);
                    if options.color {
                        colorize(&text, padded)
                    } else {
                        padded
                    }
                })
                .collect::<Vec<_>>()
                .join(SEPARATOR);
            lines.push(line.trim_end().to_string());
        }
        lines.join("\n")
    }

    /// Shrink the widest columns one character at a time until the table
    /// fits `max_width` or every column is at its minimum.
    fn fit(&self, widths: &mut [usize], max_width: Option<usize>) {
        let Some(max_width) = max_width else {
            return;
        };
        let separators = widths.len().saturating_sub(1) * SEPARATOR.len();

        while widths.iter().sum::<usize>() + separators > max_width {
            let widest = widths
                .iter()
                .enumerate()
                .filter(|(idx, width)| **width > self.min_width(*idx))
                .max_by_key(|(_, width)| **width)
                .map(|(idx, _)| idx);
            let Some(idx) = widest else {
                break;
            };
            widths[idx] -= 1;
        }
    }

    fn min_width(&self, column: usize) -> usize {
        self.headers
            .get(column)
            .map_or(0, |header| display_width(header))
            .max(MIN_COLUMN)
    }
}

fn display_width(value: &str) -> usize {
    value.chars().count()
}

fn truncate_text(value: &str, width: usize) -> String {
    let single_line = value.replace(['\n', '\r'], " ");
    if display_width(&single_line) <= width {
        return single_line;
    }
    if width <= 1 {
        return "…".to_string();
    }
    let mut out: String = single_line.chars().take(width - 1).collect();
    out.push('…');
    out
}

fn looks_numeric(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty() && trimmed.chars().all(|ch| ch.is_ascii_digit() || ch == '.')
}

fn pad(value: &str, width: usize, right_align: bool) -> String {
    let fill = " ".repeat(width.saturating_sub(display_width(value)));
    if right_align {
        format!("{fill}{value}")
    } else {
        format!("{value}{fill}")
    }
}

/// ANSI colour for decision types and statuses; other cells pass through.
pub fn color_code(value: &str) -> Option<&'static str> {
    match value {
        "active" | "true" => Some("32"),
        "superseded" => Some("2"),
        "constraint" | "false" => Some("31"),
        "product" => Some("34"),
        "process" => Some("35"),
        "learning" => Some("36"),
        _ => None,
    }
}

fn colorize(plain: &str, padded: String) -> String {
    match color_code(plain) {
        Some(code) => {
            let fill = &padded[plain.len().min(padded.len())..];
            format!("\u{1b}[{code}m{plain}\u{1b}[0m{fill}")
        }
        None => padded,
    }
}

#[cfg(test)]
mod tests {
    use super::{Table, TableOptions, truncate_text};

    fn sample() -> Table {
        let mut table = Table::new(["id", "status", "problem"]);
        table.push_row(vec!["DEC-a1b2".into(), "active".into(), "short".into()]);
        table.push_row(vec![
            "DEC-c3d4".into(),
            "superseded".into(),
            "a much longer problem statement".into(),
        ]);
        table
    }

    #[test]
    fn columns_are_aligned() {
        let out = sample().render(TableOptions::default());
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[1].chars().all(|c| c == '-'));
        let status_col = lines[0].find("status").unwrap();
        assert_eq!(lines[2].find("active"), Some(status_col));
        assert_eq!(lines[3].find("superseded"), Some(status_col));
    }

    #[test]
    fn narrow_terminal_truncates_widest_column() {
        let out = sample().render(TableOptions {
            max_width: Some(40),
            color: false,
        });
        assert!(out.lines().all(|line| line.chars().count() <= 40));
        assert!(out.contains('…'));
    }

    #[test]
    fn missing_cells_render_as_dash() {
        let mut table = Table::new(["id", "choice"]);
        table.push_row(vec!["DEC-0001".into()]);
        let out = table.render(TableOptions::default());
        assert!(out.lines().nth(2).is_some_and(|line| line.ends_with('-')));
    }

    #[test]
    fn color_wraps_known_values_only() {
        let out = sample().render(TableOptions {
            max_width: None,
            color: true,
        });
        assert!(out.contains("\u{1b}[32mactive\u{1b}[0m"));
        assert!(!out.contains("\u{1b}[32mDEC"));
    }

    #[test]
    fn truncation_flattens_newlines() {
        assert_eq!(truncate_text("line one\nline two", 40), "line one line two");
        assert_eq!(truncate_text("abcdefgh", 4), "abc…");
    }
}
