use std::borrow::Cow;
use std::fmt::Write as _;
use unicode_width::UnicodeWidthStr;

pub struct TablePrint {
    headers: Vec<Cow<'static, str>>,
    rows: Vec<Vec<String>>,
}

impl TablePrint {
    pub fn new_with_headers<S: Into<Cow<'static, str>>>(headers: Vec<S>) -> Self {
        Self {
            headers: headers.into_iter().map(|i| i.into()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn add_row(&mut self, row: Vec<String>) -> &mut Self {
        self.rows.push(row);
        self
    }

    /// Lays the table out with every column as wide as its widest cell.
    /// Widths ignore ANSI color codes so colored cells still line up.
    pub fn render(&self) -> String {
        let num_columns = self.headers.len();
        let mut column_widths: Vec<usize> = self
            .headers
            .iter()
            .map(|header| UnicodeWidthStr::width(header.as_ref()))
            .collect();

        for row in &self.rows {
            for (i, item) in row.iter().enumerate().take(num_columns) {
                column_widths[i] = column_widths[i].max(visible_width(item));
            }
        }

        let mut out = String::new();

        let header_line = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, header)| format!("{:<width$}", header, width = column_widths[i]))
            .collect::<Vec<_>>()
            .join("   ");
        let _ = writeln!(out, "{}", header_line.trim_end());

        for row in &self.rows {
            let line = row
                .iter()
                .enumerate()
                .take(num_columns)
                .map(|(i, item)| {
                    let padding = column_widths[i].saturating_sub(visible_width(item));
                    format!("{}{:padding$}", item, "", padding = padding)
                })
                .collect::<Vec<_>>()
                .join("   ");
            let _ = writeln!(out, "{}", line.trim_end());
        }

        out
    }

    pub fn print(&self) {
        print!("{}", self.render());
    }
}

fn visible_width(s: &str) -> usize {
    strip_ansi_escapes::strip_str(s).width()
}
