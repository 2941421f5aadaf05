#![forbid(unsafe_code)]

use std::io;

/// Plain-text table for CLI listings, padded per column.
#[derive(Debug, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row(&mut self, cols: impl IntoIterator<Item = impl Into<String>>) {
        self.rows.push(cols.into_iter().map(Into::into).collect());
    }

    pub fn print(&self) -> io::Result<()> {
        let out = io::stdout().lock();
        self.write_text(out)
    }

    pub fn print_csv(&self) -> io::Result<()> {
        self.write_csv(io::stdout().lock())
    }

    pub fn write_csv(&self, out: impl io::Write) -> io::Result<()> {
        let mut wtr = csv::Writer::from_writer(out);
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn write_text(&self, mut out: impl io::Write) -> io::Result<()> {
        let widths = self.column_widths();
        writeln!(out, "{}", pad_row(&self.headers, &widths))?;
        for row in &self.rows {
            writeln!(out, "{}", pad_row(row, &widths))?;
        }
        Ok(())
    }

    fn column_widths(&self) -> Vec<usize> {
        let cols = self
            .rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0);
        (0..cols)
            .map(|i| {
                std::iter::once(&self.headers)
                    .chain(&self.rows)
                    .filter_map(|r| r.get(i))
                    .map(|cell| cell_width(cell))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }
}

// Counts chars; wide glyphs will misalign, which is acceptable for plain listings.
fn cell_width(s: &str) -> usize {
    s.chars().count()
}

fn pad_row(row: &[String], widths: &[usize]) -> String {
    let last = row.len().saturating_sub(1);
    let mut out = String::new();
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            out.push_str("  ");
        }
        out.push_str(cell);
        if i < last {
            let w = widths.get(i).copied().unwrap_or(0);
            out.extend(std::iter::repeat_n(' ', w.saturating_sub(cell_width(cell))));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_all_but_the_last_column() {
        let mut t = Table::new(["ID", "TITLE", "DONE"]);
        t.row(["a1", "Buy milk", "yes"]);
        t.row(["b22222", "Call", "no"]);

        let mut buf = Vec::new();
        t.write_text(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "ID      TITLE     DONE");
        assert_eq!(lines[1], "a1      Buy milk  yes");
        assert_eq!(lines[2], "b22222  Call      no");
    }

    #[test]
    fn csv_quotes_embedded_commas() {
        let mut t = Table::new(["id", "title"]);
        t.row(["1", "milk, eggs"]);
        let mut buf = Vec::new();
        t.write_csv(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "id,title\n1,\"milk, eggs\"\n");
    }
}
