use super::{Dashboard, KpiBlock, RankedTable, YearSeries};
use prettytable::{format, Cell, Row, Table};
use std::fmt::Write;

/// `1234567` -> `"1,234,567"`
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn header(cells: &[&str]) -> Row {
    Row::new(cells.iter().map(|c| Cell::new(c).style_spec("bFg")).collect())
}

fn boxed() -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table
}

fn kpi_table(block: &KpiBlock) -> Table {
    let mut table = boxed();
    let labels: Vec<&str> = block.metrics.iter().map(|m| m.label.as_str()).collect();
    table.set_titles(header(&labels));
    table.add_row(Row::new(
        block
            .metrics
            .iter()
            .map(|m| Cell::new(&format_thousands(m.value)).style_spec("r"))
            .collect(),
    ));
    table
}

fn series_table(series: &YearSeries) -> Table {
    let mut table = boxed();
    table.set_titles(header(&[series.x_label.as_str(), series.y_label.as_str()]));
    for p in &series.points {
        table.add_row(Row::new(vec![
            Cell::new(&p.x.to_string()),
            Cell::new(&format_thousands(p.y)).style_spec("r"),
        ]));
    }
    table
}

fn ranked_table(view: &RankedTable) -> Table {
    let mut table = boxed();
    table.set_titles(header(&["#", view.label_column.as_str(), view.count_column.as_str()]));
    for (i, r) in view.rows.iter().enumerate() {
        table.add_row(Row::new(vec![
            Cell::new(&(i + 1).to_string()).style_spec("r"),
            Cell::new(&r.label),
            Cell::new(&format_thousands(r.count)).style_spec("r"),
        ]));
    }
    table
}

/// Render the dashboard as plain-text tables.
pub fn render_text(dash: &Dashboard) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", kpi_table(&dash.kpis));

    let _ = writeln!(out, "--- {} ---", dash.titles_by_year.title);
    if dash.titles_by_year.points.is_empty() {
        let _ = writeln!(out, "(no dated titles)\n");
    } else {
        let _ = writeln!(out, "{}", series_table(&dash.titles_by_year));
    }

    for (_, view) in dash.ranked_tables() {
        let _ = writeln!(out, "--- {} ---", view.title);
        if view.rows.is_empty() {
            let _ = writeln!(out, "(no data)\n");
        } else {
            let _ = writeln!(out, "{}", ranked_table(view));
        }
    }
    out
}
