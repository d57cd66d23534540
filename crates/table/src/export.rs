//! CSV rendering of a processed view: header row of labels, one line per record.

use std::io::{self, Write};

use tabula_core::FieldDescriptor;

pub fn write_csv<W: Write, T>(mut out: W, fields: &[FieldDescriptor<T>], rows: &[&T]) -> io::Result<()> {
    let header: Vec<String> = fields.iter().map(|f| quote(&f.label)).collect();
    writeln!(out, "{}", header.join(","))?;
    for rec in rows {
        let cells: Vec<String> = fields.iter().map(|f| quote(&f.search_text(rec))).collect();
        writeln!(out, "{}", cells.join(","))?;
    }
    out.flush()
}

fn quote(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}
