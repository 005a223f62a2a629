use std::io::{self, Write};

use mol_readout::config::{ForwardConfig, ReadoutConfig};
use mol_readout::nn::ReadoutModel;
use mol_readout::{DataConfig, ModelConfig};

use crate::util::text::truncate;

const INDENT: &str = "      ";

const BOX_INNER_WIDTH: usize = 62;
const SAFE_TABLE_WIDTH: usize = BOX_INNER_WIDTH - INDENT.len();

#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

struct Column {
    header: &'static str,
    width: usize,
    align: Align,
}

impl Column {
    fn left(header: &'static str, width: usize) -> Self {
        Self {
            header,
            width,
            align: Align::Left,
        }
    }

    fn right(header: &'static str, width: usize) -> Self {
        Self {
            header,
            width,
            align: Align::Right,
        }
    }

    fn cell(&self, text: &str) -> String {
        let text = truncate(text, self.width);
        match self.align {
            Align::Left => format!("{:<w$}", text, w = self.width),
            Align::Right => format!("{:>w$}", text, w = self.width),
        }
    }
}

/// Gives the first `Left` column whatever width the others leave over.
fn fit(mut columns: Vec<Column>) -> Vec<Column> {
    let overhead = 3 * columns.len() + 1;
    let fixed: usize = columns.iter().skip(1).map(|c| c.width).sum();
    if let Some(first) = columns.first_mut() {
        first.width = SAFE_TABLE_WIDTH.saturating_sub(overhead + fixed).max(first.width);
    }
    columns
}

fn rule(out: &mut impl Write, columns: &[Column], left: &str, mid: &str, right: &str) {
    let segments: Vec<String> = columns.iter().map(|c| "─".repeat(c.width + 2)).collect();
    let _ = writeln!(out, "{}{}{}{}", INDENT, left, segments.join(mid), right);
}

fn row(out: &mut impl Write, columns: &[Column], cells: &[String]) {
    let rendered: Vec<String> = columns
        .iter()
        .zip(cells)
        .map(|(c, text)| c.cell(text))
        .collect();
    let _ = writeln!(out, "{}│ {} │", INDENT, rendered.join(" │ "));
}

fn print_table(out: &mut impl Write, title: &str, columns: &[Column], rows: &[Vec<String>]) {
    let _ = writeln!(
        out,
        "{}┌─ {} ─┐",
        INDENT,
        truncate(title, SAFE_TABLE_WIDTH - 6)
    );
    rule(out, columns, "┌", "┬", "┐");
    let headers: Vec<String> = columns.iter().map(|c| c.header.to_string()).collect();
    row(out, columns, &headers);
    rule(out, columns, "├", "┼", "┤");
    for cells in rows {
        row(out, columns, cells);
    }
    rule(out, columns, "└", "┴", "┘");
}

pub fn print_data_summary(data: &DataConfig) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    let columns = fit(vec![
        Column::left("Split", 10),
        Column::right("Sources", 8),
        Column::right("Targets", 8),
        Column::right("Batch", 8),
    ]);

    let rows: Vec<Vec<String>> = data
        .datasets()
        .map(|(split, dataset)| {
            vec![
                split.key().to_string(),
                dataset.sources.len().to_string(),
                dataset.targets.len().to_string(),
                dataset
                    .batch_size
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "full".to_string()),
            ]
        })
        .collect();

    print_table(&mut out, "Dataset Summary", &columns, &rows);
}

pub fn print_targets(data: &DataConfig) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    let columns = fit(vec![
        Column::left("Column", 14),
        Column::left("Split", 10),
        Column::left("Readout", 14),
        Column::left("Metric", 6),
    ]);

    let rows: Vec<Vec<String>> = data
        .datasets()
        .flat_map(|(split, dataset)| {
            dataset.targets.iter().map(move |t| {
                vec![
                    t.column.clone(),
                    split.key().to_string(),
                    t.readout.clone(),
                    t.metric.to_string(),
                ]
            })
        })
        .collect();

    if rows.is_empty() {
        return;
    }

    print_table(&mut out, "Targets", &columns, &rows);
}

pub fn print_readouts(config: &ModelConfig, model: &ReadoutModel) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    let columns = fit(vec![
        Column::left("Stages", 20),
        Column::left("Readout", 14),
        Column::right("Params", 9),
    ]);

    let rows: Vec<Vec<String>> = model
        .iter()
        .filter_map(|(name, module)| {
            let readout = config.readouts.get(name)?;
            Some(vec![
                describe_stages(readout),
                name.to_string(),
                module.n_parameters().to_string(),
            ])
        })
        .collect();

    print_table(&mut out, "Readout Heads", &columns, &rows);
}

fn describe_stages(readout: &ReadoutConfig) -> String {
    let mut parts = vec![readout.pooling.to_string()];
    parts.push(describe_forward(&readout.forward));
    if let Some(post) = readout.postprocess {
        parts.push(post.to_string());
    }
    parts.join(" → ")
}

fn describe_forward(forward: &ForwardConfig) -> String {
    forward
        .hidden_feats
        .iter()
        .zip(&forward.activation)
        .map(|(width, act)| format!("{width}·{act}"))
        .collect::<Vec<_>>()
        .join(" ")
}
