#[derive(Clone, Copy, Debug)]
pub struct TableOptions {
    pub max_width: Option<usize>,
    pub color: bool,
}

const MIN_COLUMN: usize = 6;

/// Render an aligned table: header, divider, then one line per row.
#[must_use]
pub fn render(headers: &[&str], rows: &[Vec<String>], options: TableOptions) -> String {
    let mut widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            rows.iter()
                .filter_map(|row| row.get(index))
                .map(|cell| cell.chars().count())
                .chain([header.chars().count(), MIN_COLUMN])
                .max()
                .unwrap_or(MIN_COLUMN)
        })
        .collect();
    shrink_to(&mut widths, options.max_width);

    let header_line = join_cells(headers.iter().map(|h| (*h).to_string()), &widths, |_, _| None);
    let divider = "-".repeat(header_line.chars().count());

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(header_line);
    lines.push(divider);
    for row in rows {
        let cells = (0..widths.len()).map(|i| row.get(i).cloned().unwrap_or_else(|| "-".into()));
        lines.push(join_cells(cells, &widths, |_, text| {
            options.color.then(|| severity_color(text)).flatten()
        }));
    }
    lines.join("\n")
}

fn join_cells<I, F>(cells: I, widths: &[usize], color: F) -> String
where
    I: Iterator<Item = String>,
    F: Fn(usize, &str) -> Option<&'static str>,
{
    let line = cells
        .zip(widths)
        .enumerate()
        .map(|(index, (text, width))| {
            let text = truncate(&text, *width);
            let pad = width.saturating_sub(text.chars().count());
            let padded = if is_numeric(&text) {
                format!("{}{text}", " ".repeat(pad))
            } else {
                format!("{text}{}", " ".repeat(pad))
            };
            match color(index, &text) {
                Some(code) => format!("\u{1b}[{code}m{padded}\u{1b}[0m"),
                None => padded,
            }
        })
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end().to_string()
}

/// Narrow the widest column one char at a time until the table fits.
fn shrink_to(widths: &mut [usize], max_width: Option<usize>) {
    let Some(max_width) = max_width else {
        return;
    };
    let separators = widths.len().saturating_sub(1) * 2;
    while widths.iter().sum::<usize>() + separators > max_width {
        let Some((index, _)) = widths
            .iter()
            .enumerate()
            .filter(|(_, w)| **w > MIN_COLUMN)
            .max_by_key(|(_, w)| **w)
        else {
            break;
        };
        widths[index] -= 1;
    }
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut out: String = value.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn is_numeric(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|ch| ch.is_ascii_digit() || ch == '.')
}

fn severity_color(value: &str) -> Option<&'static str> {
    match value {
        "HIGH" => Some("31"),
        "MEDIUM" => Some("33"),
        "LOW" => Some("32"),
        _ => None,
    }
}
