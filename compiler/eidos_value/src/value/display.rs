//! Printed form of values.
//!
//! Vectors print their elements separated by single spaces, strings
//! quoted. Empty vectors print as `integer(0)` and similar. Matrices print
//! with `[i,]` row and `[,j]` column headers, zero-based; higher-rank arrays
//! print one matrix slice per trailing index.

use std::fmt;

use super::{Dimensions, Value, Vector};

/// `T` or `F`.
#[inline]
pub fn format_logical(value: bool) -> &'static str {
    if value {
        "T"
    } else {
        "F"
    }
}

/// Float text: whole numbers keep a `.0`, non-finite values use the
/// constant names.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        "NAN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 {
            "INF".to_string()
        } else {
            "-INF".to_string()
        }
    } else if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Element `index` as printed; strings are quoted when `quote` is set.
fn format_element(vector: &Vector, index: usize, quote: bool) -> String {
    match vector {
        Vector::Void | Vector::Null => String::new(),
        Vector::Logical(v) => format_logical(v[index]).to_string(),
        Vector::Int(v) => v[index].to_string(),
        Vector::Float(v) => format_float(v[index]),
        Vector::String(v) => {
            if quote {
                format!("\"{}\"", v[index])
            } else {
                v[index].clone()
            }
        }
        Vector::Object(v) => format!("<{}>", v.elements[index].class().name()),
    }
}

impl Value {
    /// Elements joined by `separator`, strings unquoted, as `cat()` writes.
    pub fn cat_string(&self, separator: &str) -> String {
        let vector = self.vector();
        (0..vector.len())
            .map(|i| format_element(vector, i, false))
            .collect::<Vec<_>>()
            .join(separator)
    }
}

fn write_empty(f: &mut fmt::Formatter<'_>, vector: &Vector) -> fmt::Result {
    match vector {
        Vector::Void => Ok(()),
        Vector::Null => write!(f, "NULL"),
        Vector::Logical(_) => write!(f, "logical(0)"),
        Vector::Int(_) => write!(f, "integer(0)"),
        Vector::Float(_) => write!(f, "float(0)"),
        Vector::String(_) => write!(f, "string(0)"),
        Vector::Object(v) => match v.class_name() {
            Some(class) => write!(f, "object()<{class}>"),
            None => write!(f, "object()"),
        },
    }
}

fn write_matrix(
    f: &mut fmt::Formatter<'_>,
    vector: &Vector,
    rows: usize,
    cols: usize,
    base: usize,
) -> fmt::Result {
    let cells: Vec<String> = (0..rows * cols)
        .map(|i| format_element(vector, base + i, true))
        .collect();
    let row_labels: Vec<String> = (0..rows).map(|r| format!("[{r},]")).collect();
    let label_width = row_labels.iter().map(String::len).max().unwrap_or(0);

    let col_widths: Vec<usize> = (0..cols)
        .map(|c| {
            let header = format!("[,{c}]").len();
            (0..rows)
                .map(|r| cells[c * rows + r].len())
                .max()
                .unwrap_or(0)
                .max(header)
        })
        .collect();

    write!(f, "{:label_width$}", "")?;
    for (c, width) in col_widths.iter().enumerate() {
        write!(f, " {:>width$}", format!("[,{c}]"))?;
    }
    for (r, label) in row_labels.iter().enumerate() {
        write!(f, "\n{label:>label_width$}")?;
        for (c, width) in col_widths.iter().enumerate() {
            write!(f, " {:>width$}", cells[c * rows + r])?;
        }
    }
    Ok(())
}

fn write_array(f: &mut fmt::Formatter<'_>, vector: &Vector, dims: &Dimensions) -> fmt::Result {
    let extents = dims.extents();
    let (rows, cols) = (extents[0], extents[1]);
    let slice_len = rows * cols;
    let slices = dims.product().unwrap_or(0) / slice_len.max(1);
    let outer = &extents[2..];

    let mut coords = vec![0usize; outer.len()];
    for slice in 0..slices {
        if slice > 0 {
            write!(f, "\n\n")?;
        }
        let labels: Vec<String> = coords.iter().map(ToString::to_string).collect();
        writeln!(f, ", , {}\n", labels.join(", "))?;
        write_matrix(f, vector, rows, cols, slice * slice_len)?;

        for (coord, &extent) in coords.iter_mut().zip(outer) {
            *coord += 1;
            if *coord < extent {
                break;
            }
            *coord = 0;
        }
    }
    Ok(())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let vector = self.vector();
        if vector.is_empty() {
            return write_empty(f, vector);
        }
        match self.dims() {
            Some(dims) if dims.rank() == 2 => {
                write_matrix(f, vector, dims.extents()[0], dims.extents()[1], 0)
            }
            Some(dims) => write_array(f, vector, dims),
            None => {
                for i in 0..vector.len() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    f.write_str(&format_element(vector, i, true))?;
                }
                Ok(())
            }
        }
    }
}
