//! CSV conversion of matrices

use std::io::{Read, Write};

use anyhow::{Context, Result};
use matrix_sheets::decode::parse_number;
use matrix_sheets::Matrix;

/// Parse headerless CSV into a text matrix.
///
/// Every row must have the same number of fields.
pub fn parse_text<R: Read>(input: R) -> Result<Matrix<String>> {
    Ok(Matrix::from_rows(records(input)?)?)
}

/// Parse headerless CSV into a numeric matrix.
pub fn parse_numeric<R: Read>(input: R) -> Result<Matrix<f64>> {
    let rows = records(input)?
        .into_iter()
        .enumerate()
        .map(|(r, row)| {
            row.into_iter()
                .enumerate()
                .map(|(c, field)| {
                    parse_number(&field).with_context(|| {
                        format!("Row {}, column {}: '{field}' is not a number", r + 1, c + 1)
                    })
                })
                .collect::<Result<Vec<f64>>>()
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Matrix::from_rows(rows)?)
}

fn records<R: Read>(input: R) -> Result<Vec<Vec<String>>> {
    // Ragged input is reported by Matrix::from_rows with the row number
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);

    reader
        .records()
        .map(|record| {
            let record = record.context("Failed to parse CSV input")?;
            Ok(record.iter().map(str::to_string).collect())
        })
        .collect()
}

/// Write a matrix as headerless CSV.
pub fn write_csv<W: Write, T: ToString>(output: W, matrix: &Matrix<T>) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(output);
    for row in matrix.iter_rows() {
        writer.write_record(row.iter().map(ToString::to_string))?;
    }
    writer.flush().context("Failed to write CSV output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_numeric() {
        let m = parse_numeric("1,2.5\n-3, 4\n".as_bytes()).unwrap();
        assert_eq!(m, Matrix::from_rows(vec![vec![1.0, 2.5], vec![-3.0, 4.0]]).unwrap());
    }

    #[test]
    fn test_parse_numeric_reports_position() {
        let err = parse_numeric("1,2\n3,x\n".as_bytes()).unwrap_err();
        assert_eq!(err.to_string(), "Row 2, column 2: 'x' is not a number");
    }

    #[test]
    fn test_parse_ragged() {
        let err = parse_text("a,b\nc\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("row 1"), "{err}");
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse_text("".as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_write_quotes() {
        let m = Matrix::row_vector(vec!["a,b".to_string(), "say \"hi\"".to_string()]);
        let mut out = Vec::new();
        write_csv(&mut out, &m).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "\"a,b\",\"say \"\"hi\"\"\"\n");
    }

    #[test]
    fn test_write_numbers() {
        let m = Matrix::from_rows(vec![vec![1.0, 0.5], vec![-2.0, 1e3]]).unwrap();
        let mut out = Vec::new();
        write_csv(&mut out, &m).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1,0.5\n-2,1000\n");
    }
}
