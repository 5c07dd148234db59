//! `results` stores sweep results as tab-separated text, one row per tolerance radius under a
//! fixed two-column header, and reads them back for charting.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::error::Error;
use crate::search::ConvergenceResult;

pub const HEADER: [&str; 2] = ["tolerance radius", "term count"];

pub fn write_results<W: Write>(out: W, results: &[ConvergenceResult]) -> Result<(), Error> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_writer(out);
    wtr.write_record(&HEADER)?;
    for r in results {
        wtr.write_record(&[r.tolerance_radius.to_string(), r.term_count.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_results_file<P: AsRef<Path>>(path: P, results: &[ConvergenceResult]) -> Result<(), Error> {
    let fout = File::create(path)?;
    write_results(fout, results)
}

pub fn read_results<R: Read>(input: R) -> Result<Vec<ConvergenceResult>, Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .from_reader(input);

    let headers = rdr.headers()?.clone();
    if headers.len() != HEADER.len() || headers.iter().zip(HEADER.iter()).any(|(a, b)| a != *b) {
        return Err(Error::Results {
            line: 1,
            reason: format!("unexpected header {:?}", headers),
        });
    }

    let mut results = vec![];
    for record in rdr.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        results.push(parse_row(&record).map_err(|reason| Error::Results { line, reason })?);
    }
    Ok(results)
}

fn parse_row(record: &csv::StringRecord) -> Result<ConvergenceResult, String> {
    if record.len() != HEADER.len() {
        return Err(format!("expected {} columns, found {}", HEADER.len(), record.len()));
    }
    let tolerance_radius = record[0]
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("tolerance radius {:?}: {}", &record[0], e))?;
    let term_count = record[1]
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("term count {:?}: {}", &record[1], e))?;
    Ok(ConvergenceResult {
        tolerance_radius,
        term_count,
    })
}

pub fn read_results_file<P: AsRef<Path>>(path: P) -> Result<Vec<ConvergenceResult>, Error> {
    let fin = File::open(path)?;
    read_results(fin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_header_and_rows() {
        let results = vec![
            ConvergenceResult {
                tolerance_radius: 2.0,
                term_count: 4,
            },
            ConvergenceResult {
                tolerance_radius: 12.5,
                term_count: 3,
            },
        ];
        let mut buf = Vec::new();
        write_results(&mut buf, &results).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "tolerance radius\tterm count\n2\t4\n12.5\t3\n"
        );
    }

    #[test]
    fn reads_back_what_it_wrote() {
        let data = "tolerance radius\tterm count\n2\t4\n40\t3\n";
        let results = read_results(data.as_bytes()).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].tolerance_radius, 2.0);
        assert_eq!(results[0].term_count, 4);
        assert_eq!(results[1].tolerance_radius, 40.0);
        assert_eq!(results[1].term_count, 3);
    }

    #[test]
    fn rejects_foreign_header() {
        let data = "radius,terms\n2,4\n";
        match read_results(data.as_bytes()) {
            Err(Error::Results { line: 1, .. }) => (),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn bad_rows_report_their_line() {
        let data = "tolerance radius\tterm count\n2\t4\n4\tmany\n6\t4\n";
        match read_results(data.as_bytes()) {
            Err(Error::Results { line: 3, reason }) => assert!(reason.contains("many")),
            other => panic!("unexpected {:?}", other),
        }

        let data = "tolerance radius\tterm count\n2\t4\n4\n";
        match read_results(data.as_bytes()) {
            Err(Error::Results { line: 3, reason }) => assert!(reason.contains("columns")),
            other => panic!("unexpected {:?}", other),
        }
    }
}
