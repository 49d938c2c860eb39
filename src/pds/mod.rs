//! Streaming parser for the PDS `edrindex.tab` archives published for the
//! retired Opportunity and Spirit rovers. Tab-delimited, quoted,
//! space-padded fields; standard camera volumes carry 55-59 fields, the
//! DESCENT (entry/descent/landing camera) variant carries 52 by omitting
//! `path_name` and `file_name`.

pub mod camera_map;

use std::io::BufRead;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("unrecognized field count: {0}")]
    UnknownFieldCount(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Variant {
    Standard,
    Descent,
}

impl Variant {
    fn detect(field_count: usize, instrument_at_descent_offset: &str) -> Option<Self> {
        match field_count {
            55..=59 => Some(Variant::Standard),
            52 if instrument_at_descent_offset.eq_ignore_ascii_case("DESCAM") => Some(Variant::Descent),
            _ => None,
        }
    }
}

/// One extracted row. `browse_url` is `None` for the DESCENT variant, which
/// does not carry the `path_name`/`file_name` fields a browse URL is built from.
#[derive(Debug, Clone)]
pub struct PdsRow {
    pub product_id: String,
    pub sol: i32,
    pub start_time: String,
    pub instrument_id: String,
    pub camera_short_name: String,
    pub lines: Option<i32>,
    pub line_samples: Option<i32>,
    pub mast_azimuth: Option<f64>,
    pub mast_elevation: Option<f64>,
    pub filter_name: Option<String>,
    pub browse_url: Option<String>,
}

/// Lazily parses `reader` line by line. Peak additional memory is bounded
/// by a single line buffer, regardless of archive size (never `read_to_string`
/// on the whole body). Malformed or short rows are logged and skipped;
/// parsing continues to the end of the stream.
pub struct PdsParser<R> {
    lines: std::io::Lines<R>,
    volume_url: String,
}

impl<R: BufRead> PdsParser<R> {
    pub fn new(reader: R, volume_url: impl Into<String>) -> Self {
        Self {
            lines: reader.lines(),
            volume_url: volume_url.into(),
        }
    }
}

impl<R: BufRead> Iterator for PdsParser<R> {
    type Item = Result<PdsRow, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(err) => return Some(Err(err.into())),
            };
            if line.trim().is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.split('\t').map(clean_field).collect();
            match parse_row(&fields, &self.volume_url) {
                Ok(row) => return Some(Ok(row)),
                Err(RowError::UnknownFieldCount(n)) => {
                    warn!("skipping PDS row with unrecognized field count {n}");
                    continue;
                }
                Err(RowError::MissingField(name)) => {
                    warn!("skipping PDS row missing required field {name}");
                    continue;
                }
            }
        }
    }
}

enum RowError {
    UnknownFieldCount(usize),
    MissingField(&'static str),
}

fn clean_field(field: &str) -> &str {
    field.trim().trim_matches('"').trim()
}

fn parse_row(fields: &[&str], volume_url: &str) -> Result<PdsRow, RowError> {
    let n = fields.len();
    let descent_probe = fields.get(1).copied().unwrap_or_default();
    let variant = Variant::detect(n, descent_probe).ok_or(RowError::UnknownFieldCount(n))?;

    let layout = FieldLayout::for_variant(variant);
    let product_id = field_at(fields, layout.product_id)?;
    let instrument_id = field_at(fields, layout.instrument_id)?;
    let sol: i32 = field_at(fields, layout.sol)?
        .parse()
        .map_err(|_| RowError::MissingField("sol_number"))?;
    let start_time = field_at(fields, layout.start_time)?.to_owned();
    let filter_name = fields.get(layout.filter_name).copied().map(clean_field).map(str::to_owned);
    let lines = fields.get(layout.lines).and_then(|v| clean_field(v).parse().ok());
    let line_samples = fields.get(layout.line_samples).and_then(|v| clean_field(v).parse().ok());
    let mast_azimuth = fields.get(layout.mast_azimuth).and_then(|v| clean_field(v).parse().ok());
    let mast_elevation = fields.get(layout.mast_elevation).and_then(|v| clean_field(v).parse().ok());

    let browse_url = match variant {
        Variant::Standard => {
            let path_name = field_at(fields, layout.path_name.unwrap())?;
            let file_name = field_at(fields, layout.file_name.unwrap())?;
            Some(build_browse_url(volume_url, path_name, file_name, sol))
        }
        Variant::Descent => None,
    };

    Ok(PdsRow {
        product_id: product_id.to_owned(),
        sol,
        start_time,
        instrument_id: instrument_id.to_owned(),
        camera_short_name: camera_map::map_camera_name(instrument_id),
        lines,
        line_samples,
        mast_azimuth,
        mast_elevation,
        filter_name,
        browse_url,
    })
}

fn field_at<'a>(fields: &[&'a str], index: usize) -> Result<&'a str, RowError> {
    fields.get(index).copied().filter(|f| !f.is_empty()).ok_or(RowError::MissingField("required field"))
}

/// Positional offsets into a split row. The DESCENT variant omits
/// `path_name`/`file_name`, shifting every field after them back by 2,
/// exactly as described in §4.3 of the row-shape contract.
struct FieldLayout {
    product_id: usize,
    path_name: Option<usize>,
    file_name: Option<usize>,
    instrument_id: usize,
    sol: usize,
    start_time: usize,
    filter_name: usize,
    lines: usize,
    line_samples: usize,
    mast_azimuth: usize,
    mast_elevation: usize,
}

impl FieldLayout {
    fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::Standard => FieldLayout {
                product_id: 0,
                path_name: Some(1),
                file_name: Some(2),
                instrument_id: 3,
                sol: 4,
                start_time: 5,
                filter_name: 6,
                lines: 7,
                line_samples: 8,
                mast_azimuth: 9,
                mast_elevation: 10,
            },
            Variant::Descent => FieldLayout {
                product_id: 0,
                path_name: None,
                file_name: None,
                instrument_id: 1,
                sol: 2,
                start_time: 3,
                filter_name: 4,
                lines: 5,
                line_samples: 6,
                mast_azimuth: 7,
                mast_elevation: 8,
            },
        }
    }
}

/// `/<volume>/data/sol<N>/edr/<file>` -> `/<volume>/browse/sol<NNNN>/edr/<file>.jpg`, sol zero-padded to 4 digits.
fn build_browse_url(volume_url: &str, path_name: &str, file_name: &str, sol: i32) -> String {
    let base = volume_url.trim_end_matches('/');
    format!("{base}/browse/sol{sol:04}/edr/{path_name}{file_name}.jpg")
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;

    fn standard_row(instrument: &str) -> String {
        let mut fields = vec!["1P128".to_string(), "data/".to_string(), "1p128edr".to_string(), instrument.to_string(), "1".to_string(), "2004-01-04T05:00:00.000Z".to_string()];
        fields.extend(std::iter::repeat("x".to_string()).take(53));
        fields.join("\t")
    }

    #[test]
    fn parses_standard_row_and_maps_camera() {
        let line = standard_row("PANCAM_LEFT");
        let mut parser = PdsParser::new(Cursor::new(line), "https://example.com/volume");
        let row = parser.next().unwrap().unwrap();
        assert_eq!(row.product_id, "1P128");
        assert_eq!(row.sol, 1);
        assert_eq!(row.camera_short_name, "PANCAM");
        assert!(row.browse_url.unwrap().contains("/browse/sol0001/edr/"));
    }

    #[test]
    fn parses_descent_variant_without_path_or_file_name() {
        let mut fields = vec!["1D128".to_string(), "DESCAM".to_string(), "0".to_string(), "2004-01-04T05:00:00.000Z".to_string()];
        fields.extend(std::iter::repeat("x".to_string()).take(48));
        let line = fields.join("\t");
        assert_eq!(fields.len(), 52);

        let mut parser = PdsParser::new(Cursor::new(line), "https://example.com/volume");
        let row = parser.next().unwrap().unwrap();
        assert_eq!(row.product_id, "1D128");
        assert_eq!(row.sol, 0);
        assert_eq!(row.camera_short_name, "ENTRY");
        assert!(row.browse_url.is_none());
    }

    #[test]
    fn skips_row_with_unrecognized_field_count() {
        let line = "too\tfew\tfields".to_string();
        let mut parser = PdsParser::new(Cursor::new(line), "https://example.com/volume");
        assert!(parser.next().is_none());
    }

    #[test]
    fn strips_quotes_and_whitespace() {
        let mut fields = vec!["\" 1P128 \"".to_string(), "\"data/\"".to_string(), "\"1p128edr\"".to_string(), "PANCAM_LEFT".to_string(), "1".to_string(), "2004-01-04T05:00:00.000Z".to_string()];
        fields.extend(std::iter::repeat("x".to_string()).take(53));
        let line = fields.join("\t");
        let mut parser = PdsParser::new(Cursor::new(line), "https://example.com/volume");
        let row = parser.next().unwrap().unwrap();
        assert_eq!(row.product_id, "1P128");
    }
}
