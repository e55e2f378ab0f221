use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use linfa::Dataset;
use ndarray::prelude::*;
use ndarray_csv::{Array2Reader, ReadError};

use crate::error::{HarnessError, Result};

/// Location of the ipums extract, relative to the working directory
pub const IPUMS_PATH: &str = "./data/ipums_1k.csv";

/// Convert CSV bytes into the header names and a 2D array
pub fn array_from_csv<R: Read>(
    csv: R,
    separator: u8,
) -> std::result::Result<(Vec<String>, Array2<f32>), ReadError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(separator)
        .from_reader(csv);

    let header = reader
        .headers()
        .map_err(ReadError::Csv)?
        .iter()
        .map(str::to_owned)
        .collect();
    let array = reader.deserialize_array2_dynamic()?;

    Ok((header, array))
}

/// Split a numeric table into features and target, the target being the last column
pub fn split_features_target(
    header: Vec<String>,
    array: Array2<f32>,
) -> std::result::Result<Dataset<f32, f32, Ix1>, String> {
    let (nrows, ncols) = array.dim();
    if nrows == 0 {
        return Err("table has no rows".to_string());
    }
    if ncols < 2 {
        return Err(format!(
            "table needs at least one feature and a target column, but has {} column(s)",
            ncols
        ));
    }

    let records = array.slice(s![.., ..ncols - 1]).to_owned();
    let targets = array.column(ncols - 1).to_owned();

    let mut feature_names = header;
    feature_names.truncate(ncols - 1);

    Ok(Dataset::new(records, targets).with_feature_names(feature_names))
}

/// Read a CSV table from disk and turn it into a regression dataset
///
/// The file is read on every call. A missing or unreadable file is reported as
/// [`DataUnavailable`](HarnessError::DataUnavailable), a table which cannot be parsed into
/// numbers or lacks a target column as [`MalformedData`](HarnessError::MalformedData).
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Dataset<f32, f32, Ix1>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| HarnessError::DataUnavailable {
        path: path.to_path_buf(),
        source,
    })?;

    let malformed = |reason: String| HarnessError::MalformedData {
        path: PathBuf::from(path),
        reason,
    };

    let (header, array) = array_from_csv(file, b',').map_err(|e| malformed(e.to_string()))?;
    split_features_target(header, array).map_err(malformed)
}

/// Read in the ipums income extract from [`IPUMS_PATH`]
pub fn ipums() -> Result<Dataset<f32, f32, Ix1>> {
    load_csv(IPUMS_PATH)
}
