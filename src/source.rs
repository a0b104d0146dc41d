use polars::prelude::*;
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, instrument};

use crate::calc::format_cfa;
use crate::domain::TVError;
use crate::filters::{FilterKey, Location};
use crate::table::{Header, Row, TableView};

/// Numeric columns shown as FCFA amounts.
const AMOUNT_COLUMNS: [&str; 3] = ["montant", "versement", "solde"];

#[derive(Debug)]
enum FileType {
    CSV,
    PARQUET,
    ARROW,
}

#[derive(Debug)]
pub struct FileInfo {
    path: PathBuf,
    file_size: u64,
    file_type: FileType,
}

pub struct Column {
    idx: u16,
    name: String,
    data: Vec<String>,
    dtype: DataType,
}

impl Column {
    pub fn as_string(&self) -> String {
        format!(
            "{} \"{}\", {:?}, # rows {}",
            self.idx,
            self.name,
            self.dtype,
            self.data.len(),
        )
    }
}

/// Loaded data file. Renders pages of rows for a [`Location`].
pub struct DataSource {
    file_info: FileInfo,
    columns: Vec<Column>,
    unsortable: Vec<String>,
}

impl DataSource {
    #[instrument(skip(unsortable))]
    pub fn load(path: PathBuf, unsortable: &[String]) -> Result<Self, TVError> {
        let file_info = Self::get_file_info(path)?;
        let frame = match file_info.file_type {
            FileType::CSV => Self::load_csv(&file_info.path)?,
            FileType::PARQUET => Self::load_parquet(&file_info.path)?,
            FileType::ARROW => Self::load_arrow(&file_info.path)?,
        };

        // Every column is converted to display strings in its own task.
        let start_time = Instant::now();
        let df = Arc::new(frame.collect()?);
        let c_: Result<Vec<Column>, _> = df
            .get_column_names()
            .par_iter()
            .enumerate()
            .map(|(idx, name)| Self::load_columns(&df, idx, name))
            .collect();
        let columns = c_?;

        let data_loading_duration = start_time.elapsed().as_millis();
        info!(
            "Loading {} bytes took {data_loading_duration}ms ...",
            file_info.file_size
        );
        for c in columns.iter() {
            debug!("Column: {}", c.as_string());
        }

        Ok(Self {
            file_info,
            columns,
            unsortable: unsortable.iter().map(|c| c.to_lowercase()).collect(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.file_info.path
    }

    pub fn nrows(&self) -> usize {
        self.columns.first().map(|c| c.data.len()).unwrap_or(0)
    }

    fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Sorted distinct non-empty values of the column backing a filter.
    pub fn distinct_values(&self, key: FilterKey) -> Vec<String> {
        self.column_by_name(key.param())
            .map(|c| {
                c.data
                    .iter()
                    .filter(|v| !v.is_empty())
                    .cloned()
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Build the page for `location`: rows whose filter columns equal the
    /// query values. A parameter without matching column is ignored.
    pub fn render(&self, location: &Location) -> TableView {
        let selection = location.selection();
        let mut predicates: Vec<(&Column, &str)> = Vec::new();
        for key in FilterKey::ALL {
            if let Some(value) = selection.get(key) {
                match self.column_by_name(key.param()) {
                    Some(column) => predicates.push((column, value)),
                    None => debug!("No column for filter \"{}\", ignored", key.param()),
                }
            }
        }

        let rows: Vec<Row> = (0..self.nrows())
            .filter(|&r| {
                predicates
                    .iter()
                    .all(|(column, value)| column.data[r].trim() == *value)
            })
            .map(|r| Row::new(self.columns.iter().map(|c| c.data[r].clone()).collect()))
            .collect();

        let headers = self
            .columns
            .iter()
            .map(|c| Header {
                sortable: !self.unsortable.contains(&c.name.to_lowercase()),
                ..Header::new(c.name.clone())
            })
            .collect();

        info!("Rendered {location} with {}/{} rows", rows.len(), self.nrows());
        TableView::new(location.to_string(), headers, rows)
    }

    fn detect_file_type(path: &Path) -> Result<FileType, TVError> {
        match path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_uppercase())
            .as_deref()
        {
            Some("CSV") => Ok(FileType::CSV),
            Some("PARQUET") | Some("PQ") => Ok(FileType::PARQUET),
            Some("ARROW") | Some("IPC") | Some("FEATHER") => Ok(FileType::ARROW),
            _ => Err(TVError::UnknownFileType),
        }
    }

    fn is_numeric_type(dtype: &DataType) -> bool {
        matches!(
            dtype,
            DataType::Int8
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt8
                | DataType::UInt16
                | DataType::UInt32
                | DataType::UInt64
                | DataType::Float32
                | DataType::Float64
        )
    }

    fn load_columns(df: &DataFrame, idx: usize, col_name: &str) -> Result<Column, PolarsError> {
        let column = df.column(col_name)?;
        let original_dtype = column.dtype().clone();
        let is_amount = AMOUNT_COLUMNS.contains(&col_name.to_lowercase().as_str());

        let data: Vec<String> = if is_amount && Self::is_numeric_type(&original_dtype) {
            let col = column.cast(&DataType::Float64)?;
            col.f64()?
                .into_iter()
                .map(|value| value.map(format_cfa).unwrap_or_default())
                .collect()
        } else {
            let col = column.cast(&DataType::String)?;
            col.str()?
                .into_iter()
                .map(|value| match value {
                    Some(s) => s.replace("\r\n", " ↵ ").replace('\n', " ↵ "),
                    None => String::new(),
                })
                .collect()
        };

        Ok(Column {
            idx: idx as u16,
            name: col_name.to_string(),
            data,
            dtype: original_dtype,
        })
    }

    fn get_file_info(path: PathBuf) -> Result<FileInfo, TVError> {
        let metadata = fs::metadata(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => TVError::FileNotFound,
            ErrorKind::PermissionDenied => TVError::PermissionDenied,
            _ => TVError::IoError(e),
        })?;
        if !metadata.is_file() {
            return Err(TVError::LoadingFailed("Not a file!".into()));
        }

        let file_size = metadata.len();
        let file_type = Self::detect_file_type(&path)?;

        Ok(FileInfo {
            path,
            file_size,
            file_type,
        })
    }

    fn load_csv(path: &Path) -> Result<LazyFrame, PolarsError> {
        LazyCsvReader::new(PlPath::Local(path.into()))
            .with_has_header(true)
            .finish()
    }

    fn load_parquet(path: &Path) -> Result<LazyFrame, PolarsError> {
        LazyFrame::scan_parquet(PlPath::Local(path.into()), ScanArgsParquet::default())
    }

    fn load_arrow(path: &Path) -> Result<LazyFrame, PolarsError> {
        LazyFrame::scan_ipc(
            PlPath::Local(path.into()),
            polars::io::ipc::IpcScanOptions,
            UnifiedScanArgs::default(),
        )
    }
}
