//! CSV 访客表格
//!
//! 只追加。文件不存在或为空时，首次追加前先写入表头。

use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, ErrorKind};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, WriterBuilder};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::analytics::VisitorRecord;
use crate::errors::{Result, VisitrackError};

/// 表头（列顺序固定）
pub const SHEET_HEADERS: [&str; 15] = [
    "Timestamp",
    "IP Address",
    "City",
    "Region",
    "Country",
    "Country Code",
    "Latitude",
    "Longitude",
    "Timezone",
    "ISP",
    "User Agent",
    "Language",
    "Screen Resolution",
    "Referrer",
    "Page URL",
];

/// 表格中的一行
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetRow {
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    #[serde(rename = "IP Address")]
    pub ip: String,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Country Code")]
    pub country_code: String,
    #[serde(rename = "Latitude")]
    pub latitude: String,
    #[serde(rename = "Longitude")]
    pub longitude: String,
    #[serde(rename = "Timezone")]
    pub timezone: String,
    #[serde(rename = "ISP")]
    pub isp: String,
    #[serde(rename = "User Agent")]
    pub user_agent: String,
    #[serde(rename = "Language")]
    pub language: String,
    #[serde(rename = "Screen Resolution")]
    pub screen_resolution: String,
    #[serde(rename = "Referrer")]
    pub referrer: String,
    #[serde(rename = "Page URL")]
    pub page_url: String,
}

impl From<&VisitorRecord> for SheetRow {
    fn from(record: &VisitorRecord) -> Self {
        Self {
            timestamp: record.timestamp.clone(),
            ip: record.ip.clone(),
            city: record.city.clone(),
            region: record.region.clone(),
            country: record.country.clone(),
            country_code: record.country_code.clone(),
            latitude: record.latitude.clone(),
            longitude: record.longitude.clone(),
            timezone: record.timezone.clone(),
            isp: record.isp.clone(),
            user_agent: record.user_agent.clone(),
            language: record.language.clone(),
            screen_resolution: record.screen_resolution.clone(),
            referrer: record.referrer.clone(),
            page_url: record.page_url.clone(),
        }
    }
}

/// 访客统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorStats {
    pub total_visitors: usize,
    pub unique_ips: usize,
    /// 按首次出现顺序去重
    pub countries: Vec<String>,
    pub last_visit: Option<String>,
}

impl VisitorStats {
    pub fn from_rows(rows: &[SheetRow]) -> Self {
        let unique_ips = rows
            .iter()
            .map(|r| r.ip.as_str())
            .collect::<HashSet<_>>()
            .len();

        let mut seen = HashSet::new();
        let countries = rows
            .iter()
            .filter(|r| seen.insert(r.country.as_str()))
            .map(|r| r.country.clone())
            .collect();

        Self {
            total_visitors: rows.len(),
            unique_ips,
            countries,
            last_visit: rows.last().map(|r| r.timestamp.clone()),
        }
    }
}

pub struct VisitorSheet {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl VisitorSheet {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 追加一条访客记录
    pub fn append(&self, record: &VisitorRecord) -> Result<()> {
        let _guard = self.write_lock.lock();

        let needs_header = match fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == ErrorKind::NotFound => true,
            Err(e) => {
                return Err(VisitrackError::file_operation(format!(
                    "Failed to stat {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                VisitrackError::file_operation(format!(
                    "Failed to open {}: {}",
                    self.path.display(),
                    e
                ))
            })?;
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .from_writer(BufWriter::new(file));

        if needs_header {
            debug!("Writing header row to {}", self.path.display());
            writer.write_record(SHEET_HEADERS)?;
        }
        writer.serialize(SheetRow::from(record))?;
        writer.flush()?;

        Ok(())
    }

    /// 读取全部数据行（不含表头）
    pub fn rows(&self) -> Result<Vec<SheetRow>> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(BufReader::new(file));

        let mut rows = Vec::new();
        for (row_idx, result) in reader.deserialize::<SheetRow>().enumerate() {
            match result {
                Ok(row) => rows.push(row),
                // CSV 行号（1-based，跳过 header）
                Err(e) => warn!("Skipping unreadable sheet row {}: {}", row_idx + 2, e),
            }
        }

        Ok(rows)
    }

    pub fn stats(&self) -> Result<VisitorStats> {
        Ok(VisitorStats::from_rows(&self.rows()?))
    }
}
