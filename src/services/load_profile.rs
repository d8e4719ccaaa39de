//! 自定义负荷曲线服务 - 业务能力层
//!
//! 输入行有 `load_file` 列时，读取对应文件并整体写入请求文档。
//! 远程服务会优先使用这条曲线，即使同时填写了参考建筑类型和年用电量。

use crate::error::{AppError, AppResult};
use crate::models::{ApiVersion, FlatRow};
use serde_json::{Map, Value as JsonValue};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// 负荷曲线文件名所在的列
pub const LOAD_FILE_COLUMN: &str = "load_file";

/// 合法的采样点数量：全年逐时、30 分钟、15 分钟
pub const VALID_PROFILE_LENGTHS: [usize; 3] = [8760, 17520, 35040];

/// 负荷曲线加载服务
pub struct LoadProfileLoader {
    profiles_dir: PathBuf,
    version: ApiVersion,
}

impl LoadProfileLoader {
    pub fn new(profiles_dir: impl Into<PathBuf>, version: ApiVersion) -> Self {
        Self {
            profiles_dir: profiles_dir.into(),
            version,
        }
    }

    /// 把自定义负荷曲线写入请求文档
    ///
    /// # 返回
    /// 是否写入了自定义曲线
    pub async fn add_load_profile_inputs(
        &self,
        row: &FlatRow,
        request: &mut JsonValue,
    ) -> AppResult<bool> {
        if !row.contains(LOAD_FILE_COLUMN) {
            info!(
                "使用内置负荷曲线: 站点编号 {}",
                row.text("site_number").unwrap_or_else(|| "-".to_string())
            );
            return Ok(false);
        }

        // 部分站点没有自定义曲线，单元格为空
        let Some(file_name) = row.text(LOAD_FILE_COLUMN) else {
            return Ok(false);
        };

        let path = self.profiles_dir.join(&file_name);
        let profile = read_load_profile(&path).await?;
        info!("📈 使用自定义负荷曲线 {} ({} 个采样点)", file_name, profile.len());

        let samples = profile.into_iter().map(JsonValue::from).collect();
        insert_at(request, self.version.load_profile_path(), JsonValue::Array(samples));
        Ok(true)
    }
}

/// 读取负荷曲线文件
///
/// 按无表头 CSV 读取，每行取第一列（允许带引号），忽略空行；采样点数量必须合法
pub async fn read_load_profile(path: &Path) -> AppResult<Vec<f64>> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| AppError::io(path, e))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut samples = Vec::new();
    for record in reader.records() {
        let record = record?;
        let field = record.get(0).unwrap_or_default();
        if field.is_empty() {
            continue;
        }
        let value = field.parse::<f64>().map_err(|_| AppError::LoadProfileValue {
            path: path.display().to_string(),
            line: record
                .position()
                .map_or(samples.len() + 1, |p| p.line() as usize),
            value: field.to_string(),
        })?;
        samples.push(value);
    }

    if !VALID_PROFILE_LENGTHS.contains(&samples.len()) {
        return Err(AppError::InvalidLoadProfile {
            path: path.display().to_string(),
            len: samples.len(),
        });
    }

    Ok(samples)
}

/// 沿路径写入值，缺失（或不是对象）的中间节点替换为空对象
fn insert_at(node: &mut JsonValue, path: &[&str], value: JsonValue) {
    match path.split_first() {
        None => *node = value,
        Some((key, rest)) => {
            if !node.is_object() {
                *node = JsonValue::Object(Map::new());
            }
            if let JsonValue::Object(map) = node {
                let child = map.entry(key.to_string()).or_insert(JsonValue::Null);
                insert_at(child, rest, value);
            }
        }
    }
}
