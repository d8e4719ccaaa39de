//! 结果保存服务 - 业务能力层
//!
//! 把每个场景的原始结果保存为 `<描述>.json`，之后可以不再请求远程服务而重新生成报表

use crate::error::{AppError, AppResult};
use crate::utils::file_stem;
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// 结果保存服务
pub struct ResultStore {
    dir: PathBuf,
}

impl ResultStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// 场景对应的结果文件路径
    pub fn path_for(&self, description: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(description)))
    }

    /// 保存结果
    pub async fn save(&self, description: &str, document: &JsonValue) -> AppResult<PathBuf> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::io(&self.dir, e))?;

        let path = self.path_for(description);
        let content = serde_json::to_string_pretty(document)?;
        fs::write(&path, content)
            .await
            .map_err(|e| AppError::io(&path, e))?;

        info!("💾 结果已保存至 {}", path.display());
        Ok(path)
    }

    /// 删除上一次运行留下的结果
    ///
    /// # 返回
    /// 是否删除了文件
    pub async fn remove(&self, description: &str) -> AppResult<bool> {
        let path = self.path_for(description);
        if !path_exists(&path).await {
            return Ok(false);
        }
        fs::remove_file(&path)
            .await
            .map_err(|e| AppError::io(&path, e))?;
        info!("🗑️ 已删除过期结果 {}", path.display());
        Ok(true)
    }

    /// 读取已保存的结果，文件不存在时返回 `None`
    pub async fn load(&self, description: &str) -> AppResult<Option<JsonValue>> {
        let path = self.path_for(description);
        if !path_exists(&path).await {
            debug!("没有已保存的结果: {}", path.display());
            return Ok(None);
        }
        let content = fs::read_to_string(&path)
            .await
            .map_err(|e| AppError::io(&path, e))?;
        Ok(Some(serde_json::from_str(&content)?))
    }
}

async fn path_exists(path: &Path) -> bool {
    fs::try_exists(path).await.unwrap_or(false)
}
