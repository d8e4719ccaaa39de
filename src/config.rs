use crate::error::{AppError, AppResult};
use crate::models::{ApiEndpoints, ApiVersion};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 程序配置
///
/// 加载顺序：默认值 → TOML 配置文件（可选）→ 环境变量
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// REopt API 根地址
    pub api_root: String,
    /// API 密钥
    pub api_key: String,
    /// 协议版本，未指定时根据 `api_root` 推断
    pub api_version: Option<ApiVersion>,
    /// 轮询间隔（秒）
    pub poll_interval_secs: u64,
    /// 状态字段缺失的容忍次数，超过即中止轮询
    pub missing_status_threshold: usize,
    /// 单个 HTTP 请求超时（秒）
    pub http_timeout_secs: u64,
    // --- 输入 ---
    pub inputs_csv: PathBuf,
    pub load_profiles_dir: PathBuf,
    /// `template` 命令生成的输入模板
    pub input_template: PathBuf,
    /// 只处理前 N 个场景
    pub n_sites: Option<usize>,
    // --- 输出 ---
    pub outputs_dir: PathBuf,
    /// 汇总模板：首行为需要输出的字段名
    pub output_template: PathBuf,
    pub summary_csv: PathBuf,
    /// 分类别输出目录（每个"工作表"一个 CSV）
    pub sheets_dir: PathBuf,
    /// 从输入 CSV 原样复制到汇总中的前 N 列
    pub n_custom_columns: usize,
    /// 是否把每个场景的原始结果保存为 JSON
    pub persist_results: bool,
    /// 日志文件
    pub log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_root: "https://developer.nrel.gov/api/reopt/v1".to_string(),
            api_key: "DEMO_KEY".to_string(),
            api_version: None,
            poll_interval_secs: 5,
            missing_status_threshold: 3,
            http_timeout_secs: 120,
            inputs_csv: PathBuf::from("inputs/scenarios.csv"),
            load_profiles_dir: PathBuf::from("inputs/load_profiles"),
            input_template: PathBuf::from("inputs/all_api_inputs.csv"),
            n_sites: None,
            outputs_dir: PathBuf::from("outputs"),
            output_template: PathBuf::from("outputs/results_template.csv"),
            summary_csv: PathBuf::from("outputs/results_summary.csv"),
            sheets_dir: PathBuf::from("outputs/results_summary"),
            n_custom_columns: 2,
            persist_results: true,
            log_file: "main.log".to_string(),
        }
    }
}

impl Config {
    /// 从 TOML 文件（如果存在）和环境变量加载配置
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let config = match path {
            Some(path) if path.exists() => {
                let content =
                    std::fs::read_to_string(path).map_err(|e| AppError::io(path, e))?;
                Self::from_toml_str(&content)?
            }
            Some(path) => {
                return Err(AppError::Config(format!(
                    "配置文件不存在: {}",
                    path.display()
                )))
            }
            None => Self::default(),
        };
        config.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        toml::from_str(content).map_err(|e| AppError::Config(format!("TOML解析失败: {}", e)))
    }

    /// 用环境变量覆盖配置项
    ///
    /// `lookup` 通常是 `std::env::var`，测试中可以替换成固定的表
    pub fn with_overrides(self, lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let default = self;
        Ok(Self {
            api_root: lookup("REOPT_API_ROOT").unwrap_or(default.api_root),
            api_key: lookup("REOPT_API_KEY").unwrap_or(default.api_key),
            api_version: match lookup("REOPT_API_VERSION") {
                Some(v) => Some(v.parse()?),
                None => default.api_version,
            },
            poll_interval_secs: parse_or("REOPT_POLL_INTERVAL", &lookup, default.poll_interval_secs)?,
            missing_status_threshold: parse_or(
                "REOPT_MISSING_STATUS_THRESHOLD",
                &lookup,
                default.missing_status_threshold,
            )?,
            http_timeout_secs: parse_or("REOPT_HTTP_TIMEOUT", &lookup, default.http_timeout_secs)?,
            inputs_csv: lookup("REOPT_INPUTS_CSV").map(PathBuf::from).unwrap_or(default.inputs_csv),
            load_profiles_dir: lookup("REOPT_LOAD_PROFILES_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.load_profiles_dir),
            input_template: lookup("REOPT_INPUT_TEMPLATE")
                .map(PathBuf::from)
                .unwrap_or(default.input_template),
            n_sites: match lookup("REOPT_N_SITES") {
                Some(v) => Some(parse_value("REOPT_N_SITES", &v)?),
                None => default.n_sites,
            },
            outputs_dir: lookup("REOPT_OUTPUTS_DIR").map(PathBuf::from).unwrap_or(default.outputs_dir),
            output_template: lookup("REOPT_OUTPUT_TEMPLATE")
                .map(PathBuf::from)
                .unwrap_or(default.output_template),
            summary_csv: lookup("REOPT_SUMMARY_CSV").map(PathBuf::from).unwrap_or(default.summary_csv),
            sheets_dir: lookup("REOPT_SHEETS_DIR").map(PathBuf::from).unwrap_or(default.sheets_dir),
            n_custom_columns: parse_or("REOPT_N_CUSTOM_COLUMNS", &lookup, default.n_custom_columns)?,
            persist_results: parse_or("REOPT_PERSIST_RESULTS", &lookup, default.persist_results)?,
            log_file: lookup("REOPT_LOG_FILE").unwrap_or(default.log_file),
        })
    }

    /// 本次运行使用的协议版本
    pub fn resolved_api_version(&self) -> ApiVersion {
        self.api_version
            .unwrap_or_else(|| ApiVersion::detect(&self.api_root))
    }

    pub fn endpoints(&self) -> ApiEndpoints {
        ApiEndpoints::new(&self.api_root, &self.api_key, self.resolved_api_version())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &str,
    lookup: &impl Fn(&str) -> Option<String>,
    fallback: T,
) -> AppResult<T> {
    match lookup(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(fallback),
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, raw: &str) -> AppResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::Config(format!("环境变量 {} 的值无法解析: '{}'", key, raw)))
}
