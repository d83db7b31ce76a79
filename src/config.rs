//! 程序配置
//!
//! 加载顺序：默认值 → TOML 文件（`SCRAPER_CONFIG`）→ 环境变量

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 程序配置
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 目标页面
    pub target_url: String,
    /// 并行进程数
    pub num_processes: usize,
    /// 每个进程的标签页数
    pub tabs_per_process: usize,
    /// 是否无头运行
    pub headless: bool,
    /// 浏览器可执行文件（为空时由 chromiumoxide 自动查找）
    pub chrome_executable: Option<String>,
    /// 导出文件路径
    pub output_path: String,
    /// 导出时地区名称所在的列名
    pub label_column: String,
    /// 单次等待上限（毫秒）
    pub wait_timeout_ms: u64,
    /// 轮询间隔（毫秒）
    pub poll_interval_ms: u64,
    /// 两个条目之间的停顿（毫秒）
    pub think_time_ms: u64,
    /// 在当前进程内用线程代替子进程
    pub in_process: bool,
    /// 页面选择器
    pub selectors: Selectors,
}

/// 页面结构相关的选择器，构造后不再修改
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    /// 地区列表容器的 class
    pub regions_wrap: String,
    /// 单个地区元素的 class
    pub region: String,
    /// 渲染中的占位文本
    pub placeholder: String,
    /// 侧边栏徽章组
    pub sidebar: BadgeGroup,
    /// 底部徽章组
    pub bottom_bar: BadgeGroup,
}

/// 一个徽章组的 class 集合
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeGroup {
    /// 日志中使用的名称
    pub name: String,
    pub wrapper: String,
    pub item: String,
    pub title: String,
    pub value: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_url: "https://stats.hh.ru/".to_string(),
            num_processes: 2,
            tabs_per_process: 4,
            headless: true,
            chrome_executable: None,
            output_path: "data.csv".to_string(),
            label_column: "Субъект".to_string(),
            wait_timeout_ms: 30_000,
            poll_interval_ms: 100,
            think_time_ms: 0,
            in_process: false,
            selectors: Selectors::default(),
        }
    }
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            regions_wrap: "_regions_39f95_341".to_string(),
            region: "_region_39f95_312".to_string(),
            placeholder: "-".to_string(),
            sidebar: BadgeGroup {
                name: "sidebar".to_string(),
                wrapper: "_regionInfo_1fsky_120".to_string(),
                item: "_infoItem_1fsky_181".to_string(),
                title: "_infoTitle_1fsky_192".to_string(),
                value: "_infoValue_1fsky_207".to_string(),
            },
            bottom_bar: BadgeGroup {
                name: "bottom_bar".to_string(),
                wrapper: "_badgesContainer_171fz_14".to_string(),
                item: "_shortInfo_1sluz_183".to_string(),
                title: "_text_1dgql_1".to_string(),
                value: "_value_1sluz_281".to_string(),
            },
        }
    }
}

impl Selectors {
    /// 按读取顺序返回两个徽章组
    pub fn groups(&self) -> [&BadgeGroup; 2] {
        [&self.sidebar, &self.bottom_bar]
    }
}

impl Config {
    /// 默认值 → `SCRAPER_CONFIG` 指向的 TOML 文件 → 环境变量，最后校验
    pub fn load() -> Result<Self, ConfigError> {
        let base = match std::env::var("SCRAPER_CONFIG") {
            Ok(path) => Self::from_toml_file(&path)?,
            Err(_) => Self::default(),
        };
        let config = base.with_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// 从 TOML 文件读取，缺省字段使用默认值
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::TomlParseFailed { source, .. } => ConfigError::TomlParseFailed {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::TomlParseFailed {
            path: String::new(),
            source,
        })
    }

    /// 用环境变量覆盖已有配置
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// 用任意键值来源覆盖配置，便于测试
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("SCRAPER_TARGET_URL") {
            self.target_url = v;
        }
        if let Some(v) = lookup("SCRAPER_OUTPUT") {
            self.output_path = v;
        }
        if let Some(v) = lookup("SCRAPER_CHROME") {
            self.chrome_executable = Some(v);
        }
        override_parsed(&lookup, "SCRAPER_PROCESSES", "usize", &mut self.num_processes)?;
        override_parsed(&lookup, "SCRAPER_TABS", "usize", &mut self.tabs_per_process)?;
        override_parsed(&lookup, "SCRAPER_HEADLESS", "bool", &mut self.headless)?;
        override_parsed(&lookup, "SCRAPER_WAIT_TIMEOUT_MS", "u64", &mut self.wait_timeout_ms)?;
        override_parsed(&lookup, "SCRAPER_THINK_TIME_MS", "u64", &mut self.think_time_ms)?;
        override_parsed(&lookup, "SCRAPER_IN_PROCESS", "bool", &mut self.in_process)?;
        Ok(self)
    }

    /// 启动前校验，任何错误都直接终止运行
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_url.trim().is_empty() {
            return Err(ConfigError::invalid("target_url", "不能为空"));
        }
        if self.num_processes == 0 {
            return Err(ConfigError::invalid("num_processes", "必须为正整数"));
        }
        if self.tabs_per_process == 0 {
            return Err(ConfigError::invalid("tabs_per_process", "必须为正整数"));
        }
        if self.wait_timeout_ms == 0 {
            return Err(ConfigError::invalid("wait_timeout_ms", "必须大于 0"));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::invalid("poll_interval_ms", "必须大于 0"));
        }
        if self.label_column.is_empty() {
            return Err(ConfigError::invalid("label_column", "不能为空"));
        }

        let s = &self.selectors;
        let mut classes = vec![("selectors.regions_wrap", &s.regions_wrap), ("selectors.region", &s.region)];
        for group in s.groups() {
            classes.extend([
                ("selectors.*.wrapper", &group.wrapper),
                ("selectors.*.item", &group.item),
                ("selectors.*.title", &group.title),
                ("selectors.*.value", &group.value),
            ]);
        }
        if let Some((field, _)) = classes.into_iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(ConfigError::invalid(field, "选择器不能为空"));
        }
        Ok(())
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn think_time(&self) -> Duration {
        Duration::from_millis(self.think_time_ms)
    }
}

fn override_parsed<F, T>(
    lookup: &F,
    var_name: &str,
    expected_type: &str,
    target: &mut T,
) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(value) = lookup(var_name) {
        *target = value.trim().parse().map_err(|_| ConfigError::EnvVarParseFailed {
            var_name: var_name.to_string(),
            value: value.clone(),
            expected_type: expected_type.to_string(),
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.num_processes, 2);
        assert_eq!(config.tabs_per_process, 4);
        assert_eq!(config.selectors.placeholder, "-");
    }

    #[test]
    fn env_overrides_replace_values() {
        let config = Config::default()
            .with_overrides(lookup_from(&[
                ("SCRAPER_PROCESSES", "3"),
                ("SCRAPER_TABS", " 5 "),
                ("SCRAPER_HEADLESS", "false"),
                ("SCRAPER_OUTPUT", "out.csv"),
            ]))
            .unwrap();
        assert_eq!(config.num_processes, 3);
        assert_eq!(config.tabs_per_process, 5);
        assert!(!config.headless);
        assert_eq!(config.output_path, "out.csv");
    }

    #[test]
    fn unparsable_env_value_is_reported() {
        let err = Config::default()
            .with_overrides(lookup_from(&[("SCRAPER_TABS", "many")]))
            .unwrap_err();
        match err {
            ConfigError::EnvVarParseFailed { var_name, value, .. } => {
                assert_eq!(var_name, "SCRAPER_TABS");
                assert_eq!(value, "many");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn zero_processes_rejected() {
        let config = Config {
            num_processes: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "num_processes", .. })
        ));
    }

    #[test]
    fn empty_selector_rejected() {
        let mut config = Config::default();
        config.selectors.bottom_bar.value = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn toml_overrides_only_given_fields() {
        let config = Config::from_toml_str(
            r#"
            num_processes = 6
            label_column = "Region"

            [selectors]
            region = "_region_new"
            "#,
        )
        .unwrap();
        assert_eq!(config.num_processes, 6);
        assert_eq!(config.label_column, "Region");
        assert_eq!(config.selectors.region, "_region_new");
        assert_eq!(config.tabs_per_process, 4);
        assert_eq!(config.selectors.sidebar, Selectors::default().sidebar);
    }

    #[test]
    fn broken_toml_is_a_parse_error() {
        let err = Config::from_toml_str("num_processes = \"two\"").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParseFailed { .. }));
    }
}
