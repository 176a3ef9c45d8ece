// src/config/config_manager.rs

use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;
use url::Url;

use crate::error::{AdapterError, Result};

fn default_timeout_ms() -> u64 {
    200
}

fn default_connect_timeout_ms() -> u64 {
    100
}

fn default_pool_max_idle_per_host() -> usize {
    32
}

fn default_pool_idle_timeout_ms() -> u64 {
    90_000
}

/// HTTP 传输层配置，对适配器核心逻辑不可见
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HttpConfig {
    /// 调用方未指定超时时使用的默认超时（毫秒）
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_pool_max_idle_per_host")]
    pub pool_max_idle_per_host: usize,
    #[serde(default = "default_pool_idle_timeout_ms")]
    pub pool_idle_timeout_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            pool_max_idle_per_host: default_pool_max_idle_per_host(),
            pool_idle_timeout_ms: default_pool_idle_timeout_ms(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// 按配置构建共享的 reqwest 客户端
    pub fn build_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(self.connect_timeout_ms))
            .pool_max_idle_per_host(self.pool_max_idle_per_host)
            .pool_idle_timeout(Duration::from_millis(self.pool_idle_timeout_ms))
            .build()
            .map_err(AdapterError::Transport)
    }
}

/// **适配器静态配置**，构造后不再修改
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AdapterConfig {
    /// 竞价端点地址
    pub endpoint: String,
    /// 用户同步（cookie matching）跳转基础地址
    #[serde(default)]
    pub usersync_url: String,
    /// 本服务对外地址，用于拼接 setuid 回调
    #[serde(default)]
    pub external_url: String,
    #[serde(default)]
    pub http: HttpConfig,
}

impl AdapterConfig {
    pub fn new(endpoint: &str, usersync_url: &str, external_url: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            usersync_url: usersync_url.to_string(),
            external_url: external_url.to_string(),
            http: HttpConfig::default(),
        }
    }

    /// 从 JSON 文件读取配置
    pub fn from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| AdapterError::InvalidConfig(format!("unable to read {}: {}", path, e)))?;
        let config: AdapterConfig = serde_json::from_str(&content)
            .map_err(|e| AdapterError::InvalidConfig(format!("unable to parse {}: {}", path, e)))?;
        config.validate()?;
        Ok(config)
    }

    /// 端点必须是 http(s) 绝对地址
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.endpoint).map_err(|e| {
            AdapterError::InvalidConfig(format!("endpoint '{}': {}", self.endpoint, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AdapterError::InvalidConfig(format!(
                "endpoint '{}' must use http or https",
                self.endpoint
            )));
        }
        if self.http.timeout_ms == 0 {
            return Err(AdapterError::InvalidConfig(
                "http.timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
