// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::domain::models::standard::DEFAULT_BASE_URL;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// 应用程序配置设置
///
/// 包含客户端和输出等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 客户端配置
    pub client: ClientSettings,
    /// 输出配置
    pub output: OutputSettings,
}

/// 客户端配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSettings {
    /// 默认服务地址
    pub base_url: String,
    /// 每个请求分摊的超时时间（秒），批次超时 = 该值 × 请求数
    pub timeout_per_request_secs: u64,
    /// 进度采样间隔（毫秒）
    pub progress_interval_ms: u64,
}

/// 输出配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct OutputSettings {
    /// 是否输出格式化的JSON
    pub pretty: bool,
    /// 进度条宽度
    pub progress_bar_width: usize,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从配置文件和环境变量加载配置，支持默认值
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Self::defaults(Config::builder())?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("SEISBATCH").separator("__"));

        builder.build()?.try_deserialize()
    }

    /// 仅由默认值构成的配置
    pub fn from_defaults() -> Result<Self, ConfigError> {
        Self::defaults(Config::builder())?
            .build()?
            .try_deserialize()
    }

    fn defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        builder
            // Default client settings
            .set_default("client.base_url", DEFAULT_BASE_URL)?
            .set_default("client.timeout_per_request_secs", 5)?
            .set_default("client.progress_interval_ms", 100)?
            // Default output settings
            .set_default("output.pretty", true)?
            .set_default("output.progress_bar_width", 20)
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
