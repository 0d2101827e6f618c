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

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 全球 HTTPS 服务地址（默认）
pub const GLOBAL_SERVER_URL_HTTPS: &str = "https://earthquake.usgs.gov/ws/designmaps/";

/// 全球 HTTP 服务地址，仅用于测试
pub const GLOBAL_SERVER_URL_HTTP: &str = "http://earthquake.usgs.gov/ws/designmaps/";

/// 本地服务地址（例如运行在 docker 容器中的服务）
pub const LOCAL_SERVER_URL: &str = "http://localhost:4000/quake/";

/// 默认服务地址
pub const DEFAULT_BASE_URL: &str = GLOBAL_SERVER_URL_HTTPS;

/// 参数错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParameterError {
    /// 不支持的参考标准
    #[error("Unsupported reference document \"{0}\"")]
    UnknownStandard(String),
    /// 未知的风险类别
    #[error("Unknown risk category \"{0}\": expected one of I, II, III, IV")]
    UnknownRiskCategory(String),
    /// 未知的场地类别
    #[error("Unknown site class \"{0}\": expected one of A, B, C, D, E, F")]
    UnknownSiteClass(String),
    /// 字段名称不匹配
    #[error("Invalid names {found}: expected {expected} (in any order)")]
    InvalidNames {
        /// 期望的字段名
        expected: String,
        /// 实际的字段名
        found: String,
    },
    /// 字段类型不匹配
    #[error("Invalid type {found} for \"{key}\"={value}: expected {expected}")]
    InvalidType {
        /// 字段名
        key: String,
        /// 字段值
        value: String,
        /// 实际类型
        found: &'static str,
        /// 期望类型
        expected: &'static str,
    },
    /// 输入文档结构无效
    #[error("Invalid input document: {0}")]
    InvalidDocument(String),
}

/// 抗震设计参考标准
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Standard {
    /// ASCE 7-05
    #[serde(rename = "ASCE7-05")]
    Asce7_05,
    /// ASCE 7-10
    #[serde(rename = "ASCE7-10")]
    Asce7_10,
    /// ASCE 7-16
    #[serde(rename = "ASCE7-16")]
    Asce7_16,
    /// IBC 2012
    #[serde(rename = "IBC-2012")]
    Ibc2012,
    /// IBC 2015
    #[serde(rename = "IBC-2015")]
    Ibc2015,
}

const STANDARDS: [Standard; 5] = [
    Standard::Asce7_05,
    Standard::Asce7_10,
    Standard::Asce7_16,
    Standard::Ibc2012,
    Standard::Ibc2015,
];

impl Standard {
    /// 返回所有支持的标准（目录顺序）
    pub fn all() -> &'static [Standard] {
        &STANDARDS
    }

    /// 标准名称，例如 `ASCE7-16`
    pub fn name(&self) -> &'static str {
        match self {
            Standard::Asce7_05 => "ASCE7-05",
            Standard::Asce7_10 => "ASCE7-10",
            Standard::Asce7_16 => "ASCE7-16",
            Standard::Ibc2012 => "IBC-2012",
            Standard::Ibc2015 => "IBC-2015",
        }
    }

    /// 标准发布年份
    pub fn year(&self) -> u16 {
        match self {
            Standard::Asce7_05 => 2005,
            Standard::Asce7_10 => 2010,
            Standard::Asce7_16 => 2016,
            Standard::Ibc2012 => 2012,
            Standard::Ibc2015 => 2015,
        }
    }

    /// 相对于服务地址的请求路径
    pub fn request_path(&self) -> &'static str {
        match self {
            Standard::Asce7_05 => "asce7-05.json",
            Standard::Asce7_10 => "asce7-10.json",
            Standard::Asce7_16 => "asce7-16.json",
            Standard::Ibc2012 => "ibc-2012.json",
            Standard::Ibc2015 => "ibc-2015.json",
        }
    }

    /// 相对于服务地址的文档路径
    pub fn doc_path(&self) -> &'static str {
        match self {
            Standard::Asce7_05 => "asce7-05.html",
            Standard::Asce7_10 => "asce7-10.html",
            Standard::Asce7_16 => "asce7-16.html",
            Standard::Ibc2012 => "ibc-2012.html",
            Standard::Ibc2015 => "ibc-2015.html",
        }
    }

    /// 完整请求地址
    ///
    /// # 参数
    ///
    /// * `base_url` - 服务地址，需以 `/` 结尾
    pub fn request_url(&self, base_url: &str) -> String {
        format!("{}{}", base_url, self.request_path())
    }

    /// 完整文档地址
    pub fn doc_url(&self, base_url: &str) -> String {
        format!("{}{}", base_url, self.doc_path())
    }
}

impl fmt::Display for Standard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Standard {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        STANDARDS
            .iter()
            .copied()
            .find(|st| st.name() == s)
            .ok_or_else(|| ParameterError::UnknownStandard(s.to_string()))
    }
}

/// 风险类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskCategory {
    I,
    II,
    III,
    IV,
}

impl RiskCategory {
    /// 所有风险类别
    pub const ALL: [RiskCategory; 4] = [
        RiskCategory::I,
        RiskCategory::II,
        RiskCategory::III,
        RiskCategory::IV,
    ];

    /// 类别标识
    pub fn id(&self) -> &'static str {
        match self {
            RiskCategory::I => "I",
            RiskCategory::II => "II",
            RiskCategory::III => "III",
            RiskCategory::IV => "IV",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for RiskCategory {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|rc| rc.id() == s)
            .ok_or_else(|| ParameterError::UnknownRiskCategory(s.to_string()))
    }
}

/// 场地类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SiteClass {
    A,
    B,
    C,
    D,
    E,
    F,
}

impl SiteClass {
    /// 所有场地类别
    pub const ALL: [SiteClass; 6] = [
        SiteClass::A,
        SiteClass::B,
        SiteClass::C,
        SiteClass::D,
        SiteClass::E,
        SiteClass::F,
    ];

    /// 类别标识
    pub fn id(&self) -> &'static str {
        match self {
            SiteClass::A => "A",
            SiteClass::B => "B",
            SiteClass::C => "C",
            SiteClass::D => "D",
            SiteClass::E => "E",
            SiteClass::F => "F",
        }
    }
}

impl fmt::Display for SiteClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for SiteClass {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|sc| sc.id() == s)
            .ok_or_else(|| ParameterError::UnknownSiteClass(s.to_string()))
    }
}
