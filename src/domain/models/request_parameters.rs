// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::standard::{ParameterError, RiskCategory, SiteClass, Standard};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// 输入文档中的字段及其期望类型
const EXPECTED_FIELDS: [(&str, FieldType); 6] = [
    ("Latitude", FieldType::Number),
    ("Longitude", FieldType::Number),
    ("RefDoc", FieldType::String),
    ("RiskCategory", FieldType::String),
    ("SiteClass", FieldType::String),
    ("Title", FieldType::String),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldType {
    String,
    Number,
}

impl FieldType {
    fn name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
        }
    }

    fn matches(&self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Number => value.is_number(),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn quoted_list<'a>(names: impl Iterator<Item = &'a str>) -> String {
    let mut names: Vec<&str> = names.collect();
    names.sort_unstable();
    names
        .iter()
        .map(|n| format!("\"{}\"", n))
        .collect::<Vec<_>>()
        .join(", ")
}

/// 未经校验的请求参数
///
/// 从输入文件中读取的原始参数，字段名与输入文档保持一致
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct RequestParametersInput {
    /// 参考标准名称
    pub ref_doc: String,
    /// 纬度
    pub latitude: f64,
    /// 经度
    pub longitude: f64,
    /// 风险类别标识
    pub risk_category: String,
    /// 场地类别标识
    pub site_class: String,
    /// 标题
    pub title: String,
}

impl RequestParametersInput {
    /// 创建新的输入参数
    pub fn new(
        ref_doc: impl Into<String>,
        latitude: f64,
        longitude: f64,
        risk_category: impl Into<String>,
        site_class: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            ref_doc: ref_doc.into(),
            latitude,
            longitude,
            risk_category: risk_category.into(),
            site_class: site_class.into(),
            title: title.into(),
        }
    }

    /// 从JSON对象创建输入参数
    ///
    /// 字段集合必须与期望字段完全一致（顺序任意），且每个字段的类型必须匹配
    ///
    /// # 参数
    ///
    /// * `data` - JSON对象
    ///
    /// # 返回值
    ///
    /// * `Ok(RequestParametersInput)` - 解析后的输入参数
    /// * `Err(ParameterError)` - 字段名或字段类型不匹配
    pub fn from_json_object(data: &Map<String, Value>) -> Result<Self, ParameterError> {
        let mut found: Vec<&str> = data.keys().map(String::as_str).collect();
        found.sort_unstable();
        let expected: Vec<&str> = EXPECTED_FIELDS.iter().map(|(name, _)| *name).collect();
        if found != expected {
            return Err(ParameterError::InvalidNames {
                expected: quoted_list(expected.into_iter()),
                found: quoted_list(found.into_iter()),
            });
        }

        for (key, field_type) in EXPECTED_FIELDS {
            let value = &data[key];
            if !field_type.matches(value) {
                return Err(ParameterError::InvalidType {
                    key: key.to_string(),
                    value: value.to_string(),
                    found: json_type_name(value),
                    expected: field_type.name(),
                });
            }
        }

        // Types were checked above
        let string = |key: &str| data[key].as_str().unwrap_or_default().to_string();
        let number = |key: &str| data[key].as_f64().unwrap_or_default();

        Ok(Self {
            ref_doc: string("RefDoc"),
            latitude: number("Latitude"),
            longitude: number("Longitude"),
            risk_category: string("RiskCategory"),
            site_class: string("SiteClass"),
            title: string("Title"),
        })
    }

    /// 转换为经过校验的请求参数
    ///
    /// 参考标准、风险类别和场地类别必须是已知的取值
    pub fn to_request_parameters(&self) -> Result<RequestParameters, ParameterError> {
        Ok(RequestParameters::new(
            self.ref_doc.parse()?,
            self.latitude,
            self.longitude,
            self.risk_category.parse()?,
            self.site_class.parse()?,
            self.title.clone(),
        ))
    }
}

impl fmt::Display for RequestParametersInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RefDoc='{}', Lat={}, Long={}, RiskCat={}, SiteClass={}, Title='{}'",
            self.ref_doc,
            self.latitude,
            self.longitude,
            self.risk_category,
            self.site_class,
            self.title
        )
    }
}

/// 请求参数
///
/// 不可变的请求描述，足以确定性地构造一个请求URI
#[derive(Debug, Clone, PartialEq)]
pub struct RequestParameters {
    standard: Standard,
    latitude: f64,
    longitude: f64,
    risk_category: RiskCategory,
    site_class: SiteClass,
    title: String,
}

impl RequestParameters {
    /// 创建新的请求参数
    pub fn new(
        standard: Standard,
        latitude: f64,
        longitude: f64,
        risk_category: RiskCategory,
        site_class: SiteClass,
        title: impl Into<String>,
    ) -> Self {
        Self {
            standard,
            latitude,
            longitude,
            risk_category,
            site_class,
            title: title.into(),
        }
    }

    pub fn standard(&self) -> Standard {
        self.standard
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn risk_category(&self) -> RiskCategory {
        self.risk_category
    }

    pub fn site_class(&self) -> SiteClass {
        self.site_class
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// 编码相对URI（不含服务地址）
    ///
    /// 用于已设置服务地址的传输层。标题按百分号编码转义。
    pub fn encode_relative_uri(&self) -> String {
        format!(
            "{}?latitude={}&longitude={}&riskCategory={}&siteClass={}&title={}",
            self.standard.request_path(),
            self.latitude,
            self.longitude,
            self.risk_category,
            self.site_class,
            urlencoding::encode(&self.title)
        )
    }

    /// 编码完整URI（包含服务地址）
    ///
    /// 用于未设置服务地址的传输层
    pub fn encode_uri(&self, base_url: &str) -> String {
        format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            self.encode_relative_uri()
        )
    }
}

impl fmt::Display for RequestParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}, {}, {}, {}",
            self.standard,
            self.latitude,
            self.longitude,
            self.site_class,
            self.risk_category,
            self.title
        )
    }
}

/// 示例输入参数，每个支持的标准各一组
pub fn sample_inputs() -> Vec<RequestParametersInput> {
    Standard::all()
        .iter()
        .map(|st| {
            RequestParametersInput::new(
                st.name(),
                34.1,
                118.01,
                "III",
                "D",
                format!("Example {}", st.name()),
            )
        })
        .collect()
}

/// 示例请求参数，每个支持的标准各一组
pub fn sample_parameters() -> Vec<RequestParameters> {
    Standard::all()
        .iter()
        .map(|st| {
            RequestParameters::new(
                *st,
                34.987,
                -118.2657,
                RiskCategory::III,
                SiteClass::D,
                format!("Example {}", st.name()),
            )
        })
        .collect()
}
