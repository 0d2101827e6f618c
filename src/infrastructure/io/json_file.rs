// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::request_parameters::{RequestParameters, RequestParametersInput};
use crate::domain::models::standard::ParameterError;
use crate::utils::errors::BatchError;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// 解析输入文档
///
/// 文档必须是对象数组，每个对象的字段集合和类型都会被严格检查
pub fn parse_input_document(text: &str) -> Result<Vec<RequestParametersInput>, BatchError> {
    let document: Value = serde_json::from_str(text)?;
    let Value::Array(items) = document else {
        return Err(ParameterError::InvalidDocument("expected an array of objects".to_string()).into());
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let object = item.as_object().ok_or_else(|| {
                ParameterError::InvalidDocument(format!("item {} is not an object", index))
            })?;
            RequestParametersInput::from_json_object(object).map_err(|e| {
                warn!(index, error = %e, "Invalid input item");
                BatchError::from(e)
            })
        })
        .collect()
}

/// 读取输入文件
pub async fn read_input_file(path: &Path) -> Result<Vec<RequestParametersInput>, BatchError> {
    let text = match fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(BatchError::FileNotFound(path.to_path_buf()))
        }
        Err(e) => return Err(BatchError::Io(e)),
    };
    let inputs = parse_input_document(&text)?;
    debug!(path = %path.display(), count = inputs.len(), "Read input file");
    Ok(inputs)
}

/// 读取输入文件并校验为请求参数
pub async fn read_request_parameters(path: &Path) -> Result<Vec<RequestParameters>, BatchError> {
    let inputs = read_input_file(path).await?;
    let parameters = inputs
        .iter()
        .map(RequestParametersInput::to_request_parameters)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(parameters)
}

/// 把值以JSON写入文件
///
/// # 参数
///
/// * `path` - 目标文件，已存在时被替换
/// * `value` - 要写入的值
/// * `pretty` - 是否缩进
pub async fn write_json<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
    pretty: bool,
) -> Result<(), BatchError> {
    let mut data = if pretty {
        serde_json::to_vec_pretty(value)?
    } else {
        serde_json::to_vec(value)?
    };
    data.push(b'\n');

    let mut file = fs::File::create(path).await?;
    file.write_all(&data).await?;
    file.flush().await?;
    debug!(path = %path.display(), bytes = data.len(), "Wrote JSON file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const VALID: &str = r#"[
        {"RefDoc": "ASCE7-16", "Latitude": 34.1, "Longitude": -118.01,
         "RiskCategory": "III", "SiteClass": "D", "Title": "Site A"},
        {"Title": "Site B", "SiteClass": "C", "RiskCategory": "I",
         "Longitude": 12, "Latitude": 45, "RefDoc": "IBC-2015"}
    ]"#;

    #[test]
    fn test_parse_input_document() {
        let inputs = parse_input_document(VALID).unwrap();
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[0].ref_doc, "ASCE7-16");
        assert_eq!(inputs[1].longitude, 12.0);
        assert_eq!(inputs[1].title, "Site B");
    }

    #[test]
    fn test_parse_input_document_rejects_bad_shapes() {
        assert!(matches!(
            parse_input_document("{}"),
            Err(BatchError::InvalidParameter(ParameterError::InvalidDocument(_)))
        ));
        assert!(matches!(
            parse_input_document("[1]"),
            Err(BatchError::InvalidParameter(ParameterError::InvalidDocument(_)))
        ));
        assert!(matches!(
            parse_input_document(r#"[{"RefDoc": "ASCE7-16"}]"#),
            Err(BatchError::InvalidParameter(ParameterError::InvalidNames { .. }))
        ));
        assert!(matches!(
            parse_input_document("not json"),
            Err(BatchError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_read_request_parameters() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("input.json");
        std::fs::write(&path, VALID).unwrap();

        let parameters = read_request_parameters(&path).await.unwrap();
        assert_eq!(parameters.len(), 2);
        assert_eq!(parameters[1].title(), "Site B");
    }

    #[tokio::test]
    async fn test_read_request_parameters_unknown_standard() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("input.json");
        std::fs::write(&path, VALID.replace("IBC-2015", "IBC-2099")).unwrap();

        let err = read_request_parameters(&path).await.err().unwrap();
        assert!(matches!(
            err,
            BatchError::InvalidParameter(ParameterError::UnknownStandard(_))
        ));
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = read_input_file(&dir.path().join("missing.json"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, BatchError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_write_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");

        write_json(&path, &serde_json::json!({"a": 1}), false).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"a\":1}\n");

        write_json(&path, &vec![1, 2], true).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[\n  1,\n  2\n]\n");
    }
}
