// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::request_parameters::sample_inputs;
use crate::infrastructure::io::json_file::write_json;
use crate::infrastructure::io::{ensure_writable, FileType};
use crate::utils::errors::BatchError;
use std::path::Path;
use tracing::info;

/// 写入示例输入文件，每个支持的标准一条
///
/// # 参数
///
/// * `path` - 目标文件，类型由扩展名决定
/// * `force_overwrite` - 是否允许覆盖已存在的文件
pub async fn write_sample_file(path: &Path, force_overwrite: bool) -> Result<(), BatchError> {
    ensure_writable(path, force_overwrite)?;
    let samples = sample_inputs();
    match FileType::from_path(path)? {
        FileType::Json => write_json(path, &samples, true).await?,
    }
    info!(path = %path.display(), count = samples.len(), "Wrote sample input file");
    Ok(())
}
