// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// JSON输入文件
pub mod json_file;
/// 批量请求报告
pub mod report;
/// 示例输入文件
pub mod samples;

use crate::utils::errors::BatchError;
use std::fmt;
use std::path::{Path, PathBuf};

/// 支持的文件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// JSON文档
    Json,
}

impl FileType {
    /// 所有支持的文件类型
    pub const ALL: [FileType; 1] = [FileType::Json];

    /// 文件扩展名（含 `.`）
    pub fn extension(&self) -> &'static str {
        match self {
            FileType::Json => ".json",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            FileType::Json => "JavaScript Object Notation File",
        }
    }

    /// 根据扩展名识别文件类型，不区分大小写
    ///
    /// # 参数
    ///
    /// * `path` - 文件路径
    ///
    /// # 返回值
    ///
    /// * `Ok(FileType)` - 识别出的类型
    /// * `Err(BatchError::UnsupportedFileType)` - 没有扩展名或扩展名不受支持
    pub fn from_path(path: &Path) -> Result<Self, BatchError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_lowercase()))
            .unwrap_or_default();

        Self::ALL
            .iter()
            .copied()
            .find(|t| t.extension() == extension)
            .ok_or(BatchError::UnsupportedFileType(extension))
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// 支持的输入文件类型表
pub fn supported_file_types_table() -> String {
    let mut table = format!("{:<10} {}\n", "Extension", "Description");
    table.push_str(&"-".repeat(40));
    for file_type in FileType::ALL {
        table.push_str(&format!(
            "\n{:<10} {}",
            file_type.extension(),
            file_type.description()
        ));
    }
    table
}

/// 尽量转换为绝对路径，文件不存在时退回到拼接当前目录
fn absolute(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        std::env::current_dir()
            .map(|dir| dir.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    })
}

/// 检查输出文件所在目录
///
/// 目录必须存在；已存在的文件只有在 `force_overwrite` 时才会被替换
pub fn ensure_writable(path: &Path, force_overwrite: bool) -> Result<(), BatchError> {
    let parent = absolute(path)
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| BatchError::DirectoryNotFound(PathBuf::new()))?;
    if !parent.is_dir() {
        return Err(BatchError::DirectoryNotFound(parent));
    }
    if path.exists() && !force_overwrite {
        return Err(BatchError::FileOverwrite(path.to_path_buf()));
    }
    Ok(())
}

/// 检查一次批量请求的输入和输出文件
///
/// # 参数
///
/// * `input` - 输入文件，必须存在
/// * `output` - 输出文件，不能与输入相同
/// * `force_overwrite` - 是否允许覆盖已存在的输出文件
pub fn check_request_files(
    input: &Path,
    output: &Path,
    force_overwrite: bool,
) -> Result<(), BatchError> {
    if absolute(input) == absolute(output) {
        return Err(BatchError::SameFile(input.to_path_buf()));
    }
    if !input.is_file() {
        return Err(BatchError::FileNotFound(input.to_path_buf()));
    }
    FileType::from_path(input)?;
    FileType::from_path(output)?;
    ensure_writable(output, force_overwrite)
}
