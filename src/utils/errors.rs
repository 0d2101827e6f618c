// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::standard::ParameterError;
use crate::engines::traits::TransportError;
use std::path::PathBuf;
use thiserror::Error;

/// 批量请求错误类型
///
/// 单个请求的失败不会出现在这里，它们被记录在 `BatchResult` 中
#[derive(Error, Debug)]
pub enum BatchError {
    /// 服务请求错误，整个批次失败
    #[error("Server request to {base_url} failed: {source}")]
    ServerRequest {
        /// 服务地址
        base_url: String,
        /// 底层错误
        #[source]
        source: TransportError,
    },

    /// 无效的服务地址
    #[error("Invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl {
        /// 服务地址
        url: String,
        /// 原因
        reason: String,
    },

    /// 批次被调用方取消
    #[error("Server request cancelled")]
    Cancelled,

    /// 请求参数错误
    #[error("Invalid parameter: {0}")]
    InvalidParameter(#[from] ParameterError),

    /// 文件已存在
    #[error("File \"{}\" already exists", .0.display())]
    FileOverwrite(PathBuf),

    /// 输入和输出是同一个文件
    #[error("Input file and output file are the same: \"{}\"", .0.display())]
    SameFile(PathBuf),

    /// 文件不存在
    #[error("File \"{}\" does not exist", .0.display())]
    FileNotFound(PathBuf),

    /// 目录不存在
    #[error("Directory \"{}\" does not exist", .0.display())]
    DirectoryNotFound(PathBuf),

    /// 不支持的文件类型
    #[error("Unsupported file type \"{0}\"")]
    UnsupportedFileType(String),

    /// 读写错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 序列化错误
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 配置错误
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// 内部错误
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BatchError {
    /// 是否为调用方主动取消
    pub fn is_cancelled(&self) -> bool {
        matches!(self, BatchError::Cancelled)
    }
}
