// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 包含参考标准目录、请求参数和批量请求结果
pub mod batch_result;
pub mod request_parameters;
pub mod standard;
