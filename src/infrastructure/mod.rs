// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 包含与外部系统交互的技术实现：
/// - 文件读写（io）：输入文件、示例文件和请求报告
/// - 可观测性（observability）：指标名称和描述
pub mod io;
pub mod observability;
