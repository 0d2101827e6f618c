// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 批量请求模块
///
/// 并发发送请求、报告进度并划分结果
pub mod batch;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含参考标准、请求参数和批量结果
pub mod domain;

/// 引擎模块
///
/// 传输层抽象及其 reqwest 和模拟实现
pub mod engines;

/// 基础设施模块
///
/// 文件读写和可观测性
pub mod infrastructure;

/// 工具模块
///
/// 错误类型和日志初始化
pub mod utils;
