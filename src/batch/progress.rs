// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use parking_lot::Mutex;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::trace;

/// 进度观察者
///
/// `on_progress` 收到的值单调不减，位于 [0.0, 1.0]；
/// 每个批次恰好调用一次 `on_finish`。
pub trait ProgressObserver: Send + Sync {
    /// 进度更新
    fn on_progress(&self, fraction: f64);

    /// 批次结束（成功、部分失败或取消）
    fn on_finish(&self);
}

impl<T: ProgressObserver + ?Sized> ProgressObserver for Arc<T> {
    fn on_progress(&self, fraction: f64) {
        (**self).on_progress(fraction)
    }

    fn on_finish(&self) {
        (**self).on_finish()
    }
}

/// 忽略所有进度
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&self, _fraction: f64) {}

    fn on_finish(&self) {}
}

/// 由两个闭包组成的进度观察者
pub struct ProgressCallbacks<P, F>
where
    P: Fn(f64) + Send + Sync,
    F: Fn() + Send + Sync,
{
    progress: P,
    finish: F,
}

impl<P, F> ProgressCallbacks<P, F>
where
    P: Fn(f64) + Send + Sync,
    F: Fn() + Send + Sync,
{
    /// 创建进度回调
    ///
    /// # 参数
    ///
    /// * `progress` - 接收进度值
    /// * `finish` - 批次结束时调用
    pub fn new(progress: P, finish: F) -> Self {
        Self { progress, finish }
    }
}

impl<P, F> ProgressObserver for ProgressCallbacks<P, F>
where
    P: Fn(f64) + Send + Sync,
    F: Fn() + Send + Sync,
{
    fn on_progress(&self, fraction: f64) {
        (self.progress)(fraction)
    }

    fn on_finish(&self) {
        (self.finish)()
    }
}

/// 进度条错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProgressBarError {
    /// 宽度过小
    #[error("progress bar width {0} < 10")]
    WidthTooSmall(usize),
    /// 进度超出范围
    #[error("progress {0} out of range [0, 1]")]
    OutOfRange(f64),
}

/// 控制台进度条
///
/// 以 `|#####     | 50.0%` 的形式在同一行刷新
pub struct ProgressBar {
    width: usize,
    done_char: char,
    undone_char: char,
    left_border: char,
    right_border: char,
    out: Mutex<Box<dyn Write + Send>>,
}

impl ProgressBar {
    /// 创建输出到标准输出的进度条
    pub fn new(width: usize) -> Result<Self, ProgressBarError> {
        Self::with_writer(width, Box::new(std::io::stdout()))
    }

    /// 创建输出到指定位置的进度条
    pub fn with_writer(width: usize, out: Box<dyn Write + Send>) -> Result<Self, ProgressBarError> {
        if width < 10 {
            return Err(ProgressBarError::WidthTooSmall(width));
        }
        Ok(Self {
            width,
            done_char: '#',
            undone_char: ' ',
            left_border: '|',
            right_border: '|',
            out: Mutex::new(out),
        })
    }

    /// 设置已完成和未完成部分的字符
    pub fn with_chars(mut self, done_char: char, undone_char: char) -> Self {
        self.done_char = done_char;
        self.undone_char = undone_char;
        self
    }

    /// 设置边框字符
    pub fn with_borders(mut self, left_border: char, right_border: char) -> Self {
        self.left_border = left_border;
        self.right_border = right_border;
        self
    }

    /// 渲染进度条文本（不含回车符）
    pub fn render(&self, progress: f64) -> String {
        let done_count = ((progress * self.width as f64) as usize).min(self.width);
        let done: String = std::iter::repeat(self.done_char).take(done_count).collect();
        let undone: String = std::iter::repeat(self.undone_char)
            .take(self.width - done_count)
            .collect();
        format!(
            "{}{}{}{} {:.1}%",
            self.left_border,
            done,
            undone,
            self.right_border,
            progress * 100.0
        )
    }

    /// 刷新进度
    pub fn update(&self, progress: f64) -> Result<(), ProgressBarError> {
        if !(0.0..=1.0).contains(&progress) {
            return Err(ProgressBarError::OutOfRange(progress));
        }
        self.print(&format!("\r{}", self.render(progress)));
        Ok(())
    }

    /// 以 100% 结束并换行
    pub fn finish(&self) {
        self.print(&format!("\r{}\n", self.render(1.0)));
    }

    fn print(&self, text: &str) {
        let mut out = self.out.lock();
        // Progress output is best effort
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
    }
}

impl ProgressObserver for ProgressBar {
    fn on_progress(&self, fraction: f64) {
        if let Err(e) = self.update(fraction) {
            tracing::warn!(error = %e, "Ignoring invalid progress value");
        }
    }

    fn on_finish(&self) {
        self.finish();
    }
}

/// 已结束请求的计数器
///
/// 由请求任务递增；进度监控器只能通过 `CompletionView` 读取
#[derive(Debug, Clone, Default)]
pub struct CompletionCounter(Arc<AtomicUsize>);

impl CompletionCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一个已结束的请求，返回新的计数
    pub fn increment(&self) -> usize {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// 当前计数
    pub fn settled(&self) -> usize {
        self.0.load(Ordering::Acquire)
    }

    /// 只读视图
    pub fn view(&self) -> CompletionView {
        CompletionView(self.0.clone())
    }
}

/// 计数器的只读视图
#[derive(Debug, Clone)]
pub struct CompletionView(Arc<AtomicUsize>);

impl CompletionView {
    /// 当前计数
    pub fn settled(&self) -> usize {
        self.0.load(Ordering::Acquire)
    }
}

/// 监控器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// 尚未开始
    Idle,
    /// 周期采样中
    Polling,
    /// 已结束，不会再次进入采样
    Finished,
}

/// 批次结束的方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorExit {
    /// 所有请求已结束
    Completed,
    /// 批次被取消或失败
    Aborted,
}

/// 进度监控器
///
/// 在请求进行期间按固定间隔采样已结束的请求数，并把 `settled / total`
/// 转发给观察者。批次结束时发出且仅发出一次结束通知。
pub struct ProgressMonitor<'a> {
    view: CompletionView,
    total: usize,
    interval: Duration,
    observer: &'a dyn ProgressObserver,
    state: MonitorState,
    last_reported: f64,
}

impl<'a> ProgressMonitor<'a> {
    /// 创建进度监控器
    ///
    /// # 参数
    ///
    /// * `view` - 已结束请求数的只读视图
    /// * `total` - 请求总数
    /// * `interval` - 采样间隔
    /// * `observer` - 进度观察者
    pub fn new(
        view: CompletionView,
        total: usize,
        interval: Duration,
        observer: &'a dyn ProgressObserver,
    ) -> Self {
        Self {
            view,
            total,
            interval,
            observer,
            state: MonitorState::Idle,
            last_reported: 0.0,
        }
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// 当前完成比例，总数为 0 时视为已完成
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.view.settled().min(self.total) as f64 / self.total as f64
    }

    /// 进入采样状态并报告 0.0
    pub fn begin(&mut self) {
        if self.state != MonitorState::Idle {
            return;
        }
        self.state = MonitorState::Polling;
        self.last_reported = 0.0;
        self.observer.on_progress(0.0);
    }

    /// 不经采样直接结束
    pub fn finish(&mut self) {
        if self.state == MonitorState::Finished {
            return;
        }
        self.state = MonitorState::Finished;
        self.observer.on_finish();
    }

    fn sample(&mut self) {
        let fraction = self.fraction().max(self.last_reported);
        self.last_reported = fraction;
        trace!(fraction, "Progress sample");
        self.observer.on_progress(fraction);
    }

    /// 周期采样，直到收到批次结束信号
    ///
    /// 发送端被丢弃时按 `Aborted` 处理。正常结束时在结束通知之前
    /// 再采样一次，保证最后一次进度为 1.0。
    pub async fn run(&mut self, exit: oneshot::Receiver<MonitorExit>) {
        if self.state == MonitorState::Idle {
            self.begin();
        }
        if self.state != MonitorState::Polling {
            return;
        }

        let period = self.interval.max(Duration::from_millis(1));
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut exit = exit;
        let completed = loop {
            tokio::select! {
                biased;
                result = &mut exit => break matches!(result, Ok(MonitorExit::Completed)),
                _ = ticker.tick() => self.sample(),
            }
        };

        if completed {
            self.sample();
        }
        self.finish();
    }
}
