//! Progress reporting for the frame scan.

use std::ops::ControlFlow;

/// Position of the frame scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Frames analysed so far.
    pub frames_done: usize,
    /// Frames in the input.
    pub frames_total: usize,
}

impl Progress {
    /// Completed fraction in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.frames_total == 0 {
            1.0
        } else {
            self.frames_done as f64 / self.frames_total as f64
        }
    }

    /// Whole percent completed, `0..=100`.
    pub fn percent(&self) -> u8 {
        if self.frames_total == 0 {
            return 100;
        }
        let done = self.frames_done.min(self.frames_total) as u128;
        (done * 100 / self.frames_total as u128) as u8
    }

    /// Whether every frame has been analysed.
    pub fn is_complete(&self) -> bool {
        self.frames_done >= self.frames_total
    }
}

/// Forwards progress to a callback once per whole percent.
///
/// The callback sees each percent value at most once, so a scan produces at
/// most 101 calls; the completed position is always delivered.
pub(crate) struct ProgressGate<F> {
    callback: F,
    frames_total: usize,
    last_percent: Option<u8>,
}

impl<F> ProgressGate<F>
where
    F: FnMut(Progress) -> ControlFlow<()>,
{
    pub(crate) fn new(frames_total: usize, callback: F) -> Self {
        Self {
            callback,
            frames_total,
            last_percent: None,
        }
    }

    /// Reports `frames_done`, invoking the callback only when the whole
    /// percent advanced.
    pub(crate) fn advance(&mut self, frames_done: usize) -> ControlFlow<()> {
        let progress = Progress {
            frames_done,
            frames_total: self.frames_total,
        };
        let percent = progress.percent();
        if self.last_percent.is_some_and(|last| last >= percent) {
            return ControlFlow::Continue(());
        }
        self.last_percent = Some(percent);
        (self.callback)(progress)
    }
}
