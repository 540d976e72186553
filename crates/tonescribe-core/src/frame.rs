//! Fixed-size overlapping analysis windows over a sample buffer.

use crate::error::{ConvertError, ConvertResult};

/// Default frame size in samples.
pub const DEFAULT_FRAME_SIZE: u32 = 2048;

/// Default hop between consecutive frames in samples.
pub const DEFAULT_HOP: u32 = 1024;

/// Slices a borrowed sample buffer into windows of `frame_size` samples,
/// starting every `hop` samples.
///
/// Only complete frames are produced: an offset `o` is visited when
/// `o + frame_size <= samples.len()`.
#[derive(Debug, Clone, Copy)]
pub struct FrameSource<'a> {
    samples: &'a [f32],
    frame_size: usize,
    hop: usize,
}

impl<'a> FrameSource<'a> {
    /// Creates a frame source.
    ///
    /// Fails when either size is zero or the hop exceeds the frame size.
    pub fn new(samples: &'a [f32], frame_size: u32, hop: u32) -> ConvertResult<Self> {
        if frame_size == 0 {
            return Err(ConvertError::invalid_param(
                "frame_size",
                "must be greater than 0",
            ));
        }
        if hop == 0 {
            return Err(ConvertError::invalid_param("hop", "must be greater than 0"));
        }
        if hop > frame_size {
            return Err(ConvertError::invalid_param(
                "hop",
                format!("{} exceeds frame_size {}", hop, frame_size),
            ));
        }
        Ok(Self {
            samples,
            frame_size: frame_size as usize,
            hop: hop as usize,
        })
    }

    /// Number of frames the source yields.
    pub fn frame_count(&self) -> usize {
        if self.samples.len() < self.frame_size {
            0
        } else {
            (self.samples.len() - self.frame_size) / self.hop + 1
        }
    }

    /// Returns a fresh iterator starting at offset 0.
    pub fn frames(&self) -> Frames<'a> {
        self.frames_from(0)
    }

    /// Returns an iterator resuming at the given frame index.
    ///
    /// Indices past the last frame yield an exhausted iterator.
    pub fn frames_from(&self, index: usize) -> Frames<'a> {
        let count = self.frame_count();
        Frames {
            samples: self.samples,
            frame_size: self.frame_size,
            hop: self.hop,
            next_index: index.min(count),
            count,
        }
    }
}

impl<'a> IntoIterator for &FrameSource<'a> {
    type Item = &'a [f32];
    type IntoIter = Frames<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames()
    }
}

/// Iterator over the frames of a [`FrameSource`].
///
/// Cloning the iterator snapshots its position, so a scan can be suspended
/// and resumed between frames.
#[derive(Debug, Clone)]
pub struct Frames<'a> {
    samples: &'a [f32],
    frame_size: usize,
    hop: usize,
    next_index: usize,
    count: usize,
}

impl<'a> Frames<'a> {
    /// Index of the frame the next call to `next` returns.
    pub fn position(&self) -> usize {
        self.next_index
    }

    /// Sample offset of the frame the next call to `next` returns.
    pub fn offset(&self) -> usize {
        self.next_index * self.hop
    }
}

impl<'a> Iterator for Frames<'a> {
    type Item = &'a [f32];

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_index >= self.count {
            return None;
        }
        let start = self.next_index * self.hop;
        self.next_index += 1;
        Some(&self.samples[start..start + self.frame_size])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count.saturating_sub(self.next_index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Frames<'_> {}

impl std::iter::FusedIterator for Frames<'_> {}
