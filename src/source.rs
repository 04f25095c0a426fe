use std::time::Duration;

use rodio::Source;
use rodio::source::SeekError;

/// Passes samples through and runs `on_end` the first time the inner source
/// runs dry. The audio thread uses it to report end of track.
pub struct EndNotify<T, F> {
    inner: T,
    on_end: Option<F>,
}

impl<T, F> EndNotify<T, F>
where
    T: Source,
    F: FnOnce(),
{
    pub fn new(inner: T, on_end: F) -> Self {
        EndNotify {
            inner,
            on_end: Some(on_end),
        }
    }
}

impl<T, F> Iterator for EndNotify<T, F>
where
    T: Source,
    F: FnOnce(),
{
    type Item = T::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let sample = self.inner.next();
        if sample.is_none() {
            if let Some(on_end) = self.on_end.take() {
                on_end();
            }
        }
        sample
    }
}

impl<T, F> Source for EndNotify<T, F>
where
    T: Source,
    F: FnOnce(),
{
    fn current_span_len(&self) -> Option<usize> {
        self.inner.current_span_len()
    }

    fn channels(&self) -> rodio::ChannelCount {
        self.inner.channels()
    }

    fn sample_rate(&self) -> rodio::SampleRate {
        self.inner.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        self.inner.total_duration()
    }

    fn try_seek(&mut self, pos: Duration) -> Result<(), SeekError> {
        self.inner.try_seek(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rodio::buffer::SamplesBuffer;
    use std::cell::Cell;

    #[test]
    fn on_end_runs_once_after_last_sample() {
        let ended = Cell::new(0);
        let buffer = SamplesBuffer::new(1, 8000, vec![0.1f32, 0.2, 0.3]);
        let mut source = EndNotify::new(buffer, || ended.set(ended.get() + 1));

        assert_eq!(source.by_ref().take(3).count(), 3);
        assert_eq!(ended.get(), 0);

        assert!(source.next().is_none());
        assert!(source.next().is_none());
        assert_eq!(ended.get(), 1);
    }

    #[test]
    fn forwards_format() {
        let buffer = SamplesBuffer::new(2, 44100, vec![0.0f32; 8]);
        let source = EndNotify::new(buffer, || {});
        assert_eq!(source.channels(), 2);
        assert_eq!(source.sample_rate(), 44100);
    }
}
