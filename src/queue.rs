//! The playback queue model.
//!
//! `current` is the entry loaded into the player, `selected` is the UI
//! cursor. Both are `None` or a valid index at all times. `next`/`prev` do
//! not wrap around at the ends.

use crate::error::QueueError;
use crate::models::Track;

/// What a play/pause toggle did, so the caller can drive the audio thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    Started(Track),
    Paused,
    Resumed,
}

#[derive(Debug)]
pub struct Removed {
    pub track: Track,
    pub was_current: bool,
}

#[derive(Debug, Default)]
pub struct PlaybackQueue {
    tracks: Vec<Track>,
    current: Option<usize>,
    selected: Option<usize>,
    playing: bool,
}

impl PlaybackQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current.and_then(|i| self.tracks.get(i))
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    fn check(&self, index: usize) -> Result<(), QueueError> {
        if index < self.tracks.len() {
            Ok(())
        } else if self.tracks.is_empty() {
            Err(QueueError::Empty)
        } else {
            Err(QueueError::OutOfBounds {
                index,
                len: self.tracks.len(),
            })
        }
    }

    /// Appends a track. The first track added becomes the selection.
    pub fn add(&mut self, track: Track) -> usize {
        self.tracks.push(track);
        if self.selected.is_none() {
            self.selected = Some(0);
        }
        self.tracks.len() - 1
    }

    /// Removes the entry at `index`. Removing the current entry stops
    /// playback.
    pub fn remove(&mut self, index: usize) -> Result<Removed, QueueError> {
        self.check(index)?;
        let track = self.tracks.remove(index);

        let was_current = self.current == Some(index);
        self.current = match self.current {
            Some(c) if c == index => {
                self.playing = false;
                None
            }
            Some(c) if c > index => Some(c - 1),
            other => other,
        };

        self.selected = match self.selected {
            _ if self.tracks.is_empty() => None,
            Some(s) if s > index => Some(s - 1),
            Some(s) => Some(s.min(self.tracks.len() - 1)),
            None => None,
        };

        Ok(Removed { track, was_current })
    }

    /// Moves the entry at `from` to position `to`, keeping every other
    /// entry's relative order. `current` and `selected` follow their tracks.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), QueueError> {
        self.check(from)?;
        self.check(to)?;
        if from == to {
            return Ok(());
        }

        let track = self.tracks.remove(from);
        self.tracks.insert(to, track);

        let remap = |i: usize| {
            if i == from {
                to
            } else if from < to && i > from && i <= to {
                i - 1
            } else if from > to && i >= to && i < from {
                i + 1
            } else {
                i
            }
        };
        self.current = self.current.map(remap);
        self.selected = self.selected.map(remap);

        Ok(())
    }

    /// Moves the selected entry up (`delta < 0`) or down. Returns the new
    /// position, or `None` when there is nothing to move or the move would
    /// leave the queue.
    pub fn move_selected(&mut self, delta: isize) -> Option<usize> {
        let from = self.selected?;
        let to = from.checked_add_signed(delta)?;
        self.reorder(from, to).ok()?;
        Some(to)
    }

    pub fn select_next(&mut self) {
        if self.tracks.is_empty() {
            return;
        }
        let last = self.tracks.len() - 1;
        self.selected = Some(self.selected.map_or(0, |s| (s + 1).min(last)));
    }

    pub fn select_prev(&mut self) {
        if self.tracks.is_empty() {
            return;
        }
        self.selected = Some(self.selected.map_or(0, |s| s.saturating_sub(1)));
    }

    /// The entry transport commands act on: the current one, else the
    /// selection, else the first entry.
    fn anchor(&self) -> Result<usize, QueueError> {
        if self.tracks.is_empty() {
            return Err(QueueError::Empty);
        }
        Ok(self.current.or(self.selected).unwrap_or(0))
    }

    fn next_index(&self) -> Result<usize, QueueError> {
        let next = self.anchor()? + 1;
        if next >= self.tracks.len() {
            return Err(QueueError::EndOfQueue);
        }
        Ok(next)
    }

    fn prev_index(&self) -> Result<usize, QueueError> {
        match self.anchor()? {
            0 => Err(QueueError::NoPrevious),
            i => Ok(i - 1),
        }
    }

    /// Makes `index` current and sets the play flag.
    pub fn play(&mut self, index: usize) -> Result<&Track, QueueError> {
        self.check(index)?;
        self.current = Some(index);
        self.selected = Some(index);
        self.playing = true;
        Ok(&self.tracks[index])
    }

    pub fn next(&mut self) -> Result<&Track, QueueError> {
        let index = self.next_index()?;
        self.play(index)
    }

    pub fn prev(&mut self) -> Result<&Track, QueueError> {
        let index = self.prev_index()?;
        self.play(index)
    }

    /// Clears the play flag. Returns whether anything was playing.
    pub fn pause(&mut self) -> bool {
        std::mem::replace(&mut self.playing, false)
    }

    pub fn resume(&mut self) -> Result<&Track, QueueError> {
        let index = self.current.ok_or(QueueError::NothingToResume)?;
        self.playing = true;
        Ok(&self.tracks[index])
    }

    /// Pause when playing, resume the current entry when paused, otherwise
    /// start the selected (or first) entry.
    pub fn toggle(&mut self) -> Result<Transport, QueueError> {
        if self.playing {
            self.pause();
            return Ok(Transport::Paused);
        }
        if self.current.is_some() {
            self.resume()?;
            return Ok(Transport::Resumed);
        }
        let index = self.anchor()?;
        self.play(index).cloned().map(Transport::Started)
    }

    /// The current entry played to its end.
    pub fn finish_current(&mut self) {
        self.playing = false;
    }

    pub fn stop(&mut self) {
        self.current = None;
        self.playing = false;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
