use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use color_eyre::Result;
use color_eyre::eyre::eyre;
use crossbeam_channel::{Receiver, Sender};
use rodio::{Decoder, Sink, Source};

use crate::event::{AudioMessage, Command, Event};
use crate::source::EndNotify;

/// Owns the output stream and sink. Everything else talks to it through
/// `Command`s and hears back through `Event::Audio`.
pub struct AudioThread {
    command_rx: Receiver<Command>,
    event_tx: Sender<Event>,
    source_total_duration: Option<Duration>,
    volume: f32,
}

impl AudioThread {
    pub fn new(command_rx: Receiver<Command>, event_tx: Sender<Event>, volume: f32) -> AudioThread {
        AudioThread {
            command_rx,
            event_tx,
            source_total_duration: None,
            volume: volume.clamp(0.0, 1.0),
        }
    }

    pub fn run(mut self) -> Result<()> {
        _ = std::thread::Builder::new()
            .name("audio".into())
            .spawn(move || -> Result<()> {
                let mut stream = match rodio::OutputStreamBuilder::open_default_stream() {
                    Ok(stream) => stream,
                    Err(e) => {
                        tracing::error!("Audio backend unavailable: {}", e);
                        self.report(format!("Audio backend unavailable: {e}"));
                        return self.drain_unavailable();
                    }
                };
                stream.log_on_drop(false);

                let sink = Sink::connect_new(stream.mixer());
                sink.set_volume(self.volume);

                loop {
                    let cmd = self.command_rx.recv()?;
                    if let Err(e) = self.handle(&sink, cmd) {
                        tracing::warn!("Audio command failed: {}", e);
                        self.report(e.to_string());
                    }
                }
            })?;

        Ok(())
    }

    fn handle(&mut self, sink: &Sink, cmd: Command) -> Result<()> {
        match cmd {
            Command::Play(path) => {
                let source = self.open(&path)?;
                self.source_total_duration = source.total_duration();

                sink.clear();
                sink.append(source);
                sink.play();
                tracing::info!("Playing {:?}", path);
            }
            Command::Pause => sink.pause(),
            Command::Resume => sink.play(),
            Command::Stop => {
                sink.clear();
                self.source_total_duration = None;
            }
            Command::Seek(pos) => {
                sink.try_seek(pos).map_err(|e| eyre!("Seek failed: {e}"))?;
            }
            Command::SetVolume(volume) => {
                self.volume = volume.clamp(0.0, 1.0);
                sink.set_volume(self.volume);
            }
            Command::SendState => {
                let state = SinkState {
                    total_duration: self.source_total_duration,
                    pos: sink.get_pos(),
                };

                _ = self.event_tx.send(Event::Audio(AudioMessage::State(state)));
            }
        }

        Ok(())
    }

    fn open(
        &self,
        path: &Path,
    ) -> Result<EndNotify<Decoder<BufReader<File>>, impl FnOnce() + Send + 'static>> {
        let file = File::open(path).map_err(|e| eyre!("Cannot open {path:?}: {e}"))?;
        let decoder = Decoder::new(BufReader::new(file))
            .map_err(|e| eyre!("Cannot decode {path:?}: {e}"))?;

        let event_tx = self.event_tx.clone();
        Ok(EndNotify::new(decoder, move || {
            _ = event_tx.send(Event::Audio(AudioMessage::EndOfTrack));
        }))
    }

    fn report(&self, message: String) {
        _ = self.event_tx.send(Event::Audio(AudioMessage::Error(message)));
    }

    /// Without an output device, answer playback requests with an error
    /// until the UI goes away.
    fn drain_unavailable(self) -> Result<()> {
        while let Ok(cmd) = self.command_rx.recv() {
            if matches!(cmd, Command::Play(_) | Command::Resume) {
                self.report("Audio player unavailable.".to_string());
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SinkState {
    pub total_duration: Option<Duration>,
    pub pos: Duration,
}
