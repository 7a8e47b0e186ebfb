use futures::StreamExt;
use log::{debug, trace, warn};
use tokio::io::AsyncRead;

use crate::codec::{Frame, LineCodec};
use crate::config::{DecodeErrorPolicy, SyncConfig};
use crate::engine::Engine;
use crate::error::{DecodeError, SyncError};
use crate::event::{Event, EventDecoder};
use crate::store::RouteStore;

/// Why the input loop finished
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Speaker sent a shutdown notification, the table was flushed
    Shutdown { removed: usize },
    /// Input closed without a shutdown notification
    EndOfInput,
}

/// Feeds speaker messages to the engine, one line at a time
pub struct Driver<S> {
    engine: Engine<S>,
    decoder: EventDecoder,
    on_decode_error: DecodeErrorPolicy,
    max_line_length: usize,
}

impl<S> Driver<S>
where
    S: RouteStore,
{
    pub fn new(engine: Engine<S>, config: &SyncConfig) -> Self {
        Self {
            engine,
            decoder: EventDecoder::new(config.families.clone()),
            on_decode_error: config.on_decode_error,
            max_line_length: config.max_line_length,
        }
    }

    pub fn engine(&self) -> &Engine<S> {
        &self.engine
    }

    /// Process lines until shutdown or end of input.
    ///
    /// Each event is fully reconciled before the next line is read.
    pub async fn run<R>(&mut self, input: R) -> Result<Outcome, SyncError>
    where
        R: AsyncRead + Unpin,
    {
        let mut frames = LineCodec::new(self.max_line_length).framed(input);
        let mut line_number: u64 = 0;

        while let Some(frame) = frames.next().await {
            line_number += 1;
            let line = match frame? {
                Frame::Line(line) => line,
                Frame::TooLong => {
                    let err = DecodeError::LineTooLong(self.max_line_length);
                    self.decode_failed(line_number, err)?;
                    continue;
                }
                Frame::NotUtf8 => {
                    let err = DecodeError::Malformed {
                        path: "line".to_string(),
                        reason: "not valid UTF-8".to_string(),
                    };
                    self.decode_failed(line_number, err)?;
                    continue;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            debug!("{}", line);

            let event = match self.decoder.decode(&line) {
                Ok(event) => event,
                Err(err) => {
                    self.decode_failed(line_number, err)?;
                    continue;
                }
            };
            match event {
                Event::Update(update) => {
                    self.engine.apply_update(&update).await?;
                }
                Event::Shutdown => {
                    let removed = self.engine.apply_shutdown().await?;
                    return Ok(Outcome::Shutdown { removed });
                }
                Event::Ignored(kind) => trace!("Ignoring '{}' message", kind),
            }
        }
        debug!("Input closed after {} lines", line_number);
        Ok(Outcome::EndOfInput)
    }

    fn decode_failed(&self, line: u64, source: DecodeError) -> Result<(), SyncError> {
        match self.on_decode_error {
            DecodeErrorPolicy::Skip => {
                warn!("Skipping line {}: {}", line, source);
                Ok(())
            }
            DecodeErrorPolicy::Fail => Err(SyncError::Decode { line, source }),
        }
    }
}
