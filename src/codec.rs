use std::io;

use bytes::BytesMut;
use tokio::io::AsyncRead;
use tokio_util::codec::{Decoder, FramedRead, LinesCodec, LinesCodecError};

pub type LineStream<R> = FramedRead<R, LineCodec>;

/// A newline-delimited frame from the speaker
#[derive(Debug, PartialEq, Eq)]
pub enum Frame {
    Line(String),
    /// Line exceeded the max length and was dropped
    TooLong,
    /// Line wasn't valid UTF-8 and was dropped
    NotUtf8,
}

/// Line codec that reports bad lines as frames instead of errors,
/// so a single bad line doesn't end the stream.
#[derive(Debug)]
pub struct LineCodec {
    inner: LinesCodec,
}

impl LineCodec {
    pub fn new(max_length: usize) -> Self {
        Self {
            inner: LinesCodec::new_with_max_length(max_length),
        }
    }

    pub fn framed<R: AsyncRead>(self, input: R) -> LineStream<R> {
        FramedRead::new(input, self)
    }
}

fn to_frame(result: Result<Option<String>, LinesCodecError>) -> Result<Option<Frame>, io::Error> {
    match result {
        Ok(line) => Ok(line.map(Frame::Line)),
        Err(LinesCodecError::MaxLineLengthExceeded) => Ok(Some(Frame::TooLong)),
        Err(LinesCodecError::Io(err)) if err.kind() == io::ErrorKind::InvalidData => {
            Ok(Some(Frame::NotUtf8))
        }
        Err(LinesCodecError::Io(err)) => Err(err),
    }
}

impl Decoder for LineCodec {
    type Item = Frame;
    type Error = io::Error;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Frame>, io::Error> {
        to_frame(self.inner.decode(buf))
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Frame>, io::Error> {
        to_frame(self.inner.decode_eof(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    async fn frames(input: &[u8], max_length: usize) -> Vec<Frame> {
        LineCodec::new(max_length)
            .framed(input)
            .map(|frame| frame.unwrap())
            .collect()
            .await
    }

    #[tokio::test]
    async fn test_lines() {
        let frames = frames(b"one\r\ntwo\nthree", 64).await;
        assert_eq!(
            frames,
            vec![
                Frame::Line("one".to_string()),
                Frame::Line("two".to_string()),
                Frame::Line("three".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_long_line_is_skipped() {
        let frames = frames(b"short\nthis line is too long\nok\n", 8).await;
        assert_eq!(frames[0], Frame::Line("short".to_string()));
        assert_eq!(frames[1], Frame::TooLong);
        assert_eq!(frames.last(), Some(&Frame::Line("ok".to_string())));
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_skipped() {
        let frames = frames(b"\xff\xfe\nok\n", 64).await;
        assert_eq!(
            frames,
            vec![Frame::NotUtf8, Frame::Line("ok".to_string())]
        );
    }
}
