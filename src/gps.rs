// Mock GPS emitter
//
// Navit re-reads its POI file when its vehicle position updates. Feeding it a
// fixed fix at a high rate over a pipe keeps the map redrawing and centered,
// without the jitter a real receiver would introduce.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use crate::error::{BridgeError, Result};
use crate::nmea;

/// Produces fix sentences for a fixed map center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsMock {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsMock {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        GpsMock { latitude, longitude }
    }

    pub fn sentence_at(&self, time: DateTime<Utc>) -> String {
        nmea::encode_fix(self.latitude, self.longitude, time)
    }

    /// Sentence stamped with the current UTC time.
    pub fn sentence(&self) -> String {
        self.sentence_at(Utc::now())
    }

    /// Write one sentence and a newline, then flush.
    pub async fn emit<W>(&self, out: &mut W) -> Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        let mut line = self.sentence();
        line.push('\n');
        out.write_all(line.as_bytes()).await.map_err(BridgeError::Stream)?;
        out.flush().await.map_err(BridgeError::Stream)?;
        Ok(())
    }

    /// Emit a sentence every `period` until the writer fails.
    ///
    /// Never touches the position store. Returns only on a write error, which
    /// normally means the consumer closed the pipe.
    pub async fn run<W>(self, period: Duration, mut out: W) -> Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        info!(
            "Mock GPS at {:.6}, {:.6} every {:?}",
            self.latitude, self.longitude, period
        );
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if let Err(e) = self.emit(&mut out).await {
                debug!("GPS stream closed: {}", e);
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::{AsyncBufReadExt, BufReader};

    #[test]
    fn test_sentence_at_fixed_time() {
        let mock = GpsMock::new(33.435, -112.00833334);
        let time = Utc.with_ymd_and_hms(2024, 1, 1, 12, 34, 56).unwrap();
        assert_eq!(
            mock.sentence_at(time),
            "$GPGGA,123456,3326.100000,N,11200.500000,W,1,12,1.0,0.0,M,0.0,M,,*67"
        );
    }

    #[tokio::test]
    async fn test_emit_writes_one_line() {
        let mock = GpsMock::new(33.435, -112.00833334);
        let mut out: Vec<u8> = Vec::new();
        mock.emit(&mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("$GPGGA,"));
        assert!(text.ends_with('\n'));
        assert_eq!(text.lines().count(), 1);
        let (body, cs) = text.trim_end()[1..].split_once('*').unwrap();
        assert_eq!(nmea::checksum_hex(body), cs);
    }

    #[tokio::test]
    async fn test_run_stops_when_reader_goes_away() {
        let mock = GpsMock::new(33.435, -112.00833334);
        let (writer, reader) = tokio::io::duplex(256);
        let task = tokio::spawn(mock.run(Duration::from_millis(1), writer));

        let mut lines = BufReader::new(reader).lines();
        for _ in 0..3 {
            let line = lines.next_line().await.unwrap().unwrap();
            assert!(line.starts_with("$GPGGA,"));
        }
        drop(lines);

        let result = task.await.unwrap();
        assert!(matches!(result, Err(BridgeError::Stream(_))));
    }

    struct BrokenPipe;

    impl AsyncWrite for BrokenPipe {
        fn poll_write(self: Pin<&mut Self>, _: &mut Context<'_>, _: &[u8]) -> Poll<io::Result<usize>> {
            Poll::Ready(Err(io::Error::from(io::ErrorKind::BrokenPipe)))
        }

        fn poll_flush(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_emit_failure_is_a_stream_error() {
        let mock = GpsMock::new(33.435, -112.00833334);
        match mock.emit(&mut BrokenPipe).await {
            Err(BridgeError::Stream(e)) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
            other => panic!("expected a stream error, got {:?}", other),
        }
    }
}
