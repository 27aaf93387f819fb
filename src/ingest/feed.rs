//! Telemetry sources.

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Split, Stdin};
use tokio::sync::mpsc;

use toll_client::{BillingError, Result, TelemetryReading};

/// An ordered source of telemetry readings.
///
/// `None` means the feed is exhausted. An `Err` item is a single bad record;
/// the feed can still be polled afterwards.
#[async_trait]
pub trait TelemetryFeed: Send {
    async fn next(&mut self) -> Option<Result<TelemetryReading>>;
}

/// Newline-delimited JSON readings, one `{"obuID","lat","long","unix"}` per line.
///
/// Lines are read as raw bytes, so a line that is not valid UTF-8 is reported
/// like any other malformed record.
pub struct JsonLinesFeed<R> {
    lines: Split<R>,
    line_no: usize,
    finished: bool,
}

impl<R: AsyncBufRead + Unpin + Send> JsonLinesFeed<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.split(b'\n'),
            line_no: 0,
            finished: false,
        }
    }
}

impl JsonLinesFeed<BufReader<Stdin>> {
    /// Read readings from the process's standard input.
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> TelemetryFeed for JsonLinesFeed<R> {
    async fn next(&mut self) -> Option<Result<TelemetryReading>> {
        if self.finished {
            return None;
        }
        loop {
            match self.lines.next_segment().await {
                Ok(Some(line)) => {
                    self.line_no += 1;
                    let line = line.strip_suffix(b"\r").unwrap_or(&line[..]);
                    if line.iter().all(u8::is_ascii_whitespace) {
                        continue;
                    }
                    let line_no = self.line_no;
                    return Some(serde_json::from_slice(line).map_err(|e| {
                        BillingError::validation(format!("line {line_no}: malformed reading: {e}"))
                    }));
                }
                Ok(None) => {
                    self.finished = true;
                    return None;
                }
                // A read error ends the feed after being reported once.
                Err(e) => {
                    self.finished = true;
                    return Some(Err(BillingError::transport(format!(
                        "telemetry feed read failed: {e}"
                    ))));
                }
            }
        }
    }
}

/// Readings pushed in-process through a channel.
pub struct ChannelFeed {
    rx: mpsc::Receiver<TelemetryReading>,
}

impl ChannelFeed {
    /// Create a feed and the sender that drives it.
    pub fn new(capacity: usize) -> (mpsc::Sender<TelemetryReading>, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (tx, Self { rx })
    }
}

#[async_trait]
impl TelemetryFeed for ChannelFeed {
    async fn next(&mut self) -> Option<Result<TelemetryReading>> {
        self.rx.recv().await.map(Ok)
    }
}
