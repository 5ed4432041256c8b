//! A bounded, blocking pipe that carries a response body from a producer
//! thread to a reading thread, followed by the response status.

use crate::{Error, Result};
use bytes::Bytes;
use http::StatusCode;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::Arc;

/// Default number of chunks a writer may run ahead of its reader.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Create a connected writer and reader.
///
/// The writer blocks once `capacity` chunks are waiting to be read. Chunks
/// arrive at the reader in the order they were written.
pub fn response_channel(capacity: usize) -> (ResponseWriter, ResponseReader) {
    let (chunk_tx, chunk_rx) = mpsc::sync_channel(capacity);
    let (status_tx, status_rx) = mpsc::sync_channel(1);
    let closed = Arc::new(AtomicBool::new(false));

    let writer = ResponseWriter {
        chunks: Some(chunk_tx),
        closed: closed.clone(),
        status: Some(status_tx),
    };
    let reader = ResponseReader {
        chunks: chunk_rx,
        closed,
        buffer: Bytes::new(),
        eof: false,
        aborted: false,
        status_rx,
        status: None,
    };
    (writer, reader)
}

/// Producer half of a response channel.
///
/// A body must be ended with [`ResponseWriter::close`]. Dropping the writer
/// before that aborts the body, and the reader fails instead of seeing end of
/// stream.
#[derive(Debug)]
pub struct ResponseWriter {
    chunks: Option<SyncSender<Bytes>>,
    closed: Arc<AtomicBool>,
    status: Option<SyncSender<StatusCode>>,
}

impl ResponseWriter {
    /// Write a chunk, blocking while the channel is full.
    ///
    /// Fails if the body is closed or the reader is gone.
    pub fn write(&mut self, chunk: impl Into<Bytes>) -> Result<()> {
        let chunk = chunk.into();
        if chunk.is_empty() {
            return Ok(());
        }

        let Some(tx) = &self.chunks else {
            return Err(Error::unexpected("response body is already closed"));
        };
        tx.send(chunk)
            .map_err(|_| Error::unexpected("response reader has gone away"))
    }

    /// Close the body. The reader sees end of stream after the chunks already
    /// written. Closing twice is a no-op.
    pub fn close(&mut self) {
        // The flag must be visible before the reader can observe the disconnect.
        self.closed.store(true, Ordering::Release);
        self.chunks = None;
    }

    /// Whether the body has been closed.
    pub fn is_closed(&self) -> bool {
        self.chunks.is_none()
    }

    /// Publish the response status. It can be set only once.
    pub fn set_status(&mut self, status: StatusCode) -> Result<()> {
        let tx = self
            .status
            .take()
            .ok_or_else(|| Error::unexpected("response status is already set"))?;
        tx.send(status)
            .map_err(|_| Error::unexpected("response reader has gone away"))
    }
}

/// Consumer half of a response channel.
///
/// All reads block, so use it from a thread that is allowed to block.
#[derive(Debug)]
pub struct ResponseReader {
    chunks: Receiver<Bytes>,
    closed: Arc<AtomicBool>,
    buffer: Bytes,
    eof: bool,
    aborted: bool,
    status_rx: Receiver<StatusCode>,
    status: Option<StatusCode>,
}

impl ResponseReader {
    /// Wait for data and return at most `max` bytes of it.
    ///
    /// Returns `None` once the body is closed and fully read, and fails if the
    /// writer went away without closing it.
    pub fn read_partial(&mut self, max: usize) -> Result<Option<Bytes>> {
        if max == 0 {
            return Ok(Some(Bytes::new()));
        }
        if !self.fill()? {
            return Ok(None);
        }

        let n = max.min(self.buffer.len());
        Ok(Some(self.buffer.split_to(n)))
    }

    /// Wait until there is data to read or the body ends, and report whether
    /// the body is exhausted.
    ///
    /// Fails if the writer went away without closing the body.
    pub fn is_eof(&mut self) -> Result<bool> {
        Ok(!self.fill()?)
    }

    /// Wait for the response status.
    ///
    /// A producer publishes the status after the body is closed, so read the
    /// body first. Fails if the writer went away without setting a status.
    pub fn status(&mut self) -> Result<StatusCode> {
        if let Some(status) = self.status {
            return Ok(status);
        }

        let status = self.status_rx.recv().map_err(|_| {
            Error::unexpected("response writer has gone away without a status")
        })?;
        self.status = Some(status);
        Ok(status)
    }

    fn fill(&mut self) -> Result<bool> {
        while self.buffer.is_empty() && !self.eof {
            match self.chunks.recv() {
                Ok(chunk) => self.buffer = chunk,
                Err(_) => {
                    self.eof = true;
                    self.aborted = !self.closed.load(Ordering::Acquire);
                }
            }
        }
        if self.buffer.is_empty() && self.aborted {
            return Err(Error::unexpected(
                "response body was aborted before it was complete",
            ));
        }
        Ok(!self.buffer.is_empty())
    }
}

impl io::Read for ResponseReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        match self.read_partial(buf.len())? {
            Some(chunk) => {
                buf[..chunk.len()].copy_from_slice(&chunk);
                Ok(chunk.len())
            }
            None => Ok(0),
        }
    }
}
