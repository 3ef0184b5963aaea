use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use panther_types::AnchorEvent;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{HistoryError, HistoryResult};
use crate::query::HistoryQuery;
use crate::traits::ProofHistoryStore;

/// Header size: 4 bytes length + 4 bytes CRC.
const HEADER_SIZE: usize = 8;

/// Durability of each append.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// Flush to the OS after every append.
    #[default]
    Flush,
    /// Flush and `fsync` after every append.
    Fsync,
}

struct LogState {
    writer: BufWriter<File>,
    events: Vec<AnchorEvent>,
}

/// Durable, append-only history log.
///
/// On-disk format, one record per event:
/// ```text
/// [4 bytes: payload length (little-endian u32)]
/// [4 bytes: CRC32 of payload (little-endian u32)]
/// [N bytes: payload (bincode-serialized AnchorEvent)]
/// ```
/// The whole log is replayed into memory on open. Records failing the CRC
/// check are skipped; a torn tail from a crash is cut off so later appends
/// stay readable.
pub struct FileHistoryStore {
    path: PathBuf,
    sync: SyncMode,
    state: RwLock<LogState>,
}

impl FileHistoryStore {
    /// Open (or create) the log at `path` and recover its events.
    pub fn open(path: impl AsRef<Path>, sync: SyncMode) -> HistoryResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;

        let (events, valid_len) = recover(&file)?;
        let file_len = file.metadata()?.len();
        if valid_len < file_len {
            warn!(
                path = %path.display(),
                valid_len,
                file_len,
                "discarding torn tail of history log"
            );
            file.set_len(valid_len)?;
        }
        info!(path = %path.display(), events = events.len(), "history log opened");

        Ok(Self {
            path: path.to_path_buf(),
            sync,
            state: RwLock::new(LogState {
                writer: BufWriter::new(file),
                events,
            }),
        })
    }

    /// Query an existing log without opening it for writing.
    ///
    /// The file is never created or truncated. A partially written tail,
    /// such as a record a live writer has not finished, is left in place
    /// and ignored.
    pub fn read_snapshot(
        path: impl AsRef<Path>,
        query: &HistoryQuery,
    ) -> HistoryResult<Vec<AnchorEvent>> {
        let file = File::open(path.as_ref())?;
        let (events, _) = recover(&file)?;
        Ok(query.select(events.iter()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of events currently in the log.
    pub fn len(&self) -> usize {
        self.state.read().map(|s| s.events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProofHistoryStore for FileHistoryStore {
    fn append(&self, event: AnchorEvent) -> HistoryResult<()> {
        let payload =
            bincode::serialize(&event).map_err(|e| HistoryError::Serialization(e.to_string()))?;
        let length = u32::try_from(payload.len())
            .map_err(|_| HistoryError::Serialization("event too large".into()))?;
        let crc = crc32fast::hash(&payload);

        let mut state = self.state.write().map_err(|_| HistoryError::LockPoisoned)?;

        let mut record = Vec::with_capacity(HEADER_SIZE + payload.len());
        record.extend_from_slice(&length.to_le_bytes());
        record.extend_from_slice(&crc.to_le_bytes());
        record.extend_from_slice(&payload);
        state.writer.write_all(&record)?;
        state.writer.flush()?;
        if self.sync == SyncMode::Fsync {
            state.writer.get_ref().sync_all()?;
        }

        debug!(action = %event.action, ts = event.ts, len = payload.len(), "history append (log)");
        state.events.push(event);
        Ok(())
    }

    fn query(&self, query: &HistoryQuery) -> HistoryResult<Vec<AnchorEvent>> {
        let state = self.state.read().map_err(|_| HistoryError::LockPoisoned)?;
        Ok(query.select(state.events.iter()))
    }
}

/// Replay every intact record. Returns the events and the byte length of
/// the well-framed prefix of the file.
fn recover(file: &File) -> HistoryResult<(Vec<AnchorEvent>, u64)> {
    let file_len = file.metadata()?.len();
    let mut reader = BufReader::new(file);
    let mut events = Vec::new();
    let mut offset: u64 = 0;

    while offset + HEADER_SIZE as u64 <= file_len {
        let mut header = [0u8; HEADER_SIZE];
        match reader.read_exact(&mut header) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        }

        let length = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        let expected_crc = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

        if length == 0 || offset + HEADER_SIZE as u64 + u64::from(length) > file_len {
            warn!(offset, length, file_len, "invalid history record length; stopping recovery");
            break;
        }

        let mut payload = vec![0u8; length as usize];
        match reader.read_exact(&mut payload) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                warn!(offset, "truncated history record; stopping recovery");
                break;
            }
            Err(e) => return Err(e.into()),
        }
        offset += HEADER_SIZE as u64 + u64::from(length);

        let actual_crc = crc32fast::hash(&payload);
        if actual_crc != expected_crc {
            warn!(offset, expected = expected_crc, actual = actual_crc, "CRC mismatch; skipping history record");
            continue;
        }

        match bincode::deserialize::<AnchorEvent>(&payload) {
            Ok(event) => events.push(event),
            Err(e) => warn!(offset, error = %e, "undecodable history record; skipping"),
        }
    }

    debug!(recovered = events.len(), "history recovery complete");
    Ok((events, offset))
}
