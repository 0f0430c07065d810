use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::cards::Card;
use crate::engine::HandResult;
use crate::hand::HandState;

/// One settled hand inside a [`RoundRecord`].
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct HandEntry {
    /// Name of the owning player
    pub player: String,
    pub cards: Vec<Card>,
    /// Main wager at settlement (doubled hands show the doubled amount)
    pub bet: u32,
    pub state: HandState,
    pub result: HandResult,
    pub amount_won: u32,
    pub insurance_won: u32,
    /// Owner's balance after the round was paid
    pub balance: u32,
}

/// Complete record of a settled round.
/// Serialized to JSONL, one round per line, as an append-only audit trail.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// Unique identifier for this round (format: YYYYMMDD-NNNNNN)
    pub round_id: String,
    /// Shoe seed, when known (enables deterministic replay)
    pub seed: Option<u64>,
    /// Round counter within the table session
    pub round: u32,
    /// Every player hand in seat order, split hands adjacent
    pub hands: Vec<HandEntry>,
    /// Dealer's final cards, hole card first
    pub dealer: Vec<Card>,
    /// Timestamp when the round was written (RFC3339 format)
    #[serde(default)]
    pub ts: Option<String>,
    /// Additional metadata (extensible JSON object)
    #[serde(default)]
    pub meta: Option<serde_json::Value>,
}

pub fn format_round_id(yyyymmdd: &str, seq: u32) -> String {
    format!("{}-{:06}", yyyymmdd, seq)
}

/// Writes [`RoundRecord`]s as JSON lines, one flush per round.
pub struct RoundLogger {
    writer: Option<BufWriter<File>>,
    date: String,
    seq: u32,
}

impl RoundLogger {
    /// Starts a fresh log at `path`, truncating any previous one.
    pub fn create<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        Self::open(
            path.as_ref(),
            OpenOptions::new().write(true).create(true).truncate(true),
        )
    }

    /// Continues an existing log at `path`.
    pub fn append<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        Self::open(path.as_ref(), OpenOptions::new().append(true).create(true))
    }

    fn open(path: &Path, options: &OpenOptions) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent)?;
            }
        }
        let f = options.open(path)?;
        Ok(Self {
            writer: Some(BufWriter::new(f)),
            date: Utc::now().format("%Y%m%d").to_string(),
            seq: 0,
        })
    }

    /// Logger with no file behind it, for exercising round ids.
    pub fn with_seq_for_test(date: &str) -> Self {
        Self {
            writer: None,
            date: date.to_string(),
            seq: 0,
        }
    }

    pub fn next_id(&mut self) -> String {
        self.seq += 1;
        format_round_id(&self.date, self.seq)
    }

    /// Appends one round. A missing `ts` is stamped with the current time.
    pub fn write(&mut self, record: &RoundRecord) -> std::io::Result<()> {
        let line = if record.ts.is_some() {
            serde_json::to_string(record)
        } else {
            let mut stamped = record.clone();
            stamped.ts = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
            serde_json::to_string(&stamped)
        }
        .map_err(std::io::Error::other)?;
        if let Some(w) = &mut self.writer {
            w.write_all(line.as_bytes())?;
            w.write_all(b"\n")?;
            w.flush()?;
        }
        Ok(())
    }
}
