//! Standard MIDI File codec
//!
//! Reads `.mid`/`.kar` files into tracks of timed events and writes them
//! back. Events keep their wire bytes (status byte included, running status
//! resolved), so anything the engine does not touch is written out exactly
//! as it was read, apart from running status being made explicit.

use crate::{Error, Result};
use std::path::Path;

/// Largest value a variable-length quantity can carry (28 bits)
pub const MAX_VLQ: u32 = 0x0FFF_FFFF;

const HEADER_ID: &[u8; 4] = b"MThd";
const TRACK_ID: &[u8; 4] = b"MTrk";

/// Type tag of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Meta event (`FF type len data`) with its meta type
    Meta(u8),
    /// Channel voice message with its status byte
    Channel(u8),
    /// System exclusive (`F0` or `F7`)
    SysEx(u8),
}

/// One timed event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    /// Ticks since the previous event in the track
    pub delta: u32,
    /// Ticks since the start of the track
    pub time: u64,
    /// Wire bytes following the delta
    pub payload: Vec<u8>,
}

impl Event {
    /// Build a meta event from its type and data
    pub fn meta(meta_type: u8, data: &[u8], delta: u32, time: u64) -> Self {
        let mut payload = Vec::with_capacity(data.len() + 6);
        payload.push(0xFF);
        payload.push(meta_type);
        write_vlq(&mut payload, data.len() as u32);
        payload.extend_from_slice(data);

        Self {
            kind: EventKind::Meta(meta_type),
            delta,
            time,
            payload,
        }
    }

    pub fn meta_type(&self) -> Option<u8> {
        match self.kind {
            EventKind::Meta(t) => Some(t),
            _ => None,
        }
    }

    /// Message data without framing
    ///
    /// Meta and sysex events skip their length field; channel messages skip
    /// the status byte.
    pub fn data(&self) -> &[u8] {
        let skip = match self.kind {
            EventKind::Meta(_) => 2,
            EventKind::SysEx(_) => 1,
            EventKind::Channel(_) => return self.payload.get(1..).unwrap_or(&[]),
        };
        let Some(rest) = self.payload.get(skip..) else {
            return &[];
        };
        let mut reader = Reader::new(rest);
        match reader.read_vlq() {
            Ok(_) => &rest[reader.pos..],
            Err(_) => &[],
        }
    }
}

/// Ordered events of one `MTrk` chunk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Track {
    pub events: Vec<Event>,
}

impl Track {
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// A parsed Standard MIDI File
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiFile {
    pub format: u16,
    pub division: u16,
    pub tracks: Vec<Track>,
}

impl MidiFile {
    /// Read and parse a file from disk
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let midi = Self::parse(&bytes)?;
        tracing::debug!(
            path = %path.display(),
            format = midi.format,
            tracks = midi.tracks.len(),
            "Parsed MIDI file"
        );
        Ok(midi)
    }

    /// Parse a complete file
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);

        let id = reader.take(4)?;
        if id != HEADER_ID {
            return Err(Error::Midi("missing MThd header".to_string()));
        }
        let header_len = reader.read_u32()? as usize;
        if header_len < 6 {
            return Err(Error::Midi(format!("header too short ({} bytes)", header_len)));
        }
        let header = reader.take(header_len)?;
        let format = u16::from_be_bytes([header[0], header[1]]);
        let track_count = u16::from_be_bytes([header[2], header[3]]);
        let division = u16::from_be_bytes([header[4], header[5]]);

        let mut tracks = Vec::with_capacity(track_count as usize);
        while !reader.is_empty() {
            let chunk_start = reader.pos;
            let id = reader.take(4)?;
            let len = reader.read_u32()? as usize;
            let body = reader.take(len).map_err(|_| {
                Error::Midi(format!("chunk at byte {} runs past end of file", chunk_start))
            })?;

            if id == TRACK_ID {
                tracks.push(parse_track(body, chunk_start + 8)?);
            } else {
                tracing::debug!(
                    chunk = %String::from_utf8_lossy(id),
                    offset = chunk_start,
                    "Skipping unknown chunk"
                );
            }
        }

        if tracks.len() != track_count as usize {
            tracing::warn!(
                declared = track_count,
                found = tracks.len(),
                "Track count in header does not match file contents"
            );
        }

        Ok(Self {
            format,
            division,
            tracks,
        })
    }

    /// Serialize to Standard MIDI File bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(HEADER_ID);
        out.extend_from_slice(&6u32.to_be_bytes());
        out.extend_from_slice(&self.format.to_be_bytes());
        out.extend_from_slice(&(self.tracks.len() as u16).to_be_bytes());
        out.extend_from_slice(&self.division.to_be_bytes());

        for track in &self.tracks {
            let mut body = Vec::new();
            for event in &track.events {
                write_vlq(&mut body, event.delta);
                body.extend_from_slice(&event.payload);
            }
            out.extend_from_slice(TRACK_ID);
            out.extend_from_slice(&(body.len() as u32).to_be_bytes());
            out.extend_from_slice(&body);
        }

        out
    }
}

fn parse_track(body: &[u8], base_offset: usize) -> Result<Track> {
    let mut reader = Reader::new(body);
    let mut events = Vec::new();
    let mut running_status: Option<u8> = None;
    let mut time: u64 = 0;

    let at = |pos: usize| base_offset + pos;

    while !reader.is_empty() {
        let delta = reader.read_vlq().map_err(|e| offset_error(e, at(reader.pos)))?;
        time += u64::from(delta);

        let start = reader.pos;
        let first = reader.peek().ok_or_else(|| {
            Error::Midi(format!("event truncated at byte {}", at(start)))
        })?;

        let event = match first {
            0xFF => {
                reader.skip(1);
                let meta_type = reader.read_u8()?;
                let len = reader.read_vlq()? as usize;
                reader.take(len).map_err(|_| {
                    Error::Midi(format!("meta event at byte {} truncated", at(start)))
                })?;
                running_status = None;
                Event {
                    kind: EventKind::Meta(meta_type),
                    delta,
                    time,
                    payload: body[start..reader.pos].to_vec(),
                }
            }
            0xF0 | 0xF7 => {
                reader.skip(1);
                let len = reader.read_vlq()? as usize;
                reader
                    .take(len)
                    .map_err(|_| Error::Midi(format!("sysex at byte {} truncated", at(start))))?;
                running_status = None;
                Event {
                    kind: EventKind::SysEx(first),
                    delta,
                    time,
                    payload: body[start..reader.pos].to_vec(),
                }
            }
            0x80..=0xEF => {
                reader.skip(1);
                running_status = Some(first);
                channel_event(&mut reader, first, delta, time, at(start))?
            }
            0x00..=0x7F => {
                let status = running_status.ok_or_else(|| {
                    Error::Midi(format!("data byte without running status at byte {}", at(start)))
                })?;
                channel_event(&mut reader, status, delta, time, at(start))?
            }
            _ => {
                return Err(Error::Midi(format!(
                    "unexpected status 0x{:02X} at byte {}",
                    first,
                    at(start)
                )))
            }
        };

        events.push(event);
    }

    Ok(Track { events })
}

fn channel_event(
    reader: &mut Reader<'_>,
    status: u8,
    delta: u32,
    time: u64,
    offset: usize,
) -> Result<Event> {
    let data_len = match status & 0xF0 {
        0xC0 | 0xD0 => 1,
        _ => 2,
    };
    let data = reader
        .take(data_len)
        .map_err(|_| Error::Midi(format!("channel message at byte {} truncated", offset)))?;

    let mut payload = Vec::with_capacity(1 + data_len);
    payload.push(status);
    payload.extend_from_slice(data);

    Ok(Event {
        kind: EventKind::Channel(status),
        delta,
        time,
        payload,
    })
}

fn offset_error(e: Error, offset: usize) -> Error {
    match e {
        Error::Midi(msg) => Error::Midi(format!("{} at byte {}", msg, offset)),
        other => other,
    }
}

/// Append a variable-length quantity
///
/// Values above [`MAX_VLQ`] are truncated to 28 bits; callers check first.
pub fn write_vlq(out: &mut Vec<u8>, value: u32) {
    let value = value & MAX_VLQ;
    let mut groups = [0u8; 4];
    let mut count = 0;
    let mut v = value;
    loop {
        groups[count] = (v & 0x7F) as u8;
        count += 1;
        v >>= 7;
        if v == 0 {
            break;
        }
    }
    for i in (0..count).rev() {
        let continuation = if i > 0 { 0x80 } else { 0x00 };
        out.push(groups[i] | continuation);
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip(&mut self, n: usize) {
        self.pos += n;
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| Error::Midi("unexpected end of data".to_string()))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn read_u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_vlq(&mut self) -> Result<u32> {
        let mut value: u32 = 0;
        for _ in 0..4 {
            let byte = self.read_u8()?;
            value = (value << 7) | u32::from(byte & 0x7F);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(Error::Midi("variable-length quantity longer than 4 bytes".to_string()))
    }
}
