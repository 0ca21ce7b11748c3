//! Progress events emitted by the transfer engine.
//!
//! Events are fire-and-forget: the engine stamps and pushes them, keeps no
//! history, and never blocks on a slow observer. The types serialize to
//! JSON (camelCase fields, kebab-case kinds) so a consumer bridge can
//! forward them unchanged.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// What a [`ProgressEvent`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProgressKind {
    /// One frame accepted and written during a fetch.
    FrameGet,
    /// Fetch finished; all frames written.
    GetDone,
    /// One frame confirmed by the server during a store.
    FramePut,
    /// Store finished; all frames confirmed.
    PutDone,
}

/// A single progress report from the transfer engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub kind: ProgressKind,
    /// Frame this event refers to (the final frame id for `*-done` events).
    pub frame_id: i32,
    pub total_frames: i32,
    /// Meaningful payload bytes in this frame (0 for `*-done` events).
    pub frame_len: i32,
    /// Running byte count for the transfer so far.
    pub bytes_total: u64,
    /// Unix timestamp in milliseconds, stamped at emit time.
    pub timestamp_ms: u64,
}

impl ProgressEvent {
    fn new(kind: ProgressKind, frame_id: i32, total_frames: i32, frame_len: i32, bytes_total: u64) -> Self {
        Self {
            kind,
            frame_id,
            total_frames,
            frame_len,
            bytes_total,
            timestamp_ms: unix_millis(),
        }
    }

    pub fn frame_get(frame_id: i32, total_frames: i32, frame_len: i32, bytes_total: u64) -> Self {
        Self::new(ProgressKind::FrameGet, frame_id, total_frames, frame_len, bytes_total)
    }

    pub fn get_done(total_frames: i32, bytes_total: u64) -> Self {
        Self::new(ProgressKind::GetDone, total_frames, total_frames, 0, bytes_total)
    }

    pub fn frame_put(frame_id: i32, total_frames: i32, frame_len: i32, bytes_total: u64) -> Self {
        Self::new(ProgressKind::FramePut, frame_id, total_frames, frame_len, bytes_total)
    }

    pub fn put_done(total_frames: i32, bytes_total: u64) -> Self {
        Self::new(ProgressKind::PutDone, total_frames, total_frames, 0, bytes_total)
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serializes_kebab_case() {
        let json = serde_json::to_string(&ProgressKind::FrameGet).unwrap();
        assert_eq!(json, "\"frame-get\"");
        let json = serde_json::to_string(&ProgressKind::PutDone).unwrap();
        assert_eq!(json, "\"put-done\"");
    }

    #[test]
    fn event_json_roundtrip() {
        let event = ProgressEvent::frame_put(3, 10, 2048, 6144);
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"frameId\":3"));
        assert!(json.contains("\"totalFrames\":10"));
        assert!(json.contains("\"bytesTotal\":6144"));

        let back: ProgressEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn done_events_carry_final_frame_id() {
        let event = ProgressEvent::get_done(4, 8192);
        assert_eq!(event.frame_id, 4);
        assert_eq!(event.frame_len, 0);
        assert!(event.timestamp_ms > 0);
    }
}
