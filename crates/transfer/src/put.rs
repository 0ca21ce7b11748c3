//! PUT state machine: announce the file, negotiate the frame count, then
//! send frames with stop-and-wait acknowledgment.
//!
//! Retransmission is a pure resend-and-rewait of the identical datagram —
//! no backoff, no jitter. The two retry budgets are separate knobs: a
//! session start that cannot agree on the frame count gives up after
//! [`TOTAL_RETRY_LIMIT`] resends, while a frame lost mid-stream is retried
//! up to [`FRAME_RETRY_LIMIT`] times before the whole transfer fails.

use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, info, warn};

use udrop_channel::{Channel, ChannelError};
use udrop_protocol::{Command, FRAME_PAYLOAD, ProgressEvent, decode_i32, encode_frame, encode_i32};

use crate::progress::ProgressEmitter;
use crate::{CONTROL_TIMEOUT, FRAME_RETRY_LIMIT, TOTAL_RETRY_LIMIT, TransferError};

/// Streams `file_size` bytes from `source` to the server as `name`.
///
/// Returns the total bytes confirmed. Fatal on an exhausted retry budget;
/// nothing about a failed store is resumable.
pub(crate) async fn store<C, R>(
    channel: &C,
    progress: &ProgressEmitter,
    name: &str,
    source: &mut R,
    file_size: u64,
) -> Result<u64, TransferError>
where
    C: Channel,
    R: AsyncRead + Unpin,
{
    let total = file_size.div_ceil(FRAME_PAYLOAD as u64) as i32;
    debug!(name, file_size, total, "store starting");

    channel.send(&Command::Put(name.to_owned()).encode()?).await?;
    negotiate_total(channel, total).await?;

    let mut sent: u64 = 0;
    for id in 1..=total {
        let want = (file_size - sent).min(FRAME_PAYLOAD as u64) as usize;
        let mut payload = vec![0u8; want];
        source.read_exact(&mut payload).await?;
        let frame = encode_frame(id, &payload)?;

        if !send_frame(channel, &frame, id).await? {
            warn!(id, "frame never acknowledged, aborting store");
            return Err(TransferError::FrameSendFailed(id));
        }

        sent += want as u64;
        progress.emit(ProgressEvent::frame_put(id, total, want as i32, sent));
    }

    info!(name, total, sent, "store complete");
    progress.emit(ProgressEvent::put_done(total, sent));
    Ok(sent)
}

/// Sends the frame count and waits until the server echoes it back.
async fn negotiate_total<C: Channel>(channel: &C, total: i32) -> Result<(), TransferError> {
    channel.send(&encode_i32(total)).await?;
    let first = match channel.recv_timeout(CONTROL_TIMEOUT).await {
        Ok(reply) => reply,
        Err(ChannelError::TimedOut) => return Err(TransferError::NoAckForTotal),
        Err(e) => return Err(e.into()),
    };
    if decode_i32(&first)? == total {
        return Ok(());
    }

    for attempt in 1..=TOTAL_RETRY_LIMIT {
        debug!(total, attempt, "frame-count ack mismatch, resending");
        channel.send(&encode_i32(total)).await?;
        match channel.recv_timeout(CONTROL_TIMEOUT).await {
            Ok(reply) => {
                if decode_i32(&reply).is_ok_and(|ack| ack == total) {
                    return Ok(());
                }
            }
            Err(ChannelError::TimedOut) => {}
            Err(e) => return Err(e.into()),
        }
    }
    Err(TransferError::AckMismatch)
}

/// Sends one frame until the server acks its id.
///
/// A timeout, a stale ack, and a malformed ack all count as one failed
/// attempt. Returns `false` when the budget is exhausted.
async fn send_frame<C: Channel>(
    channel: &C,
    frame: &[u8],
    id: i32,
) -> Result<bool, TransferError> {
    for attempt in 1..=FRAME_RETRY_LIMIT {
        channel.send(frame).await?;
        match channel.recv_timeout(CONTROL_TIMEOUT).await {
            Ok(reply) => {
                if decode_i32(&reply).is_ok_and(|ack| ack == id) {
                    return Ok(true);
                }
                debug!(id, attempt, "stale ack, resending frame");
            }
            Err(ChannelError::TimedOut) => {
                debug!(id, attempt, "ack wait timed out, resending frame");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use udrop_channel::testing::ScriptedChannel;
    use udrop_protocol::{COMMAND_LEN, FRAME_LEN, ProgressKind, decode_frame};

    /// 5000 bytes -> 3 frames: 2048 + 2048 + 904.
    fn patterned(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    async fn run_store(
        channel: &ScriptedChannel,
        progress: &ProgressEmitter,
        data: &[u8],
    ) -> Result<u64, TransferError> {
        let mut source = data;
        store(channel, progress, "file.bin", &mut source, data.len() as u64).await
    }

    #[tokio::test]
    async fn splits_file_into_fixed_frames() {
        let data = patterned(5000);
        let channel = ScriptedChannel::new();
        channel.push_datagram(encode_i32(3).as_slice());
        for id in 1..=3 {
            channel.push_datagram(encode_i32(id).as_slice());
        }

        let progress = ProgressEmitter::new();
        let bytes = run_store(&channel, &progress, &data).await.unwrap();
        assert_eq!(bytes, 5000);

        let sent = channel.sent();
        assert_eq!(sent.len(), 5); // command, total, three frames
        assert_eq!(sent[0].len(), COMMAND_LEN);
        assert_eq!(&sent[0][..12], b"put file.bin");
        assert_eq!(sent[1], encode_i32(3));

        for (i, datagram) in sent[2..].iter().enumerate() {
            assert_eq!(datagram.len(), FRAME_LEN);
            let frame = decode_frame(datagram).unwrap();
            assert_eq!(frame.id, i as i32 + 1);
        }
        let last = decode_frame(&sent[4]).unwrap();
        assert_eq!(last.payload.len(), 904);
        assert_eq!(last.payload, &data[4096..]);
    }

    #[tokio::test]
    async fn dropped_ack_resends_identical_frame_once() {
        let data = patterned(5000);
        let channel = ScriptedChannel::new();
        channel.push_datagram(encode_i32(3).as_slice()); // total ack
        channel.push_datagram(encode_i32(1).as_slice()); // frame 1
        channel.push_timeout(); // frame 2 ack lost
        channel.push_datagram(encode_i32(2).as_slice()); // frame 2 retry
        channel.push_datagram(encode_i32(3).as_slice()); // frame 3

        let progress = ProgressEmitter::new();
        let bytes = run_store(&channel, &progress, &data).await.unwrap();
        assert_eq!(bytes, 5000);

        let sent = channel.sent();
        // command, total, f1, f2, f2 again, f3
        assert_eq!(sent.len(), 6);
        assert_eq!(sent[3], sent[4], "retransmission must be byte-identical");

        let frame_ids: Vec<i32> = sent[2..]
            .iter()
            .map(|d| decode_frame(d).unwrap().id)
            .collect();
        assert_eq!(frame_ids, vec![1, 2, 2, 3]);
    }

    #[tokio::test]
    async fn unacked_frame_exhausts_budget_and_aborts() {
        let data = patterned(3000); // 2 frames
        let channel = ScriptedChannel::new();
        channel.push_datagram(encode_i32(2).as_slice()); // total ack, then silence

        let progress = ProgressEmitter::new();
        let result = run_store(&channel, &progress, &data).await;
        assert!(matches!(result, Err(TransferError::FrameSendFailed(1))));

        let sent = channel.sent();
        assert_eq!(sent.len(), 2 + FRAME_RETRY_LIMIT as usize);
        // Every frame datagram on the wire was a resend of frame 1.
        for datagram in &sent[2..] {
            assert_eq!(decode_frame(datagram).unwrap().id, 1);
        }
    }

    #[tokio::test]
    async fn missing_first_ack_is_no_ack_for_total() {
        let data = patterned(100);
        let channel = ScriptedChannel::new();

        let progress = ProgressEmitter::new();
        let result = run_store(&channel, &progress, &data).await;
        assert!(matches!(result, Err(TransferError::NoAckForTotal)));
        assert_eq!(channel.sent_count(), 2); // command + total, nothing else
    }

    #[tokio::test]
    async fn persistent_ack_mismatch_gives_up_after_budget() {
        let data = patterned(100);
        let channel = ScriptedChannel::new();
        for _ in 0..=TOTAL_RETRY_LIMIT {
            channel.push_datagram(encode_i32(99).as_slice());
        }

        let progress = ProgressEmitter::new();
        let result = run_store(&channel, &progress, &data).await;
        assert!(matches!(result, Err(TransferError::AckMismatch)));

        // command + initial total + TOTAL_RETRY_LIMIT resends
        assert_eq!(channel.sent_count(), 2 + TOTAL_RETRY_LIMIT as usize);
    }

    #[tokio::test]
    async fn mismatched_then_matching_total_ack_recovers() {
        let data = patterned(100); // 1 frame
        let channel = ScriptedChannel::new();
        channel.push_datagram(encode_i32(99).as_slice()); // stale
        channel.push_datagram(encode_i32(1).as_slice()); // total echoed
        channel.push_datagram(encode_i32(1).as_slice()); // frame 1 ack

        let progress = ProgressEmitter::new();
        let bytes = run_store(&channel, &progress, &data).await.unwrap();
        assert_eq!(bytes, 100);
    }

    #[tokio::test]
    async fn empty_file_negotiates_zero_frames() {
        let channel = ScriptedChannel::new();
        channel.push_datagram(encode_i32(0).as_slice());

        let progress = ProgressEmitter::new();
        let bytes = run_store(&channel, &progress, &[]).await.unwrap();
        assert_eq!(bytes, 0);
        assert_eq!(channel.sent_count(), 2); // command + total, no frames
    }

    #[tokio::test]
    async fn emits_frame_events_after_confirmation() {
        let data = patterned(3000);
        let channel = ScriptedChannel::new();
        channel.push_datagram(encode_i32(2).as_slice());
        channel.push_datagram(encode_i32(1).as_slice());
        channel.push_datagram(encode_i32(2).as_slice());

        let mut progress = ProgressEmitter::new();
        let mut rx = progress.subscribe();
        run_store(&channel, &progress, &data).await.unwrap();

        let first = rx.recv().await.unwrap();
        assert_eq!(first.kind, ProgressKind::FramePut);
        assert_eq!((first.frame_id, first.frame_len), (1, 2048));
        assert_eq!(first.bytes_total, 2048);

        let second = rx.recv().await.unwrap();
        assert_eq!((second.frame_id, second.frame_len), (2, 952));
        assert_eq!(second.bytes_total, 3000);

        let done = rx.recv().await.unwrap();
        assert_eq!(done.kind, ProgressKind::PutDone);
        assert_eq!(done.total_frames, 2);
    }
}
