use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::types::{AudioCmd, PlaybackInfo};
use crate::playback::HandleId;

#[test]
fn playback_info_starts_empty() {
    let info = PlaybackInfo::default();
    assert!(info.handle.is_none());
    assert_eq!(info.position, Duration::ZERO);
    assert!(!info.playing);
    assert!(!info.finished);
}

#[test]
fn load_command_shares_payload_without_copying() {
    let payload: Arc<[u8]> = Arc::from(vec![1u8, 2, 3]);
    let cmd = AudioCmd::Load {
        handle: HandleId(7),
        payload: payload.clone(),
        duration_hint: Some(Duration::from_secs(3)),
    };
    match cmd {
        AudioCmd::Load { payload: p, .. } => assert!(Arc::ptr_eq(&p, &payload)),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn shared_info_is_visible_across_clones() {
    let handle = Arc::new(Mutex::new(PlaybackInfo::default()));
    let reader = handle.clone();
    handle.lock().unwrap().finished = true;
    assert!(reader.lock().unwrap().finished);
}
