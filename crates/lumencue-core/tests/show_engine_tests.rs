mod common;

use common::{addr, Frames, RecordingDatagrams, RecordingPixels, Sent};
use crossbeam_channel::{unbounded, Sender};
use lumencue_core::{
    Instrument, InstrumentRegistry, ManualClock, Passthrough, PixelAnimator, PollOutcome, Rgb, ShowEngine,
    WallLight, PASSTHROUGH_KEY, PIXEL_ANIMATOR_KEY, WALL_LIGHT_KEY,
};
use std::sync::atomic::AtomicBool;

struct Rig {
    engine: ShowEngine,
    tx: Sender<String>,
    wall: Sent,
    greeting: Sent,
    frames: Frames,
}

fn rig(strip_length: usize) -> Rig {
    let wall = RecordingDatagrams::default();
    let greeting = RecordingDatagrams::default();
    let pixels = RecordingPixels::default();
    let (wall_sent, greeting_sent, frames) =
        (wall.sent.clone(), greeting.sent.clone(), pixels.frames.clone());

    let mut registry = InstrumentRegistry::new();
    registry
        .register(
            WALL_LIGHT_KEY,
            Box::new(WallLight::new(Box::new(wall), addr("192.168.10.223:9000"))),
        )
        .unwrap();
    registry
        .register(
            PIXEL_ANIMATOR_KEY,
            Box::new(PixelAnimator::new(Box::new(pixels), strip_length)),
        )
        .unwrap();
    registry
        .register(
            PASSTHROUGH_KEY,
            Box::new(Passthrough::new(Box::new(greeting), addr("127.0.0.1:13003"))),
        )
        .unwrap();

    let (tx, rx) = unbounded();
    Rig {
        engine: ShowEngine::new(registry, rx),
        tx,
        wall: wall_sent,
        greeting: greeting_sent,
        frames,
    }
}

#[test]
fn test_startup_greeting() {
    let rig = rig(60);
    assert_eq!(
        *rig.greeting.lock().unwrap(),
        vec![(b"Hello world.\n".to_vec(), addr("127.0.0.1:13003"))]
    );
    assert_eq!(rig.engine.pending(), 0);
}

#[test]
fn test_wall_light_cue_end_to_end() {
    // 1. Setup
    let mut rig = rig(60);
    rig.tx
        .send("0,0,1.0,danLights,baywhite,1,10,255,20".to_string())
        .unwrap();

    // 2. Receive, then dispatch
    assert!(matches!(rig.engine.poll_once(0), PollOutcome::Enqueued));
    assert!(matches!(rig.engine.poll_once(0), PollOutcome::Dispatched));

    // 3. Verify
    let sent = rig.wall.lock().unwrap();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].0, vec![4, 200, 201, 14, 10, 254, 254, 0, 0]);
    assert_eq!(sent[1].0, vec![4, 200, 201, 14, 20, 254, 0, 0, 10]);
    assert!(sent.iter().all(|(_, to)| *to == addr("192.168.10.223:9000")));
}

#[test]
fn test_cues_dispatch_in_deadline_order() {
    let mut rig = rig(60);
    let now = 50_000_000_000;

    // Sender is 50s ahead of the origin; offsets 3s, 1s, 2s
    for (offset, bank) in [("3", "lobbywall"), ("1", "baycolor"), ("2", "baywhite")] {
        rig.engine
            .enqueue(&format!("50,{},0,danLights,{},1,1,1,1", offset, bank), now)
            .unwrap();
    }
    assert_eq!(rig.engine.next_deadline(), Some(1_000_000_000));

    for t in [1_000_000_000, 2_000_000_000, 3_000_000_000] {
        assert!(matches!(rig.engine.poll_once(t), PollOutcome::Dispatched));
    }
    let zones: Vec<u8> = rig.wall.lock().unwrap().iter().map(|(p, _)| p[1]).collect();
    assert_eq!(zones, vec![201, 200, 101]);
}

#[test]
fn test_frame_emitted_every_tick() {
    let mut rig = rig(8);
    rig.engine
        .enqueue("0,0,0.5,fadeCandy,1,0,255,0,4,1", 0)
        .unwrap();

    // Dispatch at 0; the voice lasts half a second
    assert!(matches!(rig.engine.poll_once(0), PollOutcome::Dispatched));
    rig.engine.poll_once(500_000_000);
    rig.engine.poll_once(500_000_001);

    let frames = rig.frames.lock().unwrap();
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[0], vec![Rgb::BLACK; 8]);
    assert_eq!(frames[1][0], Rgb::new(255, 0, 0));
    assert_eq!(frames[1][4], Rgb::new(255, 0, 0));
    assert_eq!(frames[1][1], Rgb::BLACK);
    // Voice expired, strip goes dark but a frame is still sent
    assert_eq!(frames[2], vec![Rgb::BLACK; 8]);
}

#[test]
fn test_rejected_cues_do_not_block_later_ones() {
    let mut rig = rig(60);
    for msg in [
        "not a cue",
        "0,0,1.0,strobe,1,2,3",
        "0,0,1.0,danLights,baywhite,one,10,255,20",
        "0,0,0,fadeCandy,1,0,255,0,0,1",
        "0,0,1.0,danLights,baywhite,1,10,255,20",
    ] {
        rig.tx.send(msg.to_string()).unwrap();
    }
    drop(rig.tx);

    let clock = ManualClock::new(0);
    let shutdown = AtomicBool::new(false);
    rig.engine.run(&clock, &shutdown);

    assert_eq!(rig.engine.pending(), 0);
    assert_eq!(rig.wall.lock().unwrap().len(), 2);
}

#[test]
fn test_blend_saturates_red() {
    // 1. Setup: two red voices on the same pixel
    let pixels = RecordingPixels::default();
    let frames = pixels.frames.clone();
    let mut anim = PixelAnimator::new(Box::new(pixels), 1);
    let red = |id: &str| -> Vec<String> {
        [id, "0", "255", "0", "1", "1"].iter().map(|f| f.to_string()).collect()
    };
    anim.play(0, 256, &red("1")).unwrap();
    anim.play(100, 256, &red("2")).unwrap();

    // 2. At 201 the voices are 201/256 and 101/256 of the way in
    assert_eq!(anim.voice(1).unwrap().color_at(201), Rgb::new(200, 0, 0));
    assert_eq!(anim.voice(2).unwrap().color_at(201), Rgb::new(100, 0, 0));
    anim.tick(201).unwrap();

    // 3. Verify the composited pixel clamps instead of wrapping
    assert_eq!(frames.lock().unwrap()[0], vec![Rgb::new(255, 0, 0)]);
}
