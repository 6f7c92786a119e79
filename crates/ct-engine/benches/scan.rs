use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use ct_engine::{SongLengthScanner, SongState};
use ct_ir::{Effect, EffectKind, Module, Note};

/// A busy full-size song: every frame uses its own pattern, notes on the
/// highlight rows, and a jump on the last row back past the first frame.
fn dense_module() -> Module {
    let mut module = Module::default();
    {
        let song = module.song_mut(0).expect("default song");
        song.set_frame_count(128);
        song.set_pattern_length(64);
    }
    let channels = module.channel_order().len();
    let mut view = module.song_view_mut(0).expect("default song");
    for channel in 0..channels {
        for frame in 0..128 {
            if let Some(track) = view.track_mut(channel) {
                track.set_frame_pattern(frame, frame as u8);
            }
            for row in (0..64).step_by(4) {
                let mut note = Note::note_on((row % 12) as u8, 3);
                note.instrument = channel as u8;
                view.set_note(channel, frame, row, note);
            }
        }
    }
    let mut jump = Note::empty();
    jump.effects[0] = Effect::new(EffectKind::Jump, 8);
    view.set_note(0, 127, 63, jump);
    module
}

fn length_scan(c: &mut Criterion) {
    let module = dense_module();
    c.bench_function("length_scan", |b| {
        b.iter(|| black_box(SongLengthScanner::scan(&module, 0)))
    });
}

fn state_retrieve(c: &mut Criterion) {
    let module = dense_module();
    c.bench_function("state_retrieve", |b| {
        b.iter(|| black_box(SongState::retrieve(&module, 0, 127, 63)))
    });
}

criterion_group!(benches, length_scan, state_retrieve);
criterion_main!(benches);
