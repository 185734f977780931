use std::path::PathBuf;
use std::time::Duration;

use portal_cave::config::Snapshot;
use portal_cave::driver::FrameDriver;
use portal_cave::pointer::{PointerEvent, PointerId};
use portal_cave::{cpu, snapshot};
use shared::glam::vec2;
use shared::ShaderConstants;

fn frame(width: u32, height: u32, time: f32) -> ShaderConstants {
    ShaderConstants {
        width,
        height,
        time,
        ..Default::default()
    }
}

#[test]
fn resizing_keeps_the_portal_centered() {
    let small = cpu::render(&frame(80, 60, 2.0));
    let large = cpu::render(&frame(160, 120, 2.0));
    for pixel in [small.get_pixel(40, 30).0, large.get_pixel(80, 60).0] {
        let [r, g, b, a] = pixel;
        assert!(g > r && g > b, "{pixel:?}");
        assert_eq!(a, 255);
    }
}

#[test]
fn driver_frames_render_on_the_cpu() {
    let mut driver = FrameDriver::new(64, 48);
    driver
        .pointers_mut()
        .handle(PointerEvent::Down(PointerId::Mouse, vec2(32.0, 24.0)));
    let constants = driver.tick().expect("driver is running");
    assert_eq!(constants.pointer_count, 1);
    let image = cpu::render(&cpu::scaled(&constants, 0.5));
    assert_eq!(image.dimensions(), (32, 24));

    driver.stop_handle().stop();
    assert!(driver.tick().is_none());
}

#[test]
fn snapshot_writes_a_png() {
    let path: PathBuf = std::env::temp_dir().join(format!(
        "portal-cave-snapshot-{}.png",
        std::process::id()
    ));
    let settings = Snapshot {
        path: path.clone(),
        width: 40,
        height: 30,
        time: 1.5,
    };
    snapshot::write(&settings).expect("snapshot written");

    let image = image::open(&path).expect("snapshot readable").to_rgba8();
    assert_eq!(image.dimensions(), (40, 30));
    assert_eq!(image, cpu::render(&snapshot::constants(&settings)));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn snapshot_reports_unwritable_paths() {
    let settings = Snapshot {
        path: std::env::temp_dir()
            .join("portal-cave-missing-dir")
            .join("nested")
            .join("frame.png"),
        width: 4,
        height: 3,
        time: 0.0,
    };
    let error = snapshot::write(&settings).unwrap_err();
    assert!(error.to_string().contains("frame.png"));
}

#[test]
fn snapshot_time_wraps_like_the_live_loop() {
    let settings = Snapshot {
        path: PathBuf::from("unused.png"),
        width: 32,
        height: 24,
        time: 200.0,
    };
    let live = FrameDriver::new(32, 24).constants_at(Duration::from_secs(200));
    let still = snapshot::constants(&settings);
    assert_eq!(still, live);
    assert_eq!(still.time, 20.0);
    assert_eq!(cpu::render(&still), cpu::render(&live));
}
