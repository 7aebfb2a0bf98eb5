use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;

use tempfile::{Builder, NamedTempFile};

use ball_chaser::config::ChaserConfig;
use ball_chaser::{BoundaryLayout, ControllerEndpoint};

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "BALL_CHASER_CONFIG",
        "BALL_CHASER_SOURCE_URL",
        "BALL_CHASER_TARGET_FPS",
        "BALL_CHASER_CONTROLLER_URL",
        "BALL_CHASER_DISPATCH_TIMEOUT_MS",
        "BALL_CHASER_BOUNDARY_LAYOUT",
    ] {
        std::env::remove_var(key);
    }
}

fn lock_env() -> std::sync::MutexGuard<'static, ()> {
    let guard = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    clear_env();
    guard
}

#[test]
fn defaults_without_file_or_env() {
    let _guard = lock_env();

    let cfg = ChaserConfig::load().expect("load config");

    assert_eq!(cfg.source.url, "stub://camera/rgb/image_raw");
    assert_eq!(cfg.source.target_fps, 10);
    assert_eq!(cfg.source.width, 640);
    assert_eq!(cfg.source.height, 480);
    assert_eq!(cfg.controller_url, "stub://ball_chaser/command_robot");
    assert_eq!(cfg.dispatch_timeout, Duration::from_millis(250));
    assert_eq!(cfg.boundary_layout, BoundaryLayout::Legacy);
}

#[test]
fn loads_json_file_and_env_overrides() {
    let _guard = lock_env();

    let mut file = NamedTempFile::new().expect("temp config");
    let json = r#"{
        "source": {
            "url": "/var/lib/ball_chaser/frames",
            "target_fps": 15,
            "width": 800,
            "height": 600
        },
        "controller": {
            "url": "http://127.0.0.1:8080/ball_chaser/command_robot",
            "timeout_ms": 400
        },
        "scanner": {
            "boundary_layout": "spatial"
        }
    }"#;
    file.write_all(json.as_bytes()).expect("write config");

    std::env::set_var("BALL_CHASER_CONFIG", file.path());
    std::env::set_var("BALL_CHASER_CONTROLLER_URL", "tcp://10.0.0.7:9000");
    std::env::set_var("BALL_CHASER_DISPATCH_TIMEOUT_MS", "120");

    let cfg = ChaserConfig::load().expect("load config");

    assert_eq!(cfg.source.url, "/var/lib/ball_chaser/frames");
    assert_eq!(cfg.source.target_fps, 15);
    assert_eq!(cfg.source.width, 800);
    assert_eq!(cfg.source.height, 600);
    assert_eq!(cfg.controller_url, "tcp://10.0.0.7:9000");
    assert_eq!(
        cfg.controller_endpoint().unwrap(),
        ControllerEndpoint::Tcp("10.0.0.7:9000".into())
    );
    assert_eq!(cfg.dispatch_timeout, Duration::from_millis(120));
    assert_eq!(cfg.boundary_layout, BoundaryLayout::Spatial);

    clear_env();
}

#[test]
fn loads_toml_file_by_extension() {
    let _guard = lock_env();

    let mut file = Builder::new().suffix(".toml").tempfile().expect("temp config");
    let toml = r#"
[source]
target_fps = 30

[scanner]
boundary_layout = "legacy"
"#;
    file.write_all(toml.as_bytes()).expect("write config");

    let cfg = ChaserConfig::load_from(Some(file.path())).expect("load config");
    assert_eq!(cfg.source.target_fps, 30);
    assert_eq!(cfg.source.url, "stub://camera/rgb/image_raw");
    assert_eq!(cfg.boundary_layout, BoundaryLayout::Legacy);
}

#[test]
fn rejects_unknown_fields() {
    let _guard = lock_env();

    let mut file = NamedTempFile::new().expect("temp config");
    file.write_all(br#"{"controller": {"retries": 3}}"#)
        .expect("write config");

    let err = ChaserConfig::load_from(Some(file.path())).unwrap_err();
    assert!(err.to_string().contains("invalid config file"));
}

#[test]
fn rejects_invalid_values() {
    let _guard = lock_env();

    std::env::set_var("BALL_CHASER_DISPATCH_TIMEOUT_MS", "0");
    let err = ChaserConfig::load().unwrap_err();
    assert!(err.to_string().contains("timeout"));

    clear_env();
    std::env::set_var("BALL_CHASER_TARGET_FPS", "fast");
    assert!(ChaserConfig::load().is_err());

    clear_env();
    std::env::set_var("BALL_CHASER_BOUNDARY_LAYOUT", "diagonal");
    assert!(ChaserConfig::load().is_err());

    clear_env();
    std::env::set_var("BALL_CHASER_CONTROLLER_URL", "mqtt://broker:1883");
    let err = ChaserConfig::load().unwrap_err();
    assert!(err.to_string().contains("unsupported controller scheme"));

    clear_env();
}

#[test]
fn missing_config_file_is_an_error() {
    let _guard = lock_env();

    std::env::set_var("BALL_CHASER_CONFIG", "/nonexistent/ball_chaser.json");
    let err = ChaserConfig::load().unwrap_err();
    assert!(err.to_string().contains("failed to read config file"));

    clear_env();
}
