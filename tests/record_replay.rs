//! Cassette replay integration tests. Zero network I/O.
//!
//! Every test writes a cassette into a scratch directory and points
//! `MOCKUP_REPLAY` at it, so the binary never contacts the live API.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use base64::Engine;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use predicates::prelude::*;

fn cmd() -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("mockup");
    cmd.env("MOCKUP_CONFIG", "/nonexistent/mockup/config.toml")
        .env_remove("MOCKUP_REC")
        .env_remove("GEMINI_API_KEY")
        .env_remove("API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

/// Fresh scratch directory for one test.
fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("mockup_replay_{name}"));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// A small solid-colour JPEG, base64-encoded the way the service returns it.
fn jpeg_b64(r: u8, g: u8, b: u8) -> String {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([r, g, b])));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Jpeg).unwrap();
    base64::engine::general_purpose::STANDARD.encode(buf.into_inner())
}

fn write_logo(dir: &Path) -> PathBuf {
    let path = dir.join("logo.png");
    RgbaImage::from_pixel(4, 4, Rgba([0, 0, 255, 128])).save(&path).unwrap();
    path
}

/// Write a cassette from `(method, output)` pairs, where output is the
/// YAML mapping `Ok: <base64>` or `Err: <message>`.
fn write_cassette(dir: &Path, interactions: &[(&str, String)]) -> PathBuf {
    let mut yaml = String::from(
        "name: test\nrecorded_at: \"2026-10-01T12:00:00Z\"\ncommit: test\ninteractions:\n",
    );
    for (seq, (method, output)) in interactions.iter().enumerate() {
        yaml.push_str(&format!(
            "  - seq: {seq}\n    port: image_service\n    method: {method}\n    input: {{}}\n"
        ));
        yaml.push_str(&format!("    output:\n      {output}\n"));
    }
    let path = dir.join("image_service.cassette.yaml");
    std::fs::write(&path, yaml).unwrap();
    path
}

fn ok(b64: &str) -> String {
    format!("Ok: \"{b64}\"")
}

fn saved_files(dir: &Path, stage: &str) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .map(|e| e.path())
                .filter(|p| {
                    p.file_name().and_then(|n| n.to_str()).is_some_and(|n| n.contains(stage))
                })
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn batch_runs_all_three_steps() {
    let dir = scratch("batch_full");
    let logo = write_logo(&dir);
    let cassette = write_cassette(
        &dir,
        &[
            ("generate_mockup", ok(&jpeg_b64(250, 250, 250))),
            ("place_logo", ok(&jpeg_b64(200, 200, 255))),
            ("edit_image", ok(&jpeg_b64(180, 120, 60))),
        ],
    );
    let out = dir.join("out");

    cmd()
        .env("MOCKUP_REPLAY", &cassette)
        .args(["--prompt", "A white t-shirt on a hanger", "--logo"])
        .arg(&logo)
        .args(["--edit", "add a retro filter", "--output-dir"])
        .arg(&out)
        .assert()
        .success()
        .stderr(predicate::str::contains("Saved:"));

    assert_eq!(saved_files(&out, "-mockup-").len(), 1);
    assert!(!saved_files(&out, "-final-").is_empty());
    for path in saved_files(&out, "a-white-t-shirt") {
        assert_eq!(path.extension().unwrap(), "jpg");
    }

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn non_image_logo_never_reaches_the_service() {
    let dir = scratch("non_image_logo");
    let notes = dir.join("notes.txt");
    std::fs::write(&notes, "not a logo").unwrap();
    // Only step 1 is recorded; a place_logo call would exhaust the cassette.
    let cassette = write_cassette(&dir, &[("generate_mockup", ok(&jpeg_b64(250, 250, 250)))]);

    cmd()
        .env("MOCKUP_REPLAY", &cassette)
        .args(["--prompt", "A red mug", "--logo"])
        .arg(&notes)
        .arg("--output-dir")
        .arg(dir.join("out"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("File is not an image"))
        .stderr(predicate::str::contains("Cassette exhausted").not());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn exhausted_cassette_is_an_error_not_a_crash() {
    let dir = scratch("exhausted");
    let logo = write_logo(&dir);
    let cassette = write_cassette(&dir, &[("generate_mockup", ok(&jpeg_b64(250, 250, 250)))]);

    cmd()
        .env("MOCKUP_REPLAY", &cassette)
        .args(["--prompt", "A red mug", "--logo"])
        .arg(&logo)
        .arg("--output-dir")
        .arg(dir.join("out"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Cassette exhausted"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn png_output_is_converted() {
    let dir = scratch("png_output");
    let cassette = write_cassette(&dir, &[("generate_mockup", ok(&jpeg_b64(10, 120, 30)))]);
    let out = dir.join("out");

    cmd()
        .env("MOCKUP_REPLAY", &cassette)
        .args(["--prompt", "A green tote bag", "--format", "png", "--output-dir"])
        .arg(&out)
        .assert()
        .success();

    let saved = saved_files(&out, "-mockup-");
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].extension().unwrap(), "png");
    let bytes = std::fs::read(&saved[0]).unwrap();
    assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Png);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn interactive_session_walks_the_steps_and_resets() {
    let dir = scratch("interactive");
    let logo = write_logo(&dir);
    let cassette = write_cassette(
        &dir,
        &[
            ("generate_mockup", ok(&jpeg_b64(250, 250, 250))),
            ("place_logo", ok(&jpeg_b64(200, 200, 255))),
            ("edit_image", ok(&jpeg_b64(180, 120, 60))),
        ],
    );
    let input = format!("A red mug\n{}\nadd a retro filter\n:reset\n:quit\n", logo.display());

    let assert = cmd()
        .env("MOCKUP_REPLAY", &cassette)
        .arg("--output-dir")
        .arg(dir.join("out"))
        .write_stdin(input)
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    let step1 = stdout.find("=== Step 1: Create Your Mockup ===").unwrap();
    let step2 = stdout.find("=== Step 2: Add Your Logo ===").unwrap();
    let step3 = stdout.find("=== Step 3: Final Edits ===").unwrap();
    assert!(step1 < step2 && step2 < step3);
    assert_eq!(stdout.matches("=== Step 1: Create Your Mockup ===").count(), 2);
    assert!(stdout.contains("Your mockup: image/jpeg"));
    assert!(!stdout.contains("Error:"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn replayed_failure_shows_banner_above_the_same_step() {
    let dir = scratch("banner");
    let logo = write_logo(&dir);
    let cassette = write_cassette(
        &dir,
        &[
            ("generate_mockup", ok(&jpeg_b64(250, 250, 250))),
            ("place_logo", "Err: \"model overloaded\"".to_string()),
        ],
    );
    let input = format!("A red mug\n{}\n:quit\n", logo.display());

    let assert = cmd()
        .env("MOCKUP_REPLAY", &cassette)
        .arg("--output-dir")
        .arg(dir.join("out"))
        .write_stdin(input)
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    let last_view = &stdout[stdout.rfind("=== Step").unwrap()..];
    assert!(last_view.starts_with("=== Step 2: Add Your Logo ==="));
    let banner = last_view.find("Error: ").unwrap();
    let form = last_view.find("Enter the path to a logo image").unwrap();
    assert!(banner < form);
    assert!(last_view.contains("model overloaded"));
    assert!(!stdout.contains("Step 3: Final Edits"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_cassette_fails_at_startup() {
    cmd()
        .env("MOCKUP_REPLAY", "/nonexistent/image_service.cassette.yaml")
        .args(["--prompt", "A red mug"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to read cassette"));
}

#[test]
fn replayed_no_image_keeps_its_message() {
    let dir = scratch("no_image");
    let logo = write_logo(&dir);
    let cassette = write_cassette(
        &dir,
        &[
            ("generate_mockup", ok(&jpeg_b64(250, 250, 250))),
            (
                "place_logo",
                "Err: \"Placing the logo on the mockup failed. The model did not return an image.\""
                    .to_string(),
            ),
        ],
    );

    cmd()
        .env("MOCKUP_REPLAY", &cassette)
        .args(["--prompt", "A red mug", "--logo"])
        .arg(&logo)
        .arg("--output-dir")
        .arg(dir.join("out"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "Error: Placing the logo on the mockup failed. The model did not return an image.",
        ))
        .stderr(predicate::str::contains("API error").not());

    let _ = std::fs::remove_dir_all(&dir);
}
