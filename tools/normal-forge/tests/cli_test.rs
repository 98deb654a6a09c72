//! End-to-end tests for the normal-forge binary
//!
//! Builds a small asset tree in a temp dir, runs the CLI against it and checks
//! the files it leaves behind.

use image::{Rgb, RgbImage};
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

use normal_forge::normal::decode_pixel;

fn run(cwd: &Path, args: &[&str]) -> Output {
    let output = Command::new(env!("CARGO_BIN_EXE_normal-forge"))
        .current_dir(cwd)
        .args(args)
        .output()
        .expect("Failed to run normal-forge");
    assert!(
        output.status.success(),
        "normal-forge {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    output
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn write_checker(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    RgbImage::from_fn(16, 16, |x, y| {
        if (x / 4 + y / 4) % 2 == 0 {
            Rgb([200, 180, 160])
        } else {
            Rgb([40, 30, 20])
        }
    })
    .save(path)
    .expect("Failed to write texture");
}

#[test]
fn test_generate_then_link() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("models");
    write_checker(&root.join("true/28.jpg"));
    write_checker(&root.join("crate.png"));
    fs::write(root.join("crate_AO.PNG"), b"not scanned").unwrap();

    let mtl = root.join("ship.mtl");
    fs::write(
        &mtl,
        "# Ship\nnewmtl hull\nKd 0.8 0.8 0.8\nmap_Kd true/28.jpg\n\nnewmtl glass\nd 0.3\n",
    )
    .unwrap();

    let out = run(dir.path(), &["generate", "models"]);
    assert!(stdout(&out).contains("Generated 2 normal maps"), "{}", stdout(&out));
    assert!(root.join("true/28_normal.png").is_file());
    assert!(root.join("crate_normal.png").is_file());

    let normal = image::open(root.join("true/28_normal.png")).unwrap().to_rgb8();
    assert_eq!(normal.dimensions(), (16, 16));

    let out = run(dir.path(), &["link", "models"]);
    assert!(stdout(&out).contains("Updated 1 .mtl files"), "{}", stdout(&out));
    assert_eq!(
        fs::read_to_string(&mtl).unwrap(),
        "# Ship\nnewmtl hull\nKd 0.8 0.8 0.8\nmap_Kd true/28.jpg\nmap_bump true/28_normal.png\n\nnewmtl glass\nd 0.3\n"
    );

    // Second runs change nothing
    let out = run(dir.path(), &["generate", "models"]);
    assert!(stdout(&out).contains("Generated 0 normal maps"));
    let out = run(dir.path(), &["link", "models"]);
    assert!(stdout(&out).contains("Updated 0 .mtl files"));
}

#[test]
fn test_failures_do_not_change_exit_status() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("models");
    write_checker(&root.join("good.png"));
    fs::write(root.join("bad.jpg"), b"definitely not a jpeg").unwrap();

    let out = run(dir.path(), &["generate", "models"]);
    assert!(stdout(&out).contains("Generated 1 normal maps"));
    assert!(!root.join("bad_normal.png").exists());
}

#[test]
fn test_soft_and_force() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("models");
    write_checker(&root.join("tex/23.png"));

    run(dir.path(), &["generate", "models", "--soft"]);
    let soft = root.join("tex/23_normal_soft.png");
    assert!(soft.is_file());
    assert!(!root.join("tex/23_normal.png").exists());

    let out = run(dir.path(), &["generate", "models", "--soft"]);
    assert!(stdout(&out).contains("Generated 0 normal maps"));
    let out = run(dir.path(), &["generate", "models", "--soft", "--force"]);
    assert!(stdout(&out).contains("Generated 1 normal maps"));
}

#[test]
fn test_link_prefers_standard_map_and_respects_existing_bump() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("models");
    fs::create_dir_all(root.join("tex")).unwrap();
    fs::write(root.join("tex/23_normal.png"), b"x").unwrap();
    fs::write(root.join("tex/23_normal_soft.png"), b"x").unwrap();

    let linked = "newmtl a\nmap_Kd tex/23.jpg\n";
    let bumped = "newmtl b\nmap_Kd tex/23.jpg\nbump tex/other.png\n";
    let missing = "newmtl c\nmap_Kd tex/99.jpg\n";
    fs::write(root.join("a.mtl"), linked).unwrap();
    fs::write(root.join("b.mtl"), bumped).unwrap();
    fs::write(root.join("c.mtl"), missing).unwrap();

    run(dir.path(), &["link", "models"]);

    assert_eq!(
        fs::read_to_string(root.join("a.mtl")).unwrap(),
        "newmtl a\nmap_Kd tex/23.jpg\nmap_bump tex/23_normal.png\n"
    );
    assert_eq!(fs::read(root.join("b.mtl")).unwrap(), bumped.as_bytes());
    assert_eq!(fs::read(root.join("c.mtl")).unwrap(), missing.as_bytes());
}

#[test]
fn test_dry_run_and_config_file() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("assets");
    fs::create_dir_all(&root).unwrap();
    fs::write(root.join("a_normal.png"), b"x").unwrap();
    let mtl = "newmtl a\nmap_Kd a.png\n";
    fs::write(root.join("a.mtl"), mtl).unwrap();
    fs::write(dir.path().join("normal-forge.toml"), "root = \"assets\"\n").unwrap();

    let out = run(dir.path(), &["link", "--dry-run"]);
    assert!(stdout(&out).contains("Would update 1 .mtl files"), "{}", stdout(&out));
    assert_eq!(fs::read_to_string(root.join("a.mtl")).unwrap(), mtl);
}

#[test]
fn test_flat_texture_gives_neutral_normals() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("models");
    fs::create_dir_all(&root).unwrap();
    RgbImage::from_pixel(12, 12, Rgb([120, 60, 30]))
        .save(root.join("flat.png"))
        .unwrap();

    run(dir.path(), &["all", "models"]);

    let normal = image::open(root.join("flat_normal.png")).unwrap().to_rgb8();
    for p in normal.pixels() {
        let n = decode_pixel(p.0);
        assert!(n.x.abs() < 0.01 && n.y.abs() < 0.01 && n.z > 0.99, "{:?}", p.0);
    }
}
