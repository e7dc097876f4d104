use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use zip::ZipArchive;
use zip::write::SimpleFileOptions;

fn ftl_remix(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ftl-remix"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to run ftl-remix")
}

fn create_album(dir: &Path, name: &str, files: &[(&str, &[u8])]) -> PathBuf {
    let path = dir.join(name);
    let mut writer = zip::ZipWriter::new(File::create(&path).unwrap());
    for (entry, content) in files {
        writer.start_file(*entry, SimpleFileOptions::default()).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap();
    path
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn writes_mod_next_to_album() {
    let dir = tempfile::tempdir().unwrap();
    let album = create_album(
        dir.path(),
        "FTL Remix Project.zip",
        &[("cover.jpg", b"jpeg"), ("01 Song One.ogg", b"one")],
    );

    let output = ftl_remix(&[arg(&album), "--quiet"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let mod_path = dir.path().join("744remix.ftl");
    let mut archive = ZipArchive::new(File::open(&mod_path).unwrap()).unwrap();
    let names: Vec<_> = (0..archive.len())
        .map(|i| archive.name_for_index(i).unwrap().to_string())
        .collect();
    assert_eq!(
        names,
        vec![
            "audio/music/01_Song_One.ogg",
            "data/sounds.xml.append",
            "mod-appendix/metadata.xml",
        ]
    );

    let mut sounds = String::new();
    archive
        .by_name("data/sounds.xml.append")
        .unwrap()
        .read_to_string(&mut sounds)
        .unwrap();
    assert!(sounds.starts_with("<music>"));
}

#[test]
fn explicit_output_and_stored() {
    let dir = tempfile::tempdir().unwrap();
    let album = create_album(dir.path(), "album.zip", &[("t.ogg", b"abc")]);
    let out = dir.path().join("custom.ftl");

    let output = ftl_remix(&[arg(&album), "-o", arg(&out), "--stored", "-q"]);
    assert!(output.status.success());

    let mut archive = ZipArchive::new(File::open(&out).unwrap()).unwrap();
    let file = archive.by_name("audio/music/t.ogg").unwrap();
    assert_eq!(file.compression(), zip::CompressionMethod::Stored);
}

#[test]
fn rejects_non_zip_path() {
    let dir = tempfile::tempdir().unwrap();
    let album = dir.path().join("album.rar");
    fs::write(&album, b"rar").unwrap();

    let output = ftl_remix(&[arg(&album), "-q"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("is not a zip archive"));
}

#[test]
fn album_without_tracks_fails_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let album = create_album(dir.path(), "album.zip", &[("readme.txt", b"wrong edition")]);

    let output = ftl_remix(&[arg(&album), "-q"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("no matching audio files"));
    assert!(!dir.path().join("744remix.ftl").exists());
}

#[test]
fn broken_template_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let album = create_album(dir.path(), "album.zip", &[("t.ogg", b"abc")]);
    let config = dir.path().join("remix.toml");
    fs::write(
        &config,
        "[[payloads]]\ndestination = \"mod-appendix/metadata.xml\"\nsource = \"/no/such/file.xml\"\n",
    )
    .unwrap();

    let output = ftl_remix(&[arg(&album), "--config", arg(&config), "-q"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(!dir.path().join("744remix.ftl").exists());
}

#[test]
fn print_config_shows_defaults() {
    let output = ftl_remix(&["album.zip", "--print-config"]);
    assert!(output.status.success());
    let text = String::from_utf8_lossy(&output.stdout);
    assert!(text.contains("output_name = \"744remix.ftl\""));
    assert!(text.contains("destination = \"data/sounds.xml.append\""));
}
