//! Command line tests.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use image::{GrayImage, Luma};
use predicates::prelude::*;
use tempfile::TempDir;

const SAMPLE_HOCR: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>
<html xmlns=\"http://www.w3.org/1999/xhtml\">
<body>
<div class='ocr_page' id='page_1' title='bbox 0 0 1120 1368'>
<span class='ocr_line' id='line_1' title='bbox 161 80 435 129'>
<span class='ocrx_word' id='word_1' title='bbox 161 84 300 129; x_wconf 95'>Dear</span>
<span class='ocrx_word' id='word_2' title='bbox 324 80 417 123; x_wconf 95'>Sir</span>
</span>
<span class='ocr_line' id='line_2' title='bbox 599 41 674 69'>
<span class='ocrx_word' id='word_3' title='bbox 599 41 674 69; x_wconf 95'>ALS</span>
</span>
</div>
</body>
</html>
";

fn hocr() -> Command {
    Command::cargo_bin("hocr").unwrap()
}

/// White page with two word-sized black blocks on one line.
fn write_page(path: &Path) {
    let mut img = GrayImage::from_pixel(300, 100, Luma([255]));
    for (x, y, w, h) in [(10u32, 10u32, 40u32, 14u32), (120, 10, 40, 14)] {
        for yy in y..y + h {
            for xx in x..x + w {
                img.put_pixel(xx, yy, Luma([0]));
            }
        }
    }
    img.save(path).unwrap();
}

#[test]
fn test_help_lists_commands() {
    hocr()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("detect"))
        .stdout(predicate::str::contains("score"));
}

#[test]
fn test_detect_writes_hocr() {
    let dir = TempDir::new().unwrap();
    let image = dir.path().join("page.png");
    write_page(&image);

    hocr()
        .arg("detect")
        .arg(&image)
        .assert()
        .success()
        .stdout(predicate::str::contains("class='ocr_page' id='page_1' title='bbox 0 0 300 100'"))
        .stdout(predicate::str::contains("class='ocrx_word' id='word_2'"));
}

#[test]
fn test_detect_text_format() {
    let dir = TempDir::new().unwrap();
    let image = dir.path().join("page.png");
    write_page(&image);

    hocr()
        .args(["detect", "-f", "text"])
        .arg(&image)
        .assert()
        .success()
        .stdout(predicate::str::contains("word_1 word_2"));
}

#[test]
fn test_detect_missing_input() {
    hocr()
        .args(["detect", "does-not-exist.png"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_parse_words_and_text() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("page.hocr");
    fs::write(&file, SAMPLE_HOCR).unwrap();

    hocr()
        .arg("parse")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"line_id\": \"line_2\""))
        .stdout(predicate::str::contains("\"text\": \"ALS\""));

    hocr()
        .args(["parse", "--text"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Dear Sir\nALS"));
}

#[test]
fn test_parse_malformed_fails() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("broken.hocr");
    fs::write(&file, "<div><span>unclosed</div>").unwrap();

    hocr()
        .arg("parse")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed markup"));
}

#[test]
fn test_score_json() {
    let dir = TempDir::new().unwrap();
    let original = dir.path().join("original.txt");
    let transcribed = dir.path().join("transcribed.txt");
    fs::write(&original, "the cat sat").unwrap();
    fs::write(&transcribed, "The dog  sat\n").unwrap();

    hocr()
        .arg("score")
        .arg(&original)
        .arg(&transcribed)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"substitutions\": 1"))
        .stdout(predicate::str::contains("\"correct_words\": 2"));
}

#[test]
fn test_score_json_with_edits() {
    let dir = TempDir::new().unwrap();
    let original = dir.path().join("original.txt");
    let transcribed = dir.path().join("transcribed.txt");
    fs::write(&original, "the cat sat").unwrap();
    fs::write(&transcribed, "the dog sat").unwrap();

    let output = hocr()
        .args(["score", "--show-edits"])
        .arg(&original)
        .arg(&transcribed)
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["substitutions"], 1);
    assert_eq!(
        report["edits"],
        serde_json::json!([{ "op": "substitute", "original": "cat", "transcribed": "dog" }])
    );
}

#[test]
fn test_score_markup_text_with_edits() {
    let dir = TempDir::new().unwrap();
    let original = dir.path().join("original.hocr");
    let transcribed = dir.path().join("transcribed.hocr");
    fs::write(&original, SAMPLE_HOCR).unwrap();
    fs::write(&transcribed, SAMPLE_HOCR.replace(">Sir<", ">Madam<")).unwrap();

    hocr()
        .args(["score", "--markup", "-f", "text", "--show-edits"])
        .arg(&original)
        .arg(&transcribed)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 substitutions"))
        .stdout(predicate::str::contains("sir -> madam"));
}

#[test]
fn test_config_init_get_set() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.json");

    hocr()
        .arg("-c")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .success();
    assert!(config.exists());

    hocr()
        .arg("-c")
        .arg(&config)
        .args(["config", "get", "detection.min_width"])
        .assert()
        .success()
        .stdout(predicate::str::diff("5\n"));

    hocr()
        .arg("-c")
        .arg(&config)
        .args(["config", "set", "detection.min_width", "7"])
        .assert()
        .success();

    hocr()
        .arg("-c")
        .arg(&config)
        .args(["config", "get", "detection.min_width"])
        .assert()
        .success()
        .stdout(predicate::str::diff("7\n"));

    hocr()
        .arg("-c")
        .arg(&config)
        .args(["config", "set", "detection.no_such_key", "1"])
        .assert()
        .failure();
}

#[test]
fn test_batch_writes_outputs_and_summary() {
    let dir = TempDir::new().unwrap();
    write_page(&dir.path().join("a.png"));
    write_page(&dir.path().join("b.png"));
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let out = dir.path().join("out");
    let pattern = dir.path().join("*").to_string_lossy().into_owned();

    hocr()
        .args(["batch", &pattern, "--summary", "-o"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 files"));

    assert!(out.join("a.hocr").exists());
    assert!(out.join("b.hocr").exists());

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    assert!(summary.starts_with("filename,status,words,lines,processing_time_ms,error"));
    assert!(summary.contains("a.png,success,2,1,"));
}

#[test]
fn test_batch_continue_on_error() {
    let dir = TempDir::new().unwrap();
    write_page(&dir.path().join("good.png"));
    fs::write(dir.path().join("bad.png"), "not an image").unwrap();

    let pattern = dir.path().join("*.png").to_string_lossy().into_owned();

    hocr()
        .args(["batch", &pattern])
        .assert()
        .failure();

    hocr()
        .args(["batch", &pattern, "--continue-on-error"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 successful"));
}
