// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate assert_cmd;
extern crate predicates;
extern crate tempfile;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;

fn fractalscope() -> Command {
    Command::cargo_bin("fractalscope").unwrap()
}

#[test]
fn writes_a_pixmap() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("julia.ppm");
    fractalscope()
        .args(&["--fractal", "julia", "--size", "64x48", "--iterations", "60", "--threads", "2"])
        .arg("--output")
        .arg(&path)
        .assert()
        .success();
    let bytes = fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"P6"));
    assert!(bytes.len() > 64 * 48 * 3);
}

#[test]
fn renders_a_seeded_nebulabrot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nebula.ppm");
    fractalscope()
        .args(&["--fractal", "nebulabrot", "--size", "40x30", "--points", "2000", "--seed", "5"])
        .args(&["--center", "-0.4,0", "--single-threaded"])
        .arg("-o")
        .arg(&path)
        .assert()
        .success();
    assert!(path.exists());
}

#[test]
fn output_is_required() {
    fractalscope()
        .args(&["--fractal", "mandelbrot"])
        .assert()
        .failure();
}

#[test]
fn unknown_fractals_are_rejected() {
    fractalscope()
        .args(&["--fractal", "sierpinski", "-o", "never.ppm"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown fractal"));
}

#[test]
fn constant_polynomials_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("newton.ppm");
    fractalscope()
        .args(&["--fractal", "newton", "--polynomial", "5", "--size", "16x16"])
        .arg("-o")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Render failure"));
    assert!(!path.exists());
}
