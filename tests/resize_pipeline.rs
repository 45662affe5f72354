//! End-to-end resize tests against a real temporary image directory.

use cdn_resize::config::{LimitsConfig, ServiceConfig};
use cdn_resize::imaging::{CodecError, FormatDescriptor, ImageCodec, ImageKind, RustCodec};
use cdn_resize::storage::ImageStore;
use cdn_resize::{ErrorKind, ResizePipeline, ResizeRequest};
use image::{DynamicImage, ImageFormat, ImageReader, RgbImage};
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tempfile::TempDir;

fn fixture(format: ImageFormat, width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 7 % 256) as u8, (y * 5 % 256) as u8, 128])
    });
    let img = match format {
        ImageFormat::WebP => DynamicImage::ImageRgba8(DynamicImage::ImageRgb8(img).to_rgba8()),
        _ => DynamicImage::ImageRgb8(img),
    };
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
    buf
}

fn store(dir: &Path, name: &str, format: ImageFormat, width: u32, height: u32) -> Vec<u8> {
    let bytes = fixture(format, width, height);
    fs::write(dir.join(name), &bytes).unwrap();
    bytes
}

/// Format and dimensions of a stored file, read from its content.
fn inspect(path: &Path) -> (ImageFormat, (u32, u32)) {
    let reader = ImageReader::open(path)
        .unwrap()
        .with_guessed_format()
        .unwrap();
    let format = reader.format().unwrap();
    (format, reader.into_dimensions().unwrap())
}

fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn pipeline(tmp: &TempDir) -> ResizePipeline {
    ResizePipeline::new(
        ImageStore::new(tmp.path()),
        RustCodec::new(),
        LimitsConfig::default(),
    )
}

#[test]
fn every_supported_extension_resizes_in_its_own_format() {
    let cases = [
        ("a.png", ImageFormat::Png),
        ("b.jpg", ImageFormat::Jpeg),
        ("c.jpeg", ImageFormat::Jpeg),
        ("d.bmp", ImageFormat::Bmp),
        ("e.webp", ImageFormat::WebP),
    ];
    let tmp = TempDir::new().unwrap();
    for (name, format) in cases {
        store(tmp.path(), name, format, 64, 48);
    }

    let pipeline = pipeline(&tmp);
    for (name, format) in cases {
        let outcome = pipeline
            .resize(&ResizeRequest::new(name, 20, 30))
            .unwrap_or_else(|e| panic!("{name}: {e}"));
        assert_eq!(outcome.bytes_written as u64, fs::metadata(tmp.path().join(name)).unwrap().len());
        assert_eq!(inspect(&tmp.path().join(name)), (format, (20, 30)), "{name}");
    }
    assert_eq!(entries(tmp.path()), vec!["a.png", "b.jpg", "c.jpeg", "d.bmp", "e.webp"]);
}

#[test]
fn resizing_to_current_size_keeps_dimensions() {
    let tmp = TempDir::new().unwrap();
    store(tmp.path(), "photo.png", ImageFormat::Png, 100, 100);
    let pipeline = pipeline(&tmp);

    pipeline.resize(&ResizeRequest::new("photo.png", 50, 200)).unwrap();
    let outcome = pipeline.resize(&ResizeRequest::new("photo.png", 50, 200)).unwrap();

    assert_eq!(outcome.source, outcome.target);
    assert_eq!(inspect(&tmp.path().join("photo.png")).1, (50, 200));
}

#[test]
fn pipeline_from_config_uses_images_directory() {
    let tmp = TempDir::new().unwrap();
    let images = tmp.path().join("uploads").join("images");
    fs::create_dir_all(&images).unwrap();
    store(&images, "photo.jpg", ImageFormat::Jpeg, 40, 40);

    let mut config = ServiceConfig::default();
    config.storage.root = tmp.path().join("uploads");
    let pipeline = ResizePipeline::from_config(&config);

    pipeline.resize(&ResizeRequest::new("photo.jpg", 10, 10)).unwrap();
    assert_eq!(inspect(&images.join("photo.jpg")), (ImageFormat::Jpeg, (10, 10)));
}

#[test]
fn rejected_requests_leave_directory_untouched() {
    let tmp = TempDir::new().unwrap();
    let original = store(tmp.path(), "photo.png", ImageFormat::Png, 30, 30);
    fs::write(tmp.path().join("notes.txt"), b"hello").unwrap();
    let pipeline = pipeline(&tmp);

    let cases = [
        (ResizeRequest::new("photo.png", 0, 10), ErrorKind::InvalidRequest),
        (ResizeRequest::new("photo.png", 10, 20_000), ErrorKind::InvalidRequest),
        (ResizeRequest::new("../photo.png", 10, 10), ErrorKind::InvalidFilename),
        (ResizeRequest::new("photo", 10, 10), ErrorKind::InvalidFilename),
        (ResizeRequest::new("notes.txt", 10, 10), ErrorKind::UnsupportedFormat),
        (ResizeRequest::new("ghost.png", 10, 10), ErrorKind::NotFound),
    ];
    for (request, expected) in cases {
        let err = pipeline.resize(&request).unwrap_err();
        assert_eq!(err.kind(), expected, "{}: {err}", request.filename);
        assert!(!err.kind().is_retryable());
    }

    assert_eq!(fs::read(tmp.path().join("photo.png")).unwrap(), original);
    assert_eq!(entries(tmp.path()), vec!["notes.txt", "photo.png"]);
    assert_eq!(pipeline.locked_files(), 0);
}

#[test]
fn undecodable_file_is_a_decode_failure() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("broken.png"), b"definitely not an image").unwrap();

    let err = pipeline(&tmp)
        .resize(&ResizeRequest::new("broken.png", 10, 10))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DecodeFailure);
    assert_eq!(
        fs::read(tmp.path().join("broken.png")).unwrap(),
        b"definitely not an image"
    );
}

#[test]
fn mislabeled_file_is_rewritten_in_claimed_format() {
    let tmp = TempDir::new().unwrap();
    let jpeg = fixture(ImageFormat::Jpeg, 40, 40);
    fs::write(tmp.path().join("liar.png"), jpeg).unwrap();

    let outcome = pipeline(&tmp)
        .resize(&ResizeRequest::new("liar.png", 16, 8))
        .unwrap();

    assert_eq!(outcome.detected, ImageKind::Jpeg);
    assert_eq!(outcome.written, ImageKind::Png);
    assert_eq!(inspect(&tmp.path().join("liar.png")), (ImageFormat::Png, (16, 8)));
}

/// Decodes normally, then refuses to encode.
struct EncodeFails(RustCodec);

impl ImageCodec for EncodeFails {
    fn decode(&self, bytes: &[u8]) -> Result<(DynamicImage, ImageKind), CodecError> {
        self.0.decode(bytes)
    }

    fn encode(
        &self,
        _image: &DynamicImage,
        _format: &FormatDescriptor,
    ) -> Result<Vec<u8>, CodecError> {
        Err(CodecError::Encode("disk encoder unavailable".to_string()))
    }
}

#[test]
fn encode_failure_keeps_original_bytes() {
    let tmp = TempDir::new().unwrap();
    let original = store(tmp.path(), "photo.bmp", ImageFormat::Bmp, 30, 30);
    let pipeline = ResizePipeline::new(
        ImageStore::new(tmp.path()),
        EncodeFails(RustCodec::new()),
        LimitsConfig::default(),
    );

    let err = pipeline
        .resize(&ResizeRequest::new("photo.bmp", 10, 10))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::EncodeFailure);
    assert_eq!(fs::read(tmp.path().join("photo.bmp")).unwrap(), original);
    assert_eq!(entries(tmp.path()), vec!["photo.bmp"]);
}

#[test]
fn concurrent_resizes_of_one_file_never_mix() {
    let tmp = TempDir::new().unwrap();
    store(tmp.path(), "photo.png", ImageFormat::Png, 100, 100);
    let pipeline = pipeline(&tmp);

    for _ in 0..5 {
        std::thread::scope(|s| {
            let a = s.spawn(|| pipeline.resize(&ResizeRequest::new("photo.png", 50, 200)));
            let b = s.spawn(|| pipeline.resize(&ResizeRequest::new("photo.png", 80, 60)));
            a.join().unwrap().unwrap();
            b.join().unwrap().unwrap();
        });

        let (format, dims) = inspect(&tmp.path().join("photo.png"));
        assert_eq!(format, ImageFormat::Png);
        assert!(dims == (50, 200) || dims == (80, 60), "got {dims:?}");
        assert_eq!(entries(tmp.path()), vec!["photo.png"]);
    }
    assert_eq!(pipeline.locked_files(), 0);
}

#[test]
fn different_files_resize_in_parallel() {
    let tmp = TempDir::new().unwrap();
    let names: Vec<String> = (0..8).map(|i| format!("img{i}.png")).collect();
    for name in &names {
        store(tmp.path(), name, ImageFormat::Png, 32, 32);
    }
    let pipeline = pipeline(&tmp);

    std::thread::scope(|s| {
        for name in &names {
            let pipeline = &pipeline;
            s.spawn(move || pipeline.resize(&ResizeRequest::new(name.as_str(), 8, 4)).unwrap());
        }
    });

    for name in &names {
        assert_eq!(inspect(&tmp.path().join(name)).1, (8, 4));
    }
    assert_eq!(pipeline.locked_files(), 0);
}
