//! End-to-end tests of the compositor on the real `image` backend.
//!
//! Fixtures are generated in memory; outputs are decoded again to check what
//! was actually written, not just what was reported.

use boothframe::imaging::{
    Compositor, Dimensions, LogoSize, MergeOptions, MergeOverrides, OutputFormat,
    create_compositor,
};
use boothframe::upload::UploadFile;
use image::{
    DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage,
};

fn jpeg(width: u32, height: u32) -> UploadFile {
    let img = RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 90]));
    let mut buf = Vec::new();
    image::codecs::jpeg::JpegEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    UploadFile::new("guest.jpg", "image/jpeg", buf)
}

fn png_logo(width: u32, height: u32) -> UploadFile {
    let img = RgbaImage::from_fn(width, height, |x, _| {
        if x < width / 2 {
            Rgba([0, 0, 255, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    });
    let mut buf = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgba8)
        .unwrap();
    UploadFile::new("event-logo.png", "image/png", buf)
}

fn decode(data: &[u8]) -> DynamicImage {
    image::load_from_memory(data).expect("output must decode")
}

fn dims(width: u32, height: u32) -> Dimensions {
    Dimensions { width, height }
}

#[test]
fn merge_full_hd_photo_with_square_logo() {
    let result = create_compositor()
        .merge_images(&jpeg(1920, 1080), &png_logo(200, 200), None)
        .unwrap();

    assert_eq!(result.mime_type, "image/jpeg");
    assert_eq!(result.dimensions, dims(1248, 832));
    assert_eq!(image::guess_format(&result.data).unwrap(), ImageFormat::Jpeg);

    let out = decode(&result.data);
    assert_eq!((out.width(), out.height()), (1248, 832));
}

#[test]
fn border_on_portrait_photo_with_custom_width_and_quality() {
    let overrides = MergeOverrides {
        border_width: Some(10),
        quality: Some(85),
        ..MergeOverrides::default()
    };
    let result = create_compositor()
        .add_white_border(&jpeg(832, 1248), Some(&overrides))
        .unwrap();

    assert_eq!(result.mime_type, "image/jpeg");
    assert_eq!(result.dimensions, dims(852, 1268));
    let out = decode(&result.data);
    assert_eq!((out.width(), out.height()), (852, 1268));
}

#[test]
fn border_default_and_wide_on_landscape() {
    let compositor = create_compositor();
    let photo = jpeg(1248, 832);

    let default = compositor.add_white_border(&photo, None).unwrap();
    assert_eq!(default.dimensions, dims(1262, 846));

    let wide = MergeOverrides {
        border_width: Some(15),
        ..MergeOverrides::default()
    };
    let wide = compositor.add_white_border(&photo, Some(&wide)).unwrap();
    assert_eq!(wide.dimensions, dims(1278, 862));
    let out = decode(&wide.data);
    assert_eq!((out.width(), out.height()), (1278, 862));
}

#[test]
fn output_formats_round_trip_through_the_decoder() {
    for (format, mime, sniffed) in [
        (OutputFormat::Jpeg, "image/jpeg", ImageFormat::Jpeg),
        (OutputFormat::Png, "image/png", ImageFormat::Png),
        (OutputFormat::Webp, "image/webp", ImageFormat::WebP),
    ] {
        let overrides = MergeOverrides {
            output_format: Some(format),
            ..MergeOverrides::default()
        };
        let result = create_compositor()
            .add_white_border(&jpeg(300, 400), Some(&overrides))
            .unwrap();
        assert_eq!(result.mime_type, mime);
        assert_eq!(image::guess_format(&result.data).unwrap(), sniffed);
    }
}

#[test]
fn unrecognised_format_name_still_encodes_jpeg() {
    let overrides: MergeOverrides =
        serde_json::from_str(r#"{"outputFormat":"heic","borderWidth":0}"#).unwrap();
    let result = create_compositor()
        .add_white_border(&jpeg(400, 300), Some(&overrides))
        .unwrap();

    assert_eq!(result.mime_type, "image/jpeg");
    assert_eq!(image::guess_format(&result.data).unwrap(), ImageFormat::Jpeg);
    assert_eq!(result.dimensions, dims(1248, 832));
}

#[test]
fn wide_logo_is_letterboxed_not_stretched() {
    let overrides = MergeOverrides {
        logo_size: Some(LogoSize {
            width: 180,
            height: 180,
        }),
        output_format: Some(OutputFormat::Png),
        ..MergeOverrides::default()
    };
    // 4:1 logo, left half opaque blue: fitted to 180x45 and centered vertically
    let result = create_compositor()
        .merge_images(&jpeg(1248, 832), &png_logo(400, 100), Some(&overrides))
        .unwrap();
    let canvas = decode(&result.data).to_rgba8();

    let box_x = 1248 - 24 - 180;
    let box_y = 832 - 24 - 180;
    let logo_row = canvas.get_pixel(box_x + 40, box_y + 90);
    let padding_row = canvas.get_pixel(box_x + 40, box_y + 20);

    assert!(logo_row[2] > 200 && logo_row[0] < 60, "{logo_row:?}");
    assert!(padding_row[2] < 150, "padding should show the photo: {padding_row:?}");
}

#[test]
fn validation_failures_surface_unwrapped() {
    let compositor = create_compositor();
    let gif = UploadFile::new("anim.gif", "image/gif", vec![0x47, 0x49, 0x46]);
    let err = compositor.add_white_border(&gif, None).unwrap_err();
    assert!(err.is_validation());
    assert_eq!(err.to_string(), "Unsupported image type: image/gif");

    let empty = UploadFile::new("empty.png", "image/png", Vec::new());
    let err = compositor.merge_images(&jpeg(10, 10), &empty, None).unwrap_err();
    assert_eq!(err.to_string(), "Image file data is empty");
}

#[test]
fn undecodable_data_surfaces_as_wrapped_error() {
    let lying = UploadFile::new("photo.jpg", "image/jpeg", b"GIF89a....".to_vec());
    let err = create_compositor().add_white_border(&lying, None).unwrap_err();
    assert!(!err.is_validation());
    assert!(
        err.to_string().starts_with("Failed to add white border: "),
        "{err}"
    );
}

#[test]
fn huge_border_is_a_wrapped_error_not_a_panic() {
    let overrides = MergeOverrides {
        border_width: Some(1 << 30),
        ..MergeOverrides::default()
    };
    let err = create_compositor()
        .add_white_border(&jpeg(64, 48), Some(&overrides))
        .unwrap_err();
    assert!(!err.is_validation());
    assert!(
        err.to_string().starts_with("Failed to add white border: "),
        "{err}"
    );
}

#[test]
fn huge_logo_box_is_a_wrapped_error_not_a_panic() {
    let overrides = MergeOverrides {
        logo_size: Some(LogoSize {
            width: 1 << 20,
            height: 1 << 20,
        }),
        ..MergeOverrides::default()
    };
    let err = create_compositor()
        .merge_images(&jpeg(64, 48), &png_logo(20, 20), Some(&overrides))
        .unwrap_err();
    assert!(err.to_string().starts_with("Failed to merge images: "), "{err}");
}

#[test]
fn webp_output_honours_quality() {
    let photo = jpeg(640, 480);
    let encode = |quality| {
        let overrides = MergeOverrides {
            quality: Some(quality),
            output_format: Some(OutputFormat::Webp),
            ..MergeOverrides::default()
        };
        create_compositor()
            .add_white_border(&photo, Some(&overrides))
            .unwrap()
            .data
    };
    assert!(encode(10).len() < encode(95).len());
}

#[test]
fn independent_instances_keep_their_own_defaults() {
    let framed = Compositor::with_defaults(MergeOptions {
        border_width: 30,
        ..MergeOptions::default()
    });
    let plain = create_compositor();
    let photo = jpeg(200, 100);

    assert_eq!(framed.add_white_border(&photo, None).unwrap().dimensions, dims(1308, 892));
    assert_eq!(plain.add_white_border(&photo, None).unwrap().dimensions, dims(1262, 846));
}

#[test]
fn concurrent_calls_share_one_instance() {
    let compositor = create_compositor();
    let photo = jpeg(120, 90);
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| compositor.add_white_border(&photo, None).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().dimensions, dims(1262, 846));
        }
    });
}

#[test]
fn metadata_probe_reports_header_fields() {
    let meta = create_compositor()
        .get_image_metadata(&png_logo(64, 32))
        .unwrap();
    assert_eq!((meta.width, meta.height), (64, 32));
    assert_eq!(meta.format.as_deref(), Some("png"));
    assert!(meta.has_alpha);
}
