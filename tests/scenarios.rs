use std::cell::Cell;

use image::{Pixel, Rgb, Rgba, RgbaImage};
use wadpal::{
    AreaResampler, BuildError, DecalTransparencySource, DitheringAlgorithm, Resampler,
    TextureFrameBuilder, TextureKind, TextureSettings, TextureSource,
};

/// Point-samples the top left pixel of every block and counts its calls.
#[derive(Default)]
struct PointResampler {
    calls: Cell<usize>,
}

impl Resampler for PointResampler {
    fn resize(&self, image: &RgbaImage, width: u32, height: u32) -> RgbaImage {
        self.calls.set(self.calls.get() + 1);
        let step_x = image.width() / width;
        let step_y = image.height() / height;
        RgbaImage::from_fn(width, height, |x, y| *image.get_pixel(x * step_x, y * step_y))
    }
}

fn builder() -> TextureFrameBuilder<AreaResampler> {
    TextureFrameBuilder::new(AreaResampler)
}

/// 64 colors in 4x4 blocks.
fn checker(size: u32) -> RgbaImage {
    RgbaImage::from_fn(size, size, |x, y| {
        let block = (x / 4 + y / 4) % 4;
        Rgba([(x % 4 * 60) as u8, (y % 4 * 60) as u8, (block * 60) as u8, 255])
    })
}

#[test]
fn solid_red_round_trip() {
    let image = RgbaImage::from_pixel(16, 16, Rgba([255, 0, 0, 255]));
    let texture = builder()
        .build_texture(
            &TextureSource::new("red", image),
            TextureKind::Normal,
            &TextureSettings::default(),
            false,
        )
        .expect("valid texture");
    assert_eq!(texture.palette[0], Rgb([255, 0, 0]));
    assert_eq!(texture.mipmaps.len(), 4);
    assert_eq!(texture.mipmaps[0], vec![0; 256]);
    assert_eq!(texture.mipmaps[3], vec![0; 4]);
}

#[test]
fn few_colors_are_exact_in_every_mipmap() {
    let resampler = PointResampler::default();
    let image = checker(32);
    let texture = TextureFrameBuilder::new(resampler)
        .build_texture(
            &TextureSource::new("checker", image.clone()),
            TextureKind::Normal,
            &TextureSettings::default(),
            false,
        )
        .expect("valid texture");
    for (level, indices) in texture.mipmaps.iter().enumerate() {
        let size = 32 >> level;
        assert_eq!(indices.len(), size * size);
        let step = 1 << level;
        for (i, &index) in indices.iter().enumerate() {
            let (x, y) = ((i % size) * step, (i / size) * step);
            let expected = image.get_pixel(x as u32, y as u32).to_rgb();
            assert_eq!(texture.palette[index], expected, "level {} pixel {}", level, i);
        }
    }
}

#[test]
fn only_missing_mipmaps_are_synthesized() {
    let resampler = PointResampler::default();
    let builder = TextureFrameBuilder::new(resampler);
    let mut source = TextureSource::new("partial", checker(32));
    source.mipmaps[0] = Some(checker(16));
    builder
        .build_texture(&source, TextureKind::Normal, &TextureSettings::default(), false)
        .expect("valid texture");
    assert_eq!(builder.resampler().calls.get(), 2);
}

#[test]
fn half_transparent_blue() {
    let image = RgbaImage::from_fn(16, 16, |_, y| {
        if y < 8 {
            Rgba([0, 0, 0, 0])
        } else {
            Rgba([0, 0, 255, 255])
        }
    });
    let texture = builder()
        .build_texture(
            &TextureSource::new("{half", image),
            TextureKind::Transparent,
            &TextureSettings::default(),
            false,
        )
        .expect("valid texture");
    let main = &texture.mipmaps[0];
    assert_eq!(main.iter().filter(|&&i| i == 255).count(), 128);
    let blue = main[255];
    assert_eq!(texture.palette[blue], Rgb([0, 0, 255]));
    assert!(main[128..].iter().all(|&i| i == blue));
    assert_eq!(texture.palette[255], Rgb([0, 0, 255]));
}

#[test]
fn water_fog_slots() {
    let settings = TextureSettings {
        water_fog_color: Some(Rgba([10, 20, 30, 200])),
        ..Default::default()
    };
    let texture = builder()
        .build_texture(
            &TextureSource::new("!water", checker(16)),
            TextureKind::Water,
            &settings,
            false,
        )
        .expect("valid texture");
    assert_eq!(texture.palette[3], Rgb([10, 20, 30]));
    assert_eq!(texture.palette[4][0], 200);
    for indices in &texture.mipmaps {
        assert!(indices.iter().all(|&i| i != 3 && i != 4));
    }
}

#[test]
fn decal_ramp() {
    let settings = TextureSettings {
        decal_color: Some(Rgb([120, 0, 0])),
        decal_transparency_source: Some(DecalTransparencySource::AlphaChannel),
        ..Default::default()
    };
    let image = RgbaImage::from_fn(16, 16, |x, y| Rgba([0, 0, 0, (x * 16 + y) as u8]));
    let texture = builder()
        .build_texture(
            &TextureSource::new("{blood", image.clone()),
            TextureKind::Decal,
            &settings,
            false,
        )
        .expect("valid texture");
    for i in 0..255u8 {
        assert_eq!(texture.palette[i], Rgb([i, i, i]));
    }
    assert_eq!(texture.palette[255], Rgb([120, 0, 0]));
    let alphas: Vec<u8> = image.pixels().map(|p| p[3]).collect();
    assert_eq!(texture.mipmaps[0], alphas);
}

#[test]
fn fullbright_texture_uses_mask() {
    let image = checker(16);
    let mut source = TextureSource::new("~light", image.clone());
    source.fullbright_mask = Some(RgbaImage::from_fn(16, 16, |_, y| {
        Rgba([255, 255, 255, if y < 4 { 255 } else { 0 }])
    }));
    let texture = TextureFrameBuilder::new(PointResampler::default())
        .build_texture(&source, TextureKind::Fullbright, &TextureSettings::default(), false)
        .expect("valid texture");
    for (i, &index) in texture.mipmaps[0].iter().enumerate() {
        assert_eq!(index >= 224, i < 64, "pixel {}", i);
    }
}

#[test]
fn animated_textures_are_not_dithered() {
    let gradient =
        RgbaImage::from_fn(64, 16, |x, y| Rgba([(x * 4) as u8, (y * 16) as u8, 128, 255]));
    let settings = TextureSettings {
        dithering_algorithm: Some(DitheringAlgorithm::None),
        ..Default::default()
    };
    let source = TextureSource::new("+0fan", gradient);
    let plain = builder()
        .build_texture(&source, TextureKind::Normal, &settings, false)
        .expect("valid texture");
    let animated = builder()
        .build_texture(&source, TextureKind::Normal, &TextureSettings::default(), true)
        .expect("valid texture");
    assert_eq!(plain, animated);
}

#[test]
fn sizes_must_be_multiples_of_16() {
    let result = builder().build_texture(
        &TextureSource::new("odd", RgbaImage::new(24, 16)),
        TextureKind::Normal,
        &TextureSettings::default(),
        false,
    );
    assert!(matches!(
        result,
        Err(BuildError::InvalidDimensions {
            width: 24,
            height: 16,
            ..
        })
    ));
}

#[test]
fn mipmap_sizes_must_halve() {
    let mut source = TextureSource::new("mips", checker(32));
    source.mipmaps[1] = Some(checker(16));
    let result = builder().build_texture(
        &source,
        TextureKind::Normal,
        &TextureSettings::default(),
        false,
    );
    assert_eq!(
        result,
        Err(BuildError::MipmapSizeMismatch {
            level: 2,
            width: 16,
            height: 16,
            expected_width: 8,
            expected_height: 8,
        })
    );
}

#[test]
fn fatal_errors() {
    let settings = TextureSettings::default();
    let missing = TextureSource {
        name: "nothing".to_owned(),
        ..Default::default()
    };
    assert_eq!(
        builder().build_texture(&missing, TextureKind::Normal, &settings, false),
        Err(BuildError::MissingMainImage("nothing".to_owned()))
    );
    assert_eq!(
        builder().build_texture(
            &TextureSource::new("font", checker(16)),
            TextureKind::Font,
            &settings,
            false
        ),
        Err(BuildError::UnsupportedKind(TextureKind::Font))
    );
    assert_eq!(
        builder().build_texture(
            &TextureSource::new("~nomask", checker(16)),
            TextureKind::Fullbright,
            &settings,
            false
        ),
        Err(BuildError::MissingFullbrightMask("~nomask".to_owned()))
    );
    assert!(matches!(
        builder().build_texture(
            &TextureSource::new("sixteen_letters!", checker(16)),
            TextureKind::Normal,
            &settings,
            false
        ),
        Err(BuildError::NameTooLong { .. })
    ));
}

#[test]
fn fully_transparent_texture_still_builds() {
    let image = RgbaImage::from_pixel(16, 16, Rgba([50, 60, 70, 0]));
    let texture = builder()
        .build_texture(
            &TextureSource::new("{ghost", image),
            TextureKind::Transparent,
            &TextureSettings::default(),
            false,
        )
        .expect("valid texture");
    assert_eq!(texture.palette.colors().len(), 256);
    assert!(texture.mipmaps.iter().flatten().all(|&i| i == 255));
}
