extern crate image;
extern crate wadpal;

use std::env;
use std::path::Path;

#[cfg(feature = "print-truecolor")]
use termion::color;

use wadpal::{
    is_animated_texture_name, AreaResampler, TextureFrameBuilder, TextureKind, TextureSettings,
    TextureSource,
};

fn main() {
    let source = env::args().nth(1).expect("No source image given.");
    let path = Path::new(&source);
    let img = image::open(path)
        .unwrap_or_else(|_| panic!("Could not load image {:?}", source))
        .to_rgba8();
    let name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("texture")
        .to_owned();

    let kind = TextureKind::from_texture_name(&name);
    let animated = is_animated_texture_name(&name);
    let texture = TextureFrameBuilder::new(AreaResampler)
        .build_texture(
            &TextureSource::new(name, img),
            kind,
            &TextureSettings::default(),
            animated,
        )
        .unwrap_or_else(|err| panic!("Could not build {:?}: {}", source, err));

    println!(
        "{} ({:?}, {}x{})",
        texture.name, kind, texture.width, texture.height
    );
    println!("{}", texture.palette);

    #[cfg(feature = "print-truecolor")]
    for row in texture.palette.colors().chunks(16) {
        for rgb in row {
            print!("{}██", color::Fg(color::Rgb(rgb[0], rgb[1], rgb[2])));
        }
        println!("{}", color::Fg(color::Reset));
    }
}
