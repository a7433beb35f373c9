//! Splitting a single 6:1 strip image into cube map faces.

use std::fmt;
use std::str::FromStr;

use texel_common::{CubeFace, RasterImage};

use crate::{Error, Result};

/// The order in which compass directions appear along a cube map strip.
///
/// Written as six characters drawn from `N`, `S`, `E`, `W`, `U`, `D`, each
/// used exactly once. Directions map to faces as a left-handed cube viewed
/// from the inside: N is +Z, S is -Z, E is +X, W is -X, U is +Y, D is -Y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaceOrder([CubeFace; 6]);

impl FaceOrder {
    /// The order DDS cube maps store their faces in.
    pub const DDS: FaceOrder = FaceOrder(CubeFace::ALL);

    /// Parse a six character direction string such as `"EWUDNS"`.
    pub fn parse(order: &str) -> Result<Self> {
        let invalid = || Error::InvalidFaceOrder(order.to_owned());

        let mut faces = [CubeFace::PositiveX; 6];
        let mut seen = [false; 6];
        let mut count = 0;
        for ch in order.chars() {
            if count == 6 {
                return Err(invalid());
            }
            let face = direction_face(ch.to_ascii_uppercase()).ok_or_else(invalid)?;
            if std::mem::replace(&mut seen[face.index()], true) {
                return Err(invalid());
            }
            faces[count] = face;
            count += 1;
        }

        if count != 6 {
            return Err(invalid());
        }
        Ok(Self(faces))
    }

    /// Faces in strip order.
    pub fn faces(&self) -> &[CubeFace; 6] {
        &self.0
    }
}

impl Default for FaceOrder {
    fn default() -> Self {
        Self::DDS
    }
}

impl FromStr for FaceOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for FaceOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for face in self.0 {
            write!(f, "{}", face_direction(face))?;
        }
        Ok(())
    }
}

fn direction_face(direction: char) -> Option<CubeFace> {
    match direction {
        'N' => Some(CubeFace::PositiveZ),
        'S' => Some(CubeFace::NegativeZ),
        'W' => Some(CubeFace::NegativeX),
        'E' => Some(CubeFace::PositiveX),
        'U' => Some(CubeFace::PositiveY),
        'D' => Some(CubeFace::NegativeY),
        _ => None,
    }
}

fn face_direction(face: CubeFace) -> char {
    match face {
        CubeFace::PositiveZ => 'N',
        CubeFace::NegativeZ => 'S',
        CubeFace::NegativeX => 'W',
        CubeFace::PositiveX => 'E',
        CubeFace::PositiveY => 'U',
        CubeFace::NegativeY => 'D',
    }
}

/// Six square face images, each tagged with its direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CubeFaceSet {
    faces: Vec<(CubeFace, RasterImage)>,
}

impl CubeFaceSet {
    /// Edge length of every face.
    pub fn side(&self) -> u32 {
        self.faces.first().map_or(0, |(_, image)| image.width())
    }

    /// Image for one face.
    pub fn get(&self, face: CubeFace) -> Option<&RasterImage> {
        self.faces
            .iter()
            .find(|(f, _)| *f == face)
            .map(|(_, image)| image)
    }

    /// Faces in the order they appeared in the strip.
    pub fn iter(&self) -> impl Iterator<Item = (CubeFace, &RasterImage)> {
        self.faces.iter().map(|(face, image)| (*face, image))
    }

    /// Faces sorted into storage order (+X, -X, +Y, -Y, +Z, -Z).
    pub fn into_dds_order(mut self) -> Vec<(CubeFace, RasterImage)> {
        self.faces.sort_by_key(|(face, _)| *face);
        self.faces
    }
}

/// Split a 6:1 (or 1:6) strip into six faces following `order`.
///
/// Strips wider than they are tall are cut left to right; anything else is
/// cut top to bottom.
pub fn split_cubemap(image: &RasterImage, order: &FaceOrder) -> Result<CubeFaceSet> {
    let (width, height) = image.dimensions();
    let is_strip = width as u64 == 6 * height as u64 || height as u64 == 6 * width as u64;
    if image.is_empty() || !is_strip {
        return Err(Error::CubemapRatio { width, height });
    }

    let horizontal = width > height;
    let side = width.min(height);
    let mut faces = Vec::with_capacity(6);
    for (i, face) in order.faces().iter().enumerate() {
        let offset = i as u32 * side;
        let (x, y) = if horizontal { (offset, 0) } else { (0, offset) };
        faces.push((*face, image.crop(x, y, side, side)?));
    }

    Ok(CubeFaceSet { faces })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use texel_common::PixelLayout;

    /// A strip whose n-th face is filled with the value `n * 10`.
    fn strip(side: u32, horizontal: bool) -> RasterImage {
        let (w, h) = if horizontal {
            (side * 6, side)
        } else {
            (side, side * 6)
        };
        let mut data = Vec::with_capacity((w * h) as usize);
        for y in 0..h {
            for x in 0..w {
                let index = if horizontal { x / side } else { y / side };
                data.push((index * 10) as u8);
            }
        }
        RasterImage::new(w, h, PixelLayout::Luminance, data).unwrap()
    }

    #[test]
    fn test_parse_dds_order() {
        let order = FaceOrder::parse("EWUDNS").unwrap();
        assert_eq!(order, FaceOrder::DDS);
        assert_eq!(order.to_string(), "EWUDNS");
        assert_eq!("ewudns".parse::<FaceOrder>().unwrap(), FaceOrder::DDS);
    }

    #[rstest]
    #[case("")]
    #[case("EWUDN")]
    #[case("EWUDNSS")]
    #[case("EWUDNN")]
    #[case("EWUDNX")]
    fn test_parse_rejects(#[case] order: &str) {
        assert!(matches!(
            FaceOrder::parse(order),
            Err(Error::InvalidFaceOrder(_))
        ));
    }

    #[test]
    fn test_split_horizontal() {
        let image = strip(4, true);
        let set = split_cubemap(&image, &FaceOrder::DDS).unwrap();

        assert_eq!(set.side(), 4);
        for (i, (face, img)) in set.iter().enumerate() {
            assert_eq!(face, CubeFace::ALL[i]);
            assert_eq!(img.dimensions(), (4, 4));
            assert!(img.data().iter().all(|&v| v == (i * 10) as u8));
        }
    }

    #[test]
    fn test_split_vertical_custom_order() {
        let image = strip(2, false);
        let order = FaceOrder::parse("NSEWUD").unwrap();
        let set = split_cubemap(&image, &order).unwrap();

        assert_eq!(set.get(CubeFace::PositiveZ).unwrap().data(), &[0; 4]);
        assert_eq!(set.get(CubeFace::NegativeZ).unwrap().data(), &[10; 4]);
        assert_eq!(set.get(CubeFace::PositiveX).unwrap().data(), &[20; 4]);
        assert_eq!(set.get(CubeFace::NegativeY).unwrap().data(), &[50; 4]);

        let sorted = set.into_dds_order();
        let faces: Vec<_> = sorted.iter().map(|(face, _)| *face).collect();
        assert_eq!(faces, CubeFace::ALL.to_vec());
        assert_eq!(sorted[0].1.data(), &[20; 4]);
    }

    #[rstest]
    #[case(12, 3)]
    #[case(6, 6)]
    #[case(0, 0)]
    fn test_split_rejects_bad_ratio(#[case] width: u32, #[case] height: u32) {
        let image = RasterImage::blank(width, height, PixelLayout::Rgb);
        assert!(matches!(
            split_cubemap(&image, &FaceOrder::DDS),
            Err(Error::CubemapRatio { .. })
        ));
    }
}
