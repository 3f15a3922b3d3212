use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};

use crate::face_detector::FaceRegion;

/// Side length of every emitted face crop.
pub const CROP_SIZE: u32 = 512;

/// Extract `region` from `image` and resize it to exactly
/// [`CROP_SIZE`]×[`CROP_SIZE`].
///
/// The resize is anisotropic: a non-square region is stretched rather than
/// letterboxed. Pure and non-failing for any region inside the image, which
/// the detector contract guarantees.
pub fn crop_face(image: &DynamicImage, region: FaceRegion) -> RgbImage {
    image
        .crop_imm(region.x, region.y, region.width, region.height)
        .resize_exact(CROP_SIZE, CROP_SIZE, FilterType::Lanczos3)
        .to_rgb8()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> DynamicImage {
        let mut img = RgbImage::new(width, height);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            *pixel = image::Rgb([
                (x * 255 / width.max(1)) as u8,
                (y * 255 / height.max(1)) as u8,
                128,
            ]);
        }
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn output_is_always_512_square() {
        let img = gradient(800, 600);
        for (w, h) in [(1, 1), (1, 400), (400, 1), (150, 150), (300, 100)] {
            let crop = crop_face(
                &img,
                FaceRegion {
                    x: 10,
                    y: 20,
                    width: w,
                    height: h,
                },
            );
            assert_eq!(crop.dimensions(), (CROP_SIZE, CROP_SIZE), "{w}x{h}");
        }
    }

    #[test]
    fn full_image_region_is_valid() {
        let img = gradient(200, 100);
        let crop = crop_face(
            &img,
            FaceRegion {
                x: 0,
                y: 0,
                width: 200,
                height: 100,
            },
        );
        assert_eq!(crop.dimensions(), (CROP_SIZE, CROP_SIZE));
    }

    #[test]
    fn uniform_region_stays_uniform() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(
            300,
            300,
            image::Rgb([40, 80, 120]),
        ));
        let crop = crop_face(
            &img,
            FaceRegion {
                x: 50,
                y: 50,
                width: 120,
                height: 180,
            },
        );
        let center = crop.get_pixel(CROP_SIZE / 2, CROP_SIZE / 2);
        assert_eq!(center, &image::Rgb([40, 80, 120]));
    }
}
