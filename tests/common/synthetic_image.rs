/// Uniform opaque RGBA image.
pub fn solid_rgba(width: usize, height: usize, rgb: [u8; 3]) -> Vec<u8> {
    assert!(width > 0 && height > 0, "image dimensions must be positive");

    let mut img = vec![0u8; width * height * 4];
    for px in img.chunks_exact_mut(4) {
        px.copy_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
    }
    img
}

/// Black image with a white square covering `[x0, x1) x [y0, y1)`.
pub fn square_on_black(width: usize, height: usize, x0: usize, y0: usize, x1: usize, y1: usize) -> Vec<u8> {
    let mut img = solid_rgba(width, height, [0, 0, 0]);
    for y in y0..y1 {
        for x in x0..x1 {
            set_pixel(&mut img, width, x, y, [255, 255, 255]);
        }
    }
    img
}

pub fn set_pixel(img: &mut [u8], width: usize, x: usize, y: usize, rgb: [u8; 3]) {
    let i = (y * width + x) * 4;
    img[i..i + 3].copy_from_slice(&rgb);
}
