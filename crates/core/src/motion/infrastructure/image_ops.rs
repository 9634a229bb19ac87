//! Single-channel image helpers for motion scoring.

/// Luma (BT.601) of an RGB frame, or the first channel of any other layout.
pub fn to_gray(data: &[u8], width: usize, height: usize, channels: usize) -> Vec<u8> {
    let n = width * height;
    if channels < 3 {
        return (0..n).map(|i| data[i * channels]).collect();
    }
    (0..n)
        .map(|i| {
            let p = &data[i * channels..i * channels + 3];
            let y = 0.299 * p[0] as f32 + 0.587 * p[1] as f32 + 0.114 * p[2] as f32;
            y.round().clamp(0.0, 255.0) as u8
        })
        .collect()
}

/// Precompute a 1D Gaussian kernel of the given size.
///
/// `kernel_size` must be odd and >= 1. Sigma follows OpenCV's sigma=0
/// convention: `0.3 * ((k - 1) * 0.5 - 1) + 0.8`.
pub fn gaussian_kernel_1d(kernel_size: usize) -> Vec<f32> {
    debug_assert!(kernel_size >= 1 && kernel_size % 2 == 1);
    let sigma = 0.3 * ((kernel_size as f64 - 1.0) * 0.5 - 1.0) + 0.8;
    let half = (kernel_size / 2) as f64;
    let mut kernel: Vec<f64> = (0..kernel_size)
        .map(|i| {
            let x = i as f64 - half;
            (-x * x / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f64 = kernel.iter().sum();
    for v in &mut kernel {
        *v /= sum;
    }
    kernel.iter().map(|&v| v as f32).collect()
}

/// Separable Gaussian blur of a single-channel image, reusing `temp`.
/// Borders replicate the edge pixel.
pub fn gaussian_blur(
    data: &mut [u8],
    width: usize,
    height: usize,
    kernel: &[f32],
    temp: &mut Vec<f32>,
) {
    let kernel_size = kernel.len();
    if kernel_size <= 1 || width == 0 || height == 0 {
        return;
    }
    let half = kernel_size as isize / 2;
    temp.resize(width * height, 0.0);

    for y in 0..height {
        for x in 0..width {
            let mut sum = 0.0f32;
            for (k, &w) in kernel.iter().enumerate() {
                let sx = (x as isize + k as isize - half).clamp(0, width as isize - 1) as usize;
                sum += data[y * width + sx] as f32 * w;
            }
            temp[y * width + x] = sum;
        }
    }

    for y in 0..height {
        for x in 0..width {
            let mut sum = 0.0f32;
            for (k, &w) in kernel.iter().enumerate() {
                let sy = (y as isize + k as isize - half).clamp(0, height as isize - 1) as usize;
                sum += temp[sy * width + x] * w;
            }
            data[y * width + x] = sum.round().clamp(0.0, 255.0) as u8;
        }
    }
}

/// Binary mask: 255 where `|a - b| > threshold`, else 0.
pub fn threshold_abs_diff(a: &[u8], b: &[u8], threshold: u8) -> Vec<u8> {
    a.iter()
        .zip(b)
        .map(|(&pa, &pb)| if pa.abs_diff(pb) > threshold { 255 } else { 0 })
        .collect()
}

/// Dilation with a 3x3 square structuring element, applied `iterations` times.
pub fn dilate_3x3(data: &mut Vec<u8>, width: usize, height: usize, iterations: usize) {
    if width == 0 || height == 0 {
        return;
    }
    let mut out = vec![0u8; width * height];
    for _ in 0..iterations {
        for y in 0..height {
            let y0 = y.saturating_sub(1);
            let y1 = (y + 1).min(height - 1);
            for x in 0..width {
                let x0 = x.saturating_sub(1);
                let x1 = (x + 1).min(width - 1);
                let mut max = 0u8;
                for ny in y0..=y1 {
                    for nx in x0..=x1 {
                        max = max.max(data[ny * width + nx]);
                    }
                }
                out[y * width + x] = max;
            }
        }
        std::mem::swap(data, &mut out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_gray_of_pure_colors() {
        let data = [255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255];
        let gray = to_gray(&data, 4, 1, 3);
        assert_eq!(gray, vec![76, 150, 29, 255]);
    }

    #[test]
    fn test_gray_of_single_channel_is_copy() {
        let data = [3, 7, 9];
        assert_eq!(to_gray(&data, 3, 1, 1), vec![3, 7, 9]);
    }

    #[test]
    fn test_kernel_sums_to_one_and_is_symmetric() {
        let k = gaussian_kernel_1d(21);
        assert_relative_eq!(k.iter().sum::<f32>(), 1.0, epsilon = 1e-5);
        for i in 0..k.len() / 2 {
            assert_relative_eq!(k[i], k[k.len() - 1 - i], epsilon = 1e-7);
        }
    }

    #[test]
    fn test_blur_uniform_image_unchanged() {
        let mut data = vec![90u8; 12 * 9];
        let kernel = gaussian_kernel_1d(5);
        let mut temp = Vec::new();
        gaussian_blur(&mut data, 12, 9, &kernel, &mut temp);
        assert!(data.iter().all(|&v| v.abs_diff(90) <= 1));
    }

    #[test]
    fn test_blur_spreads_bright_pixel() {
        let mut data = vec![0u8; 9 * 9];
        data[4 * 9 + 4] = 255;
        let kernel = gaussian_kernel_1d(5);
        let mut temp = Vec::new();
        gaussian_blur(&mut data, 9, 9, &kernel, &mut temp);
        assert!(data[4 * 9 + 4] < 255);
        assert!(data[4 * 9 + 5] > 0);
    }

    #[test]
    fn test_threshold_is_strictly_greater() {
        let a = [100, 100, 100];
        let b = [125, 126, 74];
        assert_eq!(threshold_abs_diff(&a, &b, 25), vec![0, 255, 255]);
    }

    #[test]
    fn test_dilate_grows_single_pixel() {
        let mut data = vec![0u8; 7 * 7];
        data[3 * 7 + 3] = 255;
        dilate_3x3(&mut data, 7, 7, 1);
        assert_eq!(data.iter().filter(|&&v| v == 255).count(), 9);
        dilate_3x3(&mut data, 7, 7, 1);
        assert_eq!(data.iter().filter(|&&v| v == 255).count(), 25);
    }
}
