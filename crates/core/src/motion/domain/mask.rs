/// Pixel value for a foreground (moving) pixel.
pub const FOREGROUND: u8 = 255;
/// Pixel value for a detected shadow. Shadows never form motion regions.
pub const SHADOW: u8 = 127;
pub const BACKGROUND: u8 = 0;

/// Single-channel foreground mask produced by a motion detector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Mask {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        debug_assert_eq!(data.len(), (width as usize) * (height as usize));
        Self {
            data,
            width,
            height,
        }
    }

    pub fn blank(width: u32, height: u32) -> Self {
        Self::new(vec![BACKGROUND; (width as usize) * (height as usize)], width, height)
    }

    pub fn count(&self, value: u8) -> usize {
        self.data.iter().filter(|&&v| v == value).count()
    }
}
