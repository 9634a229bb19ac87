use ndarray::ArrayView3;

use crate::shared::region::FaceBox;

/// A single captured frame: contiguous RGB bytes in row-major order.
///
/// Frames carry no timestamp; `index` is the read sequence number assigned
/// by the source, so the most recent read always has the highest index.
/// Pixel data is immutable once constructed. Detectors that need history
/// copy what they need.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    /// A buffer whose length is not `width * height * channels` yields an
    /// empty frame (keeping `index`), which every detector absorbs as "no
    /// result".
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        let expected = (width as usize) * (height as usize) * (channels as usize);
        if data.len() != expected {
            log::warn!(
                "Dropping frame {index}: {} bytes for {width}x{height}x{channels}",
                data.len()
            );
            return Self {
                data: Vec::new(),
                width: 0,
                height: 0,
                channels,
                index,
            };
        }
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    /// A zero-sized frame. Every detector treats it as "no result".
    pub fn empty() -> Self {
        Self::new(Vec::new(), 0, 0, 3, 0)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.data.is_empty()
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Copies the pixels inside `face` (clamped to the frame) into a new frame.
    ///
    /// Returns `None` when the clamped box has no area.
    pub fn crop(&self, face: &FaceBox) -> Option<Frame> {
        let fw = self.width as i32;
        let fh = self.height as i32;
        let x1 = face.left.clamp(0, fw) as usize;
        let y1 = face.top.clamp(0, fh) as usize;
        let x2 = face.right.clamp(0, fw) as usize;
        let y2 = face.bottom.clamp(0, fh) as usize;
        if x2 <= x1 || y2 <= y1 {
            return None;
        }

        let channels = self.channels as usize;
        let row_len = (x2 - x1) * channels;
        let mut data = Vec::with_capacity(row_len * (y2 - y1));
        for row in y1..y2 {
            let start = (row * self.width as usize + x1) * channels;
            data.extend_from_slice(&self.data[start..start + row_len]);
        }

        Some(Frame::new(
            data,
            (x2 - x1) as u32,
            (y2 - y1) as u32,
            self.channels,
            self.index,
        ))
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}
