use ffmpeg_next::format::context::Input;
use ffmpeg_next::software::scaling;
use ffmpeg_next::util::frame::video::Video;

use crate::capture::domain::frame_source::FrameSource;
use crate::capture::domain::source_id::SourceId;
use crate::capture::domain::stream_info::StreamInfo;
use crate::shared::error::AnalysisError;
use crate::shared::frame::Frame;

/// Live or file-backed capture via ffmpeg-next (libavformat + libavdevice).
///
/// Device indices open through the platform capture demuxer
/// (`video4linux2`, `avfoundation` or `dshow`); paths and URLs go through
/// the regular demuxer probe. Every decoded picture is converted to RGB24.
pub struct FfmpegStreamSource {
    stream: Option<OpenStream>,
    frames_read: usize,
}

// Safety: FfmpegStreamSource is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegStreamSource {}

struct OpenStream {
    ictx: Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: scaling::Context,
    width: u32,
    height: u32,
    video_stream_index: usize,
    flushing: bool,
}

impl FfmpegStreamSource {
    pub fn new() -> Self {
        Self {
            stream: None,
            frames_read: 0,
        }
    }

    /// Number of frames handed out since the last successful `open`.
    pub fn frames_read(&self) -> usize {
        self.frames_read
    }
}

impl Default for FfmpegStreamSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for FfmpegStreamSource {
    fn open(&mut self, source: &SourceId) -> Result<StreamInfo, AnalysisError> {
        self.close();

        let unavailable = |reason: String| AnalysisError::CaptureUnavailable {
            source_id: source.to_string(),
            reason,
        };

        ffmpeg_next::init().map_err(|e| unavailable(e.to_string()))?;
        let ictx = open_input(source).map_err(|e| unavailable(e.to_string()))?;

        let (video_stream_index, fps, decoder) = {
            let stream = ictx
                .streams()
                .best(ffmpeg_next::media::Type::Video)
                .ok_or_else(|| unavailable("no video stream".to_string()))?;
            let rate = stream.avg_frame_rate();
            let fps = if rate.denominator() != 0 {
                rate.numerator() as f64 / rate.denominator() as f64
            } else {
                0.0
            };
            let codec_ctx =
                ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())
                    .map_err(|e| unavailable(e.to_string()))?;
            let decoder = codec_ctx
                .decoder()
                .video()
                .map_err(|e| unavailable(e.to_string()))?;
            (stream.index(), fps, decoder)
        };

        let width = decoder.width();
        let height = decoder.height();
        let scaler = scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            scaling::Flags::BILINEAR,
        )
        .map_err(|e| unavailable(e.to_string()))?;

        self.stream = Some(OpenStream {
            ictx,
            decoder,
            scaler,
            width,
            height,
            video_stream_index,
            flushing: false,
        });
        self.frames_read = 0;

        log::info!("Opened {source} ({width}x{height} @ {fps:.1} fps)");
        Ok(StreamInfo {
            width,
            height,
            fps,
            label: source.to_string(),
        })
    }

    fn read(&mut self) -> Option<Frame> {
        let stream = self.stream.as_mut()?;
        match stream.next_frame(self.frames_read) {
            Ok(Some(frame)) => {
                self.frames_read += 1;
                Some(frame)
            }
            Ok(None) => {
                log::info!("Stream ended after {} frames", self.frames_read);
                self.close();
                None
            }
            Err(e) => {
                log::warn!("{e}; closing stream");
                self.close();
                None
            }
        }
    }

    fn close(&mut self) {
        if self.stream.take().is_some() {
            log::debug!("Capture handle released");
        }
    }

    fn is_open(&self) -> bool {
        self.stream.is_some()
    }
}

impl OpenStream {
    /// Pulls packets until one decoded picture is available.
    ///
    /// `Ok(None)` is a clean end of stream; `Err` is a grab failure.
    fn next_frame(&mut self, index: usize) -> Result<Option<Frame>, AnalysisError> {
        loop {
            if let Some(frame) = self.try_receive(index)? {
                return Ok(Some(frame));
            }
            if self.flushing {
                return Ok(None);
            }

            let mut packet = ffmpeg_next::Packet::empty();
            match packet.read(&mut self.ictx) {
                Ok(()) => {}
                Err(ffmpeg_next::Error::Eof) => {
                    let _ = self.decoder.send_eof();
                    self.flushing = true;
                    continue;
                }
                Err(ffmpeg_next::Error::Other { errno }) if errno == ffmpeg_next::error::EAGAIN => {
                    continue;
                }
                Err(e) => return Err(AnalysisError::FrameGrab(e.to_string())),
            }

            if packet.stream() != self.video_stream_index {
                continue;
            }
            if let Err(e) = self.decoder.send_packet(&packet) {
                log::debug!("Dropping undecodable packet: {e}");
            }
        }
    }

    fn try_receive(&mut self, index: usize) -> Result<Option<Frame>, AnalysisError> {
        let mut decoded = Video::empty();
        if self.decoder.receive_frame(&mut decoded).is_err() {
            return Ok(None);
        }
        let mut rgb_frame = Video::empty();
        self.scaler
            .run(&decoded, &mut rgb_frame)
            .map_err(|e| AnalysisError::FrameGrab(e.to_string()))?;
        let pixels = extract_rgb_pixels(&rgb_frame, self.width, self.height);
        Ok(Some(Frame::new(pixels, self.width, self.height, 3, index)))
    }
}

fn open_input(source: &SourceId) -> Result<Input, ffmpeg_next::Error> {
    match source {
        SourceId::Path(path) => ffmpeg_next::format::input(path),
        SourceId::Device(index) => {
            ffmpeg_next::device::register_all();
            let (demuxer, device) = platform_device(*index);
            let format = ffmpeg_next::device::input::video()
                .find(|f| f.name().split(',').any(|name| name == demuxer))
                .ok_or(ffmpeg_next::Error::DemuxerNotFound)?;
            ffmpeg_next::format::open_with(
                &device,
                &ffmpeg_next::format::Format::Input(format),
                ffmpeg_next::Dictionary::new(),
            )
            .map(|ctx| ctx.input())
        }
    }
}

/// Capture demuxer name and device URL for a numeric device index.
fn platform_device(index: u32) -> (&'static str, String) {
    #[cfg(target_os = "macos")]
    {
        ("avfoundation", format!("{index}:none"))
    }
    #[cfg(target_os = "windows")]
    {
        ("dshow", format!("video={index}"))
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        ("video4linux2", format!("/dev/video{index}"))
    }
}

/// Copies pixel data from an ffmpeg frame into a contiguous RGB buffer,
/// dropping per-row stride padding.
fn extract_rgb_pixels(rgb_frame: &Video, width: u32, height: u32) -> Vec<u8> {
    let stride = rgb_frame.stride(0);
    let data = rgb_frame.data(0);
    let w = width as usize;
    let h = height as usize;

    let mut pixels = Vec::with_capacity(w * h * 3);
    for row in 0..h {
        let row_start = row * stride;
        pixels.extend_from_slice(&data[row_start..row_start + w * 3]);
    }
    pixels
}
