/// A single camera frame: contiguous RGB bytes in row-major order.
///
/// The liveness core never inspects pixels itself. Frames are handed to the
/// landmark detector and classifier capabilities, and to the photo fallback
/// when a still capture is required.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
    timestamp_ms: f64,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
            timestamp_ms: 0.0,
        }
    }

    /// A zero-sized frame carrying only its position in the stream.
    ///
    /// Used when replaying recorded landmarks, where the detector looks
    /// results up by index and pixel data is irrelevant.
    pub fn placeholder(index: usize) -> Self {
        Self::new(Vec::new(), 0, 0, 3, index)
    }

    pub fn with_timestamp(mut self, timestamp_ms: f64) -> Self {
        self.timestamp_ms = timestamp_ms;
        self
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

    /// Capture time in milliseconds, monotonically increasing per stream.
    pub fn timestamp_ms(&self) -> f64 {
        self.timestamp_ms
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
