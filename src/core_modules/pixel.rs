// THEORY:
// The `Pixel` module is the smallest unit of the lighting engine: a plain RGBA value
// with clamped channel math and a handful of single-pixel conversions. Nothing here
// looks at neighbors; anything spatial (smoothing, gradients, lighting) lives in the
// filter modules that own a `PixelBuffer`.
//
// What lives here:
// - Channel clamping: every write is clamped to [0, 255] on both ends.
// - Intensity: the unweighted mean of R, G, B scaled to [0, 1]. The normal-map
//   extractor reads slopes from this value.
// - map / unmap: the encoding of a signed unit-range vector component into a byte
//   and back. A normal map stores (x, y, z) in (R, G, B) through `map`.
// - mean / scale: the two arithmetic operations the filters need, as named
//   functions rather than operator overloads.

pub mod pixel {
    pub type Byte = u8;
    pub type Channel = Byte;
    pub type Intensity = f64;
    pub type Component = f64;
    pub type Bgra = [Byte; CHANNELS];

    pub const CHANNELS: usize = 4;

    const CHANNEL_MAX: i32 = Channel::MAX as i32;
    const HALF_RANGE: f64 = Channel::MAX as f64 / 2.0;

    /// Clamps an integer channel value to [0, 255].
    #[inline]
    pub fn clamp_channel(value: i32) -> Channel {
        value.clamp(0, CHANNEL_MAX) as Channel
    }

    /// A single RGBA pixel. Channels are always within [0, 255].
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct Pixel {
        /// The red channel value (0-255).
        pub red: Channel,
        /// The green channel value (0-255).
        pub green: Channel,
        /// The blue channel value (0-255).
        pub blue: Channel,
        /// The alpha (transparency) channel value (0-255).
        pub alpha: Channel,
    }

    impl Pixel {
        pub const fn new(red: Channel, green: Channel, blue: Channel, alpha: Channel) -> Self {
            Pixel { red, green, blue, alpha }
        }

        /// Builds a pixel from unbounded integers, clamping each channel to [0, 255].
        pub fn clamped(red: i32, green: i32, blue: i32, alpha: i32) -> Self {
            Pixel::new(
                clamp_channel(red),
                clamp_channel(green),
                clamp_channel(blue),
                clamp_channel(alpha),
            )
        }

        pub fn with_alpha(self, alpha: Channel) -> Self {
            Pixel { alpha, ..self }
        }

        /// Brightness as `(R + G + B) / (3 * 255)`, in [0, 1]. Alpha is ignored.
        pub fn intensity(&self) -> Intensity {
            let sum = self.red as u32 + self.green as u32 + self.blue as u32;
            sum as Intensity / (3.0 * Channel::MAX as Intensity)
        }

        /// Encodes a component in [-1, 1] into a byte: `round((v + 1) * 127.5)`.
        ///
        /// Values outside [-1, 1] saturate at 0 or 255.
        pub fn map(value: Component) -> Channel {
            ((value + 1.0) * HALF_RANGE).round().clamp(0.0, Channel::MAX as f64) as Channel
        }

        /// Decodes a byte produced by [`Pixel::map`] back into [-1, 1].
        ///
        /// `unmap(map(v))` is within 1/255 of `v` for every `v` in [-1, 1].
        pub fn unmap(value: Channel) -> Component {
            value as Component * 2.0 / Channel::MAX as Component - 1.0
        }

        /// Multiplies R, G and B by `factor`, truncating toward zero and clamping.
        /// Alpha is carried through unchanged.
        pub fn scale(&self, factor: f64) -> Self {
            let scale_channel = |channel: Channel| clamp_channel((channel as f64 * factor) as i32);
            Pixel {
                red: scale_channel(self.red),
                green: scale_channel(self.green),
                blue: scale_channel(self.blue),
                alpha: self.alpha,
            }
        }

        /// Per-channel mean of the present entries, using integer division.
        ///
        /// Absent entries are left out of the divisor instead of counting as zero.
        /// Returns `None` when no entry is present.
        pub fn mean(pixels: &[Option<Pixel>]) -> Option<Pixel> {
            let mut sum = [0u32; CHANNELS];
            let mut count = 0u32;

            for pixel in pixels.iter().flatten() {
                sum[0] += pixel.red as u32;
                sum[1] += pixel.green as u32;
                sum[2] += pixel.blue as u32;
                sum[3] += pixel.alpha as u32;
                count += 1;
            }

            if count == 0 {
                return None;
            }

            Some(Pixel {
                red: (sum[0] / count) as Channel,
                green: (sum[1] / count) as Channel,
                blue: (sum[2] / count) as Channel,
                alpha: (sum[3] / count) as Channel,
            })
        }

        /// Reads a pixel stored in B, G, R, A byte order.
        pub fn from_bgra(bytes: Bgra) -> Self {
            let [blue, green, red, alpha] = bytes;
            Pixel::new(red, green, blue, alpha)
        }

        /// Packs the pixel in B, G, R, A byte order.
        pub fn to_bgra(&self) -> Bgra {
            [self.blue, self.green, self.red, self.alpha]
        }
    }
}
