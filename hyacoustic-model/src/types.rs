//! Value types shared across the read path: antenna geometry, acoustic
//! channel parameters, discretization, and the small transient results
//! (`DoaPoint`, quality vectors).

/// Rigid-body offset of the receiving antenna relative to the vehicle-fixed
/// frame: three translations and three Euler angles (radians).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AntennaOffset {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Yaw.
    pub psi: f64,
    /// Pitch.
    pub gamma: f64,
    /// Roll.
    pub theta: f64,
}

impl AntennaOffset {
    /// The antenna's position along the vehicle's forward axis, used by the
    /// forward-look reader to compute the interferometric base.
    pub fn forward(&self) -> f64 {
        self.x
    }
}

/// Immutable, parsed acoustic-channel parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcousticInfo {
    pub discretization: Discretization,
    pub sample_rate_hz: f64,
    pub carrier_freq_hz: f64,
    pub bandwidth_hz: f64,
    pub antenna_h_aperture: f64,
    pub antenna_v_aperture: f64,
    pub antenna_freq_hz: f64,
    pub antenna_bandwidth_hz: f64,
    pub adc_vref: f64,
    pub adc_offset: i32,
}

/// Which sample-element family a channel's raw bytes decode into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discretization {
    Real,
    Complex,
    Amplitude,
}

impl Discretization {
    /// Size, in bytes, of one encoded element.
    pub fn element_size(self) -> usize {
        match self {
            Discretization::Real => 4,
            Discretization::Complex => 8,
            Discretization::Amplitude => 4,
        }
    }
}

/// A single complex (quadrature) sample: two little-endian `f32`, real part
/// first. `#[repr(C)]` so a block of samples is a straight reinterpret of
/// the channel's raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[repr(C)]
pub struct Complex {
    pub re: f32,
    pub im: f32,
}

impl Complex {
    pub const ZERO: Complex = Complex { re: 0.0, im: 0.0 };

    pub fn new(re: f32, im: f32) -> Self {
        Complex { re, im }
    }

    pub fn amplitude(self) -> f32 {
        (self.re * self.re + self.im * self.im).sqrt()
    }

    /// `self * conj(other)`.
    pub fn mul_conj(self, other: Complex) -> Complex {
        Complex {
            re: self.re * other.re + self.im * other.im,
            im: self.im * other.re - self.re * other.im,
        }
    }

    pub fn phase(self) -> f32 {
        self.im.atan2(self.re)
    }
}

/// One navigation sample: a timestamped scalar (position, heading, depth,
/// …) read by index from a nav channel, the same way an acoustic channel's
/// raw samples are.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavFix {
    pub time_us: i64,
    pub value: f64,
}

/// A direction-of-arrival sample computed interferometrically from two
/// phase-coherent receivers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoaPoint {
    /// Angle from boresight, radians.
    pub angle: f64,
    /// Slant range, meters.
    pub distance: f64,
    pub amplitude: f32,
}

/// The sonar source types this read path accepts. Non-sonar sources (e.g.
/// navigation, log channels) are rejected at `AcousticReader` construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceType {
    SideScanStarboard,
    SideScanPort,
    Echosounder,
    ForwardLook,
    LookAround,
    Profiler,
}

impl SourceType {
    pub fn is_sonar(self) -> bool {
        true
    }
}

/// Which auxiliary channel kind a name refers to, mirroring the store's
/// flat channel-name convention (`<source>-<channel>[-noise|-signal|-tvg]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Data,
    Noise,
    Signal,
    Tvg,
}

/// Derives the store channel name for `(source, channel, kind)`, the Rust
/// equivalent of the original `hyscan_core_get_channel_name` lookup.
pub fn channel_name(source: SourceType, channel: u32, kind: ChannelKind) -> String {
    let source_tag = match source {
        SourceType::SideScanStarboard => "ss-starboard",
        SourceType::SideScanPort => "ss-port",
        SourceType::Echosounder => "echosounder",
        SourceType::ForwardLook => "forward-look",
        SourceType::LookAround => "look-around",
        SourceType::Profiler => "profiler",
    };
    match kind {
        ChannelKind::Data => format!("{source_tag}-{channel}"),
        ChannelKind::Noise => format!("{source_tag}-{channel}-noise"),
        ChannelKind::Signal => format!("{source_tag}-{channel}-signal"),
        ChannelKind::Tvg => format!("{source_tag}-{channel}-tvg"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complex_amplitude_matches_pythagoras() {
        assert_eq!(Complex::new(3.0, 4.0).amplitude(), 5.0);
        assert_eq!(Complex::new(0.0, 0.0).amplitude(), 0.0);
        assert_eq!(Complex::new(-5.0, 12.0).amplitude(), 13.0);
    }

    #[test]
    fn in_phase_pair_has_zero_phase() {
        let c = Complex::new(2.0, 0.0);
        assert_eq!(c.mul_conj(c).phase(), 0.0);
    }

    #[test]
    fn channel_names_derive_by_kind() {
        assert_eq!(
            channel_name(SourceType::SideScanStarboard, 1, ChannelKind::Data),
            "ss-starboard-1"
        );
        assert_eq!(
            channel_name(SourceType::SideScanStarboard, 1, ChannelKind::Signal),
            "ss-starboard-1-signal"
        );
        assert_eq!(
            channel_name(SourceType::SideScanStarboard, 1, ChannelKind::Noise),
            "ss-starboard-1-noise"
        );
    }

    #[test]
    fn element_sizes_match_wire_layout() {
        assert_eq!(Discretization::Real.element_size(), 4);
        assert_eq!(Discretization::Complex.element_size(), 8);
        assert_eq!(Discretization::Amplitude.element_size(), 4);
    }
}
