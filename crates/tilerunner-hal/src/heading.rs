//! Heading sensors.
//!
//! The gyroscope reports a signed yaw (roughly `[-180, 180)` degrees).  The
//! control loops want a non-negative absolute heading, so [`ImuHeading`]
//! shifts the raw reading by exactly 180 degrees.  No further modulo is
//! applied; the instrument's own wraparound keeps the result in `[0, 360)`.

/// Absolute heading source, in degrees within `[0, 360)`.
pub trait HeadingSensor: Send + Sync {
    fn heading(&mut self) -> f64;
}

/// A raw inertial measurement unit.
pub trait Imu: Send + Sync {
    /// Stable identifier, e.g. `"imu"`.
    fn name(&self) -> &str;

    /// Signed yaw in degrees, as the instrument reports it.
    fn raw_heading(&mut self) -> f64;
}

/// Adapts an [`Imu`] to a [`HeadingSensor`]: `heading = raw + 180`.
pub struct ImuHeading<I> {
    imu: I,
}

impl<I: Imu> ImuHeading<I> {
    pub fn new(imu: I) -> Self {
        Self { imu }
    }

    pub fn into_inner(self) -> I {
        self.imu
    }
}

impl<I: Imu> HeadingSensor for ImuHeading<I> {
    fn heading(&mut self) -> f64 {
        self.imu.raw_heading() + 180.0
    }
}

impl HeadingSensor for Box<dyn HeadingSensor> {
    fn heading(&mut self) -> f64 {
        self.as_mut().heading()
    }
}

impl Imu for Box<dyn Imu> {
    fn name(&self) -> &str {
        self.as_ref().name()
    }

    fn raw_heading(&mut self) -> f64 {
        self.as_mut().raw_heading()
    }
}

/// Stand-in for a missing heading sensor.  Always reads `0`.
///
/// Turn loops driven by this sensor never see progress and only end when
/// their cancellation token is cleared.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHeadingSensor;

impl HeadingSensor for NullHeadingSensor {
    fn heading(&mut self) -> f64 {
        0.0
    }
}
