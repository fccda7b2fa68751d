//! Publishing the estimate to readers in other execution contexts.
//!
//! The filter is the single writer of its state. Control loops running at a
//! different rate (or from an interrupt) read a copy through a
//! [`SharedOrientation`], which moves the whole quaternion and its Euler
//! angles inside one critical section so a reader never observes a
//! half-written, non-unit orientation.

use core::cell::Cell;

use critical_section::Mutex;

use crate::{euler::EulerAngles, quaternion::Quaternion};

/// A consistent copy of the published attitude.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttitudeSnapshot {
    /// Unit orientation quaternion.
    pub orientation: Quaternion,
    /// `orientation` as yaw, pitch and roll.
    pub euler: EulerAngles,
    /// Number of publishes so far, `0` if nothing has been published yet.
    pub sequence: u32,
}

impl AttitudeSnapshot {
    const INITIAL: Self = Self {
        orientation: Quaternion::IDENTITY,
        euler: EulerAngles::new(0.0, 0.0, 0.0),
        sequence: 0,
    };
}

impl Default for AttitudeSnapshot {
    fn default() -> Self {
        Self::INITIAL
    }
}

/// Single-writer, many-reader cell for the attitude estimate.
///
/// Can be placed in a `static`:
///
/// ```rust
/// use mahony_ahrs::SharedOrientation;
///
/// static ATTITUDE: SharedOrientation = SharedOrientation::new();
///
/// assert_eq!(ATTITUDE.read().sequence, 0);
/// ```
pub struct SharedOrientation {
    inner: Mutex<Cell<AttitudeSnapshot>>,
}

impl SharedOrientation {
    /// Create a cell holding the identity orientation.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(Cell::new(AttitudeSnapshot::INITIAL)),
        }
    }

    /// Replace the published orientation.
    ///
    /// `orientation` is expected to be a unit quaternion; the Euler angles
    /// are derived from it before entering the critical section.
    pub fn publish(&self, orientation: Quaternion) {
        let euler = orientation.to_euler();
        critical_section::with(|cs| {
            let cell = self.inner.borrow(cs);
            let sequence = cell.get().sequence.wrapping_add(1);
            cell.set(AttitudeSnapshot {
                orientation,
                euler,
                sequence,
            });
        });
    }

    /// Copy out the latest published attitude.
    #[must_use]
    pub fn read(&self) -> AttitudeSnapshot {
        critical_section::with(|cs| self.inner.borrow(cs).get())
    }

    /// Copy out the latest published quaternion.
    #[must_use]
    pub fn orientation(&self) -> Quaternion {
        self.read().orientation
    }

    /// Copy out the latest published Euler angles.
    #[must_use]
    pub fn euler(&self) -> EulerAngles {
        self.read().euler
    }
}

impl Default for SharedOrientation {
    fn default() -> Self {
        Self::new()
    }
}
