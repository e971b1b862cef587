use std::{ops::AddAssign, time::Duration};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Wall clock time spent in each phase of a step, in seconds.
///
/// Phases which did not run in a step, such as the warm starting phases when warm starting is
/// disabled, are zero.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StepTimes {
    pub preparation: f64,
    pub shape_update: f64,
    pub body_update: f64,
    pub collision_detection: f64,
    pub contact_preparation: f64,
    pub gravity_application: f64,
    pub contact_cache_loading: f64,
    pub contact_warm_starting: f64,
    pub contact_resolution: f64,
    pub contact_cache_saving: f64,
    pub body_finalization: f64,
}

impl StepTimes {
    fn phases(&self) -> [f64; 11] {
        [
            self.preparation,
            self.shape_update,
            self.body_update,
            self.collision_detection,
            self.contact_preparation,
            self.gravity_application,
            self.contact_cache_loading,
            self.contact_warm_starting,
            self.contact_resolution,
            self.contact_cache_saving,
            self.body_finalization,
        ]
    }

    pub fn total(&self) -> f64 {
        self.phases().iter().sum()
    }

    pub fn total_duration(&self) -> Duration {
        Duration::from_secs_f64(self.total())
    }
}

impl AddAssign for StepTimes {
    fn add_assign(&mut self, rhs: Self) {
        self.preparation += rhs.preparation;
        self.shape_update += rhs.shape_update;
        self.body_update += rhs.body_update;
        self.collision_detection += rhs.collision_detection;
        self.contact_preparation += rhs.contact_preparation;
        self.gravity_application += rhs.gravity_application;
        self.contact_cache_loading += rhs.contact_cache_loading;
        self.contact_warm_starting += rhs.contact_warm_starting;
        self.contact_resolution += rhs.contact_resolution;
        self.contact_cache_saving += rhs.contact_cache_saving;
        self.body_finalization += rhs.body_finalization;
    }
}
