mod simulated;

pub use simulated::{DeviceProfile, SimulatedPlatform};
