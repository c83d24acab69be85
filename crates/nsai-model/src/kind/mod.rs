mod capability;
pub use capability::{Capability, CapabilitySet, CapabilityType};
