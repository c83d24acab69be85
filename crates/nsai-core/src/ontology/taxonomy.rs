//! Built-in capability taxonomy and implication rules.
use nsai_model::CapabilityType;

/// Capabilities every ontology created with [`super::Ontology::new`] starts with.
pub(crate) const STANDARD_CAPABILITIES: &[(&str, CapabilityType, &str)] = &[
    ("docker", CapabilityType::Executor, "Docker executor"),
    ("shell", CapabilityType::Executor, "Shell executor"),
    ("kubernetes", CapabilityType::Executor, "Kubernetes executor"),
    ("docker-machine", CapabilityType::Executor, "Autoscaled docker-machine executor"),
    ("linux", CapabilityType::Platform, "Linux host"),
    ("macos", CapabilityType::Platform, "macOS host"),
    ("windows", CapabilityType::Platform, "Windows host"),
    ("gcp", CapabilityType::Cloud, "Google Cloud"),
    ("aws", CapabilityType::Cloud, "Amazon Web Services"),
    ("azure", CapabilityType::Cloud, "Microsoft Azure"),
    ("cloud", CapabilityType::Cloud, "Any public cloud"),
    ("gpu", CapabilityType::Hardware, "GPU accelerator"),
    ("arm64", CapabilityType::Hardware, "ARM64 CPU"),
    ("x86_64", CapabilityType::Hardware, "x86-64 CPU"),
    ("nordic", CapabilityType::Network, "Nordic region"),
    ("eu-west", CapabilityType::Network, "EU west region"),
    ("us-east", CapabilityType::Network, "US east region"),
];

/// Capability implications: having the key implies having every listed capability.
///
/// Applied transitively when a runner is registered.
pub(crate) const IMPLICATIONS: &[(&str, &[&str])] = &[
    ("docker", &["linux"]),
    ("gcp", &["cloud"]),
    ("aws", &["cloud"]),
    ("azure", &["cloud"]),
    ("nordic", &["eu-west", "gcp"]),
];
