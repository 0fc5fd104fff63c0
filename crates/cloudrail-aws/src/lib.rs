//! AWS provider support for Cloudrail
//!
//! Contributes the AWS SDK error family to the core classifier and the EC2
//! instance-state wait target set. Call wrappers themselves live with the
//! embedding application; this crate only supplies the provider-specific
//! pieces the core treats as data.

pub mod classify;
pub mod ec2;

pub use classify::rules;
pub use ec2::{
    InstanceStateTarget, SUPPORTED_INSTANCE_STATES, default_instance_wait, instance_state,
    wait_for_instance_state, waiter_failure_signal,
};
