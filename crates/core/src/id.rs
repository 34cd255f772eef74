// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! ID newtypes shared across the campers crates.
//!
//! Each ID wraps a heap-allocated `String` rather than an inline buffer:
//! EC2 instance ids, security group ids, and user-chosen camp/session
//! names are not bounded to a small fixed width.

use crate::define_id;

define_id! {
    /// Identifies a single provisioned compute instance (e.g. an EC2 instance id).
    pub struct InstanceId;
}

define_id! {
    /// Identifies a cloud-side resource created on behalf of a run
    /// (security group, key pair, volume, ...).
    pub struct ResourceLabel;
}

define_id! {
    /// Name of a camp profile as declared in the config file.
    pub struct CampName;
}

define_id! {
    /// Name given to a file-sync session (mutagen or similar).
    pub struct SyncSessionId;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_inner_string() {
        let id = InstanceId::new("i-0123456789abcdef0");
        assert_eq!(id.to_string(), "i-0123456789abcdef0");
        assert_eq!(id.as_str(), "i-0123456789abcdef0");
    }

    #[test]
    fn from_str_and_string_both_work() {
        let a: InstanceId = "i-aaa".into();
        let b: InstanceId = String::from("i-aaa").into();
        assert_eq!(a, b);
    }

    #[test]
    fn unbounded_length_survives_roundtrip() {
        let long_name = "x".repeat(512);
        let id = CampName::new(long_name.clone());
        assert_eq!(id.as_str(), long_name);
    }

    #[test]
    fn serializes_as_bare_string() {
        let id = ResourceLabel::new("sg-deadbeef");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"sg-deadbeef\"");
    }
}
