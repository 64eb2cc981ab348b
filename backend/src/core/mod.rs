//! Core value types shared by every module

pub mod kinematics;

pub use kinematics::{FourVector, Vector3};
