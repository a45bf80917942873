// TiltSpot Android JNI Library
// Exposes the Rust tilt fusion core to Kotlin via JNI

pub mod android_jni;
pub mod error;

pub use error::{JResult, TiltJniError};
