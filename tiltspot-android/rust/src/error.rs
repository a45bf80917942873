use jni::JNIEnv;
use thiserror::Error;
use tiltspot::TiltError;

/// Errors surfaced across the JNI boundary
#[derive(Error, Debug, Clone)]
pub enum TiltJniError {
    #[error(transparent)]
    Core(#[from] TiltError),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("JNI error: {0}")]
    JniError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for JNI operations
pub type JResult<T> = Result<T, TiltJniError>;

/// Java exception class thrown for `error`
pub fn exception_class(error: &TiltJniError) -> &'static str {
    match error {
        TiltJniError::Core(TiltError::AlreadyRunning | TiltError::NotRunning) => {
            "java/lang/IllegalStateException"
        }
        TiltJniError::Core(TiltError::InvalidParameters(_) | TiltError::Config(_))
        | TiltJniError::InvalidParameters(_) => "java/lang/IllegalArgumentException",
        TiltJniError::Core(TiltError::Recording(_))
        | TiltJniError::JniError(_)
        | TiltJniError::Internal(_) => "java/lang/RuntimeException",
    }
}

/// Throw Java exception from Rust error
pub fn throw_java_exception(env: &mut JNIEnv, error: &TiltJniError) -> JResult<()> {
    env.throw_new(exception_class(error), error.to_string())
        .map_err(|_| TiltJniError::JniError("Failed to throw exception".to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_errors_are_illegal_state() {
        assert_eq!(
            exception_class(&TiltError::AlreadyRunning.into()),
            "java/lang/IllegalStateException"
        );
        assert_eq!(
            exception_class(&TiltError::NotRunning.into()),
            "java/lang/IllegalStateException"
        );
    }

    #[test]
    fn test_bad_input_is_illegal_argument() {
        assert_eq!(
            exception_class(&TiltError::InvalidParameters("x".into()).into()),
            "java/lang/IllegalArgumentException"
        );
        assert_eq!(
            exception_class(&TiltJniError::InvalidParameters("bad json".into())),
            "java/lang/IllegalArgumentException"
        );
    }

    #[test]
    fn test_everything_else_is_runtime() {
        assert_eq!(
            exception_class(&TiltJniError::Internal("lock".into())),
            "java/lang/RuntimeException"
        );
        assert_eq!(
            exception_class(&TiltJniError::JniError("array".into())),
            "java/lang/RuntimeException"
        );
    }

    #[test]
    fn test_core_message_is_passed_through() {
        let err: TiltJniError = TiltError::NotRunning.into();
        assert_eq!(err.to_string(), TiltError::NotRunning.to_string());
    }
}
